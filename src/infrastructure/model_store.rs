//! 模型存储 - 基础设施层
//!
//! 负责定位用户模型目录中的模型文件，不负责下载模型

use crate::config::Config;
use crate::error::ModelError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 用户数据目录下的应用目录名
const APP_DIR_NAME: &str = "resume-extract";
/// 模型子目录名
const MODELS_DIR_NAME: &str = "models";

/// 已定位的模型文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    /// 模型文件完整路径
    pub path: PathBuf,
    /// 模型名称（文件名去掉扩展名）
    pub name: String,
}

/// 模型存储
///
/// 职责：
/// - 解析模型目录（不存在时创建）
/// - 检查模型文件是否存在
/// - 不加载模型
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
    file_name: String,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    /// 按配置创建：优先使用 `model_dir`，否则使用用户数据目录
    pub fn from_config(config: &Config) -> Result<Self, ModelError> {
        let dir = match &config.model_dir {
            Some(dir) => dir.clone(),
            None => default_model_dir()?,
        };
        Ok(Self::new(dir, config.model_file.clone()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 模型文件应当所在的位置
    pub fn expected_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// 定位模型文件
    ///
    /// 模型目录不存在时会被创建，便于用户直接把模型文件放进去。
    pub async fn locate(&self) -> Result<ModelArtifact, ModelError> {
        if !tokio::fs::try_exists(&self.dir).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(|source| ModelError::Directory {
                    path: self.dir.clone(),
                    source,
                })?;
            info!("📁 已创建模型目录: {}", self.dir.display());
        }

        let path = self.expected_path();
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(ModelError::NotFound { path });
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_name.clone());

        debug!("定位到模型文件: {}", path.display());
        Ok(ModelArtifact { path, name })
    }
}

/// 默认模型目录：`<用户数据目录>/resume-extract/models`
pub fn default_model_dir() -> Result<PathBuf, ModelError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(MODELS_DIR_NAME))
        .ok_or(ModelError::NoDataDir)
}

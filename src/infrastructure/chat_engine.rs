//! 对话引擎 - 基础设施层
//!
//! 持有已加载的模型，只暴露"根据对话历史生成回复"的能力
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 调用本地推理服务
//! - 兼容 OpenAI API 的本地运行时（如 llama.cpp server、Ollama 等）
//! - 模型文件由 [`ModelStore`](super::ModelStore) 定位，加载前校验 GGUF 文件头

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use super::model_store::ModelArtifact;
use crate::config::Config;
use crate::error::{InferenceError, ModelError};

/// GGUF 文件头
const GGUF_MAGIC: &[u8; 4] = b"GGUF";

/// 对话角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// 一条对话消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// 对话引擎
///
/// 职责：
/// - 根据完整的对话历史生成一条回复
/// - 不保存对话历史（由会话管理器负责）
/// - 不认识简历
#[async_trait]
pub trait ChatEngine: Send + Sync {
    /// 模型名称（用于日志和错误信息）
    fn model_name(&self) -> &str;

    /// 生成回复
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, InferenceError>;
}

/// 模型加载器
///
/// 把模型文件变成可用的对话引擎。加载失败不在此处重试。
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, artifact: &ModelArtifact) -> Result<Box<dyn ChatEngine>, ModelError>;
}

/// 本地推理服务加载器
pub struct LocalChatLoader {
    api_base_url: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

impl LocalChatLoader {
    pub fn new(config: &Config) -> Self {
        Self {
            api_base_url: config.llm_api_base_url.clone(),
            api_key: config.llm_api_key.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }
}

#[async_trait]
impl ModelLoader for LocalChatLoader {
    async fn load(&self, artifact: &ModelArtifact) -> Result<Box<dyn ChatEngine>, ModelError> {
        verify_gguf(artifact).await?;

        // 配置 OpenAI 客户端（指向本地推理服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&self.api_key)
            .with_api_base(&self.api_base_url);

        debug!(
            "模型 {} 绑定到本地推理服务 {}",
            artifact.name, self.api_base_url
        );

        Ok(Box::new(OpenAiChatEngine {
            client: Client::with_config(openai_config),
            model_name: artifact.name.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }))
    }
}

/// 校验模型文件：非空且以 GGUF 文件头开始
async fn verify_gguf(artifact: &ModelArtifact) -> Result<(), ModelError> {
    let load_failed = |message: String| ModelError::Load {
        path: artifact.path.clone(),
        message,
    };

    let mut file = tokio::fs::File::open(&artifact.path)
        .await
        .map_err(|e| load_failed(format!("无法打开模型文件: {}", e)))?;

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)
        .await
        .map_err(|_| load_failed("模型文件过小或为空".to_string()))?;

    if &magic != GGUF_MAGIC {
        return Err(load_failed("不是有效的 GGUF 模型文件".to_string()));
    }

    Ok(())
}

/// 基于 OpenAI 兼容接口的对话引擎
pub struct OpenAiChatEngine {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiChatEngine {
    fn build_messages(
        &self,
        messages: &[ChatMessage],
    ) -> Result<Vec<ChatCompletionRequestMessage>, InferenceError> {
        let engine_err = |e: async_openai::error::OpenAIError| InferenceError::Engine {
            model: self.model_name.clone(),
            message: e.to_string(),
        };

        messages
            .iter()
            .map(|msg| {
                let built = match msg.role {
                    ChatRole::System => ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessageArgs::default()
                            .content(msg.content.as_str())
                            .build()
                            .map_err(engine_err)?,
                    ),
                    ChatRole::User => ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessageArgs::default()
                            .content(msg.content.as_str())
                            .build()
                            .map_err(engine_err)?,
                    ),
                    ChatRole::Assistant => ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessageArgs::default()
                            .content(msg.content.as_str())
                            .build()
                            .map_err(engine_err)?,
                    ),
                };
                Ok(built)
            })
            .collect()
    }
}

#[async_trait]
impl ChatEngine for OpenAiChatEngine {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, InferenceError> {
        debug!(
            "调用本地模型，模型: {}，消息数: {}",
            self.model_name,
            messages.len()
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(self.build_messages(messages)?)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| InferenceError::Engine {
                model: self.model_name.clone(),
                message: e.to_string(),
            })?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("本地模型调用失败: {}", e);
            InferenceError::Engine {
                model: self.model_name.clone(),
                message: e.to_string(),
            }
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| InferenceError::EmptyReply {
                model: self.model_name.clone(),
            })?;

        debug!("本地模型调用成功，回复长度: {} 字符", content.chars().count());
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_with(bytes: &[u8]) -> (tempfile::TempDir, ModelArtifact) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("m.gguf");
        std::fs::write(&path, bytes).unwrap();
        (
            tmp,
            ModelArtifact {
                path,
                name: "m".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_loader_accepts_gguf_file() {
        let (_tmp, artifact) = artifact_with(b"GGUF\x03\x00\x00\x00");
        let loader = LocalChatLoader::new(&Config::default());

        let engine = loader.load(&artifact).await.unwrap();
        assert_eq!(engine.model_name(), "m");
    }

    #[tokio::test]
    async fn test_loader_rejects_corrupt_file() {
        let (_tmp, artifact) = artifact_with(b"<html>not a model</html>");
        let loader = LocalChatLoader::new(&Config::default());

        let err = loader.load(&artifact).await.err().unwrap();
        assert!(matches!(err, ModelError::Load { .. }));
    }

    #[tokio::test]
    async fn test_loader_rejects_empty_file() {
        let (_tmp, artifact) = artifact_with(b"");
        let loader = LocalChatLoader::new(&Config::default());

        assert!(matches!(
            loader.load(&artifact).await.err(),
            Some(ModelError::Load { .. })
        ));
    }

    /// 需要本地推理服务运行在默认地址
    #[tokio::test]
    #[ignore]
    async fn test_local_chat_roundtrip() {
        let _ = tracing_subscriber::fmt::try_init();

        let (_tmp, artifact) = artifact_with(b"GGUF");
        let engine = LocalChatLoader::new(&Config::default())
            .load(&artifact)
            .await
            .unwrap();

        let reply = engine
            .chat(&[
                ChatMessage::system("你是一个简洁的助手，回答要简短。"),
                ChatMessage::user("只回复数字 1"),
            ])
            .await
            .unwrap();
        println!("模型回复: {}", reply);
        assert!(!reply.is_empty());
    }
}

//! 推理会话管理 - 业务能力层
//!
//! 唯一持有推理会话（已加载的模型 + 对话历史）的模块。
//!
//! ## 生命周期
//!
//! ```text
//! Uninitialized ──ensure_ready──▶ Loading ──成功──▶ Ready
//!                                    │                │
//!                                   失败            超时
//!                                    ▼                ▼
//!                                 Faulted ◀───────────┘
//!                                    │
//!                                    └──ensure_ready（重试）──▶ Loading
//! ```
//!
//! ## 互斥
//!
//! 会话放在 `tokio::sync::Mutex` 中。[`SessionTurn`] 在整份简历的推理期间持有锁，
//! 保证重置对话一定发生在本份简历的推理之前，且两次推理不会交错。

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, InferenceError, ModelError};
use crate::infrastructure::{
    ChatEngine, ChatMessage, LocalChatLoader, ModelArtifact, ModelLoader, ModelStore,
};
use crate::services::prompt_builder::SYSTEM_MESSAGE;

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// 尚未加载
    Uninitialized,
    /// 正在加载模型
    Loading,
    /// 可以推理
    Ready,
    /// 加载失败或推理超时，下次使用时重新加载
    Faulted,
}

/// 已加载的会话
struct ActiveSession {
    engine: Box<dyn ChatEngine>,
    artifact: ModelArtifact,
    /// 对话历史（不含系统消息）
    history: Vec<ChatMessage>,
}

/// 推理会话管理器
///
/// 职责：
/// - 懒加载模型，重复调用只加载一次
/// - 在每份简历之前清空对话历史
/// - 串行化所有推理调用
pub struct InferenceSessionManager {
    store: ModelStore,
    loader: Arc<dyn ModelLoader>,
    system_message: String,
    timeout: Option<Duration>,
    session: Mutex<Option<ActiveSession>>,
    phase: watch::Sender<SessionPhase>,
    loads: AtomicUsize,
}

impl InferenceSessionManager {
    pub fn new(store: ModelStore, loader: Arc<dyn ModelLoader>) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Uninitialized);
        Self {
            store,
            loader,
            system_message: SYSTEM_MESSAGE.to_string(),
            timeout: None,
            session: Mutex::new(None),
            phase,
            loads: AtomicUsize::new(0),
        }
    }

    /// 按配置创建，使用本地推理服务
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let store = ModelStore::from_config(config)?;
        let loader = Arc::new(LocalChatLoader::new(config));
        Ok(Self::new(store, loader).with_timeout(config.inference_timeout()))
    }

    /// 设置单次推理超时
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 设置系统消息
    pub fn with_system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = system_message.into();
        self
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// 当前阶段
    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    /// 订阅阶段变化（例如界面显示"模型加载中"）
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    pub fn is_loaded(&self) -> bool {
        self.phase() == SessionPhase::Ready
    }

    /// 累计加载次数
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// 已加载模型的路径
    pub async fn model_path(&self) -> Option<PathBuf> {
        let slot = self.session.lock().await;
        (*slot).as_ref().map(|s| s.artifact.path.clone())
    }

    /// 确保会话已加载，已加载时什么也不做
    pub async fn ensure_ready(&self) -> AppResult<()> {
        let mut slot = self.session.lock().await;
        self.load_into(&mut slot).await?;
        Ok(())
    }

    /// 在后台预热（不阻塞调用方）
    pub fn warm_up(self: &Arc<Self>) -> JoinHandle<AppResult<()>> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let result = manager.ensure_ready().await;
            if let Err(e) = &result {
                warn!("⚠️ 模型预热失败: {}", e);
            }
            result
        })
    }

    /// 获取一次独占的对话轮次，会话未加载时先加载
    pub async fn turn(&self) -> AppResult<SessionTurn<'_>> {
        let mut slot = self.session.lock().await;
        self.load_into(&mut slot).await?;
        Ok(SessionTurn {
            manager: self,
            slot,
        })
    }

    /// 清空对话历史
    pub async fn reset_turn(&self) -> AppResult<()> {
        self.turn().await?.reset();
        Ok(())
    }

    /// 提交一条提示词并等待模型回复
    pub async fn complete(&self, prompt: &str) -> AppResult<String> {
        let mut turn = self.turn().await?;
        Ok(turn.complete(prompt).await?)
    }

    async fn load_into(&self, slot: &mut Option<ActiveSession>) -> Result<(), ModelError> {
        if slot.is_some() {
            return Ok(());
        }

        self.phase.send_replace(SessionPhase::Loading);

        let loaded = async {
            let artifact = self.store.locate().await?;
            info!("🧠 正在加载模型: {}", artifact.path.display());
            let engine = self.loader.load(&artifact).await?;
            Ok::<_, ModelError>((artifact, engine))
        }
        .await;

        match loaded {
            Ok((artifact, engine)) => {
                self.loads.fetch_add(1, Ordering::SeqCst);
                info!("✓ 模型加载完成: {}", engine.model_name());
                *slot = Some(ActiveSession {
                    engine,
                    artifact,
                    history: Vec::new(),
                });
                self.phase.send_replace(SessionPhase::Ready);
                Ok(())
            }
            Err(e) => {
                error!("❌ 模型加载失败: {}", e);
                self.phase.send_replace(SessionPhase::Faulted);
                Err(e)
            }
        }
    }

    /// 丢弃当前会话，下次使用时重新加载
    fn fault(&self, slot: &mut Option<ActiveSession>) {
        *slot = None;
        self.phase.send_replace(SessionPhase::Faulted);
    }
}

/// 一次独占的对话轮次
///
/// 持有期间其他调用方无法访问会话。
pub struct SessionTurn<'a> {
    manager: &'a InferenceSessionManager,
    slot: MutexGuard<'a, Option<ActiveSession>>,
}

impl SessionTurn<'_> {
    /// 清空对话历史，系统消息保留
    pub fn reset(&mut self) {
        if let Some(session) = (*self.slot).as_mut() {
            debug!("清空对话历史 ({} 条)", session.history.len());
            session.history.clear();
        }
    }

    /// 当前对话历史条数（不含系统消息）
    pub fn history_len(&self) -> usize {
        (*self.slot).as_ref().map_or(0, |s| s.history.len())
    }

    /// 提交提示词并等待回复
    ///
    /// 超时会丢弃会话（模型状态未知），其他错误保留会话。
    pub async fn complete(&mut self, prompt: &str) -> Result<String, InferenceError> {
        let timeout = self.manager.timeout;
        let session = (*self.slot).as_mut().ok_or(InferenceError::NotReady)?;

        session.history.push(ChatMessage::user(prompt));
        let messages: Vec<ChatMessage> = std::iter::once(ChatMessage::system(
            self.manager.system_message.as_str(),
        ))
        .chain(session.history.iter().cloned())
        .collect();

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, session.engine.chat(&messages))
                .await
                .unwrap_or(Err(InferenceError::Timeout { limit })),
            None => session.engine.chat(&messages).await,
        };

        match result {
            Ok(reply) => {
                session.history.push(ChatMessage::assistant(reply.as_str()));
                Ok(reply)
            }
            Err(e) => {
                session.history.pop();
                if matches!(e, InferenceError::Timeout { .. }) {
                    warn!("⚠️ 推理超时，丢弃当前会话，下次使用时重新加载");
                    self.manager.fault(&mut self.slot);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// 记录收到的消息，并按顺序返回预设回复
    struct RecordingEngine {
        seen: Arc<StdMutex<Vec<Vec<ChatMessage>>>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl ChatEngine for RecordingEngine {
        fn model_name(&self) -> &str {
            "recording"
        }

        async fn chat(&self, messages: &[ChatMessage]) -> Result<String, InferenceError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let mut seen = self.seen.lock().unwrap();
            seen.push(messages.to_vec());
            Ok(format!("reply-{}", seen.len()))
        }
    }

    struct RecordingLoader {
        seen: Arc<StdMutex<Vec<Vec<ChatMessage>>>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl ModelLoader for RecordingLoader {
        async fn load(&self, _artifact: &ModelArtifact) -> Result<Box<dyn ChatEngine>, ModelError> {
            Ok(Box::new(RecordingEngine {
                seen: Arc::clone(&self.seen),
                delay: self.delay,
            }))
        }
    }

    fn manager_with(
        delay: Option<Duration>,
    ) -> (
        tempfile::TempDir,
        InferenceSessionManager,
        Arc<StdMutex<Vec<Vec<ChatMessage>>>>,
    ) {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("m.gguf"), b"GGUF").unwrap();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let loader = Arc::new(RecordingLoader {
            seen: Arc::clone(&seen),
            delay,
        });
        let manager = InferenceSessionManager::new(ModelStore::new(tmp.path(), "m.gguf"), loader);
        (tmp, manager, seen)
    }

    #[tokio::test]
    async fn test_ensure_ready_loads_once() {
        let (_tmp, manager, _) = manager_with(None);
        assert_eq!(manager.phase(), SessionPhase::Uninitialized);

        manager.ensure_ready().await.unwrap();
        manager.ensure_ready().await.unwrap();

        assert_eq!(manager.load_count(), 1);
        assert!(manager.is_loaded());
        assert!(manager.model_path().await.unwrap().ends_with("m.gguf"));
    }

    #[tokio::test]
    async fn test_missing_model_faults_and_allows_retry() {
        let tmp = tempfile::tempdir().unwrap();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let manager = InferenceSessionManager::new(
            ModelStore::new(tmp.path(), "m.gguf"),
            Arc::new(RecordingLoader { seen, delay: None }),
        );

        let err = manager.ensure_ready().await.unwrap_err();
        assert!(err.is_batch_fatal());
        assert_eq!(manager.phase(), SessionPhase::Faulted);

        std::fs::write(tmp.path().join("m.gguf"), b"GGUF").unwrap();
        manager.ensure_ready().await.unwrap();
        assert_eq!(manager.phase(), SessionPhase::Ready);
        assert_eq!(manager.load_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_history_but_keeps_system_message() {
        let (_tmp, manager, seen) = manager_with(None);

        manager.complete("第一份").await.unwrap();
        manager.complete("追问").await.unwrap();
        manager.reset_turn().await.unwrap();
        manager.complete("第二份").await.unwrap();

        let seen = seen.lock().unwrap();
        // 未重置时历史累积：system + user + assistant + user
        assert_eq!(seen[1].len(), 4);
        // 重置后只剩 system + user
        assert_eq!(seen[2].len(), 2);
        assert_eq!(seen[2][0], ChatMessage::system(SYSTEM_MESSAGE));
        assert_eq!(seen[2][1], ChatMessage::user("第二份"));
    }

    #[tokio::test]
    async fn test_custom_system_message_survives_reset() {
        let (_tmp, manager, seen) = manager_with(None);
        let manager = manager.with_system_message("只输出 JSON");

        manager.complete("第一份").await.unwrap();
        manager.reset_turn().await.unwrap();
        manager.complete("第二份").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0][0], ChatMessage::system("只输出 JSON"));
        assert_eq!(
            seen[1],
            vec![ChatMessage::system("只输出 JSON"), ChatMessage::user("第二份")]
        );
    }

    #[tokio::test]
    async fn test_timeout_faults_session_and_next_turn_reloads() {
        let (_tmp, manager, _) = manager_with(Some(Duration::from_secs(5)));
        let manager = manager.with_timeout(Some(Duration::from_millis(50)));

        let err = manager.complete("慢").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Inference(InferenceError::Timeout { .. })
        ));
        assert_eq!(manager.phase(), SessionPhase::Faulted);

        let turn = manager.turn().await.unwrap();
        assert_eq!(turn.history_len(), 0);
        drop(turn);
        assert_eq!(manager.load_count(), 2);
    }

    #[tokio::test]
    async fn test_warm_up_runs_in_background() {
        let (_tmp, manager, _) = manager_with(None);
        let manager = Arc::new(manager);
        let mut phases = manager.subscribe();

        let handle = manager.warm_up();
        handle.await.unwrap().unwrap();

        assert_eq!(*phases.borrow_and_update(), SessionPhase::Ready);
        assert_eq!(manager.load_count(), 1);
    }
}

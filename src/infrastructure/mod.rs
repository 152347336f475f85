pub mod chat_engine;
pub mod model_store;

pub use chat_engine::{
    ChatEngine, ChatMessage, ChatRole, LocalChatLoader, ModelLoader, OpenAiChatEngine,
};
pub use model_store::{ModelArtifact, ModelStore};

// Core chat module - the gateway adapter between the bot and the chat platform.
// Following the same pattern as the other core modules: models, a port trait,
// and a service generic over that port.

pub mod answer_collector;
pub mod chat_models;
pub mod chat_platform;
pub mod chat_service;
#[cfg(test)]
pub mod mock_platform;

pub use chat_models::*;
pub use chat_platform::{ChatError, ChatPlatform, ResourceKind};
pub use chat_service::ChatService;

use super::chat_models::{
    ChannelInfo, EmbedMessage, GuildInfo, IncomingMessage, MemberInfo, PermissionGrant,
};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Channel,
    Guild,
    Member,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Channel => write!(f, "Channel"),
            ResourceKind::Guild => write!(f, "Guild"),
            ResourceKind::Member => write!(f, "Member"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: ResourceKind, id: u64 },

    #[error("Channel with id {0} is not a text channel")]
    UnsupportedChannel(u64),

    #[error("Answer collection in channel {channel_id} cancelled after {collected}/{expected} answers")]
    Cancelled {
        channel_id: u64,
        collected: usize,
        expected: usize,
    },

    #[error("Expected at least {expected} answers, got {got}")]
    MissingAnswers { expected: usize, got: usize },

    #[error("Platform error: {0}")]
    Platform(String),
}

impl ChatError {
    pub fn not_found(kind: ResourceKind, id: u64) -> Self {
        ChatError::NotFound { kind, id }
    }
}

// ============================================================================
// PLATFORM TRAIT (PORT)
// ============================================================================

/// Everything the adapter needs from the chat client library.
///
/// Lookups return `Ok(None)` when the id does not resolve; transport and
/// permission failures come back as `ChatError::Platform`.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn fetch_channel(&self, channel_id: u64) -> Result<Option<ChannelInfo>, ChatError>;

    async fn fetch_guild(&self, guild_id: u64) -> Result<Option<GuildInfo>, ChatError>;

    async fn fetch_member(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<MemberInfo>, ChatError>;

    /// Post plain text. Returns the new message id.
    async fn send_text(&self, channel_id: u64, text: &str) -> Result<u64, ChatError>;

    /// Post an embed. Returns the new message id.
    async fn send_embed(&self, channel_id: u64, embed: &EmbedMessage) -> Result<u64, ChatError>;

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), ChatError>;

    /// Open a thread hanging off `message_id`. Returns the thread's channel id.
    async fn start_thread(
        &self,
        channel_id: u64,
        message_id: u64,
        name: &str,
    ) -> Result<u64, ChatError>;

    /// Create a guild text channel. Returns the new channel id.
    async fn create_text_channel(
        &self,
        guild_id: u64,
        name: &str,
        permissions: &[PermissionGrant],
    ) -> Result<u64, ChatError>;

    async fn delete_channel(&self, channel_id: u64) -> Result<(), ChatError>;

    /// Start receiving messages posted in `channel_id`.
    ///
    /// Replaces any earlier subscription for the same channel. The stream ends
    /// when the platform drops the sender.
    fn subscribe_messages(&self, channel_id: u64) -> mpsc::UnboundedReceiver<IncomingMessage>;

    /// Drop the subscription for `channel_id` once its receiver is gone.
    /// A newer, still-live subscription on the same channel is kept.
    fn unsubscribe_messages(&self, channel_id: u64);
}

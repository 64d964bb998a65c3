// Chat domain models - the values the adapter hands back and forth.
//
// These are pure domain types with no Discord dependencies.
// The infra layer converts them to serenity builders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A conversation surface, known only by its platform-assigned id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: u64,
}

impl ChannelRef {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

/// What kind of surface a resolved channel is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Thread,
    Direct,
    Voice,
    Category,
    Other,
}

impl ChannelKind {
    /// Whether plain messages and embeds can be posted here.
    pub fn is_text_capable(self) -> bool {
        matches!(self, ChannelKind::Text | ChannelKind::Thread | ChannelKind::Direct)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    #[allow(dead_code)]
    pub id: u64,
    pub kind: ChannelKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuildInfo {
    #[allow(dead_code)]
    pub id: u64,
    pub name: String,
    pub icon_url: Option<String>,
    /// The implicit @everyone role.
    pub everyone_role_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    pub user_id: u64,
    pub username: String,
    /// Legacy `#1234` tag, absent on migrated accounts.
    pub discriminator: Option<u16>,
    pub avatar_url: String,
}

impl MemberInfo {
    pub fn display_tag(&self) -> String {
        match self.discriminator {
            Some(discriminator) => format!("{}#{:04}", self.username, discriminator),
            None => self.username.clone(),
        }
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id)
    }
}

/// A message delivered by the gateway while a collector is listening.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub channel_id: u64,
    pub author_id: u64,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPermission {
    View,
    Send,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteTarget {
    Member(u64),
    Role(u64),
}

/// One permission overwrite applied when a channel is created.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionGrant {
    pub target: OverwriteTarget,
    pub allow: Vec<ChannelPermission>,
    pub deny: Vec<ChannelPermission>,
}

// ============================================================================
// EMBEDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

/// A styled message payload. Built once from collected answers, then sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedMessage {
    pub color: u32,
    pub title: String,
    pub author: EmbedAuthor,
    pub description: String,
    pub fields: Vec<EmbedField>,
    pub timestamp: DateTime<Utc>,
    pub footer: EmbedFooter,
}

/// Where the embed description is read from in the answer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionSlot {
    /// The answer right after the last field question.
    AfterQuestions,
    /// A fixed answer position; every question still becomes a field.
    Index(usize),
}

impl DescriptionSlot {
    pub fn resolve(self, question_count: usize) -> usize {
        match self {
            DescriptionSlot::AfterQuestions => question_count,
            DescriptionSlot::Index(index) => index,
        }
    }
}

/// Tunables for the chat adapter.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Upper bound for a whole question/answer session.
    pub collect_timeout: Duration,
    pub embed_color: u32,
    pub contact_field_name: String,
    pub approve_emoji: String,
    pub reject_emoji: String,
    pub description_slot: DescriptionSlot,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            collect_timeout: Duration::from_secs(300),
            embed_color: 0x0099ff,
            contact_field_name: "Contact".to_string(),
            approve_emoji: "👍".to_string(),
            reject_emoji: "👎".to_string(),
            description_slot: DescriptionSlot::AfterQuestions,
        }
    }
}

/// Result of a successful embed send.
#[derive(Debug)]
pub struct SentEmbed {
    pub message_id: u64,
    /// Reactions and discussion thread, running in the background.
    pub follow_up: tokio::task::JoinHandle<()>,
}

// In-memory `ChatPlatform` shared by the core test suites.

use super::chat_models::{
    ChannelInfo, ChannelKind, EmbedMessage, GuildInfo, IncomingMessage, MemberInfo,
    PermissionGrant,
};
use super::chat_platform::{ChatError, ChatPlatform};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

pub const GUILD: u64 = 1;
pub const USER: u64 = 10;
pub const STRANGER: u64 = 11;
pub const TEXT_CHANNEL: u64 = 100;
pub const VOICE_CHANNEL: u64 = 101;
pub const MISSING: u64 = 999;

/// In-memory platform for testing
#[derive(Default)]
pub struct MockPlatform {
    pub channels: DashMap<u64, ChannelKind>,
    pub guilds: DashMap<u64, GuildInfo>,
    pub members: DashMap<(u64, u64), MemberInfo>,
    pub sent: Mutex<Vec<(u64, String)>>,
    pub embeds: Mutex<Vec<(u64, EmbedMessage)>>,
    pub reactions: Mutex<Vec<(u64, u64, String)>>,
    pub threads: Mutex<Vec<(u64, u64, String)>>,
    pub created: Mutex<Vec<(u64, String, Vec<PermissionGrant>)>>,
    pub deleted: Mutex<Vec<u64>>,
    pub unsubscribed: Mutex<Vec<u64>>,
    scripted: Mutex<Vec<IncomingMessage>>,
    live_senders: Mutex<Vec<(u64, mpsc::UnboundedSender<IncomingMessage>)>>,
    next_id: AtomicU64,
    pub fail_reactions: AtomicBool,
    pub fail_embeds: AtomicBool,
}

impl MockPlatform {
    pub fn new() -> Self {
        let platform = Self::default();
        platform.next_id.store(5_000, Ordering::SeqCst);
        platform.channels.insert(TEXT_CHANNEL, ChannelKind::Text);
        platform.channels.insert(VOICE_CHANNEL, ChannelKind::Voice);
        platform.guilds.insert(
            GUILD,
            GuildInfo {
                id: GUILD,
                name: "Rustaceans".to_string(),
                icon_url: Some("https://cdn.example/guild.png".to_string()),
                everyone_role_id: GUILD,
            },
        );
        platform.members.insert(
            (GUILD, USER),
            MemberInfo {
                user_id: USER,
                username: "ferris".to_string(),
                discriminator: None,
                avatar_url: "https://cdn.example/ferris.png".to_string(),
            },
        );
        platform
    }

    /// Queue a message that is delivered as soon as a collector subscribes.
    /// Scripted messages go to whichever channel subscribes next.
    pub fn script(&self, author_id: u64, content: &str) {
        self.scripted.lock().unwrap().push(IncomingMessage {
            channel_id: 0,
            author_id,
            content: content.to_string(),
        });
    }

    /// Deliver a message to the live subscription on `channel_id` right now.
    pub fn push_live(&self, channel_id: u64, author_id: u64, content: &str) -> bool {
        self.live_senders
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == channel_id)
            .any(|(_, tx)| {
                tx.send(IncomingMessage {
                    channel_id,
                    author_id,
                    content: content.to_string(),
                })
                .is_ok()
            })
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn sent_to(&self, channel_id: u64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == channel_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn fetch_channel(&self, channel_id: u64) -> Result<Option<ChannelInfo>, ChatError> {
        Ok(self.channels.get(&channel_id).map(|kind| ChannelInfo {
            id: channel_id,
            kind: *kind,
        }))
    }

    async fn fetch_guild(&self, guild_id: u64) -> Result<Option<GuildInfo>, ChatError> {
        Ok(self.guilds.get(&guild_id).map(|g| g.clone()))
    }

    async fn fetch_member(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<MemberInfo>, ChatError> {
        Ok(self.members.get(&(guild_id, user_id)).map(|m| m.clone()))
    }

    async fn send_text(&self, channel_id: u64, text: &str) -> Result<u64, ChatError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel_id, text.to_string()));
        Ok(self.allocate_id())
    }

    async fn send_embed(&self, channel_id: u64, embed: &EmbedMessage) -> Result<u64, ChatError> {
        if self.fail_embeds.load(Ordering::SeqCst) {
            return Err(ChatError::Platform("Missing Access".to_string()));
        }
        self.embeds
            .lock()
            .unwrap()
            .push((channel_id, embed.clone()));
        Ok(self.allocate_id())
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), ChatError> {
        if self.fail_reactions.load(Ordering::SeqCst) {
            return Err(ChatError::Platform("Missing Permissions".to_string()));
        }
        self.reactions
            .lock()
            .unwrap()
            .push((channel_id, message_id, emoji.to_string()));
        Ok(())
    }

    async fn start_thread(
        &self,
        channel_id: u64,
        message_id: u64,
        name: &str,
    ) -> Result<u64, ChatError> {
        let thread_id = self.allocate_id();
        self.channels.insert(thread_id, ChannelKind::Thread);
        self.threads
            .lock()
            .unwrap()
            .push((channel_id, message_id, name.to_string()));
        Ok(thread_id)
    }

    async fn create_text_channel(
        &self,
        guild_id: u64,
        name: &str,
        permissions: &[PermissionGrant],
    ) -> Result<u64, ChatError> {
        let channel_id = self.allocate_id();
        self.channels.insert(channel_id, ChannelKind::Text);
        self.created
            .lock()
            .unwrap()
            .push((guild_id, name.to_string(), permissions.to_vec()));
        Ok(channel_id)
    }

    async fn delete_channel(&self, channel_id: u64) -> Result<(), ChatError> {
        self.channels.remove(&channel_id);
        self.deleted.lock().unwrap().push(channel_id);
        Ok(())
    }

    fn subscribe_messages(&self, channel_id: u64) -> mpsc::UnboundedReceiver<IncomingMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        for mut message in self.scripted.lock().unwrap().drain(..) {
            message.channel_id = channel_id;
            let _ = tx.send(message);
        }
        // Keep the sender alive so only the timer can end an idle session.
        self.live_senders.lock().unwrap().push((channel_id, tx));
        rx
    }

    fn unsubscribe_messages(&self, channel_id: u64) {
        self.unsubscribed.lock().unwrap().push(channel_id);
    }
}

// serenity-backed implementation of the chat platform port.
//
// All lookups go over HTTP so every call sees live platform state. A 404 from
// Discord means "does not resolve"; anything else is a platform error.

use super::message_router::MessageRouter;
use crate::core::chat::{
    ChannelInfo, ChannelKind, ChannelPermission, ChatError, ChatPlatform, EmbedMessage,
    GuildInfo, IncomingMessage, MemberInfo, OverwriteTarget, PermissionGrant,
};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct SerenityPlatform {
    http: Arc<serenity::Http>,
    router: MessageRouter,
}

impl SerenityPlatform {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self {
            http,
            router: MessageRouter::new(),
        }
    }

    /// Feed a gateway message to any collector listening on its channel.
    pub fn dispatch_message(&self, message: &serenity::Message) {
        let incoming = IncomingMessage {
            channel_id: message.channel_id.get(),
            author_id: message.author.id.get(),
            content: message.content.clone(),
        };

        if self.router.route(incoming) {
            tracing::debug!(
                channel_id = message.channel_id.get(),
                "Routed message to collector"
            );
        }
    }
}

fn is_not_found(error: &serenity::Error) -> bool {
    match error {
        serenity::Error::Http(http_error) => http_error
            .status_code()
            .map(|status| status.as_u16() == 404)
            .unwrap_or(false),
        _ => false,
    }
}

fn platform_error(error: serenity::Error) -> ChatError {
    ChatError::Platform(error.to_string())
}

// serenity's id constructors panic on 0, which Discord never assigns.
fn checked_id<T>(id: u64, make: fn(u64) -> T) -> Option<T> {
    (id != 0).then(|| make(id))
}

fn require_id<T>(id: u64, kind: &str, make: fn(u64) -> T) -> Result<T, ChatError> {
    checked_id(id, make).ok_or_else(|| ChatError::Platform(format!("Invalid {} id 0", kind)))
}

fn channel_kind(channel: &serenity::Channel) -> ChannelKind {
    match channel {
        serenity::Channel::Guild(guild_channel) => match guild_channel.kind {
            serenity::ChannelType::Text | serenity::ChannelType::News => ChannelKind::Text,
            serenity::ChannelType::PublicThread
            | serenity::ChannelType::PrivateThread
            | serenity::ChannelType::NewsThread => ChannelKind::Thread,
            serenity::ChannelType::Voice | serenity::ChannelType::Stage => ChannelKind::Voice,
            serenity::ChannelType::Category => ChannelKind::Category,
            _ => ChannelKind::Other,
        },
        serenity::Channel::Private(_) => ChannelKind::Direct,
        _ => ChannelKind::Other,
    }
}

fn to_permissions(permissions: &[ChannelPermission]) -> serenity::Permissions {
    permissions
        .iter()
        .fold(serenity::Permissions::empty(), |acc, permission| {
            acc | match permission {
                ChannelPermission::View => serenity::Permissions::VIEW_CHANNEL,
                ChannelPermission::Send => serenity::Permissions::SEND_MESSAGES,
            }
        })
}

fn to_overwrite(grant: &PermissionGrant) -> Result<serenity::PermissionOverwrite, ChatError> {
    let kind = match grant.target {
        OverwriteTarget::Member(user_id) => serenity::PermissionOverwriteType::Member(
            require_id(user_id, "user", serenity::UserId::new)?,
        ),
        OverwriteTarget::Role(role_id) => serenity::PermissionOverwriteType::Role(require_id(
            role_id,
            "role",
            serenity::RoleId::new,
        )?),
    };

    Ok(serenity::PermissionOverwrite {
        allow: to_permissions(&grant.allow),
        deny: to_permissions(&grant.deny),
        kind,
    })
}

fn to_create_embed(embed: &EmbedMessage) -> serenity::CreateEmbed {
    let mut footer = serenity::CreateEmbedFooter::new(&embed.footer.text);
    if let Some(icon_url) = &embed.footer.icon_url {
        footer = footer.icon_url(icon_url);
    }

    let mut builder = serenity::CreateEmbed::new()
        .colour(embed.color)
        .title(&embed.title)
        .author(serenity::CreateEmbedAuthor::new(&embed.author.name).icon_url(&embed.author.icon_url))
        .description(&embed.description)
        .fields(
            embed
                .fields
                .iter()
                .map(|field| (field.name.clone(), field.value.clone(), field.inline)),
        )
        .footer(footer);

    match serenity::Timestamp::from_unix_timestamp(embed.timestamp.timestamp()) {
        Ok(timestamp) => builder = builder.timestamp(timestamp),
        Err(e) => tracing::warn!("Skipping embed timestamp: {}", e),
    }

    builder
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn fetch_channel(&self, channel_id: u64) -> Result<Option<ChannelInfo>, ChatError> {
        let Some(id) = checked_id(channel_id, serenity::ChannelId::new) else {
            return Ok(None);
        };

        match id.to_channel(&*self.http).await {
            Ok(channel) => Ok(Some(ChannelInfo {
                id: channel_id,
                kind: channel_kind(&channel),
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(platform_error(e)),
        }
    }

    async fn fetch_guild(&self, guild_id: u64) -> Result<Option<GuildInfo>, ChatError> {
        let Some(id) = checked_id(guild_id, serenity::GuildId::new) else {
            return Ok(None);
        };

        match id.to_partial_guild(&*self.http).await {
            Ok(guild) => Ok(Some(GuildInfo {
                id: guild.id.get(),
                icon_url: guild.icon_url(),
                name: guild.name,
                // @everyone role ID is same as guild ID
                everyone_role_id: guild.id.get(),
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(platform_error(e)),
        }
    }

    async fn fetch_member(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<MemberInfo>, ChatError> {
        let (Some(guild), Some(user)) = (
            checked_id(guild_id, serenity::GuildId::new),
            checked_id(user_id, serenity::UserId::new),
        ) else {
            return Ok(None);
        };

        match guild.member(&*self.http, user).await {
            Ok(member) => Ok(Some(MemberInfo {
                user_id: member.user.id.get(),
                discriminator: member.user.discriminator.map(|d| d.get()),
                avatar_url: member.user.face(),
                username: member.user.name,
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(platform_error(e)),
        }
    }

    async fn send_text(&self, channel_id: u64, text: &str) -> Result<u64, ChatError> {
        let message = require_id(channel_id, "channel", serenity::ChannelId::new)?
            .say(&*self.http, text)
            .await
            .map_err(platform_error)?;
        Ok(message.id.get())
    }

    async fn send_embed(&self, channel_id: u64, embed: &EmbedMessage) -> Result<u64, ChatError> {
        let message = require_id(channel_id, "channel", serenity::ChannelId::new)?
            .send_message(
                &*self.http,
                serenity::CreateMessage::new().embed(to_create_embed(embed)),
            )
            .await
            .map_err(platform_error)?;
        Ok(message.id.get())
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), ChatError> {
        require_id(channel_id, "channel", serenity::ChannelId::new)?
            .create_reaction(
                &*self.http,
                require_id(message_id, "message", serenity::MessageId::new)?,
                serenity::ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(platform_error)
    }

    async fn start_thread(
        &self,
        channel_id: u64,
        message_id: u64,
        name: &str,
    ) -> Result<u64, ChatError> {
        let thread = require_id(channel_id, "channel", serenity::ChannelId::new)?
            .create_thread_from_message(
                &*self.http,
                require_id(message_id, "message", serenity::MessageId::new)?,
                serenity::CreateThread::new(name),
            )
            .await
            .map_err(platform_error)?;
        Ok(thread.id.get())
    }

    async fn create_text_channel(
        &self,
        guild_id: u64,
        name: &str,
        permissions: &[PermissionGrant],
    ) -> Result<u64, ChatError> {
        let overwrites = permissions
            .iter()
            .map(to_overwrite)
            .collect::<Result<Vec<_>, _>>()?;

        let channel = require_id(guild_id, "guild", serenity::GuildId::new)?
            .create_channel(
                &*self.http,
                serenity::CreateChannel::new(name)
                    .kind(serenity::ChannelType::Text)
                    .permissions(overwrites),
            )
            .await
            .map_err(platform_error)?;
        Ok(channel.id.get())
    }

    async fn delete_channel(&self, channel_id: u64) -> Result<(), ChatError> {
        require_id(channel_id, "channel", serenity::ChannelId::new)?
            .delete(&*self.http)
            .await
            .map(|_| ())
            .map_err(platform_error)
    }

    fn subscribe_messages(&self, channel_id: u64) -> mpsc::UnboundedReceiver<IncomingMessage> {
        self.router.subscribe(channel_id)
    }

    fn unsubscribe_messages(&self, channel_id: u64) {
        self.router.unsubscribe(channel_id);
    }
}

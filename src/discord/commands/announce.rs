use crate::core::chat::ChatError;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Post a plain text announcement to a channel.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn announce(
    ctx: Context<'_>,
    #[description = "Channel to post in"] channel: serenity::GuildChannel,
    #[description = "What to say"] text: String,
) -> Result<(), Error> {
    let reply = match ctx.data().chat.send_text(channel.id.get(), &text).await {
        Ok(()) => format!("✅ Announcement posted in <#{}>.", channel.id),
        Err(ChatError::UnsupportedChannel(_)) => {
            format!("❌ <#{}> can't receive text messages.", channel.id)
        }
        Err(ChatError::NotFound { .. }) => "❌ That channel no longer exists.".to_string(),
        Err(e) => return Err(e.into()),
    };

    ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
        .await?;

    Ok(())
}

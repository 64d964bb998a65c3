// Discord commands for posting job offers.
//
// **Notice the pattern:**
// 1. Extract primitive ids from Discord types
// 2. Call the chat service
// 3. Tell the user how it went
//
// The session itself (questions, embed, channel cleanup) lives in the core
// job board.

use crate::core::chat::{ChatError, ChatService};
use crate::core::jobs::JobBoard;
use crate::infra::chat::SerenityPlatform;
use std::sync::Arc;

/// Type alias for our bot's context.
/// This is what every command receives as its first parameter.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands.
pub struct Data {
    /// The one client handle; the event handler feeds it gateway messages.
    pub platform: Arc<SerenityPlatform>,
    pub chat: Arc<ChatService<SerenityPlatform>>,
    pub jobs: Arc<JobBoard<SerenityPlatform>>,
}

/// Post a new job offer by answering a few questions in a private channel.
#[poise::command(slash_command, guild_only)]
pub async fn job(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();
    let user_id = ctx.author().id.get();
    let jobs = &ctx.data().jobs;

    let channel = jobs.open_session(guild_id, user_id).await?;

    let pointer = ctx
        .send(
            poise::CreateReply::default()
                .content(format!(
                    "📝 Head over to <#{}> and answer a few questions about the job.",
                    channel.id
                ))
                .ephemeral(true),
        )
        .await;
    if let Err(e) = pointer {
        // Nobody knows the channel exists, so don't leave it behind.
        jobs.close_session(&channel).await;
        return Err(e.into());
    }

    let sent = match jobs.complete_session(&channel, guild_id, user_id).await {
        Ok(sent) => sent,
        Err(ChatError::Cancelled {
            collected,
            expected,
            ..
        }) => {
            tracing::info!(user_id, collected, expected, "Job offer abandoned");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let confirmation = ctx
        .send(
            poise::CreateReply::default()
                .content(format!(
                    "✅ Your job offer was posted in <#{}>!",
                    jobs.channel_id()
                ))
                .ephemeral(true),
        )
        .await;
    if let Err(e) = confirmation {
        // The offer is up; a stale interaction token only loses the receipt.
        tracing::warn!(user_id, message_id = sent.message_id, "Failed to confirm job offer: {}", e);
    }

    if let Err(e) = sent.follow_up.await {
        tracing::warn!(message_id = sent.message_id, "Job offer follow-up task failed: {}", e);
    }

    Ok(())
}

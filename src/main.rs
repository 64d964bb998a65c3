// This is the entry point of the job board bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (serenity client, config)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::chat::ChatService;
use crate::core::jobs::JobBoard;
use crate::discord::{Data, Error};
use crate::infra::chat::SerenityPlatform;
use crate::infra::config::BotConfig;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Event handler for non-command Discord events.
/// Messages are routed to any question/answer session waiting on their channel.
async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        // Ignore bot messages (including our own prompts)
        if new_message.author.bot {
            return Ok(());
        }

        data.platform.dispatch_message(new_message);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;
    tracing::info!(
        jobs_channel_id = config.jobs.channel_id,
        questions = config.jobs.questions.len(),
        "Configuration loaded"
    );

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read answers
        | serenity::GatewayIntents::GUILDS;

    let BotConfig {
        token,
        jobs,
        chat,
        dev_guild_id,
    } = config;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::commands::jobs::job(),
                discord::commands::announce::announce(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("Bot is starting up...");

                match dev_guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?
                    }
                    None => {
                        // Can take up to an hour to propagate
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?
                    }
                }
                tracing::info!("Commands registered");

                // ============================================================
                // DEPENDENCY INJECTION
                // ============================================================
                // One long-lived client handle shared by the adapter and the
                // event handler.
                let platform = Arc::new(SerenityPlatform::new(ctx.http.clone()));
                let chat_service = Arc::new(ChatService::new(Arc::clone(&platform), chat));
                let job_board = Arc::new(JobBoard::new(
                    Arc::clone(&chat_service),
                    jobs.channel_id,
                    jobs.questions,
                ));

                Ok(Data {
                    platform,
                    chat: chat_service,
                    jobs: job_board,
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;

    Ok(())
}

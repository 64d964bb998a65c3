// Chat gateway adapter - translates domain requests into chat platform calls.
//
// Every operation resolves the ids it is given against the live platform and
// turns "missing" / "not a text channel" into explicit `ChatError`s. Follow-up
// side effects (reactions, threads, question prompts) are best-effort: they
// log on failure and never undo the primary action.

use super::answer_collector::{AnswerCollector, CollectorOutcome, CollectorStep};
use super::chat_models::{
    ChannelInfo, ChannelPermission, ChannelRef, ChatSettings, EmbedAuthor, EmbedField,
    EmbedFooter, EmbedMessage, GuildInfo, MemberInfo, OverwriteTarget, PermissionGrant,
    SentEmbed,
};
use super::chat_platform::{ChatError, ChatPlatform, ResourceKind};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct ChatService<P: ChatPlatform + 'static> {
    platform: Arc<P>,
    settings: ChatSettings,
}

impl<P: ChatPlatform + 'static> ChatService<P> {
    pub fn new(platform: Arc<P>, settings: ChatSettings) -> Self {
        Self { platform, settings }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    // ------------------------------------------------------------------------
    // Resolution helpers
    // ------------------------------------------------------------------------

    async fn resolve_channel(&self, channel_id: u64) -> Result<ChannelInfo, ChatError> {
        self.platform
            .fetch_channel(channel_id)
            .await?
            .ok_or_else(|| ChatError::not_found(ResourceKind::Channel, channel_id))
    }

    async fn resolve_text_channel(&self, channel_id: u64) -> Result<ChannelInfo, ChatError> {
        let channel = self.resolve_channel(channel_id).await?;
        if !channel.kind.is_text_capable() {
            return Err(ChatError::UnsupportedChannel(channel_id));
        }
        Ok(channel)
    }

    async fn resolve_guild(&self, guild_id: u64) -> Result<GuildInfo, ChatError> {
        self.platform
            .fetch_guild(guild_id)
            .await?
            .ok_or_else(|| ChatError::not_found(ResourceKind::Guild, guild_id))
    }

    async fn resolve_member(&self, guild_id: u64, user_id: u64) -> Result<MemberInfo, ChatError> {
        self.platform
            .fetch_member(guild_id, user_id)
            .await?
            .ok_or_else(|| ChatError::not_found(ResourceKind::Member, user_id))
    }

    async fn send_best_effort(&self, channel_id: u64, text: &str) {
        if let Err(e) = self.platform.send_text(channel_id, text).await {
            tracing::warn!(channel_id, "Failed to send message: {}", e);
        }
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    pub async fn send_text(&self, channel_id: u64, text: &str) -> Result<(), ChatError> {
        self.resolve_text_channel(channel_id).await?;
        self.platform.send_text(channel_id, text).await?;
        tracing::info!(channel_id, "Message sent");
        Ok(())
    }

    /// Send `embed` and, in the background, react to it and open a discussion
    /// thread named after the member.
    pub async fn send_embed(
        &self,
        embed: &EmbedMessage,
        channel_id: u64,
        guild_id: u64,
        user_id: u64,
    ) -> Result<SentEmbed, ChatError> {
        self.resolve_text_channel(channel_id).await?;
        self.resolve_guild(guild_id).await?;
        let author = self.resolve_member(guild_id, user_id).await?;

        let message_id = self.platform.send_embed(channel_id, embed).await?;
        tracing::info!(channel_id, message_id, "Embed message sent");

        let platform = Arc::clone(&self.platform);
        let reactions = [
            self.settings.approve_emoji.clone(),
            self.settings.reject_emoji.clone(),
        ];
        let thread_name = author.username;

        let follow_up = tokio::spawn(async move {
            for emoji in reactions {
                if let Err(e) = platform.add_reaction(channel_id, message_id, &emoji).await {
                    tracing::warn!(channel_id, message_id, "Failed to react with {}: {}", emoji, e);
                }
            }

            match platform
                .start_thread(channel_id, message_id, &thread_name)
                .await
            {
                Ok(thread_id) => {
                    let notice = format!(
                        "Thread automatically created by {} in <#{}>",
                        thread_name, channel_id
                    );
                    if let Err(e) = platform.send_text(thread_id, &notice).await {
                        tracing::warn!(thread_id, "Failed to post thread notice: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!(channel_id, message_id, "Failed to start thread: {}", e);
                }
            }
        });

        Ok(SentEmbed {
            message_id,
            follow_up,
        })
    }

    /// Build the job embed: `questions[i]` pairs with `answers[i]`, the first
    /// answer is the title and the description slot picks the description.
    pub async fn build_embed_from_answers(
        &self,
        questions: &[String],
        answers: &[String],
        guild_id: u64,
        user_id: u64,
    ) -> Result<EmbedMessage, ChatError> {
        let guild = self.resolve_guild(guild_id).await?;
        let author = self.resolve_member(guild_id, user_id).await?;

        let description_index = self.settings.description_slot.resolve(questions.len());
        let required = questions.len().max(description_index + 1);
        if answers.len() < required {
            return Err(ChatError::MissingAnswers {
                expected: required,
                got: answers.len(),
            });
        }

        let mut fields: Vec<EmbedField> = questions
            .iter()
            .zip(answers)
            .map(|(question, answer)| EmbedField {
                name: question.clone(),
                value: answer.clone(),
                inline: false,
            })
            .collect();
        fields.push(EmbedField {
            name: self.settings.contact_field_name.clone(),
            value: author.mention(),
            inline: true,
        });

        tracing::info!(guild_id, user_id, "Embed message built");

        Ok(EmbedMessage {
            color: self.settings.embed_color,
            title: answers[0].clone(),
            author: EmbedAuthor {
                name: author.display_tag(),
                icon_url: author.avatar_url,
            },
            description: answers[description_index].clone(),
            fields,
            timestamp: Utc::now(),
            footer: EmbedFooter {
                text: guild.name,
                icon_url: guild.icon_url,
            },
        })
    }

    /// Create a text channel only `user_id` (and admins) can see.
    pub async fn provision_private_channel(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<ChannelRef, ChatError> {
        let guild = self.resolve_guild(guild_id).await?;

        let permissions = [
            PermissionGrant {
                target: OverwriteTarget::Member(user_id),
                allow: vec![ChannelPermission::View, ChannelPermission::Send],
                deny: Vec::new(),
            },
            PermissionGrant {
                target: OverwriteTarget::Role(guild.everyone_role_id),
                allow: Vec::new(),
                deny: vec![ChannelPermission::View],
            },
        ];

        let name = Uuid::new_v4().to_string();
        let channel_id = self
            .platform
            .create_text_channel(guild_id, &name, &permissions)
            .await?;

        tracing::info!(guild_id, channel_id, "Private channel created");
        Ok(ChannelRef::new(channel_id))
    }

    pub async fn delete_channel(&self, channel: &ChannelRef) -> Result<(), ChatError> {
        self.resolve_channel(channel.id).await?;
        self.platform.delete_channel(channel.id).await?;
        tracing::info!(channel_id = channel.id, "Channel deleted");
        Ok(())
    }

    /// Ask `questions` one by one in `channel` and gather the user's replies.
    ///
    /// Ends after every question is answered or when the collect timeout
    /// elapses. An incomplete session deletes the channel and returns
    /// `ChatError::Cancelled`.
    pub async fn collect_answers(
        &self,
        channel: &ChannelRef,
        guild_id: u64,
        user_id: u64,
        questions: &[String],
    ) -> Result<Vec<String>, ChatError> {
        let channel_id = channel.id;
        self.resolve_text_channel(channel_id).await?;
        self.resolve_guild(guild_id).await?;
        let member = self.resolve_member(guild_id, user_id).await?;

        let mut collector = AnswerCollector::new(user_id, questions.len());
        // Subscribe before prompting so a quick reply is never missed.
        let mut events = self.platform.subscribe_messages(channel_id);

        let greeting = format!(
            "{}, please answer the questions below to create a new job offer.",
            member.mention()
        );
        self.send_best_effort(channel_id, &greeting).await;
        if let Some(first) = questions.first() {
            self.send_best_effort(channel_id, first).await;
        }

        // The window is fixed when prompting starts. A message that arrives
        // after it closed counts as a timeout, even if it was polled first.
        let deadline_at = tokio::time::Instant::now() + self.settings.collect_timeout;
        let deadline = tokio::time::sleep_until(deadline_at);
        tokio::pin!(deadline);

        while collector.is_listening() {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(_) if tokio::time::Instant::now() >= deadline_at => {
                        tracing::debug!(channel_id, "Answer arrived after the deadline");
                        collector.on_timeout();
                    }
                    Some(message) => match collector.on_message(message.author_id, &message.content) {
                        CollectorStep::AskNext(index) => {
                            tracing::debug!(channel_id, index, "Answer collected");
                            if let Some(question) = questions.get(index) {
                                self.send_best_effort(channel_id, question).await;
                            }
                        }
                        CollectorStep::Finished => {
                            tracing::info!(channel_id, "Collector stopped");
                        }
                        CollectorStep::Ignored => {}
                    },
                    None => {
                        tracing::debug!(channel_id, "Message stream closed");
                        collector.on_timeout();
                    }
                },
                _ = &mut deadline => {
                    tracing::debug!(channel_id, "Collector timed out");
                    collector.on_timeout();
                }
            }
        }
        drop(events);
        self.platform.unsubscribe_messages(channel_id);
        tracing::debug!(channel_id, state = ?collector.state(), "Collector stopped listening");

        match collector.finish() {
            CollectorOutcome::Complete(answers) => {
                tracing::info!(channel_id, count = answers.len(), "Collector collected all answers");
                Ok(answers)
            }
            CollectorOutcome::Cancelled {
                collected,
                expected,
            } => {
                if let Err(e) = self.platform.delete_channel(channel_id).await {
                    tracing::warn!(channel_id, "Failed to delete cancelled channel: {}", e);
                }
                tracing::info!(channel_id, collected, expected, "Collector cancelled");
                Err(ChatError::Cancelled {
                    channel_id,
                    collected,
                    expected,
                })
            }
        }
    }

    /// Declared for parity with the other operations; does nothing.
    #[allow(dead_code)]
    pub async fn delete_message(&self, _message_id: u64, _channel_id: u64) -> Result<(), ChatError> {
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

// Job board - one job offer session from private channel to posted embed.
//
// Owns the private channel for the whole session: once `open_session` has
// created it, `complete_session` removes it on every path, whether the offer
// was posted or something failed along the way.

use crate::core::chat::{
    ChannelRef, ChatError, ChatPlatform, ChatService, DescriptionSlot, SentEmbed,
};
use std::sync::Arc;

pub struct JobBoard<P: ChatPlatform + 'static> {
    chat: Arc<ChatService<P>>,
    /// Where finished job offers are posted.
    channel_id: u64,
    questions: Vec<String>,
}

impl<P: ChatPlatform + 'static> JobBoard<P> {
    pub fn new(chat: Arc<ChatService<P>>, channel_id: u64, questions: Vec<String>) -> Self {
        Self {
            chat,
            channel_id,
            questions,
        }
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// Questions shown as embed fields. With the default description slot the
    /// last question is the description prompt and gets no field of its own.
    pub fn field_questions(&self) -> &[String] {
        match self.chat.settings().description_slot {
            DescriptionSlot::AfterQuestions => self
                .questions
                .split_last()
                .map(|(_, fields)| fields)
                .unwrap_or(&[]),
            DescriptionSlot::Index(_) => &self.questions,
        }
    }

    pub async fn open_session(&self, guild_id: u64, user_id: u64) -> Result<ChannelRef, ChatError> {
        self.chat.provision_private_channel(guild_id, user_id).await
    }

    /// Ask the questions in `channel`, then post the offer to the jobs channel.
    ///
    /// `channel` is gone when this returns, whatever the result.
    pub async fn complete_session(
        &self,
        channel: &ChannelRef,
        guild_id: u64,
        user_id: u64,
    ) -> Result<SentEmbed, ChatError> {
        let result = self.post_offer(channel, guild_id, user_id).await;

        match &result {
            // Cancelled sessions already removed their channel.
            Err(ChatError::Cancelled { .. }) => {}
            _ => self.close_session(channel).await,
        }

        result
    }

    /// Remove a session channel without posting anything.
    pub async fn close_session(&self, channel: &ChannelRef) {
        if let Err(e) = self.chat.delete_channel(channel).await {
            tracing::warn!(channel_id = channel.id, "Failed to clean up job channel: {}", e);
        }
    }

    async fn post_offer(
        &self,
        channel: &ChannelRef,
        guild_id: u64,
        user_id: u64,
    ) -> Result<SentEmbed, ChatError> {
        let answers = self
            .chat
            .collect_answers(channel, guild_id, user_id, &self.questions)
            .await?;

        let embed = self
            .chat
            .build_embed_from_answers(self.field_questions(), &answers, guild_id, user_id)
            .await?;

        let sent = self
            .chat
            .send_embed(&embed, self.channel_id, guild_id, user_id)
            .await?;

        tracing::info!(user_id, message_id = sent.message_id, "Job offer posted");
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::mock_platform::*;
    use crate::core::chat::{ChannelKind, ChatSettings, ResourceKind};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const JOBS_CHANNEL: u64 = 200;

    fn make_board(
        settings: ChatSettings,
        questions: &[&str],
    ) -> (Arc<MockPlatform>, JobBoard<MockPlatform>) {
        let platform = Arc::new(MockPlatform::new());
        platform.channels.insert(JOBS_CHANNEL, ChannelKind::Text);
        let chat = Arc::new(ChatService::new(Arc::clone(&platform), settings));
        let questions = questions.iter().map(|q| q.to_string()).collect();
        (platform, JobBoard::new(chat, JOBS_CHANNEL, questions))
    }

    fn answer_all(platform: &MockPlatform, answers: &[&str]) {
        for answer in answers {
            platform.script(USER, answer);
        }
    }

    #[test]
    fn test_field_questions_follow_description_slot() {
        let (_platform, board) = make_board(ChatSettings::default(), &["q0", "q1", "q2"]);
        assert_eq!(board.field_questions(), &["q0".to_string(), "q1".to_string()]);

        let settings = ChatSettings {
            description_slot: DescriptionSlot::Index(1),
            ..ChatSettings::default()
        };
        let (_platform, board) = make_board(settings, &["q0", "q1", "q2"]);
        assert_eq!(board.field_questions().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_posts_offer_and_removes_channel() {
        let questions = ["Title?", "Where?", "Details?"];
        let (platform, board) = make_board(ChatSettings::default(), &questions);
        let channel = board.open_session(GUILD, USER).await.unwrap();
        answer_all(&platform, &["Rust developer", "Lisbon", "Write Rust all day"]);

        let sent = board.complete_session(&channel, GUILD, USER).await.unwrap();
        sent.follow_up.await.unwrap();

        let embeds = platform.embeds.lock().unwrap().clone();
        assert_eq!(embeds.len(), 1);
        let (posted_to, embed) = &embeds[0];
        assert_eq!(*posted_to, JOBS_CHANNEL);
        assert_eq!(embed.title, "Rust developer");
        assert_eq!(embed.description, "Write Rust all day");
        // Two field questions plus the contact field.
        assert_eq!(embed.fields.len(), 3);

        assert_eq!(*platform.deleted.lock().unwrap(), vec![channel.id]);
        assert!(!platform.channels.contains_key(&channel.id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_post_still_removes_channel() {
        let (platform, board) = make_board(ChatSettings::default(), &["Title?", "Details?"]);
        platform.fail_embeds.store(true, Ordering::SeqCst);
        let channel = board.open_session(GUILD, USER).await.unwrap();
        answer_all(&platform, &["Rust developer", "Write Rust all day"]);

        let err = board.complete_session(&channel, GUILD, USER).await.unwrap_err();

        assert!(matches!(err, ChatError::Platform(_)));
        assert_eq!(*platform.deleted.lock().unwrap(), vec![channel.id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_jobs_channel_still_removes_channel() {
        let (platform, board) = make_board(ChatSettings::default(), &["Title?", "Details?"]);
        platform.channels.remove(&JOBS_CHANNEL);
        let channel = board.open_session(GUILD, USER).await.unwrap();
        answer_all(&platform, &["Rust developer", "Write Rust all day"]);

        let err = board.complete_session(&channel, GUILD, USER).await.unwrap_err();

        assert!(matches!(
            err,
            ChatError::NotFound {
                kind: ResourceKind::Channel,
                id: JOBS_CHANNEL
            }
        ));
        assert_eq!(*platform.deleted.lock().unwrap(), vec![channel.id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_session_is_removed_once() {
        let (platform, board) = make_board(ChatSettings::default(), &["Title?", "Details?"]);
        let channel = board.open_session(GUILD, USER).await.unwrap();
        platform.script(USER, "Rust developer");
        let started = tokio::time::Instant::now();

        let err = board.complete_session(&channel, GUILD, USER).await.unwrap_err();

        assert!(started.elapsed() >= Duration::from_secs(300));
        assert!(matches!(err, ChatError::Cancelled { collected: 1, .. }));
        assert_eq!(*platform.deleted.lock().unwrap(), vec![channel.id]);
        assert!(platform.embeds.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_description_index_uses_all_questions_as_fields() {
        let settings = ChatSettings {
            description_slot: DescriptionSlot::Index(1),
            ..ChatSettings::default()
        };
        let (platform, board) = make_board(settings, &["Title?", "Summary?", "Salary?"]);
        let channel = board.open_session(GUILD, USER).await.unwrap();
        answer_all(&platform, &["Rust developer", "Ship the bot", "Plenty"]);

        board.complete_session(&channel, GUILD, USER).await.unwrap();

        let embeds = platform.embeds.lock().unwrap();
        let (_, embed) = &embeds[0];
        assert_eq!(embed.description, "Ship the bot");
        assert_eq!(embed.fields.len(), 4);
    }

    #[tokio::test]
    async fn test_close_session_tolerates_missing_channel() {
        let (platform, board) = make_board(ChatSettings::default(), &["q0", "q1"]);

        board.close_session(&ChannelRef::new(MISSING)).await;

        assert!(platform.deleted.lock().unwrap().is_empty());
    }
}

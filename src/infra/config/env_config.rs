// Bot configuration, read from the environment (after `.env` is loaded).

use crate::core::chat::{ChatSettings, DescriptionSlot};
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::time::Duration;

/// Asked in order. Every entry but the last becomes an embed field; the last
/// answer is the job description unless `JOB_DESCRIPTION_INDEX` says otherwise.
/// A session has to finish while the slash command's interaction token can
/// still send the confirmation (tokens last 15 minutes).
const MAX_COLLECT_TIMEOUT_SECS: u64 = 14 * 60;

const DEFAULT_JOB_QUESTIONS: [&str; 8] = [
    "What is the job title?",
    "Which company is hiring?",
    "Where is the job located (or is it remote)?",
    "What type of contract is it (full-time, part-time, freelance)?",
    "What is the salary range?",
    "How much experience is required?",
    "How should candidates apply?",
    "Describe the role in a few sentences.",
];

#[derive(Debug, Clone)]
pub struct JobsConfig {
    /// Where finished job offers are posted.
    pub channel_id: u64,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub jobs: JobsConfig,
    pub chat: ChatSettings,
    /// Register slash commands in this guild only (instant updates while developing).
    pub dev_guild_id: Option<u64>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("DISCORD_TOKEN").context(
            "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
        )?;

        let channel_id = parse_id(
            "JOBS_CHANNEL_ID",
            &lookup("JOBS_CHANNEL_ID").context("Missing JOBS_CHANNEL_ID environment variable!")?,
        )?;

        let questions = match lookup("JOB_QUESTIONS_FILE") {
            Some(path) => load_questions(Path::new(&path))?,
            None => DEFAULT_JOB_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        };

        let mut chat = ChatSettings::default();
        if let Some(raw) = lookup("COLLECT_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("COLLECT_TIMEOUT_SECS is not a number: {raw}"))?;
            if secs == 0 || secs > MAX_COLLECT_TIMEOUT_SECS {
                bail!(
                    "COLLECT_TIMEOUT_SECS must be between 1 and {MAX_COLLECT_TIMEOUT_SECS}, got {secs}"
                );
            }
            chat.collect_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("JOB_DESCRIPTION_INDEX") {
            let index: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("JOB_DESCRIPTION_INDEX is not a number: {raw}"))?;
            if index >= questions.len() {
                bail!(
                    "JOB_DESCRIPTION_INDEX {index} is out of range for {} questions",
                    questions.len()
                );
            }
            chat.description_slot = DescriptionSlot::Index(index);
        }

        let dev_guild_id = lookup("DEV_GUILD_ID")
            .map(|raw| parse_id("DEV_GUILD_ID", &raw))
            .transpose()?;

        Ok(Self {
            token,
            jobs: JobsConfig {
                channel_id,
                questions,
            },
            chat,
            dev_guild_id,
        })
    }
}

fn parse_id(key: &str, raw: &str) -> Result<u64> {
    let id: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} is not a valid Discord id: {raw}"))?;
    if id == 0 {
        bail!("{key} must not be 0");
    }
    Ok(id)
}

/// Read a JSON array of question strings.
pub fn load_questions(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read questions file at {}", path.display()))?;
    let questions: Vec<String> = serde_json::from_str(&raw)
        .with_context(|| format!("Questions file {} is not a JSON string array", path.display()))?;

    if questions.len() < 2 {
        bail!(
            "Questions file {} needs at least two questions (fields plus a description)",
            path.display()
        );
    }
    if questions.iter().any(|q| q.trim().is_empty()) {
        bail!("Questions file {} contains an empty question", path.display());
    }

    Ok(questions)
}

pub mod message_router;
pub mod serenity_platform;

pub use serenity_platform::SerenityPlatform;

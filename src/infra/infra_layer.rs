// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "chat/mod.rs"]
pub mod chat;

#[path = "config/mod.rs"]
pub mod config;

// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "chat/mod.rs"]
pub mod chat;

#[path = "jobs/job_board.rs"]
pub mod jobs;

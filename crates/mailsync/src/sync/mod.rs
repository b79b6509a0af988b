//! Sync engine for mirroring folders and their new items
//!
//! Runs can be safely repeated: each folder resumes from its stored token.

mod orchestrator;

pub use orchestrator::{SyncOrchestrator, SyncReport, is_retryable};

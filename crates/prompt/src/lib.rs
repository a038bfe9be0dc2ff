//! Prompt system for the Jobs assistant.
//!
//! This crate provides:
//! - YAML-based prompt definitions with a built-in default
//! - Handlebars template rendering
//! - Conversation history reconstruction
//! - User profile rendering

pub mod builder;
pub mod history;
pub mod loader;
pub mod profile;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, NO_RESULTS};
pub use history::{reconstruct_history, render_history, ChatTurn, ConversationPair, Sender};
pub use loader::{default_prompt, list_prompts, load_prompt, DEFAULT_PROMPT_ID};
pub use profile::{UserProfile, ANONYMOUS_PROFILE, NO_PROFILE_INFO, UNKNOWN_SENTINEL};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOutputSpec,
};

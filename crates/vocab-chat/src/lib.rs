//! Command-line vocabulary tutor powered by vocab-tutor.
//!
//! `vocab-chat` stores a learner profile and an optional custom prompt on
//! disk, and chats with a model using whichever system prompt currently
//! applies.
//!
//! # Library usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use vocab_chat::TutorConfig;
//! use vocab_tutor::prelude::*;
//!
//! let config = TutorConfig::default();
//! let manager = Arc::new(PromptManager::new(config.build_store()));
//! manager.initialize().await;
//! let mut session = TutorSession::new(manager, config.chat_settings());
//! let reply = session.send(&config.build_client()?, "What does 'ephemeral' mean?").await?;
//! ```
//!
//! # Binary
//!
//! ```sh
//! vocab-chat profile set --goal exam --level beginner --style practice --interest tech
//! vocab-chat prompt show
//! VOCAB_TUTOR_API_KEY=... vocab-chat chat
//! ```

pub mod commands;
pub mod config;

pub use commands::ProfileAnswers;
pub use config::{TutorConfig, default_data_dir};

// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # btag-api
//!
//! Async client for the Bananatag email tracking API.
//!
//! ## Features
//!
//! - **Signed requests**: HMAC-SHA1 over the canonical parameter string
//! - **Cursor pagination**: Follow `paging.cursors` to the last page, with a
//!   fixed delay between pages and cooperative cancellation
//! - **Session cache**: One pagination session per distinct query, reused
//!   across calls and bounded by TTL and size
//! - **Date validation**: `start`/`end` checked before anything is sent
//! - **Message building**: Compose RFC 5322 messages with attachments and
//!   submit them through `tags/send`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use btag_api::{params, BtagClient, RequestOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = BtagClient::new("your-auth-id", "your-access-key")?;
//!
//!     let query = params([("start", "2013-01-01"), ("end", "2014-03-30")]);
//!     let pages = client
//!         .fetch_all("tags", query, RequestOptions::all_results())
//!         .await?;
//!
//!     for page in &pages {
//!         println!("{}", page.data());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         BtagClient                           │
//! │  request()  request_pages()  fetch_all()  send_message()     │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────┬───────────┬─────┴──────┬────────────┬───────────┐
//! │ Validate  │  Session  │   Signer   │ Transport  │  Message  │
//! ├───────────┼───────────┼────────────┼────────────┼───────────┤
//! │ Dates     │ Cursors   │ HMAC-SHA1  │ reqwest    │ lettre    │
//! │ Range     │ TTL / LRU │ Base64     │ Form body  │ Base64    │
//! └───────────┴───────────┴────────────┴────────────┴───────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Request signing
pub mod auth;

/// Pagination sessions
pub mod session;

/// Parameter validation
pub mod validate;

/// HTTP transport
pub mod http;

/// Request dispatcher
pub mod client;

/// Message composition
pub mod message;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{BtagClient, Page, SendMessage};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};
pub use message::{AttachmentDescriptor, MessageBuilder, MessageFields};
pub use types::{params, Credentials, JsonValue, Params, RequestOptions};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

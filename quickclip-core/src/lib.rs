//! # QuickClip Core
//!
//! An in-memory store for short-lived text clips, each retrievable by a
//! six-character code until its TTL (time-to-live) elapses.
//!
//! ## Features
//!
//! - Thread-safe storage using `DashMap` (sharded concurrent access)
//! - Unambiguous codes (no `0`/`O`/`1`/`I`), re-drawn on collision
//! - Automatic expiration on read (lazy eviction)
//! - Deadline-driven background eviction, one task per store
//! - Non-consuming reads: a clip can be read until it expires or is deleted
//!
//! ## Example
//!
//! ```rust,no_run
//! use quickclip_core::{Store, StoreConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = StoreConfig::default()
//!         .with_cleanup_interval(Duration::from_secs(30));
//!     let store = Store::with_config(config);
//!
//!     // Share some text for 60 seconds
//!     let clip = store.create("meet at 5", 60).unwrap();
//!     println!("code: {}", clip.code());
//!
//!     // Redeem it (codes are case-insensitive)
//!     if let Some(found) = store.get(&clip.code().to_lowercase()) {
//!         println!("{} ({}s left)", found.text(), found.remaining_seconds());
//!     }
//!
//!     // Remove it early
//!     store.delete(clip.code());
//! }
//! ```

pub mod code;
mod config;
mod entry;
mod error;
mod store;

pub use code::{is_valid_code, normalize_code, redact_code, ALPHABET, CODE_LENGTH};
pub use config::{StoreConfig, DEFAULT_MAX_CODE_ATTEMPTS, MIN_CLEANUP_INTERVAL};
pub use entry::ClipEntry;
pub use error::StoreError;
pub use store::Store;

//! wbi Rust SDK
//!
//! Reads and writes Wikibase entities over the MediaWiki action API and
//! decides, through the fast-run cache, whether a write is needed at all.
//!
//! # Example
//!
//! ```no_run
//! use wbi_sdk::{WbiClient, WbiConfig, WriteOptions};
//! use wbi_domain::{EntityId, TermAction};
//!
//! let mut client = WbiClient::new(&WbiConfig::default()).expect("Failed to build client");
//!
//! let mut item = client.get(&EntityId::parse("Q4115189").unwrap()).expect("Failed to fetch");
//! item.labels.set("en", Some("Sandbox"), TermAction::Replace);
//! client
//!     .write(&mut item, &WriteOptions::default().with_summary("relabel"))
//!     .expect("Failed to write");
//! ```

#![warn(missing_docs)]

pub mod api;
mod client;
pub mod config;
pub mod entity;
mod error;
pub mod fastrun;
mod mock;

pub use api::{check_error_envelope, MediaWikiApi, Params, WikibaseApi};
pub use client::WbiClient;
pub use config::WbiConfig;
pub use entity::WriteOptions;
pub use error::{Result, WbiError};
pub use fastrun::{BaseFilter, FastRunContainer, FastRunKey, FastRunOptions, FastRunStore};
pub use mock::{MockApi, RecordedCall};

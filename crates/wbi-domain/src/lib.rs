//! Wikibase Domain Layer
//!
//! In-memory model of Wikibase entity bodies and their JSON wire format.
//! Nothing in this crate talks to the network; the SDK crate owns the
//! request/response cycle and depends on the types defined here.
//!
//! ## Key Concepts
//!
//! - **Entity**: an item, property, lexeme, form, sense or media-info body
//! - **Claim**: a property-value assertion with qualifiers and references
//! - **Snak**: the wire-level property/value pair inside a claim
//! - **DataValue**: the closed set of typed values a snak can carry
//! - **Merge policies**: how incoming claims and terms meet existing ones
//!
//! ## Example
//!
//! ```
//! use wbi_domain::{ActionIfExists, Claim, DataValue, Entity, PropertyId, TermAction};
//!
//! let mut item = Entity::item();
//! item.labels.set("en", Some("Earth"), TermAction::Replace);
//!
//! let instance_of = Claim::value(PropertyId::new(31), DataValue::item("Q3504248").unwrap());
//! item.add_claims(instance_of, ActionIfExists::Append);
//!
//! let json = item.to_json();
//! assert_eq!(json["labels"]["en"]["value"], "Earth");
//! assert_eq!(json["claims"]["P31"][0]["mainsnak"]["datavalue"]["value"]["id"], "Q3504248");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action;
pub mod claim;
pub mod claims;
pub mod datavalue;
pub mod entity;
pub mod error;
pub mod id;
pub mod language;
pub mod snak;

// Re-exports for convenience
pub use action::{ActionIfExists, AliasAction, TermAction};
pub use claim::{Claim, Rank, Reference};
pub use claims::Claims;
pub use datavalue::{DataType, DataValue, GlobeCoordinate, MonolingualText, Quantity, Time};
pub use entity::{Entity, EntityFields, EntityType, IntoClaims};
pub use error::{DomainError, Result};
pub use id::{EntityId, PropertyId};
pub use language::{Aliases, LanguageValue, LanguageValues};
pub use snak::{Snak, SnakValue};

//! Data layer for a Drupal-Services-style REST entity API.
//!
//! This crate provides:
//! - Per-variant entity configuration (content item, file, taxonomy term,
//!   taxonomy vocabulary, user) as data rather than inheritance
//! - Wire field coercion rules, including the true-or-absent boolean
//!   serialization constraint of the upstream API
//! - A generic [`Entity`] record and an ordered [`EntityCollection`]
//!
//! No I/O happens here; the network side lives in `drupal-services-client`.

pub mod coerce;
pub mod collection;
pub mod entity;
mod error;
pub mod kind;

pub use coerce::CoercionMode;
pub use collection::EntityCollection;
pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use kind::EntityKind;

//! Core domain model for lineup.
//!
//! This crate defines the canonical-artist data model, the identity
//! normalizer and match scorer, the source priority table, the SQLite
//! schema with its store accessor, and the read-side projector.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod identity;
pub mod matching;
pub mod model;
pub mod project;
pub mod schema;
pub mod source;

pub use error::{Error, Result};

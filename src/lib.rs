//! # Lineup
//!
//! A canonical artist store with cross-source identity resolution.
//!
//! Lineup ingests artist records from heterogeneous sources (a curated
//! legacy catalog, knowledge-base extractions, photo feeds, scrapes,
//! and manual edits), resolves each record to exactly one canonical
//! artist, and keeps every source's contribution attributable. Reads
//! go through a projector that flattens the canonical graph back into
//! the familiar one-big-record shape, picking fields by source
//! priority.

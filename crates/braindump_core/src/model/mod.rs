//! Domain model for brain dump records.
//!
//! # Responsibility
//! - Define the canonical record persisted by the store.
//! - Define the structured analysis written by background processing.
//!
//! # Invariants
//! - Every record is identified by a stable `BrainDumpId`.
//! - Records are never deleted by core.

pub mod brain_dump;

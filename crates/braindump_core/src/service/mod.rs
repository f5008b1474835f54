//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, queue and model calls into use-case APIs.
//! - Keep callers decoupled from storage and transport details.

pub mod analysis;
pub mod brain_dump_service;
pub mod processor;

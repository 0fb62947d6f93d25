//! Core library components.
//!
//! This module contains the sync engine: key resolution, value lookup,
//! sealing, publishing, and the orchestrator tying them together.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod locator;
pub mod store;
pub mod sync;
pub mod types;
pub mod validation;

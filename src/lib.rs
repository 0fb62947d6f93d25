//! pipeseal - Seal deployment configuration into GitHub Actions environment secrets.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── sync          # Full sync run
//! │   ├── check         # Validate config and print the plan
//! │   ├── key           # Show an environment's public key
//! │   └── output        # Terminal output helpers
//! └── core/             # Core library components
//!     ├── config        # Environment variables + pipeseal.toml
//!     ├── domain/       # Environments, secrets, reports
//!     ├── cipher/       # Sealed-box encryption
//!     ├── store/        # Remote secret store (GitHub)
//!     ├── locator/      # Live infrastructure lookups (CloudFront)
//!     └── sync          # Orchestrator
//! ```
//!
//! # Flow
//!
//! For each environment: fetch its public key, then for each secret resolve
//! the value (static or looked up), seal it to that key, and publish it.
//! Failures are collected per (environment, secret) pair; nothing stops the
//! run early.

pub mod cli;
pub mod core;
pub mod error;

//! Domain types.

mod environment;
mod report;
mod secret;

pub use environment::{Environment, EnvironmentKey};
pub use report::{
    EnvironmentReport, EnvironmentState, Failure, RunStatus, SecretOutcome, SecretReport,
    SyncReport,
};
pub use secret::{LookupRule, SealedSecret, SecretDefinition, ValueSource};

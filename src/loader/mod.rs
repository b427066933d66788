//! Input loaders
//!
//! Parsers are pure functions over file contents; reading the files is left to
//! the commands, which go through the injected [`crate::traits::FileSystem`].
//! Every parser fails with [`crate::rules::RuleImportError::InputFormat`].

pub mod desired;
pub mod groups;
pub mod snapshot;

pub use desired::parse_desired_rules;
pub use groups::parse_groups;
pub use snapshot::parse_snapshot;

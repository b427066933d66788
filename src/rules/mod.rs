//! Security group rule reconciliation
//!
//! Pairs desired rules (CSV export) with live rules (JSON snapshot) and renders
//! `aws_vpc_security_group_*_rule` blocks plus import commands for the pairs:
//!
//! 1. [`RuleIndex::build`] groups live rules by security group id
//! 2. [`RuleMatcher::match_all`] drops excluded groups, matches each record and
//!    collects ambiguous or duplicate matches as conflicts
//! 3. [`BlockEmitter::emit_all`] renders one block per result and one import
//!    command per matched result, in input order

pub mod emitter;
pub mod error;
pub mod index;
pub mod matcher;
pub mod model;

pub use emitter::BlockEmitter;
pub use error::{RuleImportError, RuleImportResult};
pub use index::RuleIndex;
pub use matcher::RuleMatcher;

//! Rule matching
//!
//! Pairs each desired rule from the CSV export with the live rule it describes.
//! A candidate matches when, within the same security group and direction:
//!
//! - the protocols are equal; the all-traffic wildcard (`-1`) only equals itself
//! - for concrete protocols, `from_port` and `to_port` are both equal; an
//!   all-traffic rule has no meaningful port range, so ports are not compared
//! - the address specifiers are of the same kind with the same value
//!
//! More than one matching candidate is an ambiguity, and a live rule claimed
//! by a second CSV record is a duplicate. Both are reported as conflicts and
//! never resolved by picking one.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::index::RuleIndex;
use super::model::{CsvRuleRecord, LiveRuleRecord, normalize_group_name};

/// Result of matching one CSV record against the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(String),
    Unmatched,
    /// Ids of every candidate that matched
    Ambiguous(Vec<String>),
}

/// A processed CSV record, ready to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Matched {
        record: CsvRuleRecord,
        rule_id: String,
    },
    Unmatched {
        record: CsvRuleRecord,
    },
}

impl MatchResult {
    pub fn record(&self) -> &CsvRuleRecord {
        match self {
            MatchResult::Matched { record, .. } | MatchResult::Unmatched { record } => record,
        }
    }

    /// Live rule id, for matched records
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            MatchResult::Matched { rule_id, .. } => Some(rule_id),
            MatchResult::Unmatched { .. } => None,
        }
    }
}

/// A CSV record that could not be paired one-to-one with a live rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchConflict {
    /// More than one live rule satisfies every predicate
    Ambiguous {
        record: CsvRuleRecord,
        candidate_ids: Vec<String>,
    },
    /// The live rule was already claimed by an earlier record
    Duplicate {
        record: CsvRuleRecord,
        rule_id: String,
        claimed_by_row: usize,
    },
}

impl MatchConflict {
    pub fn record(&self) -> &CsvRuleRecord {
        match self {
            MatchConflict::Ambiguous { record, .. } | MatchConflict::Duplicate { record, .. } => {
                record
            }
        }
    }
}

impl fmt::Display for MatchConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchConflict::Ambiguous {
                record,
                candidate_ids,
            } => {
                write!(
                    f,
                    "Ambiguous match for {} in {}: candidates {}",
                    record.display_string(),
                    record.group_id,
                    candidate_ids.join(", ")
                )
            }
            MatchConflict::Duplicate {
                record,
                rule_id,
                claimed_by_row,
            } => {
                write!(
                    f,
                    "Duplicate match for {} in {}: rule {} already claimed by row {}",
                    record.display_string(),
                    record.group_id,
                    rule_id,
                    claimed_by_row
                )
            }
        }
    }
}

/// Everything the matcher produced for one run, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    pub results: Vec<MatchResult>,
    pub conflicts: Vec<MatchConflict>,
    /// Records dropped by the exclusion filter
    pub excluded: usize,
}

impl MatchReport {
    pub fn matched_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, MatchResult::Matched { .. }))
            .count()
    }

    pub fn unmatched_count(&self) -> usize {
        self.results.len() - self.matched_count()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Check every matching predicate for one CSV/live pair
pub fn rule_matches(record: &CsvRuleRecord, live: &LiveRuleRecord) -> bool {
    if record.group_id != live.group_id || record.direction != live.direction {
        return false;
    }

    if record.protocol != live.protocol {
        return false;
    }

    if !record.protocol.is_all()
        && (record.from_port != live.from_port || record.to_port != live.to_port)
    {
        return false;
    }

    record.address == live.address
}

/// Matches CSV records against an indexed live snapshot
pub struct RuleMatcher<'a> {
    index: &'a RuleIndex,
    exclusions: HashSet<String>,
}

impl<'a> RuleMatcher<'a> {
    pub fn new(index: &'a RuleIndex) -> Self {
        Self {
            index,
            exclusions: HashSet::new(),
        }
    }

    /// Drop records of these security groups before matching
    pub fn with_exclusions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclusions
            .extend(names.into_iter().map(|n| normalize_group_name(n.as_ref())));
        self
    }

    pub fn is_excluded(&self, record: &CsvRuleRecord) -> bool {
        self.exclusions.contains(&record.normalized_group_name())
    }

    /// Match a single record, without duplicate tracking
    pub fn match_record(&self, record: &CsvRuleRecord) -> MatchOutcome {
        let matching: Vec<&LiveRuleRecord> = self
            .index
            .candidates_for(&record.group_id, record.direction)
            .into_iter()
            .filter(|live| rule_matches(record, live))
            .collect();

        match matching.as_slice() {
            [] => MatchOutcome::Unmatched,
            [live] => MatchOutcome::Matched(live.rule_id.clone()),
            many => MatchOutcome::Ambiguous(many.iter().map(|l| l.rule_id.clone()).collect()),
        }
    }

    /// Match every record in order, tracking which live rules are claimed
    ///
    /// Conflicts are collected over the whole input rather than stopping at the
    /// first one, so a caller can report all of them at once.
    pub fn match_all(&self, records: impl IntoIterator<Item = CsvRuleRecord>) -> MatchReport {
        let mut report = MatchReport::default();
        let mut claimed: HashMap<String, usize> = HashMap::new();

        for record in records {
            if self.is_excluded(&record) {
                report.excluded += 1;
                continue;
            }

            match self.match_record(&record) {
                MatchOutcome::Unmatched => {
                    report.results.push(MatchResult::Unmatched { record });
                }
                MatchOutcome::Ambiguous(candidate_ids) => {
                    report.conflicts.push(MatchConflict::Ambiguous {
                        record,
                        candidate_ids,
                    });
                }
                MatchOutcome::Matched(rule_id) => {
                    if let Some(&claimed_by_row) = claimed.get(&rule_id) {
                        report.conflicts.push(MatchConflict::Duplicate {
                            record,
                            rule_id,
                            claimed_by_row,
                        });
                    } else {
                        claimed.insert(rule_id.clone(), record.row);
                        report.results.push(MatchResult::Matched { record, rule_id });
                    }
                }
            }
        }

        report
    }
}

use std::collections::HashMap;

use super::model::{Direction, LiveRuleRecord};

/// Live rules grouped by security group id
///
/// Built once from the snapshot and read-only afterwards. Every record lives in
/// exactly one bucket, keyed by its own group id, in snapshot order. Identical
/// rules are kept as-is; telling them apart is the matcher's job.
#[derive(Debug, Default)]
pub struct RuleIndex {
    groups: HashMap<String, Vec<LiveRuleRecord>>,
    len: usize,
}

impl RuleIndex {
    /// Build the index from the full live-rule collection
    pub fn build(records: impl IntoIterator<Item = LiveRuleRecord>) -> Self {
        let mut groups: HashMap<String, Vec<LiveRuleRecord>> = HashMap::new();
        let mut len = 0;

        for record in records {
            groups
                .entry(record.group_id.clone())
                .or_default()
                .push(record);
            len += 1;
        }

        Self { groups, len }
    }

    /// Rules of `group_id` that govern `direction`
    pub fn candidates_for(&self, group_id: &str, direction: Direction) -> Vec<&LiveRuleRecord> {
        self.groups
            .get(group_id)
            .map(|rules| {
                rules
                    .iter()
                    .filter(|rule| rule.direction == direction)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of indexed rules
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct security groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::LiveRuleBuilder;

    fn sample_rules() -> Vec<LiveRuleRecord> {
        vec![
            LiveRuleBuilder::new("sgr-1", "sg-1").tcp(443, 443).build(),
            LiveRuleBuilder::new("sgr-2", "sg-1").egress().tcp(443, 443).build(),
            LiveRuleBuilder::new("sgr-3", "sg-2").tcp(22, 22).build(),
            LiveRuleBuilder::new("sgr-4", "sg-1").tcp(80, 80).build(),
        ]
    }

    fn ids(rules: &[&LiveRuleRecord]) -> Vec<String> {
        rules.iter().map(|r| r.rule_id.clone()).collect()
    }

    #[test]
    fn test_build_groups_by_security_group() {
        let index = RuleIndex::build(sample_rules());

        assert_eq!(index.len(), 4);
        assert_eq!(index.group_count(), 2);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_candidates_filtered_by_direction() {
        let index = RuleIndex::build(sample_rules());

        assert_eq!(
            ids(&index.candidates_for("sg-1", Direction::Ingress)),
            vec!["sgr-1", "sgr-4"]
        );
        assert_eq!(
            ids(&index.candidates_for("sg-1", Direction::Egress)),
            vec!["sgr-2"]
        );
        assert!(index.candidates_for("sg-2", Direction::Egress).is_empty());
    }

    #[test]
    fn test_candidates_for_unknown_group() {
        let index = RuleIndex::build(sample_rules());

        assert!(index.candidates_for("sg-404", Direction::Ingress).is_empty());
    }

    #[test]
    fn test_candidates_partition_every_rule() {
        let rules = sample_rules();
        let index = RuleIndex::build(rules.clone());

        for rule in &rules {
            let expected: Vec<String> = rules
                .iter()
                .filter(|r| r.group_id == rule.group_id && r.direction == rule.direction)
                .map(|r| r.rule_id.clone())
                .collect();

            assert_eq!(
                ids(&index.candidates_for(&rule.group_id, rule.direction)),
                expected
            );
        }
    }

    #[test]
    fn test_identical_rules_are_preserved() {
        let rules = vec![
            LiveRuleBuilder::new("sgr-a", "sg-1").tcp(443, 443).build(),
            LiveRuleBuilder::new("sgr-b", "sg-1").tcp(443, 443).build(),
        ];
        let index = RuleIndex::build(rules);

        assert_eq!(index.candidates_for("sg-1", Direction::Ingress).len(), 2);
    }

    #[test]
    fn test_empty_index() {
        let index = RuleIndex::build(Vec::new());

        assert!(index.is_empty());
        assert_eq!(index.group_count(), 0);
    }
}

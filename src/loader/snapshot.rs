use serde::Deserialize;
use serde_json::Value;

use crate::rules::model::{Address, Direction, LiveRuleRecord, Protocol};
use crate::rules::{RuleImportError, RuleImportResult};

/// Rule entry as returned by the EC2 API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SnapshotRule {
    security_group_rule_id: String,
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    is_egress: Option<bool>,
    ip_protocol: String,
    #[serde(default)]
    from_port: Option<i32>,
    #[serde(default)]
    to_port: Option<i32>,
    #[serde(default)]
    cidr_ipv4: Option<String>,
    #[serde(default)]
    prefix_list_id: Option<String>,
    #[serde(default)]
    referenced_group_info: Option<ReferencedGroupInfo>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ReferencedGroupInfo {
    group_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SnapshotGroup {
    group_id: String,
    #[serde(default)]
    ingress_rules: Vec<SnapshotRule>,
    #[serde(default)]
    egress_rules: Vec<SnapshotRule>,
}

/// Live rules loaded from a snapshot
#[derive(Debug, Default)]
pub struct Snapshot {
    pub rules: Vec<LiveRuleRecord>,
    /// Ids of rules without a CIDR, prefix list or referenced group (e.g. IPv6-only)
    pub skipped: Vec<String>,
}

impl Snapshot {
    fn add(
        &mut self,
        rule: SnapshotRule,
        group_id: String,
        direction: Direction,
    ) -> Result<(), String> {
        let protocol = Protocol::parse(&rule.ip_protocol).ok_or_else(|| {
            format!("rule '{}' has no IpProtocol", rule.security_group_rule_id)
        })?;

        let address = if let Some(cidr) = rule.cidr_ipv4 {
            Address::Cidr(cidr)
        } else if let Some(prefix_list) = rule.prefix_list_id {
            Address::PrefixList(prefix_list)
        } else if let Some(group) = rule.referenced_group_info {
            Address::SecurityGroup(group.group_id)
        } else {
            self.skipped.push(rule.security_group_rule_id);
            return Ok(());
        };

        self.rules.push(LiveRuleRecord {
            rule_id: rule.security_group_rule_id,
            group_id,
            direction,
            protocol,
            from_port: rule.from_port,
            to_port: rule.to_port,
            address,
            description: rule.description.unwrap_or_default(),
        });

        Ok(())
    }
}

/// Parse the live-state JSON snapshot
///
/// Accepts three shapes:
/// - `{"SecurityGroups": [{"GroupId", "IngressRules": [...], "EgressRules": [...]}]}`
/// - `{"SecurityGroupRules": [...]}` as printed by `aws ec2 describe-security-group-rules`
/// - a bare array of rules
///
/// In the flat shapes each rule carries its own `GroupId` and `IsEgress`.
pub fn parse_snapshot(content: &str, source: &str) -> RuleImportResult<Snapshot> {
    let mut document: Value = serde_json::from_str(content)
        .map_err(|e| RuleImportError::input(source, format!("malformed JSON: {}", e)))?;

    if let Some(groups) = document.get_mut("SecurityGroups").map(Value::take) {
        return parse_grouped(groups, source);
    }

    let rules = match document {
        Value::Array(_) => document,
        Value::Object(mut map) => map.remove("SecurityGroupRules").ok_or_else(|| {
            RuleImportError::input(
                source,
                "expected a 'SecurityGroups' or 'SecurityGroupRules' array",
            )
        })?,
        _ => {
            return Err(RuleImportError::input(
                source,
                "expected a JSON object or array",
            ));
        }
    };

    parse_flat(rules, source)
}

fn parse_grouped(groups: Value, source: &str) -> RuleImportResult<Snapshot> {
    let groups: Vec<SnapshotGroup> = serde_json::from_value(groups)
        .map_err(|e| RuleImportError::input(source, format!("invalid SecurityGroups: {}", e)))?;

    let mut snapshot = Snapshot::default();

    for group in groups {
        let rules = group
            .ingress_rules
            .into_iter()
            .map(|rule| (rule, Direction::Ingress))
            .chain(
                group
                    .egress_rules
                    .into_iter()
                    .map(|rule| (rule, Direction::Egress)),
            );

        for (rule, direction) in rules {
            snapshot
                .add(rule, group.group_id.clone(), direction)
                .map_err(|msg| RuleImportError::input(source, msg))?;
        }
    }

    Ok(snapshot)
}

fn parse_flat(rules: Value, source: &str) -> RuleImportResult<Snapshot> {
    let rules: Vec<SnapshotRule> = serde_json::from_value(rules).map_err(|e| {
        RuleImportError::input(source, format!("invalid SecurityGroupRules: {}", e))
    })?;

    let mut snapshot = Snapshot::default();

    for (index, rule) in rules.into_iter().enumerate() {
        let position = index + 1;

        let group_id = rule.group_id.clone().ok_or_else(|| {
            RuleImportError::input_row(
                source,
                position,
                format!("rule '{}' has no GroupId", rule.security_group_rule_id),
            )
        })?;

        let direction = match rule.is_egress {
            Some(true) => Direction::Egress,
            Some(false) => Direction::Ingress,
            None => {
                return Err(RuleImportError::input_row(
                    source,
                    position,
                    format!("rule '{}' has no IsEgress", rule.security_group_rule_id),
                ));
            }
        };

        snapshot
            .add(rule, group_id, direction)
            .map_err(|msg| RuleImportError::input_row(source, position, msg))?;
    }

    Ok(snapshot)
}

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::rules::model::{Address, AddressKind, CsvRuleRecord, Direction, Protocol};
use crate::rules::{RuleImportError, RuleImportResult};

/// Raw CSV row; header names are the field identifiers
#[derive(Debug, Deserialize)]
struct RuleRow {
    group_name: String,
    group_id: String,
    direction: String,
    protocol: String,
    #[serde(default)]
    from_port: Option<i32>,
    #[serde(default)]
    to_port: Option<i32>,
    address_kind: String,
    address_value: String,
    #[serde(default)]
    description: Option<String>,
}

impl RuleRow {
    fn into_record(self, row: usize) -> Result<CsvRuleRecord, String> {
        let group_name = required("group_name", self.group_name)?;
        let group_id = required("group_id", self.group_id)?;

        let direction = Direction::from_str(&self.direction)
            .ok_or_else(|| format!("unknown direction '{}'", self.direction))?;

        let protocol = Protocol::parse(&self.protocol)
            .ok_or_else(|| "missing value for 'protocol'".to_string())?;

        if !protocol.is_all() && (self.from_port.is_none() || self.to_port.is_none()) {
            return Err(format!(
                "protocol '{}' requires both from_port and to_port",
                protocol
            ));
        }

        let kind = AddressKind::from_str(&self.address_kind)
            .ok_or_else(|| format!("unknown address_kind '{}'", self.address_kind))?;
        let value = required("address_value", self.address_value)?;

        Ok(CsvRuleRecord {
            row,
            group_name,
            group_id,
            direction,
            protocol,
            from_port: self.from_port,
            to_port: self.to_port,
            address: Address::new(kind, value),
            description: self.description.unwrap_or_default(),
        })
    }
}

fn required(column: &str, value: String) -> Result<String, String> {
    if value.is_empty() {
        Err(format!("missing value for '{}'", column))
    } else {
        Ok(value)
    }
}

/// Parse the desired-state CSV export
///
/// `source` names the input in error messages. Rows are numbered from 1,
/// excluding the header.
pub fn parse_desired_rules(content: &str, source: &str) -> RuleImportResult<Vec<CsvRuleRecord>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();

    for (index, row) in reader.deserialize::<RuleRow>().enumerate() {
        let row_number = index + 1;
        let row = row.map_err(|e| RuleImportError::input_row(source, row_number, e.to_string()))?;
        let record = row
            .into_record(row_number)
            .map_err(|msg| RuleImportError::input_row(source, row_number, msg))?;

        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::SAMPLE_RULES_CSV;

    const HEADER: &str =
        "group_name,group_id,direction,protocol,from_port,to_port,address_kind,address_value,description\n";

    #[test]
    fn test_parse_sample() {
        let records = parse_desired_rules(SAMPLE_RULES_CSV, "rules.csv").unwrap();

        assert_eq!(records.len(), 4);

        let https = &records[0];
        assert_eq!(https.row, 1);
        assert_eq!(https.group_name, "web");
        assert_eq!(https.group_id, "sg-1");
        assert_eq!(https.direction, Direction::Ingress);
        assert_eq!(https.protocol, Protocol::Named("tcp".to_string()));
        assert_eq!(https.from_port, Some(443));
        assert_eq!(https.to_port, Some(443));
        assert_eq!(https.address, Address::Cidr("0.0.0.0/0".to_string()));
        assert_eq!(https.description, "HTTPS");

        let egress = &records[1];
        assert_eq!(egress.direction, Direction::Egress);
        assert_eq!(egress.protocol, Protocol::All);
        assert_eq!(egress.from_port, None);
        assert_eq!(egress.description, "");

        assert_eq!(records[2].address, Address::PrefixList("pl-123".to_string()));
        assert_eq!(records[3].row, 4);
    }

    #[test]
    fn test_columns_may_be_reordered_and_padded() {
        let content = "\
direction, protocol, group_id, group_name, address_kind, address_value, from_port, to_port
Outbound, UDP, sg-2, dns, sg, sg-dns, 53, 53
";
        let records = parse_desired_rules(content, "rules.csv").unwrap();

        assert_eq!(records[0].direction, Direction::Egress);
        assert_eq!(records[0].protocol, Protocol::Named("udp".to_string()));
        assert_eq!(records[0].address, Address::SecurityGroup("sg-dns".to_string()));
        assert_eq!(records[0].description, "");
    }

    #[test]
    fn test_unknown_direction() {
        let content = format!("{}web,sg-1,sideways,tcp,1,1,cidr,0.0.0.0/0,\n", HEADER);

        let err = parse_desired_rules(&content, "rules.csv").unwrap_err();

        assert!(matches!(err, RuleImportError::InputFormat { row: Some(1), .. }));
        assert!(err.to_string().contains("unknown direction 'sideways'"));
    }

    #[test]
    fn test_missing_ports_for_concrete_protocol() {
        let content = format!(
            "{}web,sg-1,ingress,-1,,,cidr,0.0.0.0/0,\nweb,sg-1,ingress,tcp,,,cidr,0.0.0.0/0,\n",
            HEADER
        );

        let err = parse_desired_rules(&content, "rules.csv").unwrap_err();

        assert!(matches!(err, RuleImportError::InputFormat { row: Some(2), .. }));
        assert!(err.to_string().contains("requires both from_port and to_port"));
    }

    #[test]
    fn test_malformed_port() {
        let content = format!("{}web,sg-1,ingress,tcp,https,443,cidr,0.0.0.0/0,\n", HEADER);

        let err = parse_desired_rules(&content, "rules.csv").unwrap_err();

        assert!(matches!(err, RuleImportError::InputFormat { row: Some(1), .. }));
    }

    #[test]
    fn test_missing_column() {
        let content = "group_name,group_id,direction\nweb,sg-1,ingress\n";

        let err = parse_desired_rules(content, "rules.csv").unwrap_err();

        assert!(err.to_string().contains("rules.csv"));
    }

    #[test]
    fn test_empty_required_value() {
        let content = format!("{}web,,ingress,tcp,1,1,cidr,0.0.0.0/0,\n", HEADER);

        let err = parse_desired_rules(&content, "rules.csv").unwrap_err();

        assert!(err.to_string().contains("missing value for 'group_id'"));
    }

    #[test]
    fn test_unknown_address_kind() {
        let content = format!("{}web,sg-1,ingress,tcp,1,1,ipv6,::/0,\n", HEADER);

        let err = parse_desired_rules(&content, "rules.csv").unwrap_err();

        assert!(err.to_string().contains("unknown address_kind 'ipv6'"));
    }
}

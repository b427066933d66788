use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::groups::{GroupRecord, parse_tags};
use crate::rules::{RuleImportError, RuleImportResult};

/// Raw row of a security groups export (console column names)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GroupRow {
    group_name: String,
    #[serde(default)]
    group_id: Option<String>,
    vpc_id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Option<String>,
}

/// Parse a security groups CSV export
pub fn parse_groups(content: &str, source: &str) -> RuleImportResult<Vec<GroupRecord>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut groups = Vec::new();

    for (index, row) in reader.deserialize::<GroupRow>().enumerate() {
        let row_number = index + 1;
        let row = row.map_err(|e| RuleImportError::input_row(source, row_number, e.to_string()))?;

        if row.group_name.is_empty() {
            return Err(RuleImportError::input_row(
                source,
                row_number,
                "missing value for 'GroupName'",
            ));
        }

        let tags = parse_tags(row.tags.as_deref().unwrap_or_default())
            .map_err(|msg| RuleImportError::input_row(source, row_number, msg))?;

        groups.push(GroupRecord {
            row: row_number,
            name: row.group_name,
            group_id: row.group_id.filter(|id| !id.is_empty()),
            vpc_id: row.vpc_id,
            description: row.description.unwrap_or_default(),
            tags,
        });
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::SAMPLE_GROUPS_CSV;

    #[test]
    fn test_parse_sample_groups() {
        let groups = parse_groups(SAMPLE_GROUPS_CSV, "groups.csv").unwrap();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].name, "Web Tier");
        assert_eq!(groups[0].group_id.as_deref(), Some("sg-1"));
        assert_eq!(
            groups[0].tags,
            vec![
                ("Env".to_string(), "prod".to_string()),
                ("Team".to_string(), "platform".to_string()),
            ]
        );
        assert!(groups[1].tags.is_empty());
        assert_eq!(groups[2].group_id, None);
        assert_eq!(groups[2].vpc_id, "vpc-456");
    }

    #[test]
    fn test_bad_tag() {
        let content = "GroupName,VpcId,Description,Tags\nweb,vpc-1,Web,broken\n";

        let err = parse_groups(content, "groups.csv").unwrap_err();

        assert!(matches!(err, RuleImportError::InputFormat { row: Some(1), .. }));
        assert!(err.to_string().contains("not in Key:Value form"));
    }

    #[test]
    fn test_missing_vpc_column() {
        let content = "GroupName,Description\nweb,Web\n";

        assert!(parse_groups(content, "groups.csv").is_err());
    }
}

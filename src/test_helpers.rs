//! Test helpers for building rule records and sample input files
//!
//! This module provides fluent builders for CSV and live rule records plus
//! small, realistic input fixtures for exercising whole commands against a
//! `MockFileSystem`.

#![cfg(test)]

use crate::rules::model::{Address, CsvRuleRecord, Direction, LiveRuleRecord, Protocol};
use crate::traits::{FileSystem, MockFileSystem};
use std::path::Path;

/// Builder for a desired rule as loaded from CSV
pub struct CsvRuleBuilder {
    record: CsvRuleRecord,
}

impl CsvRuleBuilder {
    /// Create a builder for an ingress tcp/443 rule open to 0.0.0.0/0
    pub fn new(group_name: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            record: CsvRuleRecord {
                row: 1,
                group_name: group_name.into(),
                group_id: group_id.into(),
                direction: Direction::Ingress,
                protocol: Protocol::Named("tcp".to_string()),
                from_port: Some(443),
                to_port: Some(443),
                address: Address::Cidr("0.0.0.0/0".to_string()),
                description: String::new(),
            },
        }
    }

    pub fn row(mut self, row: usize) -> Self {
        self.record.row = row;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.record.direction = direction;
        self
    }

    pub fn egress(self) -> Self {
        self.direction(Direction::Egress)
    }

    pub fn tcp(self, from: i32, to: i32) -> Self {
        self.protocol("tcp").ports(from, to)
    }

    pub fn udp(self, from: i32, to: i32) -> Self {
        self.protocol("udp").ports(from, to)
    }

    pub fn protocol(mut self, name: &str) -> Self {
        self.record.protocol = Protocol::Named(name.to_string());
        self
    }

    /// All traffic, with no port range
    pub fn all_traffic(mut self) -> Self {
        self.record.protocol = Protocol::All;
        self.record.from_port = None;
        self.record.to_port = None;
        self
    }

    pub fn ports(mut self, from: i32, to: i32) -> Self {
        self.record.from_port = Some(from);
        self.record.to_port = Some(to);
        self
    }

    pub fn cidr(mut self, block: &str) -> Self {
        self.record.address = Address::Cidr(block.to_string());
        self
    }

    pub fn prefix_list(mut self, id: &str) -> Self {
        self.record.address = Address::PrefixList(id.to_string());
        self
    }

    pub fn security_group(mut self, id: &str) -> Self {
        self.record.address = Address::SecurityGroup(id.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.record.description = description.to_string();
        self
    }

    pub fn build(self) -> CsvRuleRecord {
        self.record
    }
}

/// Builder for a live rule as found in the snapshot
pub struct LiveRuleBuilder {
    record: LiveRuleRecord,
}

impl LiveRuleBuilder {
    /// Create a builder for an ingress tcp/443 rule open to 0.0.0.0/0
    pub fn new(rule_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            record: LiveRuleRecord {
                rule_id: rule_id.into(),
                group_id: group_id.into(),
                direction: Direction::Ingress,
                protocol: Protocol::Named("tcp".to_string()),
                from_port: Some(443),
                to_port: Some(443),
                address: Address::Cidr("0.0.0.0/0".to_string()),
                description: String::new(),
            },
        }
    }

    pub fn egress(mut self) -> Self {
        self.record.direction = Direction::Egress;
        self
    }

    pub fn tcp(mut self, from: i32, to: i32) -> Self {
        self.record.protocol = Protocol::Named("tcp".to_string());
        self.ports(from, to)
    }

    pub fn udp(mut self, from: i32, to: i32) -> Self {
        self.record.protocol = Protocol::Named("udp".to_string());
        self.ports(from, to)
    }

    /// All traffic; AWS reports its ports as -1
    pub fn all_traffic(mut self) -> Self {
        self.record.protocol = Protocol::All;
        self.ports(-1, -1)
    }

    pub fn ports(mut self, from: i32, to: i32) -> Self {
        self.record.from_port = Some(from);
        self.record.to_port = Some(to);
        self
    }

    pub fn cidr(mut self, block: &str) -> Self {
        self.record.address = Address::Cidr(block.to_string());
        self
    }

    pub fn prefix_list(mut self, id: &str) -> Self {
        self.record.address = Address::PrefixList(id.to_string());
        self
    }

    pub fn security_group(mut self, id: &str) -> Self {
        self.record.address = Address::SecurityGroup(id.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.record.description = description.to_string();
        self
    }

    pub fn build(self) -> LiveRuleRecord {
        self.record
    }
}

/// Desired rules: two matched web rules, an unmatched one, and an excluded group
pub const SAMPLE_RULES_CSV: &str = "\
group_name,group_id,direction,protocol,from_port,to_port,address_kind,address_value,description
web,sg-1,ingress,tcp,443,443,cidr,0.0.0.0/0,HTTPS
web,sg-1,egress,-1,,,cidr,0.0.0.0/0,
web,sg-1,ingress,tcp,8080,8080,prefix-list,pl-123,
legacy-sg,sg-9,ingress,tcp,22,22,cidr,10.0.0.0/8,SSH
";

/// Live snapshot in the grouped shape matching `SAMPLE_RULES_CSV`
pub const SAMPLE_SNAPSHOT_JSON: &str = r#"{
  "SecurityGroups": [
    {
      "GroupId": "sg-1",
      "GroupName": "web",
      "IngressRules": [
        {
          "SecurityGroupRuleId": "sgr-1",
          "IpProtocol": "tcp",
          "FromPort": 443,
          "ToPort": 443,
          "CidrIpv4": "0.0.0.0/0",
          "Description": "HTTPS"
        }
      ],
      "EgressRules": [
        {
          "SecurityGroupRuleId": "sgr-2",
          "IpProtocol": "-1",
          "FromPort": -1,
          "ToPort": -1,
          "CidrIpv4": "0.0.0.0/0"
        }
      ]
    },
    {
      "GroupId": "sg-9",
      "GroupName": "legacy-sg",
      "IngressRules": [
        {
          "SecurityGroupRuleId": "sgr-9",
          "IpProtocol": "tcp",
          "FromPort": 22,
          "ToPort": 22,
          "CidrIpv4": "10.0.0.0/8"
        }
      ]
    }
  ]
}"#;

/// Security groups export with tags
pub const SAMPLE_GROUPS_CSV: &str = "\
GroupName,GroupId,VpcId,Description,Tags
Web Tier,sg-1,vpc-123,Web servers,\"Env:prod, Team:platform\"
legacy-sg,sg-9,vpc-123,Old stuff,
db,,vpc-456,Database,
";

/// Create a mock filesystem holding the given files
pub fn mock_fs_with(files: &[(&str, &str)]) -> MockFileSystem {
    let fs = MockFileSystem::new();

    for (path, contents) in files {
        fs.write(Path::new(path), contents)
            .expect("Failed to write mock file");
    }

    fs
}

use std::fmt;

/// Sentinel protocol value AWS uses for "all traffic" rules
pub const ALL_TRAFFIC: &str = "-1";

/// Traffic direction governed by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ingress,
    Egress,
}

impl Direction {
    /// Get the direction identifier string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ingress => "ingress",
            Direction::Egress => "egress",
        }
    }

    /// Terraform resource type used for rules in this direction
    pub fn resource_type(&self) -> &'static str {
        match self {
            Direction::Ingress => "aws_vpc_security_group_ingress_rule",
            Direction::Egress => "aws_vpc_security_group_egress_rule",
        }
    }

    /// Parse direction from string (console exports say inbound/outbound)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ingress" | "inbound" => Some(Direction::Ingress),
            "egress" | "outbound" => Some(Direction::Egress),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// IP protocol of a rule
///
/// `All` is the wildcard; for it port ranges carry no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Protocol {
    All,
    /// Lowercased protocol name or number (e.g. "tcp", "udp", "icmp", "50")
    Named(String),
}

impl Protocol {
    /// Parse a protocol token. Returns None for an empty value.
    pub fn parse(s: &str) -> Option<Self> {
        let token = s.trim().to_lowercase();

        match token.as_str() {
            "" => None,
            ALL_TRAFFIC | "all" => Some(Protocol::All),
            _ => Some(Protocol::Named(token)),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Protocol::All)
    }

    /// Value as rendered into configuration (`-1` for all traffic)
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::All => ALL_TRAFFIC,
            Protocol::Named(name) => name,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of address specifier a rule uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    Cidr,
    PrefixList,
    SecurityGroup,
}

impl AddressKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cidr" | "cidr_ipv4" | "cidr-ipv4" => Some(AddressKind::Cidr),
            "prefix-list" | "prefix_list" | "prefixlist" => Some(AddressKind::PrefixList),
            "security-group"
            | "security_group"
            | "referenced-security-group"
            | "referenced_security_group"
            | "sg" => Some(AddressKind::SecurityGroup),
            _ => None,
        }
    }

    /// Attribute name on the aws_vpc_security_group_*_rule resources
    pub fn attribute(&self) -> &'static str {
        match self {
            AddressKind::Cidr => "cidr_ipv4",
            AddressKind::PrefixList => "prefix_list_id",
            AddressKind::SecurityGroup => "referenced_security_group_id",
        }
    }
}

/// Source or destination of a rule. Exactly one kind per rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// IPv4 CIDR block, e.g. "10.0.0.0/16"
    Cidr(String),
    /// Managed prefix list id, e.g. "pl-1234abcd"
    PrefixList(String),
    /// Referenced security group id, e.g. "sg-0abc"
    SecurityGroup(String),
}

impl Address {
    pub fn new(kind: AddressKind, value: impl Into<String>) -> Self {
        let value = value.into();
        match kind {
            AddressKind::Cidr => Address::Cidr(value),
            AddressKind::PrefixList => Address::PrefixList(value),
            AddressKind::SecurityGroup => Address::SecurityGroup(value),
        }
    }

    pub fn kind(&self) -> AddressKind {
        match self {
            Address::Cidr(_) => AddressKind::Cidr,
            Address::PrefixList(_) => AddressKind::PrefixList,
            Address::SecurityGroup(_) => AddressKind::SecurityGroup,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Address::Cidr(v) | Address::PrefixList(v) | Address::SecurityGroup(v) => v,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind().attribute(), self.value())
    }
}

/// A desired rule loaded from the CSV export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRuleRecord {
    /// 1-based data row in the source CSV (header excluded)
    pub row: usize,
    pub group_name: String,
    pub group_id: String,
    pub direction: Direction,
    pub protocol: Protocol,
    pub from_port: Option<i32>,
    pub to_port: Option<i32>,
    pub address: Address,
    pub description: String,
}

impl CsvRuleRecord {
    /// Group name in the form used for resource names and exclusions
    pub fn normalized_group_name(&self) -> String {
        normalize_group_name(&self.group_name)
    }

    /// Short human-readable identity for diagnostics
    pub fn display_string(&self) -> String {
        format!(
            "row {} ({} {} {} {})",
            self.row,
            self.group_name,
            self.direction,
            self.protocol,
            self.address
        )
    }
}

/// A rule as it exists in the live snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveRuleRecord {
    /// Provider-assigned rule id, e.g. "sgr-0123456789abcdef0"
    pub rule_id: String,
    pub group_id: String,
    pub direction: Direction,
    pub protocol: Protocol,
    pub from_port: Option<i32>,
    pub to_port: Option<i32>,
    pub address: Address,
    pub description: String,
}

/// Normalize a security group name: trimmed, lowercased, spaces as dashes
pub fn normalize_group_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

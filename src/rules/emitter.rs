use handlebars::Handlebars;
use std::collections::HashMap;

use super::error::RuleImportResult;
use super::matcher::MatchResult;
use super::model::{CsvRuleRecord, Direction};
use crate::hcl::{self, RESOURCE_TEMPLATE, ResourceBlock};
use crate::script::{ImportBatch, ImportCommand};

/// One rendered rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedRule {
    /// Resource address, e.g. `aws_vpc_security_group_ingress_rule.web-ingress1`
    pub address: String,
    pub block: String,
    /// Present only for records matched to a live rule
    pub import: Option<ImportCommand>,
}

/// Generated artifacts for a whole run
#[derive(Debug, Clone, Default)]
pub struct EmittedRules {
    pub blocks: Vec<String>,
    pub imports: ImportBatch,
}

impl EmittedRules {
    /// Configuration file contents, one blank line between blocks
    pub fn config(&self) -> String {
        self.blocks.join("\n")
    }
}

/// Renders `aws_vpc_security_group_*_rule` blocks and their import commands
///
/// Resource names are `<group>-<direction><n>`, numbered per group and
/// direction in the order records are emitted.
pub struct BlockEmitter<'r> {
    registry: &'r Handlebars<'static>,
    counters: HashMap<(String, Direction), usize>,
}

impl<'r> BlockEmitter<'r> {
    pub fn new(registry: &'r Handlebars<'static>) -> Self {
        Self {
            registry,
            counters: HashMap::new(),
        }
    }

    /// Render a single result
    pub fn emit(&mut self, result: &MatchResult) -> RuleImportResult<EmittedRule> {
        let record = result.record();
        let name = self.next_name(record);
        let resource_type = record.direction.resource_type();

        let block = ResourceBlock {
            resource_type: resource_type.to_string(),
            name: name.clone(),
            attributes: hcl::align(rule_attributes(record)),
            tags: Vec::new(),
        };
        let block = self.registry.render(RESOURCE_TEMPLATE, &block)?;

        let address = format!("{}.{}", resource_type, name);
        let import = result.rule_id().map(|id| ImportCommand {
            address: address.clone(),
            id: id.to_string(),
        });

        Ok(EmittedRule {
            address,
            block,
            import,
        })
    }

    /// Render every result, keeping their order in both outputs
    pub fn emit_all(&mut self, results: &[MatchResult]) -> RuleImportResult<EmittedRules> {
        let mut emitted = EmittedRules::default();

        for result in results {
            let rule = self.emit(result)?;
            emitted.blocks.push(rule.block);

            if let Some(import) = rule.import {
                emitted.imports.push(import);
            }
        }

        Ok(emitted)
    }

    /// Counters are keyed on the sanitized name so groups that sanitize alike share one
    fn next_name(&mut self, record: &CsvRuleRecord) -> String {
        let base = hcl::resource_name(&record.normalized_group_name());
        let counter = self
            .counters
            .entry((base.clone(), record.direction))
            .or_insert(0);
        *counter += 1;

        format!("{}-{}{}", base, record.direction, counter)
    }
}

/// Attributes of a rule block, in rendering order
fn rule_attributes(record: &CsvRuleRecord) -> Vec<(String, String)> {
    let mut attributes = vec![
        ("security_group_id".to_string(), hcl::quote(&record.group_id)),
        // Always quoted: tcp/udp would otherwise be read as bare identifiers
        ("ip_protocol".to_string(), hcl::quote(record.protocol.as_str())),
    ];

    if !record.protocol.is_all() {
        if let Some(from_port) = record.from_port {
            attributes.push(("from_port".to_string(), from_port.to_string()));
        }

        if let Some(to_port) = record.to_port {
            attributes.push(("to_port".to_string(), to_port.to_string()));
        }
    }

    attributes.push((
        record.address.kind().attribute().to_string(),
        hcl::quote(record.address.value()),
    ));

    if !record.description.is_empty() {
        attributes.push(("description".to_string(), hcl::quote(&record.description)));
    }

    attributes
}

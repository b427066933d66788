//! `aws_security_group` block generation
//!
//! Declares the security groups themselves from a groups export, so rule
//! blocks generated by [`crate::rules`] have something to attach to.

use handlebars::Handlebars;
use std::collections::HashSet;

use crate::hcl::{self, RESOURCE_TEMPLATE, ResourceBlock};
use crate::rules::RuleImportResult;
use crate::rules::model::normalize_group_name;
use crate::script::{ImportBatch, ImportCommand};

pub const GROUP_RESOURCE_TYPE: &str = "aws_security_group";

/// A security group as loaded from the groups CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    /// 1-based data row in the source CSV
    pub row: usize,
    pub name: String,
    /// Existing group id; when present an import command is generated
    pub group_id: Option<String>,
    pub vpc_id: String,
    pub description: String,
    /// Tags in the order they were listed
    pub tags: Vec<(String, String)>,
}

impl GroupRecord {
    pub fn normalized_name(&self) -> String {
        normalize_group_name(&self.name)
    }
}

/// Parse tags written as `Key:Value, Other:Value`
///
/// Each pair is split on its first `:` only, so values may contain colons.
pub fn parse_tags(tags: &str) -> Result<Vec<(String, String)>, String> {
    let mut parsed = Vec::new();

    for pair in tags.split(',') {
        if pair.trim().is_empty() {
            continue;
        }

        let (key, value) = pair
            .split_once(':')
            .ok_or_else(|| format!("tag '{}' is not in Key:Value form", pair.trim()))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(format!("tag '{}' has an empty key", pair.trim()));
        }

        parsed.push((key.to_string(), value.trim().to_string()));
    }

    Ok(parsed)
}

/// Generated artifacts for a groups run
#[derive(Debug, Clone, Default)]
pub struct EmittedGroups {
    pub blocks: Vec<String>,
    pub imports: ImportBatch,
    /// Groups dropped by the exclusion filter
    pub excluded: usize,
}

impl EmittedGroups {
    pub fn config(&self) -> String {
        self.blocks.join("\n")
    }
}

/// Renders `aws_security_group` blocks
pub struct GroupEmitter<'r> {
    registry: &'r Handlebars<'static>,
    exclusions: HashSet<String>,
}

impl<'r> GroupEmitter<'r> {
    pub fn new(registry: &'r Handlebars<'static>) -> Self {
        Self {
            registry,
            exclusions: HashSet::new(),
        }
    }

    pub fn with_exclusions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclusions
            .extend(names.into_iter().map(|n| normalize_group_name(n.as_ref())));
        self
    }

    /// Render one group block under resource name `name`, and its import command
    /// if the group id is known
    pub fn emit(
        &self,
        group: &GroupRecord,
        name: &str,
    ) -> RuleImportResult<(String, Option<ImportCommand>)> {
        let attributes = vec![
            ("name".to_string(), hcl::quote(&group.normalized_name())),
            ("description".to_string(), hcl::quote(&group.description)),
            ("vpc_id".to_string(), hcl::quote(&group.vpc_id)),
        ];
        let tags = group
            .tags
            .iter()
            .map(|(key, value)| (hcl::map_key(key), hcl::quote(value)))
            .collect();

        let block = ResourceBlock {
            resource_type: GROUP_RESOURCE_TYPE.to_string(),
            name: name.to_string(),
            attributes: hcl::align(attributes),
            tags: hcl::align(tags),
        };
        let block = self.registry.render(RESOURCE_TEMPLATE, &block)?;

        let import = group.group_id.as_ref().map(|id| ImportCommand {
            address: format!("{}.{}", GROUP_RESOURCE_TYPE, name),
            id: id.clone(),
        });

        Ok((block, import))
    }

    /// Render every group not excluded, in input order
    ///
    /// Groups sharing a name (every VPC has a `default`) get `-2`, `-3`, ...
    /// suffixes on their resource names.
    pub fn emit_all(&self, groups: &[GroupRecord]) -> RuleImportResult<EmittedGroups> {
        let mut emitted = EmittedGroups::default();
        let mut used = HashSet::new();

        for group in groups {
            if self.exclusions.contains(&group.normalized_name()) {
                emitted.excluded += 1;
                continue;
            }

            let name = unique_name(&mut used, hcl::resource_name(&group.normalized_name()));
            let (block, import) = self.emit(group, &name)?;
            emitted.blocks.push(block);

            if let Some(import) = import {
                emitted.imports.push(import);
            }
        }

        Ok(emitted)
    }
}

/// Claim `base`, or the first free `base-<n>` from 2 upwards
fn unique_name(used: &mut HashSet<String>, base: String) -> String {
    let mut name = base.clone();
    let mut n = 1;

    while !used.insert(name.clone()) {
        n += 1;
        name = format!("{}-{}", base, n);
    }

    name
}

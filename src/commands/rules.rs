use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::{OutputArgs, default_script_path, read_input, write_outputs};
use crate::context::Context;
use crate::hcl;
use crate::loader::{parse_desired_rules, parse_snapshot};
use crate::rules::{BlockEmitter, RuleImportError, RuleIndex, RuleMatcher};

/// Generate rule blocks and import commands from a CSV and a live snapshot
#[derive(Debug, Clone, Args)]
pub struct RulesArgs {
    /// Desired rules CSV
    #[arg(long)]
    pub csv: PathBuf,

    /// Live rules JSON (describe-security-groups or describe-security-group-rules output)
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Generated configuration file
    #[arg(long, default_value = "terraform_security_rules.tf")]
    pub out: PathBuf,

    /// Generated import batch [default: terraform_import_script.<format extension>]
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Drop ambiguous and duplicate records instead of failing
    #[arg(long)]
    pub skip_conflicts: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub struct RulesCommand;

impl RulesCommand {
    pub fn execute(ctx: &Context, args: &RulesArgs) -> Result<()> {
        ctx.output.section("Security Group Rules");

        let settings = args.output.settings(ctx, args.skip_conflicts)?;

        let csv = read_input(ctx, &args.csv, "Rules CSV")?;
        let records = parse_desired_rules(&csv, &args.csv.display().to_string())?;

        let json = read_input(ctx, &args.snapshot, "Snapshot")?;
        let snapshot = parse_snapshot(&json, &args.snapshot.display().to_string())?;

        ctx.output.key_value("Desired rules", &records.len().to_string());
        ctx.output
            .key_value("Live rules", &snapshot.rules.len().to_string());

        for rule_id in &snapshot.skipped {
            ctx.output.warning(&format!(
                "Skipping live rule {}: no IPv4 CIDR, prefix list or referenced group",
                rule_id
            ));
        }

        let index = RuleIndex::build(snapshot.rules);
        ctx.output
            .key_value("Live groups", &index.group_count().to_string());

        let matcher = RuleMatcher::new(&index).with_exclusions(&settings.exclude);
        let report = matcher.match_all(records);

        if report.has_conflicts() {
            if !settings.skip_conflicts {
                for conflict in &report.conflicts {
                    ctx.output.error(&conflict.to_string());
                }
                return Err(RuleImportError::Conflicts(report.conflicts).into());
            }

            for conflict in &report.conflicts {
                ctx.output.warning(&format!("Skipped: {}", conflict));
            }
        }

        for result in &report.results {
            if result.rule_id().is_none() {
                let record = result.record();
                ctx.output.warning(&format!(
                    "No live rule in {} matches {}; block generated without import",
                    record.group_id,
                    record.display_string()
                ));
            }
        }

        let registry = hcl::registry().map_err(RuleImportError::from)?;
        let emitted = BlockEmitter::new(&registry).emit_all(&report.results)?;
        let script = emitted
            .imports
            .render(&registry, settings.format, settings.binary)
            .map_err(RuleImportError::from)?;

        let script_path = args
            .script
            .clone()
            .unwrap_or_else(|| default_script_path("terraform_import_script", settings.format));

        ctx.output.section("Summary");
        ctx.output
            .key_value("Blocks generated", &emitted.blocks.len().to_string());
        ctx.output
            .key_value("Import commands", &emitted.imports.len().to_string());
        ctx.output
            .key_value("Unmatched", &report.unmatched_count().to_string());
        ctx.output
            .key_value("Excluded", &report.excluded.to_string());
        ctx.output
            .key_value("Conflicts", &report.conflicts.len().to_string());
        ctx.output
            .key_value_highlight("Configuration", &args.out.display().to_string());
        ctx.output
            .key_value_highlight("Import script", &script_path.display().to_string());
        ctx.output.blank();

        write_outputs(
            ctx,
            args.output.dry_run,
            &args.out,
            &emitted.config(),
            &script_path,
            &script,
        )
    }
}

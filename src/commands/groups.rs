use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::{OutputArgs, default_script_path, read_input, write_outputs};
use crate::context::Context;
use crate::groups::GroupEmitter;
use crate::hcl;
use crate::loader::parse_groups;
use crate::rules::RuleImportError;

/// Generate security group blocks and import commands from a groups CSV
#[derive(Debug, Clone, Args)]
pub struct GroupsArgs {
    /// Security groups CSV (GroupName, GroupId, VpcId, Description, Tags)
    #[arg(long)]
    pub csv: PathBuf,

    /// Generated configuration file
    #[arg(long, default_value = "terraform_security_groups.tf")]
    pub out: PathBuf,

    /// Generated import batch [default: terraform_import_groups.<format extension>]
    #[arg(long)]
    pub script: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub struct GroupsCommand;

impl GroupsCommand {
    pub fn execute(ctx: &Context, args: &GroupsArgs) -> Result<()> {
        ctx.output.section("Security Groups");

        let settings = args.output.settings(ctx, false)?;

        let csv = read_input(ctx, &args.csv, "Groups CSV")?;
        let groups = parse_groups(&csv, &args.csv.display().to_string())?;

        ctx.output.key_value("Groups", &groups.len().to_string());

        for group in groups.iter().filter(|g| g.group_id.is_none()) {
            ctx.output.dimmed(&format!(
                "  {} has no GroupId; block generated without import",
                group.name
            ));
        }

        let registry = hcl::registry().map_err(RuleImportError::from)?;
        let emitted = GroupEmitter::new(&registry)
            .with_exclusions(&settings.exclude)
            .emit_all(&groups)?;
        let script = emitted
            .imports
            .render(&registry, settings.format, settings.binary)
            .map_err(RuleImportError::from)?;

        let script_path = args
            .script
            .clone()
            .unwrap_or_else(|| default_script_path("terraform_import_groups", settings.format));

        ctx.output.section("Summary");
        ctx.output
            .key_value("Blocks generated", &emitted.blocks.len().to_string());
        ctx.output
            .key_value("Import commands", &emitted.imports.len().to_string());
        ctx.output
            .key_value("Excluded", &emitted.excluded.to_string());
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

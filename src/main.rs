mod commands;
mod config;
mod context;
mod groups;
mod hcl;
mod loader;
mod output;
mod rules;
mod script;
#[cfg(test)]
mod test_helpers;
mod traits;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{GroupsArgs, GroupsCommand, RulesArgs, RulesCommand};
use context::Context;

#[derive(Parser)]
#[command(name = "sg-import")]
#[command(
    about = "Generate Terraform blocks and import commands for existing AWS security groups",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate security group rule blocks matched against a live snapshot
    Rules(RulesArgs),

    /// Generate security group blocks from a groups export
    Groups(GroupsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::new();

    match cli.command {
        Commands::Rules(args) => {
            RulesCommand::execute(&ctx, &args)?;
        }
        Commands::Groups(args) => {
            GroupsCommand::execute(&ctx, &args)?;
        }
    }

    Ok(())
}

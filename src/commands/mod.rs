pub mod groups;
pub mod rules;

pub use groups::{GroupsArgs, GroupsCommand};
pub use rules::{RulesArgs, RulesCommand};

use anyhow::{Result, bail};
use clap::Args;
use std::path::{Path, PathBuf};

use crate::config::{ImportConfig, Settings};
use crate::context::Context;
use crate::script::{ImportBinary, ImportFormat};

/// Flags shared by every generating command
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Import batch format
    #[arg(long, value_enum)]
    pub format: Option<ImportFormat>,

    /// CLI named in import commands
    #[arg(long, value_enum)]
    pub binary: Option<ImportBinary>,

    /// Security group name to leave out (repeatable)
    #[arg(long = "exclude", value_name = "GROUP")]
    pub exclude: Vec<String>,

    /// Print the summary without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// YAML configuration file
    #[arg(long, env = "SG_IMPORT_CONFIG")]
    pub config: Option<PathBuf>,
}

impl OutputArgs {
    /// Load the config file, if any, and merge these flags over it
    pub fn settings(&self, ctx: &Context, skip_conflicts: bool) -> Result<Settings> {
        let config = ImportConfig::load_optional(ctx.fs.as_ref(), self.config.as_deref())?;

        Ok(Settings::merge(
            config,
            &self.exclude,
            self.format,
            self.binary,
            skip_conflicts,
        ))
    }
}

/// Read an input file, failing with a clear message when it is missing
fn read_input(ctx: &Context, path: &Path, what: &str) -> Result<String> {
    if !ctx.fs.is_file(path) {
        bail!("{} not found: {}", what, path.display());
    }

    ctx.fs.read_to_string(path)
}

/// Script path for a format when none was given on the command line
fn default_script_path(stem: &str, format: ImportFormat) -> PathBuf {
    PathBuf::from(format!("{}.{}", stem, format.extension()))
}

/// Write both generated files, or announce that a dry run wrote nothing
fn write_outputs(
    ctx: &Context,
    dry_run: bool,
    config_path: &Path,
    config: &str,
    script_path: &Path,
    script: &str,
) -> Result<()> {
    if dry_run {
        ctx.output.info("Dry run: no files written");
        return Ok(());
    }

    // Stage both files first so a failed write leaves neither behind
    let outputs = [(config_path, config), (script_path, script)];
    let mut staged: Vec<PathBuf> = Vec::with_capacity(outputs.len());

    for (path, contents) in outputs {
        let staging = staging_path(path);

        if let Err(err) = ctx.fs.write(&staging, contents) {
            for written in &staged {
                let _ = ctx.fs.remove_file(written);
            }
            return Err(err);
        }

        staged.push(staging);
    }

    for ((path, _), staging) in outputs.iter().zip(&staged) {
        ctx.fs.rename(staging, path)?;
    }

    ctx.output
        .success(&format!("Configuration written to {}", config_path.display()));
    ctx.output
        .success(&format!("Import script written to {}", script_path.display()));

    Ok(())
}

/// Sibling path an output is written to before being moved into place
fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{FileSystem, MockFileSystem, MockOutput};
    use std::sync::Arc;

    /// In-memory filesystem that refuses writes to one path
    struct FailingFileSystem {
        inner: MockFileSystem,
        fail_on: PathBuf,
    }

    impl FileSystem for FailingFileSystem {
        fn read_to_string(&self, path: &Path) -> Result<String> {
            self.inner.read_to_string(path)
        }

        fn write(&self, path: &Path, contents: &str) -> Result<()> {
            if path == self.fail_on {
                bail!("Disk full: {:?}", path);
            }
            self.inner.write(path, contents)
        }

        fn rename(&self, from: &Path, to: &Path) -> Result<()> {
            self.inner.rename(from, to)
        }

        fn remove_file(&self, path: &Path) -> Result<()> {
            self.inner.remove_file(path)
        }

        fn is_file(&self, path: &Path) -> bool {
            self.inner.is_file(path)
        }
    }

    #[test]
    fn test_write_outputs_moves_both_files_into_place() {
        let fs = Arc::new(MockFileSystem::new());
        let ctx = Context::test_with(fs.clone(), Arc::new(MockOutput::new()));

        write_outputs(
            &ctx,
            false,
            Path::new("/out/rules.tf"),
            "config",
            Path::new("/out/import.sh"),
            "script",
        )
        .unwrap();

        let mut files = fs.list_files();
        files.sort();
        assert_eq!(
            files,
            vec![PathBuf::from("/out/import.sh"), PathBuf::from("/out/rules.tf")]
        );
        assert_eq!(
            fs.get_file_contents(Path::new("/out/rules.tf")).unwrap(),
            "config"
        );
    }

    #[test]
    fn test_failed_script_write_leaves_no_config() {
        let fs = Arc::new(FailingFileSystem {
            inner: MockFileSystem::new(),
            fail_on: PathBuf::from("/out/import.bat.tmp"),
        });
        let output = Arc::new(MockOutput::new());
        let ctx = Context::test_with(fs.clone(), output.clone());

        let err = write_outputs(
            &ctx,
            false,
            Path::new("/out/rules.tf"),
            "config",
            Path::new("/out/import.bat"),
            "script",
        )
        .unwrap_err();

        assert!(err.to_string().contains("Disk full"));
        assert!(fs.inner.list_files().is_empty());
        assert!(output.to_text().is_empty());
    }

    #[test]
    fn test_staging_path_appends_suffix() {
        assert_eq!(
            staging_path(Path::new("out/terraform_security_rules.tf")),
            PathBuf::from("out/terraform_security_rules.tf.tmp")
        );
    }
}

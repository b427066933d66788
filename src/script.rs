use clap::ValueEnum;
use handlebars::Handlebars;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::hcl::{self, IMPORT_TEMPLATE, ImportBlock};

lazy_static! {
    static ref SHELL_SAFE: Regex = Regex::new(r"^[A-Za-z0-9_./:@+=-]+$").unwrap();
}

/// Layout of the generated import batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    /// Windows batch file (`@echo off` followed by one command per line)
    #[default]
    Bat,
    /// POSIX shell script that stops at the first failing import
    Sh,
    /// `import { to = ..., id = ... }` blocks for config-driven import
    Hcl,
}

impl ImportFormat {
    /// Conventional file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImportFormat::Bat => "bat",
            ImportFormat::Sh => "sh",
            ImportFormat::Hcl => "tf",
        }
    }
}

/// CLI used in generated import commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportBinary {
    #[default]
    Terraform,
    Tofu,
}

impl ImportBinary {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportBinary::Terraform => "terraform",
            ImportBinary::Tofu => "tofu",
        }
    }
}

/// Binds a declared resource address to an existing provider id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCommand {
    pub address: String,
    pub id: String,
}

/// Ordered batch of import commands
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    commands: Vec<ImportCommand>,
}

impl ImportBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command; order of insertion is the order of execution
    pub fn push(&mut self, command: ImportCommand) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[ImportCommand] {
        &self.commands
    }

    /// Render the whole batch as file contents
    pub fn render(
        &self,
        registry: &Handlebars<'static>,
        format: ImportFormat,
        binary: ImportBinary,
    ) -> Result<String, handlebars::RenderError> {
        match format {
            ImportFormat::Bat => Ok(self.render_lines("@echo off\n", binary, str::to_string)),
            ImportFormat::Sh => Ok(self.render_lines("#!/bin/sh\nset -e\n\n", binary, sh_quote)),
            ImportFormat::Hcl => {
                let blocks = self
                    .commands
                    .iter()
                    .map(|command| {
                        registry.render(
                            IMPORT_TEMPLATE,
                            &ImportBlock {
                                address: command.address.clone(),
                                id: hcl::quote(&command.id),
                            },
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(blocks.join("\n"))
            }
        }
    }

    fn render_lines(
        &self,
        header: &str,
        binary: ImportBinary,
        quote: impl Fn(&str) -> String,
    ) -> String {
        let mut script = header.to_string();

        for command in &self.commands {
            script.push_str(&format!(
                "{} import {} {}\n",
                binary.as_str(),
                quote(&command.address),
                quote(&command.id)
            ));
        }

        script
    }
}

/// Single-quote a word for POSIX sh unless it is made of safe characters only
fn sh_quote(word: &str) -> String {
    if SHELL_SAFE.is_match(word) {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

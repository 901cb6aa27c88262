//! `kdoc build` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use kdoc_builder::{Builder, OutputFormat};
use kdoc_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Html,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Html => Self::Html,
            Format::Json => Self::Json,
        }
    }
}

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Source files to build (default: every .rst file in the source directory).
    paths: Vec<PathBuf>,

    /// Path to configuration file (default: auto-discover kdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// kernel-doc executable (overrides config).
    #[arg(long, env = "KERNELDOC")]
    kerneldoc_bin: Option<String>,

    /// Root of the source tree kernel-doc paths are relative to (overrides config).
    #[arg(long, env = "srctree")]
    srctree: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "html")]
    format: Format,

    /// Enable verbose output (build progress logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            kerneldoc_bin: self.kerneldoc_bin,
            srctree: self.srctree,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Source: {}",
            config.docs_resolved.source_dir.display()
        ));
        output.info(&format!(
            "Output: {}",
            config.docs_resolved.output_dir.display()
        ));

        let app = super::application();
        let values = super::config_values(&app, &config);
        let report = Builder::new(app, config.docs_resolved.clone())
            .with_config_values(values)
            .with_format(self.format.into())
            .build(&self.paths)?;

        for doc in &report.documents {
            for diagnostic in &doc.diagnostics {
                output.diagnostic(diagnostic);
            }
        }

        let problems = report.problem_count();
        if problems > 0 {
            output.warning(&format!("{problems} problem(s) reported"));
        }
        output.success(&format!(
            "Built {} document(s) to {}",
            report.documents.len(),
            config.docs_resolved.output_dir.display()
        ));
        Ok(())
    }
}

//! `kdoc command` command implementation.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use clap::Args;
use console::Term;
use kdoc_config::{CliSettings, Config};
use kdoc_kerneldoc::{
    CommandBuilder, DIRECTIVE_NAME, KERNELDOC_SRCTREE, KernelDocConfig, KernelDocOptions,
};
use kdoc_renderer::directive::{Directive, DirectiveArgs, DirectiveError};
use kdoc_renderer::{BuildEnvironment, DocumentProcessor, Node, ParseState, SOURCE_SUFFIX};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the command command.
#[derive(Args)]
pub(crate) struct CommandArgs {
    /// Source document (.rst) to inspect.
    doc: PathBuf,

    /// Path to configuration file (default: auto-discover kdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// kernel-doc executable (overrides config).
    #[arg(long, env = "KERNELDOC")]
    kerneldoc_bin: Option<String>,

    /// Root of the source tree kernel-doc paths are relative to (overrides config).
    #[arg(long, env = "srctree")]
    srctree: Option<PathBuf>,
}

/// Stands in for `kernel-doc` and records the command it would run.
struct CommandRecorder {
    commands: Arc<Mutex<Vec<String>>>,
}

impl Directive for CommandRecorder {
    fn run(
        &mut self,
        args: DirectiveArgs,
        state: &mut ParseState,
    ) -> Result<Vec<Node>, DirectiveError> {
        let options = KernelDocOptions::from_args(&args)?;
        let config = KernelDocConfig::from_values(&state.env().config);
        let srctree = config.srctree.ok_or_else(|| {
            DirectiveError::Other(format!("{KERNELDOC_SRCTREE} is not configured"))
        })?;

        let command = CommandBuilder::new(config.bin.unwrap_or_default(), srctree).build(&options);
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.cmd_str());
        Ok(Vec::new())
    }
}

/// Command lines of every `kernel-doc` directive in `text`, in order.
fn collect_commands(
    env: BuildEnvironment,
    text: &str,
) -> Result<(Vec<String>, Vec<kdoc_renderer::Diagnostic>), CliError> {
    let commands = Arc::new(Mutex::new(Vec::new()));

    let mut app = super::application();
    let recorded = Arc::clone(&commands);
    app.add_directive_with(DIRECTIVE_NAME, move || {
        Box::new(CommandRecorder {
            commands: Arc::clone(&recorded),
        })
    });

    let processed = DocumentProcessor::new(Arc::new(env), app.registry()).process(text)?;
    let commands = std::mem::take(&mut *commands.lock().unwrap_or_else(PoisonError::into_inner));
    Ok((commands, processed.diagnostics))
}

impl CommandArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            kerneldoc_bin: self.kerneldoc_bin,
            srctree: self.srctree,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let doc = std::path::absolute(&self.doc)?;
        let source_dir = std::path::absolute(&config.docs_resolved.source_dir)?;
        let docname = doc
            .strip_prefix(&source_dir)
            .ok()
            .and_then(|p| p.to_str())
            .and_then(|p| p.strip_suffix(SOURCE_SUFFIX))
            .ok_or_else(|| {
                CliError::Validation(format!(
                    "{} is not a source document under {}",
                    self.doc.display(),
                    source_dir.display()
                ))
            })?
            .to_owned();

        let text = std::fs::read_to_string(&doc)?;
        let app = super::application();
        let env = BuildEnvironment::new(source_dir, docname)
            .with_tab_width(config.docs_resolved.tab_width)
            .with_config(super::config_values(&app, &config));

        let (commands, diagnostics) = collect_commands(env, &text)?;
        for diagnostic in &diagnostics {
            output.diagnostic(diagnostic);
        }

        let stdout = Term::stdout();
        for command in &commands {
            stdout.write_line(command)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdoc_kerneldoc::KERNELDOC_BIN;
    use kdoc_renderer::ConfigValue;
    use pretty_assertions::assert_eq;

    fn env() -> BuildEnvironment {
        let mut values = super::super::application().config_values();
        values.set(KERNELDOC_BIN, ConfigValue::Str("scripts/kernel-doc".to_owned()));
        values.set(KERNELDOC_SRCTREE, ConfigValue::Str("/src/linux".to_owned()));
        BuildEnvironment::new("/src/linux/Documentation", "core-api/kernel-api").with_config(values)
    }

    #[test]
    fn test_collect_commands() {
        let text = "\
Kernel API
==========

.. kernel-doc:: include/linux/list.h
   :internal:

.. kernel-doc:: lib/string.c
   :doc: String helpers
   :no-identifiers: strcpy
";
        let (commands, diagnostics) = collect_commands(env(), text).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(
            commands,
            vec![
                "scripts/kernel-doc -rst -enable-lineno -internal /src/linux/include/linux/list.h",
                "scripts/kernel-doc -rst -enable-lineno -function 'String helpers' -nosymbol strcpy /src/linux/lib/string.c",
            ]
        );
    }

    #[test]
    fn test_invalid_directive_reported() {
        let (commands, diagnostics) =
            collect_commands(env(), ".. kernel-doc::\n").unwrap();
        assert!(commands.is_empty());
        assert_eq!(
            diagnostics[0].message,
            "Error in \"kernel-doc\" directive: 1 argument(s) required, 0 supplied."
        );
    }
}

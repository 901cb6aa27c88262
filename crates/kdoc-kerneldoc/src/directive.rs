//! The `kernel-doc` directive.

use std::io::Write;

use kdoc_renderer::directive::{Directive, DirectiveArgs, DirectiveError};
use kdoc_renderer::{Node, ParseState};

use crate::attribute::{attribute_output, output_source};
use crate::command::{CommandBuilder, KernelDocCommand};
use crate::config::{KERNELDOC_SRCTREE, KernelDocConfig, verbosity_from_env};
use crate::invoke::{self, ExtractError};
use crate::options::KernelDocOptions;

/// Text of the node that replaces a failed extraction.
pub const PLACEHOLDER: &str = "kernel-doc missing";

/// Extracts documentation comments from a source file and parses them in
/// place of the directive.
///
/// ```text
/// .. kernel-doc:: drivers/gpu/drm/drm_atomic.c
///    :export:
/// ```
///
/// Extraction failures are reported as warnings and leave a
/// `kernel-doc missing` error node behind.
#[derive(Debug, Default)]
pub struct KernelDocDirective {
    verbose: i64,
}

impl Directive for KernelDocDirective {
    fn run(
        &mut self,
        args: DirectiveArgs,
        state: &mut ParseState,
    ) -> Result<Vec<Node>, DirectiveError> {
        let options = KernelDocOptions::from_args(&args)?;
        let config = KernelDocConfig::from_values(&state.env().config);
        let Some(srctree) = config.srctree.clone() else {
            return Err(DirectiveError::Other(format!(
                "{KERNELDOC_SRCTREE} is not configured"
            )));
        };

        let env_verbosity = verbosity_from_env();
        if env_verbosity != 0 {
            self.verbose = env_verbosity;
        }

        let bin = config.bin.clone().unwrap_or_default();
        let command = CommandBuilder::new(bin, srctree).build(&options);
        for path in &command.dependencies {
            state.note_dependency(path);
        }

        self.echo_command(&command, &mut std::io::stdout().lock());

        match extract(&command, &options, &config, &args, state) {
            Ok(nodes) => Ok(nodes),
            Err(err) => {
                state.warning(args.location.clone(), err.to_string());
                Ok(vec![Node::error_message(PLACEHOLDER)])
            }
        }
    }
}

impl KernelDocDirective {
    /// Print the copy-pasteable command line to `out` when verbose.
    fn echo_command<W: Write>(&self, command: &KernelDocCommand, out: &mut W) {
        if self.verbose < 1 {
            return;
        }
        if let Err(e) = writeln!(out, "{}", command.cmd_str()) {
            tracing::debug!(error = %e, "Failed to print kernel-doc command");
        }
    }
}

/// Run the tool and parse its output into nodes.
fn extract(
    command: &KernelDocCommand,
    options: &KernelDocOptions,
    config: &KernelDocConfig,
    args: &DirectiveArgs,
    state: &mut ParseState,
) -> Result<Vec<Node>, ExtractError> {
    if config.bin.is_none() {
        return Err(ExtractError::processing(
            command,
            "kerneldoc_bin is not configured",
        ));
    }

    let output = invoke::run(command, config.verbosity)?;

    let env = state.env();
    let doc = format!("{}/{}", env.srcdir.display(), env.docname);
    let source = output_source(&doc, args.lineno, command.target());
    let tab_width = options.tab_width.unwrap_or(env.tab_width);
    let lines = attribute_output(&output, &source, tab_width);

    let mut section = Node::section();
    {
        let mut guard = state.switch_source_input(lines);
        guard
            .nested_parse(&mut section, true)
            .map_err(|e| ExtractError::processing(command, e))?;
    }
    Ok(section.into_children())
}

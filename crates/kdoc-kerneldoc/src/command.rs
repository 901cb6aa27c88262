//! Command line construction for the extraction tool.

use std::path::{Path, PathBuf};

use crate::options::{KernelDocOptions, Selection};

/// Arguments always passed after the tool path.
const BASE_FLAGS: [&str; 2] = ["-rst", "-enable-lineno"];

/// A command line and the files it reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelDocCommand {
    /// Tool path followed by its arguments; the last one is the target file.
    pub args: Vec<String>,
    /// Target file followed by every file matched by export patterns.
    pub dependencies: Vec<PathBuf>,
}

impl KernelDocCommand {
    /// Target file path as passed to the tool.
    #[must_use]
    pub fn target(&self) -> &str {
        self.args.last().map_or("", String::as_str)
    }

    /// Space-joined arguments, as used in log messages.
    #[must_use]
    pub fn joined(&self) -> String {
        self.args.join(" ")
    }

    /// Shell-pasteable form of the command.
    #[must_use]
    pub fn cmd_str(&self) -> String {
        cmd_str(&self.args)
    }
}

/// Builds the tool command line for one directive.
///
/// # Example
///
/// ```
/// use kdoc_kerneldoc::{CommandBuilder, KernelDocOptions, Selection};
///
/// let options = KernelDocOptions {
///     path: "lib/list.c".to_owned(),
///     selection: Selection::Doc("List helpers".to_owned()),
///     excluded: Vec::new(),
///     tab_width: None,
/// };
/// let command = CommandBuilder::new("scripts/kernel-doc", "/src/linux").build(&options);
/// assert_eq!(
///     command.cmd_str(),
///     "scripts/kernel-doc -rst -enable-lineno -function 'List helpers' /src/linux/lib/list.c"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct CommandBuilder {
    bin: String,
    srctree: PathBuf,
}

impl CommandBuilder {
    pub fn new(bin: impl Into<String>, srctree: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            srctree: srctree.into(),
        }
    }

    #[must_use]
    pub fn build(&self, options: &KernelDocOptions) -> KernelDocCommand {
        let target = self.srctree.join(&options.path);
        let mut dependencies = vec![target.clone()];

        let mut args = vec![self.bin.clone()];
        args.extend(BASE_FLAGS.iter().map(|flag| (*flag).to_owned()));

        let mut patterns: &[String] = &[];
        match &options.selection {
            Selection::All => {}
            Selection::Export(p) => {
                args.push("-export".to_owned());
                patterns = p;
            }
            Selection::Internal(p) => {
                args.push("-internal".to_owned());
                patterns = p;
            }
            Selection::Doc(name) => {
                args.push("-function".to_owned());
                args.push(name.clone());
            }
            Selection::Identifiers(ids) if ids.is_empty() => {
                args.push("-no-doc-sections".to_owned());
            }
            Selection::Identifiers(ids) => {
                for id in ids {
                    args.push("-function".to_owned());
                    args.push(id.clone());
                }
            }
        }

        for id in &options.excluded {
            args.push("-nosymbol".to_owned());
            args.push(id.clone());
        }

        for pattern in patterns {
            for path in self.expand(pattern) {
                args.push("-export-file".to_owned());
                args.push(path.display().to_string());
                dependencies.push(path);
            }
        }

        args.push(target.display().to_string());

        KernelDocCommand { args, dependencies }
    }

    /// Files under the source tree matching `pattern`, in sorted order.
    fn expand(&self, pattern: &str) -> Vec<PathBuf> {
        let root = glob::Pattern::escape(&self.srctree.display().to_string());
        let full = Path::new(&root).join(pattern).display().to_string();

        let paths = match glob::glob(&full) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!(pattern = %full, error = %e, "Invalid export file pattern");
                return Vec::new();
            }
        };

        let mut matches: Vec<PathBuf> = paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable export file match");
                    None
                }
            })
            .collect();
        matches.sort();
        matches
    }
}

/// Render a command line that can be pasted into a shell.
///
/// Words that are empty or contain a space are wrapped in single quotes.
///
/// ```
/// use kdoc_kerneldoc::cmd_str;
///
/// assert_eq!(cmd_str(&["a", "", "b c"]), "a '' 'b c'");
/// ```
pub fn cmd_str<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|word| {
            let word = word.as_ref();
            if word.is_empty() || word.contains(' ') {
                format!("'{word}'")
            } else {
                word.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn options(selection: Selection) -> KernelDocOptions {
        KernelDocOptions {
            path: "drivers/foo.c".to_owned(),
            selection,
            excluded: Vec::new(),
            tab_width: None,
        }
    }

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_owned()).collect()
    }

    fn builder() -> CommandBuilder {
        CommandBuilder::new("kernel-doc", "/src")
    }

    #[test]
    fn test_no_selection() {
        let command = builder().build(&options(Selection::All));
        assert_eq!(
            command.args,
            strings(&["kernel-doc", "-rst", "-enable-lineno", "/src/drivers/foo.c"])
        );
        assert_eq!(command.dependencies, vec![PathBuf::from("/src/drivers/foo.c")]);
    }

    #[test]
    fn test_doc_section() {
        let command = builder().build(&options(Selection::Doc("Overview".to_owned())));
        assert_eq!(
            command.args,
            strings(&[
                "kernel-doc",
                "-rst",
                "-enable-lineno",
                "-function",
                "Overview",
                "/src/drivers/foo.c"
            ])
        );
    }

    #[test]
    fn test_identifiers() {
        let command = builder().build(&options(Selection::Identifiers(strings(&["a", "b"]))));
        assert_eq!(
            command.args,
            strings(&[
                "kernel-doc",
                "-rst",
                "-enable-lineno",
                "-function",
                "a",
                "-function",
                "b",
                "/src/drivers/foo.c"
            ])
        );
    }

    #[test]
    fn test_empty_identifiers_disable_doc_sections() {
        let command = builder().build(&options(Selection::Identifiers(Vec::new())));
        assert!(command.args.contains(&"-no-doc-sections".to_owned()));
        assert!(!command.args.contains(&"-function".to_owned()));
    }

    #[test]
    fn test_excluded_identifiers_with_mode() {
        let mut opts = options(Selection::Internal(Vec::new()));
        opts.excluded = strings(&["foo_priv"]);
        let command = builder().build(&opts);
        assert_eq!(
            command.args,
            strings(&[
                "kernel-doc",
                "-rst",
                "-enable-lineno",
                "-internal",
                "-nosymbol",
                "foo_priv",
                "/src/drivers/foo.c"
            ])
        );
    }

    #[test]
    fn test_export_files_sorted_and_recorded() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("include")).unwrap();
        fs::write(dir.path().join("include/b.h"), "").unwrap();
        fs::write(dir.path().join("include/a.h"), "").unwrap();
        fs::write(dir.path().join("include/c.txt"), "").unwrap();

        let builder = CommandBuilder::new("kernel-doc", dir.path());
        let command = builder.build(&options(Selection::Export(strings(&["include/*.h"]))));

        let a = dir.path().join("include/a.h");
        let b = dir.path().join("include/b.h");
        let target = dir.path().join("drivers/foo.c");
        assert_eq!(
            command.args,
            vec![
                "kernel-doc".to_owned(),
                "-rst".to_owned(),
                "-enable-lineno".to_owned(),
                "-export".to_owned(),
                "-export-file".to_owned(),
                a.display().to_string(),
                "-export-file".to_owned(),
                b.display().to_string(),
                target.display().to_string(),
            ]
        );
        assert_eq!(command.dependencies, vec![target, a, b]);
    }

    #[test]
    fn test_unmatched_export_pattern() {
        let dir = TempDir::new().unwrap();
        let builder = CommandBuilder::new("kernel-doc", dir.path());
        let command = builder.build(&options(Selection::Export(strings(&["nothing/*.h"]))));

        assert!(!command.args.contains(&"-export-file".to_owned()));
        assert_eq!(command.dependencies.len(), 1);
    }

    #[test]
    fn test_invalid_pattern_ignored() {
        let dir = TempDir::new().unwrap();
        let builder = CommandBuilder::new("kernel-doc", dir.path());
        let command = builder.build(&options(Selection::Export(strings(&["[*.h"]))));
        assert!(!command.args.contains(&"-export-file".to_owned()));
    }

    #[test]
    fn test_target_is_last() {
        for selection in [
            Selection::All,
            Selection::Export(Vec::new()),
            Selection::Doc("x".to_owned()),
            Selection::Identifiers(Vec::new()),
        ] {
            let command = builder().build(&options(selection));
            assert_eq!(command.target(), "/src/drivers/foo.c");
        }
    }

    #[test]
    fn test_cmd_str_quotes_words() {
        let command = builder().build(&options(Selection::Doc("Driver overview".to_owned())));
        assert_eq!(
            command.cmd_str(),
            "kernel-doc -rst -enable-lineno -function 'Driver overview' /src/drivers/foo.c"
        );
        assert_eq!(
            command.joined(),
            "kernel-doc -rst -enable-lineno -function Driver overview /src/drivers/foo.c"
        );
    }
}

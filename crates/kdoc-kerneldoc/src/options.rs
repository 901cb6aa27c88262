//! Directive options.
//!
//! Options are validated once, when the directive block is parsed, into a
//! closed [`KernelDocOptions`] value. Everything later works on that value
//! rather than on raw option strings.

use kdoc_renderer::directive::{DirectiveArgs, DirectiveError};

/// Option names accepted by the directive.
pub const KNOWN_OPTIONS: &[&str] = &[
    "doc",
    "export",
    "internal",
    "identifiers",
    "no-identifiers",
    "functions",
    "tab-width",
];

/// What part of the target file to extract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Everything in the file.
    All,
    /// Exported symbols. Patterns name further files holding export markers.
    Export(Vec<String>),
    /// Symbols that are not exported. Patterns as for [`Selection::Export`].
    Internal(Vec<String>),
    /// A named `DOC:` section.
    Doc(String),
    /// Named identifiers. An empty list selects no documentation sections.
    Identifiers(Vec<String>),
}

/// Validated options of one `kernel-doc` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelDocOptions {
    /// Target path relative to the source tree root.
    pub path: String,
    pub selection: Selection,
    /// Identifiers excluded from the output whatever the selection.
    pub excluded: Vec<String>,
    /// Tab width for the tool's output; the document setting when unset.
    pub tab_width: Option<usize>,
}

/// Invalid directive options.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("1 argument(s) required, {0} supplied")]
    ArgumentCount(usize),
    #[error("unknown option: \"{0}\"")]
    Unknown(String),
    #[error("invalid option value: (option: \"doc\"; value: None) argument required but none supplied")]
    EmptyDoc,
    #[error("invalid option value: (option: \"tab-width\"; value: {0:?}) expected a positive integer")]
    TabWidth(String),
}

impl From<OptionError> for DirectiveError {
    fn from(err: OptionError) -> Self {
        match err {
            OptionError::ArgumentCount(_) => Self::arguments(err.to_string()),
            _ => Self::option(err.to_string()),
        }
    }
}

impl KernelDocOptions {
    /// Validate a parsed directive block.
    ///
    /// Exactly one argument is required. Of `export`, `internal`, `doc` and
    /// `identifiers` the first present in that order decides the selection;
    /// `functions` is an alias of `identifiers` and wins over it.
    pub fn from_args(args: &DirectiveArgs) -> Result<Self, OptionError> {
        let [path] = args.arguments.as_slice() else {
            return Err(OptionError::ArgumentCount(args.arguments.len()));
        };

        if let Some((name, _)) = args
            .options
            .iter()
            .find(|(name, _)| !KNOWN_OPTIONS.contains(&name.as_str()))
        {
            return Err(OptionError::Unknown(name.clone()));
        }

        let identifiers = args.get("functions").or_else(|| args.get("identifiers"));

        let selection = if let Some(value) = args.get("export") {
            Selection::Export(split_words(value))
        } else if let Some(value) = args.get("internal") {
            Selection::Internal(split_words(value))
        } else if let Some(value) = args.get("doc") {
            let doc = value.trim();
            if doc.is_empty() {
                return Err(OptionError::EmptyDoc);
            }
            Selection::Doc(doc.to_owned())
        } else if let Some(value) = identifiers {
            Selection::Identifiers(split_words(value))
        } else {
            Selection::All
        };

        let excluded = args.get("no-identifiers").map(split_words).unwrap_or_default();

        let tab_width = args
            .get("tab-width")
            .map(|value| match value.trim().parse::<usize>() {
                Ok(width) if width > 0 => Ok(width),
                _ => Err(OptionError::TabWidth(value.to_owned())),
            })
            .transpose()?;

        Ok(Self {
            path: path.clone(),
            selection,
            excluded,
            tab_width,
        })
    }
}

/// Split an option value into words, dropping line-continuation backslashes
/// and words that end up empty.
pub(crate) fn split_words(value: &str) -> Vec<String> {
    value
        .split_whitespace()
        .map(|word| word.trim_end_matches('\\').trim())
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}

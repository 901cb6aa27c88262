//! Directive arguments.

use crate::node::SourceLocation;
use crate::source::StringList;

/// Parsed pieces of one directive block.
///
/// For the block
///
/// ```text
/// .. kernel-doc:: drivers/foo.c
///    :identifiers: foo_init \
///                  foo_exit
/// ```
///
/// `arguments` is `["drivers/foo.c"]` and the `identifiers` option holds
/// `"foo_init \\\nfoo_exit"`: continuation lines are joined with a newline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Directive name.
    pub name: String,
    /// Whitespace-separated words after `::`.
    pub arguments: Vec<String>,
    /// Options in order of appearance. Options without a value map to `""`.
    pub options: Vec<(String, String)>,
    /// Directive content with original attribution.
    pub content: StringList,
    /// One-based line of the directive marker.
    pub lineno: usize,
    /// Location of the directive marker.
    pub location: Option<SourceLocation>,
}

impl DirectiveArgs {
    /// Value of the first option named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether an option was given, with or without a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.options.iter().any(|(k, _)| k == key)
    }

    /// Positional argument at `index`.
    #[must_use]
    pub fn argument(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> DirectiveArgs {
        DirectiveArgs {
            name: "kernel-doc".to_owned(),
            arguments: vec!["drivers/foo.c".to_owned()],
            options: vec![
                ("export".to_owned(), String::new()),
                ("doc".to_owned(), "Overview".to_owned()),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_get() {
        let args = args();
        assert_eq!(args.get("doc"), Some("Overview"));
        assert_eq!(args.get("export"), Some(""));
        assert_eq!(args.get("internal"), None);
    }

    #[test]
    fn test_contains() {
        let args = args();
        assert!(args.contains("export"));
        assert!(!args.contains("internal"));
    }

    #[test]
    fn test_argument() {
        let args = args();
        assert_eq!(args.argument(0), Some("drivers/foo.c"));
        assert_eq!(args.argument(1), None);
    }
}

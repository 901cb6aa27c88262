//! Source document discovery.

use std::fs;
use std::path::{Path, PathBuf};

use kdoc_renderer::SOURCE_SUFFIX;

/// A source document found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Path relative to the source directory without suffix, `/`-separated.
    pub docname: String,
    pub path: PathBuf,
}

/// Walk `source_dir` and collect `.rst` documents in sorted order.
///
/// Hidden files and directories are skipped. A missing directory yields no
/// documents.
pub(crate) fn scan(source_dir: &Path) -> Vec<DocumentRef> {
    let mut refs = Vec::new();
    if source_dir.exists() {
        scan_directory(source_dir, "", &mut refs);
    }
    refs.sort_by(|a, b| a.docname.cmp(&b.docname));
    refs
}

fn scan_directory(dir_path: &Path, prefix: &str, refs: &mut Vec<DocumentRef>) {
    let Ok(entries) = fs::read_dir(dir_path) else {
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        let child = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };

        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            scan_directory(&path, &child, refs);
        } else if let Some(docname) = child.strip_suffix(SOURCE_SUFFIX) {
            refs.push(DocumentRef {
                docname: docname.to_owned(),
                path,
            });
        }
    }
}

/// Document name of `path` relative to `source_dir`, if it is a source file
/// inside it.
pub(crate) fn docname_for(source_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(source_dir).ok()?;
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    joined.strip_suffix(SOURCE_SUFFIX).map(str::to_owned)
}

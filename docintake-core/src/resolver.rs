//! Type and path resolution for document descriptors.

use crate::types::DocumentTag;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

/// Environment variable naming the default root for relative descriptor paths.
pub const WORKSPACE_ROOT_ENV: &str = "DOCINTAKE_WORKSPACE_ROOT";

// Read once per process; later changes to the environment are not observed.
static ENV_WORKSPACE_ROOT: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    std::env::var(WORKSPACE_ROOT_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| PathBuf::from(v.replace('\\', "/")))
});

const EXTENSION_TAGS: &[(&str, DocumentTag)] = &[
    ("txt", DocumentTag::Text),
    ("text", DocumentTag::Text),
    ("log", DocumentTag::Text),
    ("md", DocumentTag::Text),
    ("pdf", DocumentTag::Pdf),
    ("docx", DocumentTag::Docx),
    ("doc", DocumentTag::Doc),
    ("xlsx", DocumentTag::Spreadsheet),
    ("xls", DocumentTag::Spreadsheet),
];

/// Resolve the format tag for a document.
///
/// A hint naming a supported tag (case-insensitive) wins; otherwise the file
/// extension decides. `None` means the document is unsupported.
pub fn resolve_tag(type_hint: Option<&str>, path: &Path) -> Option<DocumentTag> {
    if let Some(tag) = type_hint.and_then(parse_tag) {
        return Some(tag);
    }

    let extension = path.extension()?.to_str()?.to_lowercase();
    EXTENSION_TAGS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, tag)| *tag)
}

/// Parse a tag name, ignoring case and surrounding whitespace.
pub fn parse_tag(name: &str) -> Option<DocumentTag> {
    let name = name.trim().to_lowercase();
    DocumentTag::ALL
        .iter()
        .copied()
        .find(|tag| tag.as_str() == name)
}

/// Workspace root used for relative paths: explicit root, then the
/// environment default, then the current directory.
pub fn workspace_root(explicit: Option<&Path>) -> PathBuf {
    pick_root(explicit, ENV_WORKSPACE_ROOT.as_deref(), || {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    })
}

fn pick_root<F>(explicit: Option<&Path>, env_default: Option<&Path>, current_dir: F) -> PathBuf
where
    F: FnOnce() -> PathBuf,
{
    explicit
        .or(env_default)
        .map(Path::to_path_buf)
        .unwrap_or_else(current_dir)
}

/// Resolve a descriptor path to an absolute, lexically normalized path.
///
/// Backslashes are treated as separators. Relative paths are joined onto
/// `workspace_root(explicit_root)`; a relative root is itself anchored at the
/// current directory.
pub fn resolve_path(raw: &str, explicit_root: Option<&Path>) -> PathBuf {
    let raw = PathBuf::from(raw.trim().replace('\\', "/"));
    let joined = if raw.is_absolute() {
        raw
    } else {
        let root = workspace_root(explicit_root);
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("/"))
                .join(root)
        };
        root.join(raw)
    };
    normalize_lexically(&joined)
}

/// Render a path with forward-slash separators.
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, matching how `/..` resolves.
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

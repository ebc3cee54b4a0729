use std::path::{Path, PathBuf};

pub const PREVIEW_TRUNCATION_MARKER: &str = " …";

/// Location of the snippet `id` inside `directory`. Computed on demand so that
/// callers always see the current layout rather than whatever was indexed.
#[inline]
pub fn snippet_path(directory: &Path, id: &str, extension: &str) -> PathBuf {
    directory.join(format!("{id}.{extension}"))
}

/// Snippet id of `path`, or `None` when the file does not carry the snippet
/// extension. Only the last extension counts: `a.b.txt` has the id `a.b`.
pub fn snippet_id(path: &Path, extension: &str) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if ext != extension {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() {
        return None;
    }

    Some(stem.to_string())
}

#[inline]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

pub fn make_preview(content: &str, max_chars: usize) -> String {
    let mut preview = content.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some((cut, _)) = preview.char_indices().nth(max_chars) {
        preview.truncate(cut);
        preview.push_str(PREVIEW_TRUNCATION_MARKER);
    }

    preview
}

//! Path manipulation utilities for hierarchical URL inheritance

/// Append child path segments onto a parent URL or path and normalize the
/// result.
///
/// When `append` is true the result starts from
/// `parent/{adjustment}/{child}` (each part only if present); when false the
/// parent is normalized unchanged. A leading scheme such as `https://` and a
/// leading `/` are preserved; `.`, `..` and empty segments are collapsed.
///
/// This mirrors conventional hierarchical site-URL derivation: a module
/// without its own URL lives under its parent's URL at a path named after
/// the module.
pub fn append_path(
    parent_path: &str,
    child_path: Option<&str>,
    path_adjustment: Option<&str>,
    append: bool,
) -> String {
    let mut unclean = parent_path.to_string();

    if append {
        if let Some(adjustment) = path_adjustment {
            unclean.push('/');
            unclean.push_str(adjustment);
        }
        if let Some(child) = child_path {
            unclean.push('/');
            unclean.push_str(child);
        }
    }

    normalize_path(&unclean)
}

/// Normalize a path, collapsing empty, `.` and `..` segments while
/// preserving a leading `proto://` scheme and a leading root `/`.
///
/// Normalization is idempotent: normalizing an already-normalized path
/// returns it unchanged. Extra `..` segments that would climb above the
/// root are dropped.
pub fn normalize_path(path: &str) -> String {
    let mut prefix = String::new();
    let mut rest = path;

    if let Some(idx) = rest.find("://") {
        prefix.push_str(&rest[..idx + 3]);
        rest = &rest[idx + 3..];
    }

    if rest.starts_with('/') {
        prefix.push('/');
    }

    let mut segments: Vec<&str> = Vec::new();
    for token in rest.split('/') {
        match token {
            // Empty path entry ("...//..") and no-op entries, remove.
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(token),
        }
    }

    prefix + &segments.join("/")
}

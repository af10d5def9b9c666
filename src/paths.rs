//! Path utilities: normalization, parent/filename splitting, marshalling, ancestor walks.
//!
//! A "path" here is always relative to the implicit root `/` of a filesystem namespace and
//! always starts with `/`. Directory paths end in `/`; file paths never do.

use uuid::Uuid;

/// Join `parent` and `filename` with a single `/`, collapsing duplicate separators.
pub fn normalize(parent: &str, filename: &str) -> String {
    let mut out = String::with_capacity(parent.len() + filename.len() + 1);
    out.push_str(parent.trim_end_matches('/'));
    out.push('/');
    out.push_str(filename.trim_start_matches('/'));
    collapse_slashes(&out)
}

fn collapse_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_slash = false;
    for c in s.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    if out.len() > 1 && out.ends_with('/') && !s.ends_with('/') {
        out.pop();
    }
    out
}

/// Everything up to and including the last `/` before the final component; `/` for top-level
/// entries. Operates on the path stripped of any trailing directory slash.
pub fn parent_path(p: &str) -> Option<String> {
    let trimmed = strip_trailing_slash(p);
    if trimmed.is_empty() || trimmed == "/" {
        return None;
    }
    let idx = trimmed.rfind('/')?;
    Some(trimmed[..=idx].to_string())
}

/// Final path component. For directory paths ending in `/`, the trailing `/` is preserved.
pub fn filename(p: &str) -> Option<String> {
    if p.is_empty() {
        return None;
    }
    let is_dir = p.ends_with('/');
    let trimmed = strip_trailing_slash(p);
    if trimmed.is_empty() {
        return None;
    }
    let idx = trimmed.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &trimmed[idx..];
    if name.is_empty() {
        return None;
    }
    Some(if is_dir {
        format!("{name}/")
    } else {
        name.to_string()
    })
}

fn strip_trailing_slash(p: &str) -> &str {
    if p.len() > 1 && p.ends_with('/') {
        &p[..p.len() - 1]
    } else {
        p
    }
}

/// Ensure a trailing `/`; used as the prefix/equality key for child-listing queries.
pub fn normalize_parent_path(p: &str) -> String {
    if p.ends_with('/') {
        p.to_string()
    } else {
        format!("{p}/")
    }
}

/// Stable string joining `filesystem` and `path`, stored as a reverse-map set element.
/// Round-trips via [`unmarshall`].
pub fn marshall(filesystem: &str, path: &str) -> String {
    format!("{filesystem}:{path}")
}

/// Inverse of [`marshall`]. `filesystem` names must not contain `:` for this to round-trip,
/// which holds for every filesystem tag this index accepts (see [`is_valid_filesystem`]).
pub fn unmarshall(marshalled: &str) -> Option<(String, String)> {
    let idx = marshalled.find(':')?;
    Some((
        marshalled[..idx].to_string(),
        marshalled[idx + 1..].to_string(),
    ))
}

/// Filesystem tags are plain identifiers: no `:` (the marshall separator) and non-empty.
pub fn is_valid_filesystem(fs: &str) -> bool {
    !fs.is_empty() && !fs.contains(':')
}

/// Ordered ancestor directory paths from `path`'s immediate parent up to (not including) root,
/// nearest-first. `path` may itself be a directory or file path.
pub fn parents_bottom_up(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = strip_trailing_slash(path).to_string();
    loop {
        let Some(parent) = parent_path(&cur) else {
            break;
        };
        if parent == "/" {
            break;
        }
        out.push(parent.clone());
        cur = parent;
    }
    out
}

/// An opaque blob-id token. The first 4 characters double as a two-level sharding prefix for
/// the physical store (out of scope here, but the shape is part of this index's contract).
pub fn random_file_id() -> String {
    Uuid::new_v4().simple().to_string()
}

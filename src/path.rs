//! Property-path parsing and endpoint resolution (v0.1)
//!
//! Paths are dot-separated field chains ("account.owner.name"). Resolution
//! walks object links and yields the (tail object, last key) pair a binding
//! endpoint needs.
//!
//! A path that cannot be walked yet (a root segment that is not defined,
//! or an intermediate property that is not an object) resolves to `None`
//! rather than erroring, and is retried lazily on next use.

use crate::error::TetherError;
use crate::object::Object;
use crate::value::Value;

/// Validate a path and split it into field segments.
pub fn parse(path: &str) -> Result<Vec<&str>, TetherError> {
    if path.is_empty() {
        return Err(TetherError::InvalidPath {
            path: path.to_string(),
            reason: "cannot be empty".to_string(),
        });
    }

    let mut segments = Vec::new();
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(TetherError::InvalidPath {
                path: path.to_string(),
                reason: "empty segment".to_string(),
            });
        }
        segments.push(segment);
    }
    Ok(segments)
}

/// Resolve a path against a root object into a (target, key) endpoint.
///
/// `None` means not yet resolvable; the caller retries on next use.
pub fn resolve(root: &Object, path: &str) -> Option<(Object, String)> {
    if path.is_empty() {
        return None;
    }

    let segments: Vec<&str> = path.split('.').collect();
    let (last, walk) = segments.split_last()?;

    let mut current = root.clone();
    for segment in walk {
        match current.get(segment) {
            Value::Object(child) => current = child,
            _ => return None,
        }
    }
    Some((current, (*last).to_string()))
}

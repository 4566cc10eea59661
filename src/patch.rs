//! `--set key.path=value` overrides merged over a JSON document before it is
//! decoded into the typed model.

use crate::error::{CliError, Result};
use serde_json::{Map, Value};

/// Merge `overrides` over the JSON document in `base`.
///
/// Every override is validated before `base` is parsed, so a malformed
/// `--set` fails even when the base document is not JSON. With no overrides
/// `base` is returned untouched.
pub fn merge(base: &[u8], overrides: &[String]) -> Result<Vec<u8>> {
    if overrides.is_empty() {
        return Ok(base.to_vec());
    }

    let mut accumulator = Value::Object(Map::new());
    for item in overrides {
        let (path, value) = parse_override(item)?;
        deep_merge(&mut accumulator, leaf_tree(&path, value));
    }

    let mut document: Value = serde_json::from_slice(base)?;
    deep_merge(&mut document, accumulator);
    Ok(serde_json::to_vec(&document)?)
}

/// Split `key.keypart=value` into its path segments and value. The value is
/// always the literal string.
fn parse_override(item: &str) -> Result<(Vec<String>, Value)> {
    let mut splits = item.split('=');
    let (key, raw) = match (splits.next(), splits.next(), splits.next()) {
        (Some(key), Some(raw), None) => (key, raw),
        _ => return Err(CliError::MalformedOverride(item.to_string())),
    };
    if key.is_empty() {
        return Err(CliError::MalformedOverride(item.to_string()));
    }

    Ok((split_path(key), Value::String(raw.to_string())))
}

/// Split on `.`; `\.` keeps a literal dot inside a segment, which the offer
/// schema needs for keys like `microsoft-azure-marketplace.title`.
fn split_path(key: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'.') => {
                current.push('.');
                chars.next();
            }
            '.' => segments.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// `["a", "b"]` + `v` => `{"a": {"b": v}}`
fn leaf_tree(path: &[String], value: Value) -> Value {
    path.iter().rev().fold(value, |inner, segment| {
        let mut map = Map::new();
        map.insert(segment.clone(), inner);
        Value::Object(map)
    })
}

/// Objects recurse; anything else is replaced by the overlay.
fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

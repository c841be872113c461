//! Golden JSON files for deterministic tests.
//!
//! A golden is the canonical rendering of a value: keys sorted at every
//! depth, two-space indent, one trailing newline. Setting
//! `SMELTERY_UPDATE_SNAPSHOTS` to `1`, `true` or `yes` regenerates goldens
//! instead of checking them.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Environment variable that switches snapshot assertions to regeneration.
pub const UPDATE_SNAPSHOTS_ENV: &str = "SMELTERY_UPDATE_SNAPSHOTS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GoldenMode {
    Check,
    Regenerate,
}

impl GoldenMode {
    fn from_env() -> Self {
        match std::env::var(UPDATE_SNAPSHOTS_ENV).as_deref() {
            Ok("1" | "true" | "yes") => GoldenMode::Regenerate,
            _ => GoldenMode::Check,
        }
    }
}

/// Compare `value` with the golden at `path`, or rewrite the golden when
/// regeneration is enabled.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let rendered = canonical_json(value)?;
    match GoldenMode::from_env() {
        GoldenMode::Check => check_golden(path, &rendered),
        GoldenMode::Regenerate => regenerate_golden(path, &rendered),
    }
}

fn check_golden(path: &Path, rendered: &str) -> Result<()> {
    let golden = fs::read_to_string(path).with_context(|| {
        format!(
            "no golden at {} ({UPDATE_SNAPSHOTS_ENV}=1 creates it)",
            path.display()
        )
    })?;
    if golden == rendered {
        return Ok(());
    }

    let line = first_difference(&golden, rendered);
    let at = |text: &str| text.lines().nth(line - 1).unwrap_or("<end of file>").to_string();
    bail!(
        "{} differs from its golden at line {line}: expected {:?}, got {:?} ({UPDATE_SNAPSHOTS_ENV}=1 regenerates it)",
        path.display(),
        at(&golden),
        at(rendered),
    )
}

fn regenerate_golden(path: &Path, rendered: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("cannot create golden directory {}", dir.display()))?;
    }
    fs::write(path, rendered).with_context(|| format!("cannot write golden {}", path.display()))?;
    info!(path = %path.display(), "golden regenerated");
    Ok(())
}

/// 1-based line of the first difference.
fn first_difference(expected: &str, actual: &str) -> usize {
    expected
        .lines()
        .zip(actual.lines())
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected.lines().count().min(actual.lines().count()))
        + 1
}

/// Render `value` the way goldens are stored.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let tree = serde_json::to_value(value).context("value does not serialize to JSON")?;
    let mut text = serde_json::to_string_pretty(&sorted(tree)).context("cannot render golden JSON")?;
    text.push('\n');
    Ok(text)
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<String, Value> = map.into_iter().map(|(k, v)| (k, sorted(v))).collect();
            Value::Object(ordered.into_iter().collect())
        }
        Value::Array(items) => items.into_iter().map(sorted).collect(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn canonical_json_sorts_keys_and_ends_with_newline() {
        let text = canonical_json(&json!({ "b": 1, "a": { "d": [2], "c": 3 } })).unwrap();
        assert_eq!(
            text,
            "{\n  \"a\": {\n    \"c\": 3,\n    \"d\": [\n      2\n    ]\n  },\n  \"b\": 1\n}\n"
        );
    }

    #[test]
    fn first_difference_reports_line() {
        assert_eq!(first_difference("a\nb\nc", "a\nx\nc"), 2);
        assert_eq!(first_difference("a\nb", "a\nb\nc"), 3);
    }

    #[test]
    fn check_names_the_differing_line() {
        let stamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        let path = std::env::temp_dir()
            .join(format!("smeltery_golden_{stamp}"))
            .join("counter.json");

        let golden = canonical_json(&json!({ "count": 1, "name": "kiln" })).unwrap();
        regenerate_golden(&path, &golden).unwrap();
        check_golden(&path, &golden).unwrap();

        let changed = canonical_json(&json!({ "count": 2, "name": "kiln" })).unwrap();
        let err = check_golden(&path, &changed).unwrap_err().to_string();
        assert!(err.contains("line 2"), "{err}");
        assert!(err.contains("\\\"count\\\": 2"), "{err}");

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}

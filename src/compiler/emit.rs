//! Writing a compiled unit's parts to disk.
//!
//! | Part       | Destination            | Skipped when            |
//! |------------|------------------------|-------------------------|
//! | `code`     | `paths.code`           | absent or empty         |
//! | `style`    | `paths.css`            | absent or empty         |
//! | `config`   | `paths.json`           | absent or falsy         |
//! | `template` | `paths.template`       | absent or empty         |
//! | `assets`   | `assets_dir/<key>`     | never                   |
//!
//! A falsy config is `null`, `false`, `0` or `""`, as in a JavaScript
//! `if (config)` test. Empty objects and arrays are written. The source map
//! is not written.

use super::error::{BuildError, BuildResult};
use super::paths::OutputPathSet;
use super::unit::CompiledUnit;
use serde_json::Value;
use std::{fs, path::Path};

/// Write every present part of `unit` to its destination.
pub fn emit(unit: &CompiledUnit, paths: &OutputPathSet) -> BuildResult<()> {
    write_text(&paths.code, unit.code.as_deref())?;
    write_text(&paths.css, unit.style.as_deref())?;
    write_text(&paths.template, unit.template.as_deref())?;

    if let Some(config) = unit.config.as_ref().filter(|c| !is_falsy(c)) {
        let mut json = serde_json::to_string_pretty(config)
            .map_err(|err| BuildError::compile(&paths.json, err.to_string()))?;
        json.push('\n');
        write_file_with_dir_check(&paths.json, json.as_bytes())?;
    }

    // Later keys overwrite earlier ones
    for (name, value) in &unit.assets {
        let path = paths.assets_dir.join(name);
        match value {
            Value::String(content) => write_file_with_dir_check(&path, content.as_bytes())?,
            other => {
                let content = serde_json::to_vec(other)
                    .map_err(|err| BuildError::compile(&path, err.to_string()))?;
                write_file_with_dir_check(&path, &content)?;
            }
        }
    }

    Ok(())
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn write_text(path: &Path, content: Option<&str>) -> BuildResult<()> {
    match content {
        Some(content) if !content.is_empty() => write_file_with_dir_check(path, content.as_bytes()),
        _ => Ok(()),
    }
}

/// Write `content` to `path`, creating missing parent directories.
pub fn write_file_with_dir_check(path: &Path, content: &[u8]) -> BuildResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
    }
    fs::write(path, content).map_err(BuildError::io(path))
}

/// Copy a file byte for byte, creating missing parent directories.
pub fn copy_file_with_dir_check(from: &Path, to: &Path) -> BuildResult<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
    }
    fs::copy(from, to).map_err(BuildError::io(from))?;
    Ok(())
}

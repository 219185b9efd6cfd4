//! File processing logic for shortarray

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use shortarray_core::{convert_with, Strictness};

use crate::output::EditInfo;

const EDIT_MESSAGE: &str = "Replace array() with [] (short array syntax)";

/// Result of converting a single lexer dump
pub struct ProcessResult {
    /// Constructions that were rewritten
    pub edits: Vec<EditInfo>,
    /// Source text reassembled from the input tokens
    pub old_source: String,
    /// Source text after conversion
    pub new_source: String,
}

/// Convert lexer JSON output held in memory
pub fn process_source(json: &str, strictness: Strictness) -> Result<ProcessResult> {
    let conversion = convert_with(json, strictness)?;

    let edits = conversion
        .occurrences()
        .iter()
        .map(|occurrence| {
            let location = occurrence.location(&conversion.tokens);
            EditInfo {
                line: location.line,
                column: location.column,
                message: EDIT_MESSAGE.to_string(),
            }
        })
        .collect();

    Ok(ProcessResult {
        edits,
        old_source: conversion.original(),
        new_source: conversion.rewrite.text,
    })
}

/// Read and convert a single lexer dump
pub fn process_file(path: &Path, strictness: Strictness) -> Result<ProcessResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    process_source(&json, strictness)
        .with_context(|| format!("Failed to convert {}", path.display()))
}

/// Where the converted source of a lexer dump is written
///
/// `foo.php.json` becomes `foo.php`; a dump with no extension left after
/// dropping its own gets `extension` appended (`foo.json` becomes `foo.php`).
/// A target that would overwrite the dump itself is an error.
pub fn output_path(input: &Path, out_dir: Option<&Path>, extension: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();

    let mut name = PathBuf::from(stem);
    if name.extension().is_none() {
        name.set_extension(extension);
    }

    let target = match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    };

    if is_same_file(&target, input) {
        bail!(
            "Refusing to overwrite {} with its converted source",
            input.display()
        );
    }

    Ok(target)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Write the converted source to the file
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

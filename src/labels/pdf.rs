// ABOUTME: PDF label rendering by compiling a generated Typst document
// ABOUTME: Runs the external typst binary in a per-request temp directory with a timeout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # PDF labels
//!
//! The Typst source is generated from [`LabelData`]; user text only ever
//! appears inside Typst string literals.

use std::env;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use nutrilog_core::errors::{AppError, AppResult};
use tokio::fs;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use super::LabelData;
use crate::config::LabelConfig;

const SERVICE_NAME: &str = "typst";

/// Quote text as a Typst string literal
#[must_use]
pub fn typst_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' | '\r' => quoted.push(' '),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// Typst source for the label
#[must_use]
pub fn label_document(data: &LabelData) -> String {
    let mut doc = String::new();
    doc.push_str("#set page(width: 3.2in, height: auto, margin: 0.15in)\n");
    doc.push_str("#set text(font: (\"Helvetica\", \"Arial\", \"Liberation Sans\"), size: 8pt)\n");
    doc.push_str("#let bar(h) = line(length: 100%, stroke: h)\n");
    doc.push_str("#block(stroke: 1pt, inset: 4pt, width: 100%)[\n");
    doc.push_str("  #text(size: 22pt, weight: \"black\")[Nutrition Facts]\n\n");
    let _ = writeln!(doc, "  #text({})\n", typst_string(&data.title));
    if let Some(servings) = data.servings {
        let _ = writeln!(doc, "  #text(\"{servings} servings per container\")\n");
    }
    let _ = writeln!(
        doc,
        "  #grid(columns: (1fr, auto), text(weight: \"bold\")[Serving size], text(weight: \"bold\")[{}g])",
        data.serving_size_g.round()
    );
    doc.push_str("  #bar(6pt)\n");
    let _ = writeln!(
        doc,
        "  #grid(columns: (1fr, auto), text(size: 14pt, weight: \"black\")[Calories], text(size: 18pt, weight: \"black\")[{}])",
        data.calories()
    );
    doc.push_str("  #bar(3pt)\n");
    doc.push_str("  #align(right)[#text(weight: \"bold\")[% Daily Value\\*]]\n");
    doc.push_str("  #table(columns: (1fr, auto), stroke: (x: none, y: 0.5pt), inset: 2pt,\n");
    for row in data.rows() {
        let name = if row.indented {
            format!("h(1em) + text({})", typst_string(row.label))
        } else {
            format!("text(weight: \"bold\", {})", typst_string(row.label))
        };
        let percent = row
            .daily_value_percent
            .map(|p| format!("text(weight: \"bold\", \"{p}%\")"))
            .unwrap_or_else(|| "[]".to_owned());
        let _ = writeln!(
            doc,
            "    [#({name}) #text({})], [#{percent}],",
            typst_string(&row.amount)
        );
    }
    doc.push_str("  )\n");
    doc.push_str("  #text(size: 6pt)[\\* The % Daily Value tells you how much a nutrient in a serving contributes to a daily diet.]\n");
    doc.push_str("]\n");
    doc
}

/// Render the label to PDF bytes with the configured Typst binary
///
/// # Errors
///
/// Returns `EXTERNAL_SERVICE_ERROR` if the binary is missing, fails, or exceeds the timeout
pub async fn render_label_pdf(data: &LabelData, config: &LabelConfig) -> AppResult<Vec<u8>> {
    let work_dir = env::temp_dir().join(format!("nutrilog-label-{}", Uuid::new_v4()));
    fs::create_dir_all(&work_dir)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create label directory: {e}")))?;

    let result = compile_in(&work_dir, data, config).await;

    if let Err(e) = fs::remove_dir_all(&work_dir).await {
        warn!(dir = %work_dir.display(), error = %e, "Failed to remove label directory");
    }
    result
}

async fn compile_in(work_dir: &Path, data: &LabelData, config: &LabelConfig) -> AppResult<Vec<u8>> {
    let source: PathBuf = work_dir.join("label.typ");
    let output: PathBuf = work_dir.join("label.pdf");
    fs::write(&source, label_document(data))
        .await
        .map_err(|e| AppError::internal(format!("Failed to write label source: {e}")))?;

    let child = Command::new(&config.typst_bin)
        .arg("compile")
        .arg(&source)
        .arg(&output)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("Failed to start {}: {e}", config.typst_bin))
        })?;

    let finished = timeout(config.render_timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            AppError::external_service(
                SERVICE_NAME,
                format!("Label rendering timed out after {}s", config.render_timeout.as_secs()),
            )
        })?
        .map_err(|e| AppError::external_service(SERVICE_NAME, format!("Label rendering failed: {e}")))?;

    if !finished.status.success() {
        let stderr = String::from_utf8_lossy(&finished.stderr);
        return Err(AppError::external_service(
            SERVICE_NAME,
            format!("typst exited with {}: {}", finished.status, stderr.trim()),
        ));
    }

    let bytes = fs::read(&output)
        .await
        .map_err(|e| AppError::external_service(SERVICE_NAME, format!("No PDF produced: {e}")))?;
    debug!(bytes = bytes.len(), "Label PDF rendered");
    Ok(bytes)
}

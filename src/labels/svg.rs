// ABOUTME: FDA-style Nutrition Facts panel rendered as a standalone SVG document
// ABOUTME: Fixed-width layout with escaped text and %DV column
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::Write;

use super::LabelData;

const WIDTH: u32 = 300;
const MARGIN: u32 = 10;
const ROW_HEIGHT: u32 = 22;

/// Escape text for use in XML content and attributes
#[must_use]
pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render the label as an SVG document
#[must_use]
pub fn render_label_svg(data: &LabelData) -> String {
    let rows = data.rows();
    let header_height = 150;
    let height = header_height + ROW_HEIGHT * rows.len() as u32 + 30;
    let right = WIDTH - MARGIN;
    let mut y = 0;

    let mut svg = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" font-family="Helvetica, Arial, sans-serif">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect x="1" y="1" width="{}" height="{}" fill="white" stroke="black" stroke-width="2"/>"#,
        WIDTH - 2,
        height - 2
    );

    y += 38;
    let _ = writeln!(
        svg,
        r#"<text x="{MARGIN}" y="{y}" font-size="30" font-weight="900">Nutrition Facts</text>"#
    );
    y += 20;
    let _ = writeln!(
        svg,
        r#"<text x="{MARGIN}" y="{y}" font-size="13">{}</text>"#,
        xml_escape(&data.title)
    );
    if let Some(servings) = data.servings {
        y += 18;
        let plural = if servings == 1 { "" } else { "s" };
        let _ = writeln!(
            svg,
            r#"<text x="{MARGIN}" y="{y}" font-size="13">{servings} serving{plural} per container</text>"#
        );
    }
    y += 20;
    let _ = writeln!(
        svg,
        r#"<text x="{MARGIN}" y="{y}" font-size="14" font-weight="bold">Serving size</text><text x="{right}" y="{y}" font-size="14" font-weight="bold" text-anchor="end">{}g</text>"#,
        data.serving_size_g.round()
    );
    y += 8;
    let _ = writeln!(
        svg,
        r#"<rect x="{MARGIN}" y="{y}" width="{}" height="8" fill="black"/>"#,
        WIDTH - 2 * MARGIN
    );
    y += 34;
    let _ = writeln!(
        svg,
        r#"<text x="{MARGIN}" y="{y}" font-size="22" font-weight="900">Calories</text><text x="{right}" y="{y}" font-size="28" font-weight="900" text-anchor="end">{}</text>"#,
        data.calories()
    );
    y += 8;
    let _ = writeln!(
        svg,
        r#"<rect x="{MARGIN}" y="{y}" width="{}" height="4" fill="black"/>"#,
        WIDTH - 2 * MARGIN
    );
    y += 16;
    let _ = writeln!(
        svg,
        r#"<text x="{right}" y="{y}" font-size="11" font-weight="bold" text-anchor="end">% Daily Value*</text>"#
    );

    for row in &rows {
        y += ROW_HEIGHT;
        let x = if row.indented { MARGIN + 14 } else { MARGIN };
        let weight = if row.indented { "normal" } else { "bold" };
        let _ = writeln!(
            svg,
            r#"<line x1="{MARGIN}" y1="{}" x2="{right}" y2="{}" stroke="black" stroke-width="0.5"/>"#,
            y - 16,
            y - 16
        );
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y}" font-size="13"><tspan font-weight="{weight}">{}</tspan> {}</text>"#,
            xml_escape(row.label),
            xml_escape(&row.amount)
        );
        if let Some(percent) = row.daily_value_percent {
            let _ = write!(
                svg,
                r#"<text x="{right}" y="{y}" font-size="13" font-weight="bold" text-anchor="end">{percent}%</text>"#
            );
        }
        svg.push('\n');
    }

    y += 20;
    let _ = writeln!(
        svg,
        r#"<text x="{MARGIN}" y="{y}" font-size="8">* The % Daily Value tells you how much a nutrient in a serving contributes to a daily diet.</text>"#
    );
    svg.push_str("</svg>\n");
    svg
}

// src/report.rs
use chrono::{DateTime, Local};

use crate::ai::record::Classification;

pub const GENDER_FAILURE: &str = "Failed to process the image.";
pub const DETECTOR_FAILURE: &str = "Failed to get a valid response from the API.";
pub const NO_RESULTS: &str = "No results to display.";

/// The three things a user can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Gender,
    Detector,
    IsArtificial,
}

impl Mode {
    pub fn title(&self) -> &'static str {
        match self {
            Mode::Gender => "Gender Classification",
            Mode::Detector => "AI Image Detector",
            Mode::IsArtificial => "Is Image Artificial?",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Mode::Gender => GENDER_FAILURE,
            Mode::Detector | Mode::IsArtificial => DETECTOR_FAILURE,
        }
    }
}

pub fn header(mode: Mode, at: DateTime<Local>) -> String {
    format!("=== {} ({}) ===", mode.title(), at.format("%Y-%m-%d %H:%M:%S"))
}

/// Two-column label/score table, rows in the order the API returned them.
pub fn render_table(result: &Classification) -> String {
    let width = result
        .records()
        .iter()
        .map(|r| r.label.len())
        .max()
        .unwrap_or(0)
        .max("label".len());

    let mut out = format!("{:<width$}  score\n", "label", width = width);
    out.push_str(&format!("{}  ------\n", "-".repeat(width)));
    for record in result.records() {
        out.push_str(&format!("{:<width$}  {:.4}\n", record.label, record.score, width = width));
    }
    out
}

pub fn gender_summary(result: &Classification) -> String {
    match result.top() {
        Some(top) => format!(
            "The person in the image is likely to be **{}** with a score of {:.2}.",
            top.label, top.score
        ),
        None => NO_RESULTS.to_string(),
    }
}

pub fn detector_summary(result: &Classification) -> String {
    match result.top() {
        Some(top) => format!("The image is likely **{}** with a score of {:.2}.", top.label, top.score),
        None => NO_RESULTS.to_string(),
    }
}

pub fn artificial_verdict(is_artificial: bool) -> &'static str {
    if is_artificial {
        "The image may be artificially generated."
    } else {
        "The image is likely human."
    }
}

/// Everything printed after a successful call, table first where the mode has one.
pub fn render(mode: Mode, result: &Classification) -> String {
    match mode {
        Mode::Gender => format!("API Response:\n{}\n{}", render_table(result), gender_summary(result)),
        Mode::Detector => format!("API Response:\n{}\n{}", render_table(result), detector_summary(result)),
        Mode::IsArtificial => artificial_verdict(result.is_artificial()).to_string(),
    }
}

/// `render`, or the raw record array when JSON was asked for. The verdict
/// mode has no table to replace, so it ignores the flag.
pub fn render_output(mode: Mode, result: &Classification, json: bool) -> serde_json::Result<String> {
    if json && mode != Mode::IsArtificial {
        serde_json::to_string_pretty(result.records())
    } else {
        Ok(render(mode, result))
    }
}

// src/ai/record.rs
use serde::{Deserialize, Serialize};

use super::error::{ClassifyError, ClassifyResult};

/// Cutoff above which an `artificial` score flags the image. Fixed policy.
pub const ARTIFICIAL_THRESHOLD: f64 = 0.20;

pub const ARTIFICIAL_LABEL: &str = "artificial";

/// One `{label, score}` pair from the inference API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub label: String,
    pub score: f64,
}

impl Record {
    #[cfg(test)]
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    fn validate(&self, index: usize) -> ClassifyResult<()> {
        if self.label.trim().is_empty() {
            return Err(ClassifyError::MalformedResponse(format!(
                "record {} has an empty label",
                index
            )));
        }
        if !self.score.is_finite() || !(0.0..=1.0).contains(&self.score) {
            return Err(ClassifyError::MalformedResponse(format!(
                "record {} ({}) has score {} outside [0, 1]",
                index, self.label, self.score
            )));
        }
        Ok(())
    }
}

/// Records in the order the endpoint sent them. Not sorted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    records: Vec<Record>,
}

impl Classification {
    /// Validate every record; a single bad one rejects the whole response.
    pub fn from_records(records: Vec<Record>) -> ClassifyResult<Self> {
        for (index, record) in records.iter().enumerate() {
            record.validate(index)?;
        }
        Ok(Self { records })
    }

    /// Parse a response body as a JSON array of records.
    pub fn from_json(body: &str) -> ClassifyResult<Self> {
        let records: Vec<Record> = serde_json::from_str(body)
            .map_err(|e| ClassifyError::MalformedResponse(e.to_string()))?;
        Self::from_records(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest-scoring record; the earliest one wins a tie.
    pub fn top(&self) -> Option<&Record> {
        self.records.iter().fold(None, |best: Option<&Record>, record| match best {
            Some(b) if b.score >= record.score => Some(b),
            _ => Some(record),
        })
    }

    pub fn is_artificial(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.label == ARTIFICIAL_LABEL && r.score > ARTIFICIAL_THRESHOLD)
    }
}

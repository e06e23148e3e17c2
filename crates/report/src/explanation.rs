//! Explanations: the expected-vs-actual reports built from one trace.

use serde::{Deserialize, Serialize};
use std::fmt;

use pcond_core::{EngineConfig, Trace, TraceRecord};

use crate::layout;
use crate::squash::squash;

pub const EXPECTED_PREFIX: &str = "Mismatch<:";
pub const ACTUAL_PREFIX: &str = "Mismatch>:";

/// Long-form explanation of one record, correlated across both reports by
/// `index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailSection {
    pub index: usize,
    pub form_name: String,
    pub text: String,
}

/// One side (expected or actual) of an explanation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub summary: String,
    pub details: Vec<DetailSection>,
}

impl Report {
    /// The summary followed by its delimited detail blocks.
    pub fn render(&self) -> String {
        let mut out = self.summary.clone();
        for detail in &self.details {
            out.push_str(&format!(
                "\n\n.Detail of failure [{}]\n----\n{}\n----",
                detail.index, detail.text
            ));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub message: String,
    pub expected: Report,
    pub actual: Report,
}

impl Explanation {
    /// Lines both sides agree on appear once; differing lines appear as a
    /// `Mismatch<:` / `Mismatch>:` pair.
    pub fn diff(&self) -> String {
        let expected: Vec<&str> = self.expected.summary.lines().collect();
        let actual: Vec<&str> = self.actual.summary.lines().collect();
        let pad = " ".repeat(EXPECTED_PREFIX.len());
        let mut out = Vec::with_capacity(expected.len().max(actual.len()));
        for i in 0..expected.len().max(actual.len()) {
            let e = expected.get(i).copied().unwrap_or("");
            let a = actual.get(i).copied().unwrap_or("");
            if e == a {
                out.push(format!("{}{}", pad, e));
            } else {
                out.push(format!("{}{}", EXPECTED_PREFIX, e));
                out.push(format!("{}{}", ACTUAL_PREFIX, a));
            }
        }
        out.join("\n")
    }

    /// Serializing derived plain-data types into a `serde_json::Value`
    /// cannot fail, so this returns the value directly.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.message,
            "expected": self.expected,
            "actual": self.actual,
        })
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.message, self.diff())?;
        for (expected, actual) in self.expected.details.iter().zip(&self.actual.details) {
            write!(
                f,
                "\n\n.Detail of failure [{}]\n----\nExpected:\n{}\n----\nActual:\n{}\n----",
                expected.index, expected.text, actual.text
            )?;
        }
        Ok(())
    }
}

/// Builds explanations from traces.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    config: EngineConfig,
}

impl Composer {
    pub fn new(config: EngineConfig) -> Self {
        Composer { config }
    }

    pub fn compose(&self, message: impl Into<String>, trace: &Trace) -> Explanation {
        let records: Vec<TraceRecord> = squash(trace.records())
            .into_iter()
            .filter(|r| self.config.debug || !r.ignored || r.requires_explanation)
            .collect();

        let mut markers = Vec::with_capacity(records.len());
        let mut expected_details = Vec::new();
        let mut actual_details = Vec::new();
        for record in &records {
            if !record.requires_explanation {
                markers.push(None);
                continue;
            }
            let index = expected_details.len();
            markers.push(Some(index));
            expected_details.push(DetailSection {
                index,
                form_name: record.form_name.clone(),
                text: record.detail_expected.clone().unwrap_or_default(),
            });
            actual_details.push(DetailSection {
                index,
                form_name: record.form_name.clone(),
                text: record.detail_actual.clone().unwrap_or_default(),
            });
        }
        debug_assert_eq!(expected_details.len(), actual_details.len());

        let (expected_lines, actual_lines) =
            layout::render(&records, &markers, self.config.max_snapshot_len);
        Explanation {
            message: message.into(),
            expected: Report {
                summary: expected_lines.join("\n"),
                details: expected_details,
            },
            actual: Report {
                summary: actual_lines.join("\n"),
                details: actual_details,
            },
        }
    }
}

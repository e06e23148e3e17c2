//! pcond-report: turns an evaluation trace into an expected-vs-actual
//! explanation.
//!
//! Composition squashes uninteresting rows, hides ignored rows (unless the
//! config asks for debug output), lays both sides out in shared columns,
//! and collects indexed detail sections for rows that need a long-form
//! explanation.

pub mod explanation;
pub mod layout;
pub mod squash;

pub use explanation::{Composer, DetailSection, Explanation, Report};
pub use squash::squash;

use pcond_core::{EngineConfig, Trace};

/// Compose an explanation with the process-wide config.
pub fn compose_explanation(message: impl Into<String>, trace: &Trace) -> Explanation {
    Composer::new(EngineConfig::global().clone()).compose(message, trace)
}

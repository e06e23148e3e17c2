//! pcond-core: model types for the pcond explainable predicate engine.
//!
//! Callers build a [`Node`] tree, the evaluator (`pcond-eval`) walks it
//! and produces a [`Trace`], and the report composer (`pcond-report`)
//! turns the trace into an expected-vs-actual explanation.
//!
//! # Public API
//!
//! - [`Value`] -- dynamically typed input and intermediate values
//! - [`Outcome`] / [`State`] -- tri-state result of one node
//! - [`Node`], [`Check`], [`Func`] -- the expression tree
//! - [`TraceRecord`], [`Trace`] -- rows of an evaluation trace
//! - [`EngineConfig`] -- debug, detail and rendering settings
//! - [`EngineError`] -- malformed trees and recorder misuse
//! - [`predicates`], [`functions`] -- stock printable checks and functions

pub mod config;
pub mod error;
pub mod failure;
pub mod functions;
pub mod node;
pub mod outcome;
pub mod predicates;
pub mod record;
pub mod value;

pub use config::EngineConfig;
pub use error::EngineError;
pub use failure::Failure;
pub use node::{Check, Func, Node};
pub use outcome::{Origin, Outcome, State};
pub use record::{Detail, RecordKind, RecordValue, Trace, TraceRecord};
pub use value::Value;

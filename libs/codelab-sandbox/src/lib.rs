//! Isolated execution of submitted JavaScript functions against test cases.
//!
//! Each test case runs in a freshly spawned interpreter process that is
//! killed once its deadline elapses. The pieces, leaves first:
//!
//! - [`resolver`] finds the entry point in the submitted source
//! - [`adapter`] turns a test input into an argument list
//! - [`comparator`] decides whether an output matches the expected value
//! - [`engine`] spawns one context and races message, deadline and exit
//! - [`evaluator`] turns a context verdict into a [`TestOutcome`]
//! - [`runner`] runs a whole suite sequentially
//!
//! [`TestOutcome`]: codelab_common::types::TestOutcome

pub mod adapter;
pub mod comparator;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod resolver;
pub mod runner;
pub mod value;

mod runner_tests;

pub use config::RuntimeConfig;
pub use engine::{ContextCommand, ContextVerdict, ProcessEngine};
pub use error::SandboxError;
pub use runner::SuiteRunner;
pub use value::JsValue;

//! examguard-sink — quiz provider and submission sink integrations.
//!
//! Implements the `QuizProvider` and `SubmissionSink` traits over HTTP,
//! plus in-memory mocks for tests and dry runs.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;

pub use config::{load_config, load_config_from, ExamguardConfig, SinkConfig};
pub use error::SinkError;
pub use http::{HttpQuizProvider, HttpSink};
pub use mock::{MockQuizProvider, MockSink};

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod runner;
pub mod sandbox;

pub use error::{Result, RunletError};
pub use events::{RunnerEvents, StreamKind};
pub use runner::{CommandRequest, ExecutionResult, Runner, Target};

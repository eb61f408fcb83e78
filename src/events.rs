//! Notification listener for runner progress.
//!
//! The runner never waits on a listener: every method is a fire-and-forget
//! call, and a listener that is gone simply drops the notification.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::error::RunletError;

/// Stream an output chunk was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
    /// Echo of submitted input
    Stdin,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::Stdin => "stdin",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener for runner notifications.
///
/// All methods default to no-ops, so implementors only override what they
/// subscribe to.
pub trait RunnerEvents: Send + Sync {
    /// Source text or command as it is submitted.
    ///
    /// Defaults to an output notification tagged [`StreamKind::Stdin`].
    fn input(&self, text: &str) {
        self.output(text, StreamKind::Stdin);
    }

    /// Captured output tagged by stream.
    fn output(&self, _text: &str, _stream: StreamKind) {}

    /// Human-readable trace of what is being executed.
    fn log(&self, _message: &str) {}

    /// Fault that ended an execution.
    fn error(&self, _err: &RunletError) {}

    /// Short status line.
    fn status(&self, _message: &str) {}
}

/// Listener that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEvents;

impl RunnerEvents for NullEvents {}

/// Owned notification, as delivered by [`ChannelEvents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerEvent {
    Input(String),
    Output { text: String, stream: StreamKind },
    Log(String),
    /// Rendered error message
    Error(String),
    Status(String),
}

/// Listener that forwards notifications to a channel the caller drains.
#[derive(Debug, Clone)]
pub struct ChannelEvents {
    tx: UnboundedSender<RunnerEvent>,
}

impl ChannelEvents {
    pub fn new() -> (Self, UnboundedReceiver<RunnerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: RunnerEvent) {
        // Receiver may be gone; notifications are best effort.
        let _ = self.tx.send(event);
    }
}

impl RunnerEvents for ChannelEvents {
    fn input(&self, text: &str) {
        self.send(RunnerEvent::Input(text.to_string()));
    }

    fn output(&self, text: &str, stream: StreamKind) {
        self.send(RunnerEvent::Output {
            text: text.to_string(),
            stream,
        });
    }

    fn log(&self, message: &str) {
        self.send(RunnerEvent::Log(message.to_string()));
    }

    fn error(&self, err: &RunletError) {
        self.send(RunnerEvent::Error(err.to_string()));
    }

    fn status(&self, message: &str) {
        self.send(RunnerEvent::Status(message.to_string()));
    }
}

/// Listener that writes notifications to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl RunnerEvents for TracingEvents {
    fn input(&self, text: &str) {
        debug!(len = text.len(), "Input submitted");
    }

    fn output(&self, text: &str, stream: StreamKind) {
        debug!(stream = %stream, len = text.len(), "Output captured");
    }

    fn log(&self, message: &str) {
        info!("{}", message);
    }

    fn error(&self, err: &RunletError) {
        error!(error = %err, "Execution failed");
    }

    fn status(&self, message: &str) {
        info!(status = %message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct OutputOnly {
        seen: Mutex<Vec<(String, StreamKind)>>,
    }

    impl RunnerEvents for OutputOnly {
        fn output(&self, text: &str, stream: StreamKind) {
            self.seen.lock().unwrap().push((text.to_string(), stream));
        }
    }

    #[test]
    fn test_input_defaults_to_stdin_output() {
        let listener = OutputOnly::default();
        listener.input("print(1)");
        listener.log("ignored");

        let seen = listener.seen.lock().unwrap();
        assert_eq!(*seen, vec![("print(1)".to_string(), StreamKind::Stdin)]);
    }

    #[test]
    fn test_channel_events_in_order() {
        let (events, mut rx) = ChannelEvents::new();
        events.status("running");
        events.output("x", StreamKind::Stdout);

        assert_eq!(rx.try_recv().unwrap(), RunnerEvent::Status("running".to_string()));
        assert_eq!(
            rx.try_recv().unwrap(),
            RunnerEvent::Output {
                text: "x".to_string(),
                stream: StreamKind::Stdout
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_events_without_receiver() {
        let (events, rx) = ChannelEvents::new();
        drop(rx);
        events.log("dropped silently");
        events.error(&RunletError::ContainerRuntime("gone".to_string()));
    }

    #[test]
    fn test_stream_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&StreamKind::Stderr).unwrap(), "\"stderr\"");
        assert_eq!(StreamKind::Stdin.to_string(), "stdin");
    }
}

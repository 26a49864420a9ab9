use lockfile_sbom::prelude::*;
use std::sync::{Arc, Mutex};

/// One call made against the reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Message(String),
    Step {
        current: usize,
        total: usize,
        message: Option<String>,
    },
    Error(String),
    Completion(String),
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressEvent::Message(message) => write!(f, "{}", message),
            ProgressEvent::Step {
                current,
                total,
                message: Some(message),
            } => write!(f, "Progress: {}/{} - {}", current, total, message),
            ProgressEvent::Step { current, total, .. } => {
                write!(f, "Progress: {}/{}", current, total)
            }
            ProgressEvent::Error(message) => write!(f, "Error: {}", message),
            ProgressEvent::Completion(message) => write!(f, "Completed: {}", message),
        }
    }
}

/// Mock ProgressReporter that records every call in order
#[derive(Default, Clone)]
pub struct MockProgressReporter {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Every event rendered as the line a console reporter would print.
    pub fn get_messages(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, message: &str) {
        self.record(ProgressEvent::Message(message.to_string()));
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        self.record(ProgressEvent::Step {
            current,
            total,
            message: message.map(str::to_string),
        });
    }

    fn report_error(&self, message: &str) {
        self.record(ProgressEvent::Error(message.to_string()));
    }

    fn report_completion(&self, message: &str) {
        self.record(ProgressEvent::Completion(message.to_string()));
    }
}

//! Workflow entry points behind the CLI commands.
//!
//! `init` is the real pipeline; `plan`, `apply`, and `handover` are the
//! authoring workflows that later steps build on top of the verified
//! configuration, present as fixed-result stubs.

pub mod init;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Ok,
    Error,
}

/// One command's outcome: a status line plus whatever structured detail the
/// command produced (rendered in JSON mode only).
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub command: String,
    pub status: WorkflowStatus,
    pub message: String,
    #[serde(flatten)]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

impl WorkflowResult {
    pub fn ok(command: &str, message: &str) -> Self {
        Self {
            command: command.to_string(),
            status: WorkflowStatus::Ok,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn error(command: &str, message: &str) -> Self {
        Self {
            command: command.to_string(),
            status: WorkflowStatus::Error,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Map<String, serde_json::Value>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn succeeded(&self) -> bool {
        self.status == WorkflowStatus::Ok
    }
}

/// Options shared by every workflow, lifted from the global CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowOptions {
    pub yes: bool,
    pub json: bool,
}

pub fn plan_workflow(_options: &WorkflowOptions) -> WorkflowResult {
    WorkflowResult::ok("plan", "Plan completed.")
}

pub fn apply_workflow(_options: &WorkflowOptions) -> WorkflowResult {
    WorkflowResult::ok("apply", "Apply completed.")
}

pub fn handover_workflow(_options: &WorkflowOptions) -> WorkflowResult {
    WorkflowResult::ok("handover", "Handover completed.")
}

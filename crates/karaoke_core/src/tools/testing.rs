//! Fake tool runner for tests.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::error::ToolError;
use super::invocation::{ToolInvocation, ToolOutput};
use super::runner::ToolRunner;

type Handler = Box<dyn Fn(&ToolInvocation) -> Result<ToolOutput, ToolError> + Send + Sync>;

/// Records every invocation and answers with per-tool handlers.
///
/// Tools without a handler succeed with empty output.
#[derive(Default)]
pub struct FakeRunner {
    handlers: HashMap<String, Handler>,
    calls: Mutex<Vec<ToolInvocation>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer invocations of `tool` (matched on program file name).
    pub fn on<F>(mut self, tool: &str, handler: F) -> Self
    where
        F: Fn(&ToolInvocation) -> Result<ToolOutput, ToolError> + Send + Sync + 'static,
    {
        self.handlers.insert(tool.to_string(), Box::new(handler));
        self
    }

    /// Make every invocation of `tool` exit with `exit_code`.
    pub fn failing(self, tool: &str, exit_code: i32, stderr: &str) -> Self {
        let name = tool.to_string();
        let stderr = stderr.to_string();
        self.on(tool, move |_| {
            Err(ToolError::non_zero_exit(name.clone(), exit_code, stderr.clone()))
        })
    }

    /// All invocations seen so far.
    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().clone()
    }

    /// Invocations of one tool.
    pub fn calls_to(&self, tool: &str) -> Vec<ToolInvocation> {
        self.calls()
            .into_iter()
            .filter(|inv| inv.tool_name() == tool)
            .collect()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        self.calls.lock().push(invocation.clone());
        match self.handlers.get(&invocation.tool_name()) {
            Some(handler) => handler(invocation),
            None => Ok(ToolOutput::default()),
        }
    }
}

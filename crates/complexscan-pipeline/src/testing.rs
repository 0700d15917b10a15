//! Fakes shared by the unit tests

use crate::executor::{CommandFailure, CommandRunner, ToolCommand};
use crate::power::{HostClass, HostPower};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type Handler = Box<dyn Fn(&ToolCommand) -> Result<String, CommandFailure> + Send + Sync>;

/// Records every command and answers with a handler
pub struct RecordingRunner {
    calls: Mutex<Vec<ToolCommand>>,
    handler: Handler,
}

impl RecordingRunner {
    pub fn new(
        handler: impl Fn(&ToolCommand) -> Result<String, CommandFailure> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// Succeeds with empty stdout
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(String::new()))
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

pub fn exit_failure(stderr: &str) -> CommandFailure {
    CommandFailure::Exit {
        status: "exit status: 1".to_string(),
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &ToolCommand) -> Result<String, CommandFailure> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.clone());
        }
        (self.handler)(command)
    }
}

/// Host with a fixed power state that records shutdown requests
pub struct FakeHost {
    class: HostClass,
    mains: bool,
    shut_down: AtomicBool,
}

impl FakeHost {
    pub fn new(class: HostClass, mains: bool) -> Self {
        Self {
            class,
            mains,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn desktop() -> Self {
        Self::new(HostClass::Desktop, true)
    }

    pub fn was_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl HostPower for FakeHost {
    fn host_class(&self) -> HostClass {
        self.class
    }

    fn on_mains_power(&self) -> bool {
        self.mains
    }

    fn shut_down(&self) -> complexscan_common::Result<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

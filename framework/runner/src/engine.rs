use std::io::Write as _;
use std::process::Stdio;

use async_trait::async_trait;
use loadrelay_report_model::{EngineScript, LifecycleEvent};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Lifecycle events buffered between the engine and the orchestrator.
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to write the test script for the engine")]
    WriteScript(#[source] std::io::Error),

    #[error("failed to encode the test script for the engine")]
    EncodeScript(#[source] serde_json::Error),

    #[error("failed to spawn engine `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine output is not captured")]
    MissingOutput,
}

/// The traffic-generation engine.
///
/// Starting the engine runs the test in the background. Its lifecycle events arrive on the returned
/// channel, which closes once the engine has stopped.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn start(
        &self,
        script: &EngineScript,
    ) -> Result<mpsc::Receiver<LifecycleEvent>, EngineError>;
}

/// Runs the engine as a child process.
///
/// The merged test script is written to a temporary file whose path is passed as the only argument.
/// The engine writes one JSON encoded [LifecycleEvent] per line to stdout.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    command: String,
}

impl ProcessEngine {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Engine for ProcessEngine {
    async fn start(
        &self,
        script: &EngineScript,
    ) -> Result<mpsc::Receiver<LifecycleEvent>, EngineError> {
        let mut script_file = tempfile::Builder::new()
            .prefix("loadrelay-test-")
            .suffix(".json")
            .tempfile()
            .map_err(EngineError::WriteScript)?;
        serde_json::to_writer(&mut script_file, script).map_err(EngineError::EncodeScript)?;
        script_file.flush().map_err(EngineError::WriteScript)?;

        log::debug!(
            "Starting engine `{}` with test script {}",
            self.command,
            script_file.path().display()
        );
        let mut child = Command::new(&self.command)
            .arg(script_file.path())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                command: self.command.clone(),
                source,
            })?;
        let stdout = child.stdout.take().ok_or(EngineError::MissingOutput)?;

        let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(async move {
            // The engine reads the script for as long as it runs.
            let _script_file = script_file;
            let mut lines = BufReader::new(stdout).lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match serde_json::from_str::<LifecycleEvent>(&line) {
                        Ok(event) => {
                            if sender.send(event).await.is_err() {
                                log::debug!("Nobody is listening for engine events, stopping engine");
                                if let Err(e) = child.kill().await {
                                    log::warn!("Failed to stop engine: {e}");
                                }
                                return;
                            }
                        }
                        Err(e) => log::warn!("Skipping unrecognised engine output ({e}): {line}"),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("Failed to read engine output: {e}");
                        break;
                    }
                }
            }

            match child.wait().await {
                Ok(status) if status.success() => log::debug!("Engine exited"),
                Ok(status) => log::warn!("Engine exited with {status}"),
                Err(e) => log::error!("Failed to wait for engine to exit: {e}"),
            }
        });

        Ok(receiver)
    }
}

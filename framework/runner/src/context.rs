use std::path::{Path, PathBuf};
use std::sync::Arc;

use loadrelay_core::prelude::ShutdownListener;

use crate::config::RunConfig;
use crate::connectors::ControlService;
use crate::engine::Engine;

/// Everything a run needs from its surroundings.
#[derive(Clone)]
pub struct RunnerContext {
    config: Arc<RunConfig>,
    service: Arc<dyn ControlService>,
    engine: Arc<dyn Engine>,
    shutdown_listener: ShutdownListener,
    script_dir: PathBuf,
}

impl RunnerContext {
    /// `script_dir` is where a helper script fetched for the test is saved.
    pub fn new(
        config: Arc<RunConfig>,
        service: Arc<dyn ControlService>,
        engine: Arc<dyn Engine>,
        shutdown_listener: ShutdownListener,
        script_dir: PathBuf,
    ) -> Self {
        Self {
            config,
            service,
            engine,
            shutdown_listener,
            script_dir,
        }
    }

    pub fn config(&self) -> &Arc<RunConfig> {
        &self.config
    }

    pub fn service(&self) -> &Arc<dyn ControlService> {
        &self.service
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// A new listener for the run's termination signal.
    pub fn shutdown_listener(&self) -> ShutdownListener {
        self.shutdown_listener.clone()
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }
}

mod cli;
mod config;
mod connectors;
mod context;
mod engine;
mod error;
mod handler;
mod init;
mod merge;
mod monitor;
mod orchestrator;
mod plugins;
mod progress;
mod run;
mod script;
mod shutdown;
mod summary;
mod version;

pub mod prelude {
    pub use crate::cli::RunnerCli;
    pub use crate::config::RunConfig;
    pub use crate::connectors::{ConnectorError, ControlService, HttpControlService};
    pub use crate::context::RunnerContext;
    pub use crate::engine::{Engine, EngineError, ProcessEngine};
    pub use crate::error::{RunError, RunResult};
    pub use crate::init::init;
    pub use crate::orchestrator::{RunOrchestrator, RunState};
    pub use crate::plugins::{MetricsAdapter, PluginError};
    pub use crate::run::run;
    pub use crate::script::PROCESSOR_FILE_NAME;
    pub use crate::shutdown::start_shutdown_listener;
    pub use crate::version::RUNNER_VERSION;
}

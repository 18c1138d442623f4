//! Data exchanged between the runner, the control service and the traffic-generation engine.
//!
//! - [TestDefinition] is fetched from the control service once per run.
//! - [LifecycleEvent] is emitted by the engine while the test executes.
//! - [ReportPost] is sent back to the control service to record run status.

mod definition;
mod event;
mod post;

pub use definition::{EngineConfig, EngineScript, HttpSettings, Phase, TestDefinition};
pub use event::{LifecycleEvent, PhaseInfo, StatsSnapshot};
pub use post::{PhaseStatus, ReportPost};

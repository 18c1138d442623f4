use clap::Parser;

/// Runner settings. Every value is read from its environment variable, the long flags exist for
/// local runs only.
#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None)]
pub struct RunnerCli {
    /// Name of the environment the runner is deployed to
    #[arg(long, env = "ENVIRONMENT")]
    pub environment: Option<String>,

    /// Name of the cluster the runner is deployed to
    #[arg(long, env = "CLUSTER", default_value = "default")]
    pub cluster: String,

    /// Log filter, in `env_logger` syntax
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Seconds between two intermediate reports
    #[arg(long, env = "STATS_INTERVAL", default_value = "30")]
    pub stats_interval: u64,

    /// The test to run
    #[arg(long, env = "TEST_ID")]
    pub test_id: String,

    /// The job this run belongs to
    #[arg(long, env = "JOB_ID")]
    pub job_id: String,

    #[arg(long, env = "JOB_TYPE", default_value = "load_test")]
    pub job_type: String,

    /// Base URL of the control service. `/v1` is appended when no path is given.
    #[arg(long, env = "PREDATOR_URL")]
    pub predator_url: String,

    /// Duration of the first phase, in seconds
    #[arg(long, env = "DURATION")]
    pub duration: Option<u64>,

    /// Arrival rate of the first phase
    #[arg(long, env = "ARRIVAL_RATE")]
    pub arrival_rate: Option<u64>,

    /// Total number of arrivals over the run
    #[arg(long, env = "ARRIVAL_COUNT")]
    pub arrival_count: Option<u64>,

    /// Arrival rate the first phase ramps up to
    #[arg(long, env = "RAMP_TO")]
    pub ramp_to: Option<u64>,

    /// Cap on concurrently running scenarios
    #[arg(long, env = "MAX_VIRTUAL_USERS")]
    pub max_virtual_users: Option<u64>,

    /// Size of the engine's HTTP connection pool
    #[arg(long, env = "HTTP_POOL_SIZE", default_value = "250")]
    pub http_pool_size: u64,

    #[arg(long, env = "NOTES")]
    pub notes: Option<String>,

    /// Metrics adapter to configure on the engine, for example `prometheus`
    #[arg(long, env = "METRICS_PLUGIN_NAME")]
    pub metrics_plugin_name: Option<String>,

    /// Base64 encoded JSON configuration for the metrics adapter
    #[arg(long, env = "METRICS_EXPORT_CONFIG")]
    pub metrics_export_config: Option<String>,

    /// Proxy for requests to the control service
    #[arg(long, env = "PROXY_URL")]
    pub proxy_url: Option<String>,

    /// Milliseconds to wait before starting
    #[arg(long, env = "DELAY_RUNNER_MS", default_value = "0")]
    pub delay_runner_ms: u64,

    /// The report this run writes to
    #[arg(long, env = "REPORT_ID")]
    pub report_id: String,

    /// Version of the control service, major and minor must match the runner. A run without it
    /// fails before the engine starts
    #[arg(long, env = "PREDATOR_VERSION")]
    pub predator_version: Option<String>,

    /// Orchestration platform app id, the last path segment becomes the container id
    #[arg(long, env = "MARATHON_APP_ID")]
    pub marathon_app_id: Option<String>,

    /// Executable of the traffic-generation engine
    #[arg(long, env = "ENGINE_COMMAND", default_value = "loadrelay-engine")]
    pub engine_command: String,
}

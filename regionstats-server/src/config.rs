use std::net::SocketAddr;

/// Address the binary binds to when `--addr` is not given.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";

/// Telemetry dataset location, relative to the deployment root.
pub const DEFAULT_DATA_PATH: &str = "telemetry.json";

/// Largest accepted request body in bytes; larger bodies are rejected with 413.
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
}

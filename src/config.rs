use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    pub log_path: PathBuf,
    /// Capacity of the pending-event queue feeding the log writer task.
    /// A full queue suspends mutating callers until the writer catches up.
    pub queue_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            log_path: PathBuf::from("transactions.log"),
            queue_capacity: 16,
        }
    }
}

impl NodeConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// Recognized variables: `TIDEKV_ADDR`, `TIDEKV_LOG_PATH`,
    /// `TIDEKV_QUEUE_CAPACITY`. Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(addr) = std::env::var("TIDEKV_ADDR") {
            match addr.parse() {
                Ok(addr) => cfg.bind_addr = addr,
                Err(_) => tracing::warn!(%addr, "ignoring unparsable TIDEKV_ADDR"),
            }
        }
        if let Ok(path) = std::env::var("TIDEKV_LOG_PATH") {
            cfg.log_path = PathBuf::from(path);
        }
        if let Ok(cap) = std::env::var("TIDEKV_QUEUE_CAPACITY") {
            match cap.parse::<usize>() {
                Ok(cap) if cap > 0 => cfg.queue_capacity = cap,
                _ => tracing::warn!(%cap, "ignoring unparsable TIDEKV_QUEUE_CAPACITY"),
            }
        }

        cfg
    }
}

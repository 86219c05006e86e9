use crate::storage::resolve_data_path;
use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub data_path: PathBuf,
}

impl ServerConfig {
    /// Reads `PORT` and `APP_DATA_PATH`, falling back to defaults.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            data_path: resolve_data_path(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

use crate::errors::AppError;
use crate::models::MarkedDays;
use std::{
    env,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{error, info};

pub const DEFAULT_DATA_PATH: &str = "data/datos_calendario.json";

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_DATA_PATH)
}

/// Creates the data directory and seeds an empty document when none exists.
pub async fn bootstrap_document(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    if fs::try_exists(path).await? {
        return Ok(());
    }

    info!(path = %path.display(), "initialising empty calendar document");
    persist_document(path, &MarkedDays::new()).await
}

pub async fn load_document(path: &Path) -> MarkedDays {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(days) => days,
            Err(err) => {
                error!("failed to parse calendar document: {err}");
                MarkedDays::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => MarkedDays::default(),
        Err(err) => {
            error!("failed to read calendar document: {err}");
            MarkedDays::default()
        }
    }
}

/// Writes the whole document to a sibling temp file, then renames it into
/// place so readers never see a partial write.
pub async fn persist_document(path: &Path, days: &MarkedDays) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(days).map_err(AppError::internal)?;
    let staging = staging_path(path);
    fs::write(&staging, payload).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

use crate::errors::AppError;
use crate::store::UrgeStore;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{debug, error};

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/urges.json"))
}

/// Reads the saved collection. A missing or unreadable file yields an empty store.
pub async fn load_data(path: &Path) -> UrgeStore {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(store) => store,
            Err(err) => {
                error!("failed to parse data file: {err}");
                UrgeStore::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => UrgeStore::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            UrgeStore::default()
        }
    }
}

pub async fn persist_data(path: &Path, store: &UrgeStore) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(|err| {
        error!("failed to write data file {}: {err}", path.display());
        AppError::internal(err)
    })?;
    debug!(urges = store.len(), "data file written");
    Ok(())
}

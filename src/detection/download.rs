use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{Error, Result};

/// Release that hosts the stock YOLOv8 weights.
pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://github.com/ultralytics/assets/releases/download/v8.2.0";

/// Makes sure `model_path` exists, fetching `<base_url>/<file name>` when it
/// does not.
pub fn ensure_model(model_path: &Path, base_url: &str) -> Result<PathBuf> {
    if model_path.exists() {
        return Ok(model_path.to_path_buf());
    }

    let file_name = model_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::ModelNotFound(model_path.to_path_buf()))?;
    let url = model_url(base_url, file_name);

    warn!("Model file {model_path:?} not found. Downloading from {url}...");
    fetch(&url, model_path)?;
    info!("Model downloaded to {model_path:?}");

    Ok(model_path.to_path_buf())
}

pub fn model_url(base_url: &str, file_name: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), file_name)
}

#[cfg(feature = "download")]
fn fetch(url: &str, destination: &Path) -> Result<()> {
    use std::fs::{self, File};

    let download_error = |message: String| Error::Download {
        url: url.to_string(),
        message,
    };

    let response = ureq::get(url)
        .call()
        .map_err(|err| download_error(err.to_string()))?;

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // Only a complete transfer is renamed to the real name.
    let partial = destination.with_extension("part");
    let mut file = File::create(&partial)?;
    let mut reader = response.into_reader();
    if let Err(err) = std::io::copy(&mut reader, &mut file) {
        let _ = fs::remove_file(&partial);
        return Err(download_error(err.to_string()));
    }
    drop(file);
    fs::rename(&partial, destination)?;

    Ok(())
}

#[cfg(not(feature = "download"))]
fn fetch(_url: &str, destination: &Path) -> Result<()> {
    Err(Error::ModelNotFound(destination.to_path_buf()))
}

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("could not determine a cache directory for detector models")]
    NoCacheDir,
    #[error("failed to prepare cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to store model at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress callback: `(bytes_written, total_bytes)`; `total_bytes` is 0
/// when the server sent no Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Locates the detector model file by name.
///
/// Checks the per-user cache first, then an optional bundled directory,
/// and finally downloads into the cache. The model is required before
/// any detection can happen, so every failure here is fatal to pipeline
/// construction.
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cache_dir = model_cache_dir()?;
    let cached = cache_dir.join(name);
    if cached.exists() {
        return Ok(cached);
    }

    if let Some(path) = bundled_dir.map(|d| d.join(name)).filter(|p| p.exists()) {
        return Ok(path);
    }

    fs::create_dir_all(&cache_dir).map_err(|source| ModelResolveError::CacheDir {
        path: cache_dir.clone(),
        source,
    })?;
    download(url, &cached, progress)?;
    Ok(cached)
}

/// Per-user cache directory for detector models,
/// e.g. `~/.cache/facesentry/models` on Linux.
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    dirs::cache_dir()
        .map(|d| d.join("facesentry").join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let download_err = |source| ModelResolveError::Download {
        url: url.to_string(),
        source,
    };
    let store_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ModelResolveError::Store {
            path: path.clone(),
            source,
        }
    };

    let response = reqwest::blocking::get(url).and_then(|r| r.error_for_status());
    let body = response.and_then(|r| {
        let total = r.content_length().unwrap_or(0);
        r.bytes().map(|b| (b, total))
    });
    let (bytes, total) = body.map_err(download_err)?;

    // Written to a sibling temp file and renamed, so an interrupted
    // download never leaves a truncated model in the cache.
    let temp = dest.with_extension("partial");
    let mut file = fs::File::create(&temp).map_err(store_err(&temp))?;

    let mut written: u64 = 0;
    for chunk in bytes.chunks(256 * 1024) {
        file.write_all(chunk).map_err(store_err(&temp))?;
        written += chunk.len() as u64;
        if let Some(ref report) = progress {
            report(written, total);
        }
    }
    file.flush().map_err(store_err(&temp))?;
    drop(file);

    fs::rename(&temp, dest).map_err(store_err(dest))?;
    Ok(())
}

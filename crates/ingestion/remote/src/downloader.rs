use std::{path::{Path, PathBuf}, time::Duration};

use futures::StreamExt;
use reqwest::Client;
use tokio::{fs, io::AsyncWriteExt};
use tracing::warn;

use crate::error::RemoteError;

const CHUNK_LOG_INTERVAL_BYTES: u64 = 20 * 1024 * 1024;

/// Downloads `url` into `download_dir`, retrying up to `max_retries` times
/// with exponential backoff. Partial files from a failed attempt are
/// removed before the next attempt starts.
pub async fn download_era(
    client: &Client,
    url: &str,
    download_dir: &Path,
    filename: &str,
    max_retries: u32,
) -> Result<PathBuf, RemoteError> {
    fs::create_dir_all(download_dir)
        .await
        .map_err(|source| RemoteError::Io { path: download_dir.display().to_string(), source })?;
    let dest = download_dir.join(filename);

    let mut attempt = 0;
    loop {
        attempt += 1;
        match try_download_once(client, url, &dest).await {
            Ok(()) => return Ok(dest),
            Err(err) if attempt >= max_retries => {
                let _ = fs::remove_file(&dest).await;
                warn!(url, attempt, "download exhausted retries: {err}");
                return Err(RemoteError::DownloadExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                });
            }
            Err(err) => {
                let _ = fs::remove_file(&dest).await;
                let backoff = Duration::from_secs(2u64.saturating_pow(attempt));
                warn!(url, attempt, backoff_secs = backoff.as_secs(), "download attempt failed: {err}");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

async fn try_download_once(client: &Client, url: &str, dest: &Path) -> Result<(), RemoteError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| RemoteError::Request { url: url.to_string(), source })?
        .error_for_status()
        .map_err(|source| RemoteError::Request { url: url.to_string(), source })?;

    let mut file = fs::File::create(dest)
        .await
        .map_err(|source| RemoteError::Io { path: dest.display().to_string(), source })?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    let mut next_log_at = CHUNK_LOG_INTERVAL_BYTES;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| RemoteError::Request { url: url.to_string(), source })?;
        file.write_all(&chunk)
            .await
            .map_err(|source| RemoteError::Io { path: dest.display().to_string(), source })?;
        downloaded += chunk.len() as u64;
        if downloaded >= next_log_at {
            tracing::debug!(url, downloaded, "download progress");
            next_log_at += CHUNK_LOG_INTERVAL_BYTES;
        }
    }

    Ok(())
}

/// Deletes a downloaded era file, honoring the `cleanup` configuration flag.
pub async fn cleanup_download(path: &Path, cleanup: bool) -> Result<(), RemoteError> {
    if !cleanup {
        return Ok(());
    }
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(RemoteError::Io { path: path.display().to_string(), source }),
    }
}

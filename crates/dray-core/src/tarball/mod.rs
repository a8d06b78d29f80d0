//! Tarball retrieval pipeline.
//!
//! Fetches a package tarball over HTTP and extracts it into a destination
//! directory as the body downloads: chunks flow through a bounded channel
//! into a blocking gunzip + untar task, so extraction starts before the
//! download finishes and a slow disk pauses the network side.

pub mod extract;

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;
use tokio::sync::mpsc;

use crate::error::FetchError;
use crate::latch::CompletionLatch;

pub use extract::{extract_archive, normalize_entry_name, ChannelReader, DIR_MODE, FILE_MODE};

/// Body chunks buffered between download and extraction before the network
/// side pauses.
const CHUNK_BUFFER: usize = 16;

/// Fetches `tarball_url` and extracts its contents into `output_dir`.
///
/// `output_dir` is created first (intermediate directories included); no
/// network call is made if that fails. Entry names are normalized with
/// [`normalize_entry_name`] and permissions are rewritten to [`DIR_MODE`] /
/// [`FILE_MODE`] as entries are written. The download and the extraction
/// run as separate tasks racing to report through a [`CompletionLatch`], so
/// the caller sees exactly one completion even when both sides fail.
///
/// There are no internal retries, and partially extracted files are left in
/// place on error.
///
/// # Errors
/// [`FetchError::CreateDir`] if the destination cannot be created,
/// [`FetchError::Request`] if the request or its body stream fails,
/// [`FetchError::Status`] on a non-success response, and
/// [`FetchError::Extract`] for decompression, archive, or write failures.
pub async fn fetch_package(
    client: &Client,
    tarball_url: &str,
    output_dir: &Path,
) -> Result<(), FetchError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|source| FetchError::CreateDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let response = client
        .get(tarball_url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: tarball_url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: tarball_url.to_string(),
            status,
        });
    }

    let (latch, completion) = CompletionLatch::new();
    let latch = Arc::new(latch);
    let (chunk_tx, chunk_rx) = mpsc::channel::<Bytes>(CHUNK_BUFFER);

    // Network side: forward body chunks until the stream ends or the
    // extraction side hangs up.
    let url = tarball_url.to_string();
    let stream_latch = Arc::clone(&latch);
    tokio::spawn(async move {
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(chunk) => {
                    if chunk_tx.send(chunk).await.is_err() {
                        // Extraction already reported; nothing left to feed.
                        break;
                    }
                }
                Err(source) => {
                    stream_latch.complete(Err(FetchError::Request {
                        url: url.clone(),
                        source,
                    }));
                    break;
                }
            }
        }
        // chunk_tx drops here, which reads as end of stream downstream.
    });

    // Extraction side: blocking gunzip + untar fed by the channel.
    let dest = output_dir.to_path_buf();
    let extract_latch = Arc::clone(&latch);
    tokio::task::spawn_blocking(move || {
        let reader = ChannelReader::new(chunk_rx);
        extract_latch.complete(extract_archive(reader, &dest));
    });

    match completion.await {
        Ok(result) => result,
        Err(_) => Err(FetchError::extract(
            "Retrieval ended without reporting completion",
        )),
    }
}

use futures::TryStreamExt;
use indicatif::ProgressBar;
use reqwest::header::CONTENT_LENGTH;
use std::path::Path;
use tokio::fs::File;
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::info;

use super::client::NexusClient;
use super::error::{EXPECTED_STATUS, Result, UploadError};

/// What the server said about one PUT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub status: u16,
    pub body: Option<String>,
}

impl TransferOutcome {
    /// Consume the response. The body is only read when the upload failed.
    async fn from_response(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        if status == EXPECTED_STATUS {
            return Ok(Self { status, body: None });
        }

        let body = response
            .text()
            .await
            .map_err(|source| UploadError::UnreadableBody { status, source })?;

        Ok(Self {
            status,
            body: Some(body),
        })
    }

    pub fn into_result(self) -> Result<()> {
        if self.status == EXPECTED_STATUS {
            Ok(())
        } else {
            Err(UploadError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Stream a local file to `url` with an HTTP PUT.
///
/// The file is read in chunks as the request body goes out, never loaded
/// whole. Returns the number of bytes sent.
pub async fn upload_file(
    client: &NexusClient,
    local_path: &Path,
    url: &str,
    pb: Option<&ProgressBar>,
) -> Result<u64> {
    let fs_error = |source| UploadError::Filesystem {
        path: local_path.to_path_buf(),
        source,
    };

    let file = File::open(local_path).await.map_err(fs_error)?;
    let file_size = file.metadata().await.map_err(fs_error)?.len();

    if let Some(pb) = pb {
        pb.set_length(file_size);
        pb.set_position(0);
        pb.set_message(format!("Uploading {}", local_path.display()));
    }

    let progress = pb.cloned();
    let stream = FramedRead::new(file, BytesCodec::new()).inspect_ok(move |chunk| {
        if let Some(pb) = &progress {
            pb.inc(chunk.len() as u64);
        }
    });

    let response = client
        .put(url)
        .header(CONTENT_LENGTH, file_size)
        .body(reqwest::Body::wrap_stream(stream))
        .send()
        .await
        .map_err(|source| UploadError::Transport {
            path: local_path.to_path_buf(),
            source,
        })?;

    let outcome = TransferOutcome::from_response(response).await?;
    if client.verbose() {
        info!(
            "got HTTP {} for {} - written to server",
            outcome.status,
            local_path.display()
        );
    }
    outcome.into_result()?;

    Ok(file_size)
}

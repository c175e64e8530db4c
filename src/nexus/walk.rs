use indicatif::ProgressBar;
use std::path::Path;
use tracing::info;
use walkdir::WalkDir;

use super::client::NexusClient;
use super::error::{Result, ResultExt, UploadError};
use super::upload::upload_file;
use super::url::{FileUploadTarget, destination_url};
use crate::config::UploadConfig;

/// Totals for a finished run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Drives a whole run: every path in the config, in order, one PUT at a time.
///
/// The first failure anywhere ends the run; nothing after it is attempted.
pub struct Uploader {
    config: UploadConfig,
    client: NexusClient,
    pb: Option<ProgressBar>,
}

impl Uploader {
    /// Validate `config` and set up the HTTP client. No request is made here.
    pub fn new(config: UploadConfig) -> Result<Self> {
        config.validate()?;
        let client = NexusClient::new(&config)?;
        Ok(Self {
            config,
            client,
            pb: None,
        })
    }

    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.pb = Some(pb);
        self
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<UploadSummary> {
        let mut summary = UploadSummary::default();

        for path in &self.config.files {
            let metadata = tokio::fs::metadata(path)
                .await
                .map_err(|source| UploadError::Filesystem {
                    path: path.clone(),
                    source,
                })
                .with_path_context(|| format!("could not stat {}", path.display()))?;

            if metadata.is_dir() {
                self.upload_directory(path, &mut summary)
                    .await
                    .with_path_context(|| {
                        format!("failed to upload files in {}", path.display())
                    })?;
            } else {
                self.upload_single(path, &mut summary).await?;
            }
        }

        Ok(summary)
    }

    async fn upload_single(&self, path: &Path, summary: &mut UploadSummary) -> Result<()> {
        let target = FileUploadTarget::single(path)
            .with_path_context(|| format!("could not upload single file {}", path.display()))?;
        self.upload_target(&target, summary).await
    }

    /// Walk `root` depth-first and upload every non-directory entry below it.
    async fn upload_directory(&self, root: &Path, summary: &mut UploadSummary) -> Result<()> {
        if root.as_os_str().is_empty() {
            return Err(UploadError::EmptyRoot);
        }

        // Directory reads block the runtime thread; fine while uploads run one at a time.
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;

            if entry.file_type().is_dir() {
                if self.config.verbose {
                    info!(
                        "{} was a directory, stepping in",
                        entry.file_name().to_string_lossy()
                    );
                }
                continue;
            }

            let target = FileUploadTarget::walked(root, entry.path())?;
            self.upload_target(&target, summary).await?;
        }

        Ok(())
    }

    async fn upload_target(
        &self,
        target: &FileUploadTarget,
        summary: &mut UploadSummary,
    ) -> Result<()> {
        let url = destination_url(&self.config, target);
        let bytes = upload_file(&self.client, &target.local_path, &url, self.pb.as_ref())
            .await
            .with_path_context(|| target.describe())?;

        summary.files += 1;
        summary.bytes += bytes;
        Ok(())
    }
}

use std::path::{Path, PathBuf};

use super::error::{Result, UploadError};
use crate::config::UploadConfig;

/// A local file resolved to its place under the destination path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUploadTarget {
    pub local_path: PathBuf,
    pub relative_path: String,
    pub from_directory_walk: bool,
}

impl FileUploadTarget {
    /// Target for a file given directly on the command line: only its name is kept
    pub fn single(local_path: &Path) -> Result<Self> {
        let name = local_path
            .file_name()
            .ok_or_else(|| UploadError::NoFileName {
                path: local_path.to_path_buf(),
            })?;

        Ok(Self {
            local_path: local_path.to_path_buf(),
            relative_path: utf8_name(Path::new(name), local_path)?,
            from_directory_walk: false,
        })
    }

    /// Target for a file found while walking `root`: its path below `root` is kept
    pub fn walked(root: &Path, local_path: &Path) -> Result<Self> {
        let outside = || UploadError::OutsideRoot {
            path: local_path.to_path_buf(),
            root: root.to_path_buf(),
        };
        let relative = local_path.strip_prefix(root).map_err(|_| outside())?;
        if relative.as_os_str().is_empty() {
            return Err(outside());
        }

        Ok(Self {
            local_path: local_path.to_path_buf(),
            relative_path: utf8_name(relative, local_path)?,
            from_directory_walk: true,
        })
    }

    /// How this target is named in error messages
    pub fn describe(&self) -> String {
        if self.from_directory_walk {
            format!("could not upload {}", self.relative_path)
        } else {
            format!("could not upload single file {}", self.local_path.display())
        }
    }
}

// Remote names must match the local bytes exactly, never a lossy rendering.
fn utf8_name(name: &Path, local_path: &Path) -> Result<String> {
    name.to_str()
        .map(str::to_owned)
        .ok_or_else(|| UploadError::NonUtf8Name {
            path: local_path.to_path_buf(),
        })
}

/// Build the Nexus URL a target is PUT to: `{url}/{repository}/{path}/{relative}`.
///
/// Backslashes in the relative path become forward slashes. Nothing is
/// percent-encoded, so names with spaces, `#` or `?` end up verbatim in the URL.
pub fn destination_url(config: &UploadConfig, target: &FileUploadTarget) -> String {
    let relative = target.relative_path.replace('\\', "/");
    let mut url = String::with_capacity(
        config.url.len() + config.repository.len() + config.path.len() + relative.len() + 3,
    );
    url.push_str(&config.url);
    url.push('/');
    url.push_str(&config.repository);
    url.push('/');
    url.push_str(&config.path);
    url.push('/');
    url.push_str(&relative);
    url
}

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// HTTP status Nexus answers with when an asset is stored
pub const EXPECTED_STATUS: u16 = 201;

/// Configuration fields that must be set before anything is uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Url,
    Username,
    Password,
    Files,
    Repository,
    Path,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Url => "a URL must be set",
            Self::Username => "nexus username must be set",
            Self::Password => "nexus password must be set",
            Self::Files => "files to upload must be provided",
            Self::Repository => "a repo must be set",
            Self::Path => "a path must be set",
        };
        f.write_str(msg)
    }
}

/// Errors that can occur while publishing to Nexus.
///
/// Messages embed their cause, so the top-level `Display` already reads as
/// the whole chain.
#[derive(Error, Debug)]
pub enum UploadError {
    /// A required configuration field is empty
    #[error("{0}")]
    MissingField(RequiredField),

    /// Directory walk started without a root
    #[error("current root path cannot be empty")]
    EmptyRoot,

    /// Path has no final component to use as a remote name
    #[error("could not determine file name of {}", .path.display())]
    NoFileName { path: PathBuf },

    /// Name can't be put into a URL without changing it
    #[error("file name of {} is not valid UTF-8", .path.display())]
    NonUtf8Name { path: PathBuf },

    /// Walked entry does not sit below the directory being walked
    #[error("{} is not under {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// Local stat/open/read failure
    #[error("could not access {} - {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Directory enumeration failure
    #[error("could not access file/dir - {0}")]
    Walk(#[from] walkdir::Error),

    /// Connection refused, TLS failure, timeout...
    #[error("could not upload {} - {source}", .path.display())]
    Transport {
        path: PathBuf,
        source: reqwest::Error,
    },

    /// HTTP client could not be constructed
    #[error("could not build http client - {0}")]
    Client(#[source] reqwest::Error),

    /// Server answered with something other than 201
    #[error("response was {status}, expected 201; {}", describe_body(.body))]
    Status { status: u16, body: Option<String> },

    /// Server answered with a failure and its body could not be read
    #[error("response was {status}, expected 201; could not read response body - {source}")]
    UnreadableBody { status: u16, source: reqwest::Error },

    /// Any of the above, tagged with the file or path being processed
    #[error("{context} - {source}")]
    Context {
        context: String,
        source: Box<UploadError>,
    },
}

fn describe_body(body: &Option<String>) -> String {
    match body {
        Some(body) if !body.is_empty() => format!("response body: {body}"),
        _ => "there was no response body".to_string(),
    }
}

impl UploadError {
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all context layers peeled off
    pub fn root_cause(&self) -> &UploadError {
        match self {
            Self::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Attach path context to a fallible result, like `anyhow::Context` for [`UploadError`]
pub trait ResultExt<T> {
    fn with_path_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_path_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.context(f()))
    }
}

/// Result type for Nexus upload operations
pub type Result<T> = std::result::Result<T, UploadError>;

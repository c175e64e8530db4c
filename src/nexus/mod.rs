pub mod client;
pub mod error;
pub mod upload;
pub mod url;
pub mod walk;

pub use error::{RequiredField, UploadError};
pub use walk::{UploadSummary, Uploader};

use std::fmt;

use super::error::{Result, UploadError};
use crate::config::UploadConfig;

/// HTTP client bound to one set of Nexus credentials
#[derive(Clone)]
pub struct NexusClient {
    http: reqwest::Client,
    username: String,
    password: String,
    verbose: bool,
}

impl fmt::Debug for NexusClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NexusClient")
            .field("username", &self.username)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl NexusClient {
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(concat!("endeavour/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(UploadError::Client)?;

        Ok(Self {
            http,
            username: config.username.clone(),
            password: config.password.clone(),
            verbose: config.verbose,
        })
    }

    /// A PUT to `url` with basic auth already attached
    pub fn put(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .put(url)
            .basic_auth(&self.username, Some(&self.password))
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::nexus::{RequiredField, UploadError};

/// Default environment variable holding the Nexus username
pub const DEFAULT_USER_VAR: &str = "REPO_USERNAME";

/// Default environment variable holding the Nexus password
pub const DEFAULT_PASS_VAR: &str = "REPO_PASSWORD";

/// Base URL baked in at build time, e.g. `ENDEAVOUR_DEFAULT_URL=https://nexus.corp cargo build`
pub const DEFAULT_URL: &str = match option_env!("ENDEAVOUR_DEFAULT_URL") {
    Some(url) => url,
    None => "",
};

/// Everything a single upload run needs. Built once, never mutated.
#[derive(Clone)]
pub struct UploadConfig {
    pub url: String,
    pub repository: String,
    pub path: String,
    pub username: String,
    pub password: String,
    pub verbose: bool,
    pub timeout: Option<Duration>,
    pub files: Vec<PathBuf>,
}

/// Username/password pair read from the environment
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Load credentials from the named environment variables (and a .env file if present)
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is not set
    pub fn from_env(user_var: &str, pass_var: &str) -> Result<Self> {
        dotenv::dotenv().ok();
        Self::lookup(user_var, pass_var, |name| env::var(name).ok())
    }

    fn lookup<F>(user_var: &str, pass_var: &str, get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = get(user_var).with_context(|| {
            format!("The variable {user_var} must be set and must be non-empty")
        })?;
        let password = get(pass_var).with_context(|| {
            format!("The variable {pass_var} must be set and must be non-empty")
        })?;

        Ok(Self { username, password })
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("url", &self.url)
            .field("repository", &self.repository)
            .field("path", &self.path)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verbose", &self.verbose)
            .field("timeout", &self.timeout)
            .field("files", &self.files)
            .finish()
    }
}

impl UploadConfig {
    pub fn new(
        url: impl Into<String>,
        repository: impl Into<String>,
        path: impl Into<String>,
        credentials: Credentials,
        files: Vec<PathBuf>,
    ) -> Self {
        Self {
            url: url.into(),
            repository: repository.into(),
            path: path.into(),
            username: credentials.username,
            password: credentials.password,
            verbose: false,
            timeout: None,
            files,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that every required field is present, reporting the first missing one.
    ///
    /// Fields are checked in a fixed order: URL, username, password, files,
    /// repository, path.
    pub fn validate(&self) -> std::result::Result<(), UploadError> {
        let checks = [
            (RequiredField::Url, self.url.is_empty()),
            (RequiredField::Username, self.username.is_empty()),
            (RequiredField::Password, self.password.is_empty()),
            (RequiredField::Files, self.files.is_empty()),
            (RequiredField::Repository, self.repository.is_empty()),
            (RequiredField::Path, self.path.is_empty()),
        ];

        match checks.into_iter().find(|(_, missing)| *missing) {
            Some((field, _)) => Err(UploadError::MissingField(field)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> UploadConfig {
        UploadConfig::new(
            "http://h",
            "r",
            "p",
            Credentials {
                username: "user".to_string(),
                password: "hunter2".to_string(),
            },
            vec![PathBuf::from("f.bin")],
        )
    }

    fn missing(config: &UploadConfig) -> Option<RequiredField> {
        match config.validate() {
            Err(UploadError::MissingField(field)) => Some(field),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(()) => None,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert_eq!(missing(&valid_config()), None);
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        let mut config = valid_config();
        config.url.clear();
        assert_eq!(missing(&config), Some(RequiredField::Url));

        let mut config = valid_config();
        config.username.clear();
        assert_eq!(missing(&config), Some(RequiredField::Username));

        let mut config = valid_config();
        config.password.clear();
        assert_eq!(missing(&config), Some(RequiredField::Password));

        let mut config = valid_config();
        config.files.clear();
        assert_eq!(missing(&config), Some(RequiredField::Files));

        let mut config = valid_config();
        config.repository.clear();
        assert_eq!(missing(&config), Some(RequiredField::Repository));

        let mut config = valid_config();
        config.path.clear();
        assert_eq!(missing(&config), Some(RequiredField::Path));
    }

    #[test]
    fn test_first_missing_field_wins() {
        // Password comes before repository in the check order
        let mut config = valid_config();
        config.repository.clear();
        config.password.clear();
        assert_eq!(missing(&config), Some(RequiredField::Password));

        let config = UploadConfig::new(
            "",
            "",
            "",
            Credentials {
                username: String::new(),
                password: String::new(),
            },
            Vec::new(),
        );
        assert_eq!(missing(&config), Some(RequiredField::Url));
    }

    #[test]
    fn test_missing_field_message() {
        let mut config = valid_config();
        config.path.clear();
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "a path must be set");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = valid_config();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_credentials_lookup() {
        let creds = Credentials::lookup("U", "P", |name| match name {
            "U" => Some("alice".to_string()),
            "P" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "secret");
        assert!(!format!("{creds:?}").contains("secret"));
    }

    #[test]
    fn test_credentials_missing_variable() {
        let err = Credentials::lookup("U", "P", |name| {
            (name == "U").then(|| "alice".to_string())
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The variable P must be set and must be non-empty"
        );
    }
}

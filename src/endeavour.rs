mod config;
mod nexus;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};

use config::{Credentials, DEFAULT_PASS_VAR, DEFAULT_URL, DEFAULT_USER_VAR, UploadConfig};
use nexus::{UploadError, UploadSummary, Uploader};

const ART: &str = r#"
                .                                            .
     *   .                  .              .        .   *          .
  .         .                     .       .           .      .        .
        o                             .                   .
         .              .                  .           .
          0     .
                 .          .                 ,                ,    ,
 .          \          .                         .
      .      \   ,
   .          o     .                 .                   .            .
     .         \                 ,             .                .
               #\##\#      .                              .        .
             #  #O##\###                .                        .
   .        #*#  #\##\###                       .                     ,
        .   ##*#  #\##\##               .                     .
      .      ##*#  #o##\#         .                             ,       .
          .     *#  #\#     .                    .             .          ,
                      \          .                         .
____^/\___^--____/\____O______________/\/\---/\___________---______________
   /\^   ^  ^    ^                  ^^ ^  '\ ^          ^       ---
         --           -            --  -      -         ---  __       ^
   --  __                      ___--  ^  ^                         --  __
"#;

#[derive(Parser, Debug)]
#[command(
    name = "endeavour",
    version = env!("CARGO_PKG_VERSION"),
    about = "Uploads files or directories to Nexus, for use in CI/CD",
    long_about = "Uploads files or directories to a Nexus raw repository, for use in CI/CD. \
                  Directories are walked recursively and every file is PUT under the \
                  destination path, keeping its location relative to the directory. \
                  Credentials are read from the REPO_USERNAME and REPO_PASSWORD environment \
                  variables unless other names are given.",
    after_help = "Examples:\n  \
                  endeavour -U https://nexus.example.com/repository -r raw-hosted -P app/1.0.0 app.tar.gz\n  \
                  endeavour -U https://nexus.example.com/repository -r raw-hosted -P docs ./site\n  \
                  endeavour --user-var CI_NEXUS_USER --pass-var CI_NEXUS_PASS -r raw -P x ./dist"
)]
struct Cli {
    /// Files or directories to upload
    files: Vec<PathBuf>,

    /// Nexus URL to upload to
    #[arg(short = 'U', long = "url")]
    url: Option<String>,

    /// Nexus repository to upload to
    #[arg(short = 'r', long = "repo", default_value = "")]
    repo: String,

    /// Path to publish to inside the repository
    #[arg(short = 'P', long = "path", default_value = "")]
    path: String,

    /// Environment variable holding the Nexus username
    #[arg(long, default_value = DEFAULT_USER_VAR)]
    user_var: String,

    /// Environment variable holding the Nexus password
    #[arg(long, default_value = DEFAULT_PASS_VAR)]
    pass_var: String,

    /// Don't display the art on success
    #[arg(long)]
    no_art: bool,

    /// Log extra messages (never secrets)
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Give up on a single request after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() {
    // Load .env file early to get LOG_LEVEL and credentials
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("Upload failed. Error: {}", e);
        if let Some(UploadError::MissingField(_)) =
            e.downcast_ref::<UploadError>().map(UploadError::root_cause)
        {
            eprintln!("{}", style("Run with --help to see the available options").dim());
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| if verbose { "info" } else { "warn" }.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let credentials = Credentials::from_env(&cli.user_var, &cli.pass_var)?;

    let config = UploadConfig::new(
        cli.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
        cli.repo,
        cli.path,
        credentials,
        cli.files,
    )
    .with_verbose(cli.verbose)
    .with_timeout(cli.timeout.map(Duration::from_secs));

    let mut uploader = Uploader::new(config)?;

    info!("endeavour v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Target: {}/{}/{}",
        uploader.config().url,
        uploader.config().repository,
        uploader.config().path
    );

    // Logs already name every file in verbose mode
    let pb = if cli.verbose {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")?
            .progress_chars("#>-"),
    );
    uploader = uploader.with_progress(pb.clone());

    let start = Instant::now();
    let result = uploader.run().await;
    pb.finish_and_clear();
    let summary = result?;

    print_summary(&summary, start.elapsed());
    if !cli.no_art {
        print!("{ART}");
    }

    Ok(())
}

fn print_summary(summary: &UploadSummary, elapsed: Duration) {
    println!(
        "{}",
        style(format!("All done! Completed in {elapsed:.2?}"))
            .green()
            .bold()
    );
    println!(
        "{}",
        style(format!(
            "{} file(s), {} uploaded",
            summary.files,
            format_size(summary.bytes)
        ))
        .dim()
    );
}

/// Format file size for display
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "endeavour",
            "-U",
            "http://h",
            "-r",
            "r",
            "-P",
            "p",
            "-v",
            "--no-art",
            "a.bin",
            "dist",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("http://h"));
        assert_eq!(cli.repo, "r");
        assert_eq!(cli.path, "p");
        assert!(cli.verbose);
        assert!(cli.no_art);
        assert_eq!(cli.files, vec![PathBuf::from("a.bin"), PathBuf::from("dist")]);
        assert_eq!(cli.user_var, "REPO_USERNAME");
        assert_eq!(cli.pass_var, "REPO_PASSWORD");
        assert_eq!(cli.timeout, None);
    }

    #[test]
    fn test_cli_custom_credential_vars() {
        let cli = Cli::try_parse_from([
            "endeavour",
            "--user-var",
            "CI_USER",
            "--pass-var",
            "CI_PASS",
            "--timeout",
            "30",
            "f",
        ])
        .unwrap();

        assert_eq!(cli.user_var, "CI_USER");
        assert_eq!(cli.pass_var, "CI_PASS");
        assert_eq!(cli.timeout, Some(30));
        assert_eq!(cli.url, None);
        assert!(cli.repo.is_empty());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}

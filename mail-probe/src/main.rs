//! Mail Probe CLI Application
//!
//! Reads an email list, classifies every address against the configured
//! registration endpoint with a fixed-size worker pool, and writes the
//! valid / invalid / retry lists plus a combined log.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use mail_probe_lib::{
    load_email_list, load_env_config, BatchCoordinator, ConfigManager, EnvConfig, ProbeConfig,
    ProbeError,
};
use std::io::{BufRead, Write};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for mail-probe
#[derive(Parser, Debug)]
#[command(name = "mail-probe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classify a list of email addresses against a registration endpoint")]
#[command(
    long_about = "Classify a list of email addresses against a registration endpoint.\n\n\
    The endpoint, marker text and pool size come from mail-probe.toml or MP_* environment \
    variables. Results go to valid_emails.txt, invalid_emails.txt, retry_emails.txt and \
    checker.log, which are emptied at the start of every run."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Email list file, one address per line (prompted for when omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_tracing();
    ui::print_banner();

    let file = match args.file {
        Some(file) => file,
        None => match prompt_for_file() {
            Ok(file) => file,
            Err(e) => {
                eprintln!("[ERROR] {}", e);
                process::exit(1);
            }
        },
    };

    if !Path::new(&file).is_file() {
        eprintln!("[ERROR] File not found: {}", file);
        process::exit(1);
    }

    if let Err(e) = run(&file).await {
        eprintln!("[ERROR] {}", e);
        process::exit(1);
    }
}

/// Install the tracing subscriber: `RUST_LOG` filter, stderr, default `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn prompt_for_file() -> Result<String, Box<dyn std::error::Error>> {
    print!("Enter email list file: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Main batch logic
async fn run(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(load_env_config())?;

    let emails = load_email_list(file)?;

    let coordinator = BatchCoordinator::from_config(&config).await?;
    coordinator.sink().reset().await?;

    let view = ui::ProgressView::new();
    view.start(emails.len());

    // The batch keeps going if the console goes away; the files still fill.
    let mut display_error = None;
    let summary = coordinator
        .run(&emails, |result, progress| {
            if let Err(e) = view.update(result, progress) {
                display_error.get_or_insert(e);
            }
        })
        .await;

    view.finish()?;
    ui::print_summary(&summary);

    if let Some(e) = display_error {
        return Err(e.into());
    }

    Ok(())
}

/// Build ProbeConfig from config files and environment.
///
/// Precedence order (highest to lowest):
/// 1. Environment variables (MP_*)
/// 2. Explicit config file (MP_CONFIG)
/// 3. Local config file (./mail-probe.toml)
/// 4. Global config file (~/.mail-probe.toml)
/// 5. XDG config file (~/.config/mail-probe/config.toml)
/// 6. Built-in defaults
fn build_config(env_config: EnvConfig) -> Result<ProbeConfig, ProbeError> {
    let config_manager = ConfigManager::new();

    let file_config = match &env_config.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using explicit config file (MP_CONFIG)");
            config_manager.load_file(path)?
        }
        None => config_manager.discover_and_load()?,
    };

    let config = env_config.apply_to(file_config.apply_to(ProbeConfig::default()));

    if config.endpoint.trim().is_empty() {
        return Err(ProbeError::config(
            "No probe endpoint configured. Set [probe] endpoint in mail-probe.toml or MP_ENDPOINT",
        ));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_args_single_positional() {
        let args = Args::try_parse_from(["mail-probe", "emails.txt"]).unwrap();
        assert_eq!(args.file.as_deref(), Some("emails.txt"));

        let args = Args::try_parse_from(["mail-probe"]).unwrap();
        assert!(args.file.is_none());

        assert!(Args::try_parse_from(["mail-probe", "a.txt", "b.txt"]).is_err());
        assert!(Args::try_parse_from(["mail-probe", "--pool-size", "5"]).is_err());
    }

    #[test]
    fn test_build_config_from_explicit_file_and_env() {
        let mut config_file = NamedTempFile::new().unwrap();
        writeln!(
            config_file,
            "[probe]\nendpoint = \"https://file.example.test/register\"\n\n[run]\npool_size = 20\n"
        )
        .unwrap();
        config_file.flush().unwrap();

        let env_config = EnvConfig {
            config: Some(config_file.path().to_path_buf()),
            pool_size: Some(5),
            ..Default::default()
        };

        let config = build_config(env_config).unwrap();
        assert_eq!(config.endpoint, "https://file.example.test/register");
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.max_attempts, 2);
    }

    #[test]
    fn test_build_config_missing_explicit_file() {
        let env_config = EnvConfig {
            config: Some(PathBuf::from("/no/such/mail-probe.toml")),
            ..Default::default()
        };
        assert!(build_config(env_config).is_err());
    }
}

// ABOUTME: LASCSS language server binary speaking LSP over stdio
// ABOUTME: Parses arguments, loads configuration and logging, then runs the server loop

use anyhow::{Context, Result, bail};
use lascss_logging::{LoggingConfig, error, info};
use lascss_lsp::{LspConfig, run_server};
use lsp_server::Connection;
use std::path::PathBuf;

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    display_help: bool,
    display_version: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.display_help = true,
                "-V" | "--version" => parsed.display_version = true,
                // Clients commonly pass this; stdio is the only transport
                "--stdio" => {}
                "-c" | "--config" => {
                    let path = args.next().context("--config requires a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                other => match other.strip_prefix("--config=") {
                    Some(path) => parsed.config = Some(PathBuf::from(path)),
                    None => bail!("unexpected argument: {other}"),
                },
            }
        }
        Ok(parsed)
    }
}

fn help() -> String {
    format!(
        "
{} {}
LASCSS utility class completions over the Language Server Protocol

USAGE:
    lascss-lsp [FLAGS]

FLAGS:
    -c, --config <file>    Specifies a file to use for configuration
                           (default file: {})
    -h, --help             Prints help information
    -V, --version          Prints version information
",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        LspConfig::default_path()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "none".to_string()),
    )
}

fn logging_config(config: &LspConfig) -> Result<LoggingConfig> {
    let mut logging = LoggingConfig::from_settings(&config.logging);
    // Environment wins over the config file
    logging
        .apply_env_overrides()
        .context("Invalid logging environment variables")?;
    Ok(logging)
}

fn main() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1)).context("could not parse arguments")?;

    if args.display_help {
        print!("{}", help());
        return Ok(());
    }
    if args.display_version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => LspConfig::load_from_file(path)?,
        None => LspConfig::load_default()?,
    };
    lascss_logging::init_logging_with_reload(logging_config(&config)?)?;

    info!(config_file = ?args.config, "Starting LASCSS language server");

    let (connection, io_threads) = Connection::stdio();
    let result = run_server(&connection, config);
    drop(connection);
    io_threads.join()?;

    match result {
        Ok(()) => {
            info!("LASCSS language server shut down");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Server error");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        Args::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn test_parse_config_forms() {
        assert_eq!(
            parse(&["--config", "a.toml"]).unwrap().config,
            Some(PathBuf::from("a.toml"))
        );
        assert_eq!(
            parse(&["--config=b.toml", "--stdio"]).unwrap().config,
            Some(PathBuf::from("b.toml"))
        );
        assert_eq!(parse(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
    }

    #[test]
    fn test_flags() {
        let args = parse(&["-h", "-V"]).unwrap();
        assert!(args.display_help);
        assert!(args.display_version);
    }
}

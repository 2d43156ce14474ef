//! Shell Preferences - settings window for the desktop shell
//!
//! This is the main entry point. It handles:
//! 1. CLI argument parsing (--config, --backend, headless commands)
//! 2. Logging setup
//! 3. Headless access to the settings store (--list, --get, --set, --reset)
//! 4. Launching the GTK4/Libadwaita preferences window

use anyhow::{Context, Result};
use clap::Parser;
use shellprefs::backend::{self, OpenedStore};
use shellprefs::ui::app::PrefsApplication;
use shellprefs_common::config::{self, BackendKind, PrefsConfig};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Shell Preferences
#[derive(Parser, Debug)]
#[command(name = "shellprefs")]
#[command(about = "Preferences window for the desktop shell")]
#[command(version)]
struct Args {
    /// Configuration file (default: ~/.config/shellprefs/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Settings backend: auto, gsettings, keyfile or memory
    #[arg(long, value_name = "KIND")]
    backend: Option<BackendKind>,

    /// Directory of .ui files overriding the built-in pages
    #[arg(long, value_name = "DIR")]
    pages_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print every setting with its current value
    #[arg(long, conflicts_with_all = ["get", "set", "reset"])]
    list: bool,

    /// Print the current value of KEY
    #[arg(long, value_name = "KEY", conflicts_with_all = ["set", "reset"])]
    get: Option<String>,

    /// Store VALUE under KEY
    #[arg(long, value_name = "KEY=VALUE", conflicts_with = "reset")]
    set: Option<String>,

    /// Restore the default value of KEY
    #[arg(long, value_name = "KEY")]
    reset: Option<String>,

    /// Print a template config.toml and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn is_headless(&self) -> bool {
        self.list || self.get.is_some() || self.set.is_some() || self.reset.is_some()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();

    if args.print_config {
        print!("{}", config::generate_template());
        return Ok(());
    }

    let mut config = PrefsConfig::load(args.config.as_deref())?;
    if let Some(dir) = &args.pages_dir {
        config.pages.dir = Some(dir.display().to_string());
    }
    config.validate()?;

    if args.is_headless() {
        let store = backend::open_settings(&config, args.backend)?;
        run_headless(&args, store)
    } else {
        run_gui(args, config)
    }
}

fn run_headless(args: &Args, store: OpenedStore) -> Result<()> {
    let settings = store.settings;
    debug!("Headless access via {} backend", settings.backend_name());

    if args.list {
        for (key, value) in settings.entries() {
            println!("{} = {}", key, value);
        }
    } else if let Some(key) = &args.get {
        println!("{}", settings.get(key)?);
    } else if let Some(assignment) = &args.set {
        let (key, text) = assignment
            .split_once('=')
            .with_context(|| format!("Expected KEY=VALUE, got: {}", assignment))?;
        let value = settings.schema().parse_value(key.trim(), text.trim())?;
        settings.set(key.trim(), value)?;
    } else if let Some(key) = &args.reset {
        settings.reset(key)?;
    }

    settings.flush()?;
    Ok(())
}

fn run_gui(args: Args, config: PrefsConfig) -> Result<()> {
    if std::env::var("DISPLAY").is_err() && std::env::var("WAYLAND_DISPLAY").is_err() {
        eprintln!("Error: No display server detected (X11 or Wayland).");
        eprintln!();
        eprintln!("Settings can still be read and changed without a display:");
        eprintln!("  {} --list", std::env::current_exe()?.display());
        eprintln!("  {} --set color-scheme=dark", std::env::current_exe()?.display());
        std::process::exit(1);
    }

    if let Err(e) = gtk::init() {
        eprintln!("Failed to initialize GTK4: {}", e);
        eprintln!("Please ensure GTK4 is installed on your system.");
        std::process::exit(1);
    }

    if let Err(e) = adw::init() {
        eprintln!("Failed to initialize Libadwaita: {}", e);
        eprintln!("Please ensure Libadwaita is installed on your system.");
        std::process::exit(1);
    }

    info!("Shell Preferences v{}", env!("CARGO_PKG_VERSION"));

    let app = PrefsApplication::new(config, args.backend);
    let exit_code = app.run();

    std::process::exit(exit_code.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellprefs_common::schema::COLOR_SCHEME;

    fn headless(config: &PrefsConfig, argv: &[&str]) -> Result<()> {
        let args = Args::try_parse_from(std::iter::once("shellprefs").chain(argv.iter().copied()))?;
        assert!(args.is_headless());
        run_headless(&args, backend::open_settings(config, args.backend)?)
    }

    #[test]
    fn test_headless_set_and_reset_reach_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = PrefsConfig::from_str(&format!(
            "[settings]\nbackend = \"keyfile\"\nkeyfile = {:?}\n",
            dir.path().join("settings.toml").display().to_string()
        ))
        .unwrap();

        headless(&config, &["--set", "color-scheme = dark"]).unwrap();
        let reopened = backend::open_settings(&config, None).unwrap();
        assert_eq!(reopened.settings.get_string(COLOR_SCHEME).unwrap(), "dark");

        headless(&config, &["--reset", COLOR_SCHEME]).unwrap();
        let reopened = backend::open_settings(&config, None).unwrap();
        assert_eq!(reopened.settings.get_string(COLOR_SCHEME).unwrap(), "system");
    }

    #[test]
    fn test_headless_set_rejects_missing_value() {
        let config = PrefsConfig::default();
        assert!(headless(&config, &["--backend", "memory", "--set", "color-scheme"]).is_err());
    }
}

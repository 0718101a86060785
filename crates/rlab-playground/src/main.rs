#![forbid(unsafe_code)]

//! Render Lab binary entry point.

use std::fs::File;
use std::sync::Mutex;
use std::time::Duration;

use rlab_playground::app::{AppConfig, AppModel};
use rlab_playground::cli::Opts;
use rlab_playground::theme::{ThemeStore, detect_system_theme};
use rlab_runtime::state_persistence::StateRegistry;
use rlab_runtime::{Program, ProgramConfig};
use tracing_subscriber::EnvFilter;

const APP_NAME: &str = "renderlab";

fn main() {
    let opts = Opts::parse();
    init_logging(&opts);

    let config = AppConfig {
        start_screen: opts.start_screen,
        work_factor: opts.work_factor,
        initial_theme: opts.theme,
    };
    let model = AppModel::new(config, ThemeStore::new(registry(&opts), detect_system_theme()));

    let program_config = ProgramConfig {
        exit_after: (opts.exit_after_ms > 0).then(|| Duration::from_millis(opts.exit_after_ms)),
        ..ProgramConfig::default()
    };
    match Program::with_config(model, program_config) {
        Ok(mut program) => {
            if let Err(e) = program.run() {
                eprintln!("Runtime error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    }
}

/// Tracing goes to `--log-file` only. Without one, logging stays off.
fn init_logging(opts: &Opts) {
    let Some(path) = &opts.log_file else {
        return;
    };
    let file = match File::create(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", path.display());
            std::process::exit(1);
        }
    };
    let filter = EnvFilter::try_from_env("RENDERLAB_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
    {
        eprintln!("Cannot install logger for {}: {e}", path.display());
    }
}

fn registry(opts: &Opts) -> StateRegistry {
    if opts.no_persist {
        return StateRegistry::in_memory();
    }
    file_registry(opts)
}

#[cfg(feature = "state-persistence")]
fn file_registry(opts: &Opts) -> StateRegistry {
    let path = opts
        .state_file
        .clone()
        .unwrap_or_else(|| rlab_runtime::state_persistence::default_state_path(APP_NAME));
    StateRegistry::with_file(path)
}

#[cfg(not(feature = "state-persistence"))]
fn file_registry(_opts: &Opts) -> StateRegistry {
    tracing::warn!(app = APP_NAME, "built without state-persistence; preferences are not saved");
    StateRegistry::in_memory()
}

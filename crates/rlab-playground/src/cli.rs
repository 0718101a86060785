#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Arguments are parsed by hand. Every option also has a `RENDERLAB_*`
//! environment variable; explicit flags win over the environment.

use std::env;
use std::path::PathBuf;
use std::process;

use crate::app::ScreenId;
use crate::screens::computation_playground::DEFAULT_WORK_FACTOR;
use crate::theme::ThemePreference;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
Render Lab: render optimization playgrounds

USAGE:
    renderlab [OPTIONS]

OPTIONS:
    --route=NAME         Start on route NAME: home, memo, callback, use-memo
    --screen=N           Start on screen N: 0 overview, 1-3 playgrounds (default: 1)
    --theme=THEME        Set and persist the theme: light or dark
    --state-file=PATH    Preference file (default: $XDG_STATE_HOME/renderlab/state.json)
    --no-persist         Keep preferences in memory only
    --work-factor=N      Busy-loop iterations per item in use-memo (default: 2000)
    --exit-after-ms=N    Quit after N milliseconds (0 = never)
    --log-file=PATH      Write tracing output to PATH
    --help, -h           Show this help message
    --version, -V        Show version

ROUTES:
    0  home       Overview of the playgrounds
    1  memo       Component memoization
    2  callback   Stable callback references
    3  use-memo   Cached computation

KEYBINDINGS:
    0-3             Switch screen
    Tab / Shift-Tab Cycle screens
    m               Toggle the playground's optimization
    t               Toggle light/dark theme
    q / Ctrl+C      Quit

ENVIRONMENT VARIABLES:
    RENDERLAB_ROUTE           Override --route
    RENDERLAB_SCREEN          Override --screen
    RENDERLAB_THEME           Override --theme
    RENDERLAB_STATE_FILE      Override --state-file
    RENDERLAB_NO_PERSIST      Set to 1 for --no-persist
    RENDERLAB_WORK_FACTOR     Override --work-factor
    RENDERLAB_EXIT_AFTER_MS   Override --exit-after-ms
    RENDERLAB_LOG_FILE        Override --log-file
    RENDERLAB_LOG             Log filter, e.g. debug or rlab_runtime=trace
    RENDERLAB_SYSTEM_THEME    Force the system theme: light or dark";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Starting route.
    pub start_screen: ScreenId,
    /// Theme to set at startup, if any.
    pub theme: Option<ThemePreference>,
    /// Explicit preference file.
    pub state_file: Option<PathBuf>,
    /// Use in-memory preference storage.
    pub no_persist: bool,
    pub work_factor: u32,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            start_screen: ScreenId::Memo,
            theme: None,
            state_file: None,
            no_persist: false,
            work_factor: DEFAULT_WORK_FACTOR,
            exit_after_ms: 0,
            log_file: None,
        }
    }
}

/// Outcome of parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

/// A rejected argument or environment value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError(String);

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse the process arguments and environment, exiting on `--help`,
    /// `--version` or invalid input.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("renderlab {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with environment lookups through `get_env`.
    pub fn parse_from<F>(args: &[String], get_env: F) -> Result<Parsed, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Environment first; flags below override.
        if let Some(val) = get_env("RENDERLAB_SCREEN") {
            opts.start_screen = parse_screen_number(&val, "RENDERLAB_SCREEN")?;
        }
        if let Some(val) = get_env("RENDERLAB_ROUTE") {
            opts.start_screen = parse_route(&val, "RENDERLAB_ROUTE")?;
        }
        if let Some(val) = get_env("RENDERLAB_THEME") {
            opts.theme = Some(parse_theme(&val, "RENDERLAB_THEME")?);
        }
        if let Some(val) = get_env("RENDERLAB_STATE_FILE").filter(|v| !v.is_empty()) {
            opts.state_file = Some(PathBuf::from(val));
        }
        if let Some(val) = get_env("RENDERLAB_NO_PERSIST") {
            opts.no_persist = matches!(val.trim(), "1" | "true" | "yes");
        }
        if let Some(val) = get_env("RENDERLAB_WORK_FACTOR") {
            opts.work_factor = parse_number(&val, "RENDERLAB_WORK_FACTOR")?;
        }
        if let Some(val) = get_env("RENDERLAB_EXIT_AFTER_MS") {
            opts.exit_after_ms = parse_number(&val, "RENDERLAB_EXIT_AFTER_MS")?;
        }
        if let Some(val) = get_env("RENDERLAB_LOG_FILE").filter(|v| !v.is_empty()) {
            opts.log_file = Some(PathBuf::from(val));
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--no-persist" => opts.no_persist = true,
                other => {
                    if let Some(val) = other.strip_prefix("--route=") {
                        opts.start_screen = parse_route(val, "--route")?;
                    } else if let Some(val) = other.strip_prefix("--screen=") {
                        opts.start_screen = parse_screen_number(val, "--screen")?;
                    } else if let Some(val) = other.strip_prefix("--theme=") {
                        opts.theme = Some(parse_theme(val, "--theme")?);
                    } else if let Some(val) = other.strip_prefix("--state-file=") {
                        opts.state_file = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--work-factor=") {
                        opts.work_factor = parse_number(val, "--work-factor")?;
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms = parse_number(val, "--exit-after-ms")?;
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(PathBuf::from(val));
                    } else {
                        return Err(CliError(format!("Unknown argument: {other}")));
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }
}

fn parse_route(val: &str, source: &str) -> Result<ScreenId, CliError> {
    ScreenId::from_route(val).ok_or_else(|| {
        CliError(format!(
            "Invalid {source} value: {val} (expected home, memo, callback or use-memo)"
        ))
    })
}

fn parse_screen_number(val: &str, source: &str) -> Result<ScreenId, CliError> {
    val.trim()
        .parse::<u16>()
        .ok()
        .and_then(ScreenId::from_number)
        .ok_or_else(|| CliError(format!("Invalid {source} value: {val}")))
}

fn parse_theme(val: &str, source: &str) -> Result<ThemePreference, CliError> {
    ThemePreference::parse(val)
        .ok_or_else(|| CliError(format!("Invalid {source} value: {val} (expected light or dark)")))
}

fn parse_number<T: std::str::FromStr>(val: &str, source: &str) -> Result<T, CliError> {
    val.trim()
        .parse()
        .map_err(|_| CliError(format!("Invalid {source} value: {val}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Parsed, CliError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Opts::parse_from(&args, |key| env.get(key).cloned())
    }

    fn run(args: &[&str], env: &[(&str, &str)]) -> Opts {
        match parse(args, env) {
            Ok(Parsed::Run(opts)) => opts,
            other => panic!("expected options, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = run(&[], &[]);
        assert_eq!(opts, Opts::default());
        assert_eq!(opts.start_screen, ScreenId::Memo);
        assert_eq!(opts.work_factor, DEFAULT_WORK_FACTOR);
    }

    #[test]
    fn route_and_screen_flags() {
        assert_eq!(run(&["--route=use-memo"], &[]).start_screen, ScreenId::Computation);
        assert_eq!(run(&["--screen=2"], &[]).start_screen, ScreenId::Callback);
        assert_eq!(run(&["--screen=0"], &[]).start_screen, ScreenId::Home);
        assert_eq!(run(&["--route=home"], &[]).start_screen, ScreenId::Home);
        assert!(parse(&["--screen=9"], &[]).is_err());
        assert!(parse(&["--route=nowhere"], &[]).is_err());
    }

    #[test]
    fn flags_override_environment() {
        let opts = run(
            &["--route=callback", "--theme=light"],
            &[("RENDERLAB_ROUTE", "use-memo"), ("RENDERLAB_THEME", "dark")],
        );
        assert_eq!(opts.start_screen, ScreenId::Callback);
        assert_eq!(opts.theme, Some(ThemePreference::Light));
    }

    #[test]
    fn environment_applies_without_flags() {
        let opts = run(
            &[],
            &[
                ("RENDERLAB_ROUTE", "callback"),
                ("RENDERLAB_STATE_FILE", "/tmp/rl.json"),
                ("RENDERLAB_NO_PERSIST", "1"),
                ("RENDERLAB_EXIT_AFTER_MS", "250"),
            ],
        );
        assert_eq!(opts.start_screen, ScreenId::Callback);
        assert_eq!(opts.state_file, Some(PathBuf::from("/tmp/rl.json")));
        assert!(opts.no_persist);
        assert_eq!(opts.exit_after_ms, 250);
    }

    #[test]
    fn path_and_number_flags() {
        let opts = run(
            &["--state-file=prefs.json", "--log-file=rl.log", "--work-factor=10", "--no-persist"],
            &[],
        );
        assert_eq!(opts.state_file, Some(PathBuf::from("prefs.json")));
        assert_eq!(opts.log_file, Some(PathBuf::from("rl.log")));
        assert_eq!(opts.work_factor, 10);
        assert!(opts.no_persist);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse(&["--help", "--bogus"], &[]), Ok(Parsed::Help));
        assert_eq!(parse(&["-V"], &[]), Ok(Parsed::Version));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let err = parse(&["--frobnicate"], &[]).unwrap_err();
        assert!(err.to_string().contains("--frobnicate"));
    }

    #[test]
    fn bad_environment_value_is_rejected() {
        assert!(parse(&[], &[("RENDERLAB_WORK_FACTOR", "lots")]).is_err());
    }

    #[test]
    fn help_route_count_matches_all() {
        let routes = HELP_TEXT
            .lines()
            .skip_while(|line| !line.starts_with("ROUTES:"))
            .skip(1)
            .take_while(|line| !line.trim().is_empty())
            .count();
        assert_eq!(routes, ScreenId::ALL.len());
    }

    #[test]
    fn help_text_contains_env_vars() {
        assert!(HELP_TEXT.contains("RENDERLAB_STATE_FILE"));
        assert!(HELP_TEXT.contains("RENDERLAB_LOG"));
        assert!(!VERSION.is_empty());
    }
}

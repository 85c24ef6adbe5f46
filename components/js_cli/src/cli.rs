//! Command line arguments

use clap::Parser as ClapParser;
use orchestrator::SessionConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Stateful JavaScript/TypeScript REPL
#[derive(ClapParser, Debug, Clone, PartialEq)]
#[command(name = "sandbox-repl", version, about)]
pub struct Cli {
    /// Evaluate inline code as a single submission
    #[arg(short, long, conflicts_with = "file")]
    pub eval: Option<String>,

    /// Submit a whole file as a single submission
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Restore a saved history (JSON) before anything else runs
    #[arg(short, long, value_name = "HISTORY")]
    pub recover: Option<PathBuf>,

    /// Write the session history (JSON) here on exit
    #[arg(short, long, value_name = "HISTORY")]
    pub save: Option<PathBuf>,

    /// Skip the CDN reachability probe and use the primary host
    #[arg(long)]
    pub no_probe: bool,

    /// Primary CDN host for package imports
    #[arg(long, value_name = "HOST")]
    pub cdn_host: Option<String>,

    /// Host used when the primary CDN is unreachable
    #[arg(long, value_name = "HOST")]
    pub mirror_host: Option<String>,

    /// Milliseconds before the executing indicator is shown
    #[arg(long, value_name = "MS")]
    pub grace_ms: Option<u64>,

    /// Nesting depth of rendered values
    #[arg(long, value_name = "DEPTH")]
    pub inspect_depth: Option<usize>,

    /// More log output on stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Builds the session configuration, starting from the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use js_cli::Cli;
    ///
    /// let cli = Cli::parse_from(["sandbox-repl", "--no-probe", "--inspect-depth", "4"]);
    /// let config = cli.session_config();
    /// assert!(!config.cdn.probe);
    /// assert_eq!(config.inspect_depth, 4);
    /// ```
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::default();
        if self.no_probe {
            config.cdn.probe = false;
        }
        if let Some(host) = &self.cdn_host {
            config.cdn.primary_host = host.clone();
        }
        if let Some(host) = &self.mirror_host {
            config.cdn.mirror_host = host.clone();
        }
        if let Some(ms) = self.grace_ms {
            config.grace_period = Duration::from_millis(ms);
        }
        if let Some(depth) = self.inspect_depth {
            config.inspect_depth = depth;
        }
        config
    }

    /// True when no one-shot submission was given.
    pub fn is_interactive(&self) -> bool {
        self.eval.is_none() && self.file.is_none()
    }
}

use std::fmt;
use std::path::PathBuf;

use simulation::config::CanopyConfig;
use simulation::config_error::ConfigError;
use simulation::sensor_feed::FeedSource;

pub const USAGE: &str = "\
Usage: canopy [OPTIONS]

Options:
  --config <PATH>  Load settings from a JSON file (default: $CANOPY_CONFIG)
  --feed <PATH>    Replay a scripted JSON feed instead of the configured one
  --loop           Loop the scripted feed given with --feed
  --debug          Start with the statistics overlay shown (toggle: F3)
  -h, --help       Print this help";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub feed: Option<PathBuf>,
    pub looping: bool,
    pub debug: bool,
    pub help: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    MissingValue(&'static str),
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::MissingValue(flag) => write!(f, "{flag} needs a value"),
            CliError::UnknownArgument(arg) => write!(f, "unknown argument '{arg}'"),
        }
    }
}

impl std::error::Error for CliError {}

pub fn parse_args<I>(args: I) -> Result<CliArgs, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().ok_or(CliError::MissingValue("--config"))?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--feed" => {
                let value = args.next().ok_or(CliError::MissingValue("--feed"))?;
                parsed.feed = Some(PathBuf::from(value));
            }
            "--loop" => parsed.looping = true,
            "--debug" => parsed.debug = true,
            "-h" | "--help" => parsed.help = true,
            _ => return Err(CliError::UnknownArgument(arg)),
        }
    }
    Ok(parsed)
}

/// Resolve the config: `--config`, then `env_path`, then defaults. Command
/// line overrides are applied before validation.
pub fn load_config(args: &CliArgs, env_path: Option<PathBuf>) -> Result<CanopyConfig, ConfigError> {
    let mut config = match args.config.clone().or(env_path) {
        Some(path) => CanopyConfig::load(&path)?,
        None => CanopyConfig::default(),
    };
    if let Some(path) = &args.feed {
        config.feed.source = FeedSource::Scripted {
            path: path.clone(),
            looping: args.looping,
        };
    }
    if args.debug {
        config.debug = true;
    }
    config.validate()?;
    Ok(config)
}

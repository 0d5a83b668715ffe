use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use flexi_logger::{colored_default_format, detailed_format, Logger, LoggerHandle, WriteMode};
use log::LevelFilter;

#[derive(Args)]
#[derive(Debug)]
#[group(id = "bootstrap")]
pub struct Params {
    /// More output per occurrence, repeat to ✨ intensify ✨
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Less output per occurrence. Has no short form since `-q` sets the traceroute retries.
    #[arg(long, action = ArgAction::Count, global = true, conflicts_with = "verbose")]
    quiet: u8,

    /// Use a flexi_logger configuration file
    #[arg(long = "log-spec")]
    use_log_spec: bool,

    /// Path to log spec
    #[arg(long, value_name = "TOML FILE", default_value = "logspec.toml")]
    log_spec_file: std::path::PathBuf,
}

impl Params {
    /// Info by default, each -v moves one level further down, each --quiet one level up.
    pub fn level_filter(&self) -> LevelFilter {
        let info = 3i16;
        match info + self.verbose as i16 - self.quiet as i16 {
            i16::MIN..=0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

pub fn configure_from(params: &Params) -> Result<LoggerHandle> {
    let log_builder = Logger::try_with_env_or_str(params.level_filter().to_string())
        .context("Failed to parse logger spec from env RUST_LOG or cli level")?
        .write_mode(WriteMode::Async)
        // stdout carries the report, keep it clean
        .format_for_stderr(colored_default_format)
        .format_for_files(detailed_format);

    match (&params.use_log_spec, &params.log_spec_file) {
        (true, specfile_path) => log_builder
            .start_with_specfile(specfile_path)
            .with_context(|| format!("Failed to start logger with specfile {:?}", *specfile_path)),
        (false, _) => log_builder
            .start().context("Failed to start logger handle w/o specfile")
    }
}

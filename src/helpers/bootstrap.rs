use std::time::Duration;

use anyhow::{Context, Result};
use human_panic::setup_panic;
use log::debug;

use crate::helpers::logging;

pub fn run<CliType>(
    fn_cli_parse: fn() -> CliType,
    fn_extract_logging: fn(&CliType) -> &logging::Params,
    fn_run: fn(CliType) -> Result<()>,
) -> Result<()> {
    setup_panic!();
    // .env is optional here, all settings have CLI defaults
    let dotenv_result = dotenvy::dotenv();

    let cli = fn_cli_parse();
    let logger_handle = logging::configure_from(fn_extract_logging(&cli))?;
    match dotenv_result {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(env_err) if env_err.not_found() => debug!("No `.env` file found, using CLI & env only"),
        Err(env_err) => return Err(env_err).with_context(|| "Failed to load `.env` file"),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "Failed to start Tokio runtime")?;
    let command_result = {
        let _guard = runtime.enter();
        fn_run(cli)
    };

    debug!("Waiting up to 15 seconds for remaining tasks to finish");
    runtime.shutdown_timeout(Duration::from_secs(15));

    // Important with non-direct write mode
    // Handle needs to be kept alive until end of program
    logger_handle.flush();

    command_result
}

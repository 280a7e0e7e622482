use ferrous_lookup_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        timeout_ms = config.lookup.timeout_ms,
        dispatch_mode = ?config.lookup.dispatch_mode,
        local_records = config.local_records.len(),
        "Configuration loaded"
    );

    Ok(config)
}

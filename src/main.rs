use anyhow::Context;
use clap::Parser;

use covid_dash::config::Cli;
use covid_dash::data::build_processed_table;
use covid_dash::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let settings = cli.into_settings()?;

    // The table is read once here and shared read-only with every request.
    let table = build_processed_table(&settings.data, &settings.window, settings.date_policy)
        .inspect_err(|e| log::error!("Cannot start without data: {e}"))
        .with_context(|| format!("loading {}", settings.data.display()))?;

    let state = AppState::new(table, &settings.default_country);
    server::serve(settings.addr, state).await
}

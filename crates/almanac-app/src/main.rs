use almanac_app::cli::CliArgs;
use almanac_app::input::CalendarFile;
use almanac_app::report::write_occurrences;
use almanac_core::config::load_config;
use almanac_service::calendar::recurrence::RecurrenceService;
use almanac_service::calendar::service::CalendarService;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let args = CliArgs::parse();

    let config = load_config()?;

    tracing::debug!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let recurrence = RecurrenceService::from_config(&config.recurrence)?;
    let source = CalendarFile::read(&args.input)?.into_source()?;
    let calendar = CalendarService::new(source, recurrence);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let written = write_occurrences(&calendar, &args, &mut out)?;

    tracing::info!(written, input = %args.input.display(), "Occurrences written");

    Ok(())
}

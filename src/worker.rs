use crate::config::AppConfig;
use crate::data_structures::{reload_holdings, SharedData};
use tracing::{debug, info, instrument, warn};

/// Periodically re-read the data folder so newly collected days show up
/// without a restart.
#[instrument(skip(data, config), fields(data_dir = %config.data_dir.display()))]
pub async fn run(data: SharedData, config: AppConfig) {
    if config.reload_interval.is_zero() {
        info!("Reload interval is zero, background reload disabled");
        return;
    }

    info!(interval = ?config.reload_interval, "Starting holdings reload worker");
    let mut interval = tokio::time::interval(config.reload_interval);
    // The first tick fires immediately and startup has already loaded
    interval.tick().await;

    let mut iteration_count: u64 = 0;
    loop {
        interval.tick().await;
        iteration_count += 1;
        debug!(iteration = iteration_count, "Starting reload cycle");

        match reload_holdings(&data, config.data_dir.clone()).await {
            Ok(status) => info!(
                iteration = iteration_count,
                months = status.months.len(),
                records = status.records,
                "Reloaded holdings"
            ),
            Err(e) => warn!(iteration = iteration_count, error = %e, "Reload failed, keeping previous dataset"),
        }
    }
}

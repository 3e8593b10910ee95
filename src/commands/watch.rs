use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::services::{top_k, RankBy};

use super::{build_scanner, local_timestamp, print_ranked_table, send_summary};

pub fn run(interval_secs: u64, top: usize, by: &str, notify: bool) {
    let by = match RankBy::from_str(by) {
        Ok(by) => by,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let config = AppConfig::from_env();
    if let Err(e) = run_loop(&config, interval_secs.max(5), top, by, notify) {
        eprintln!("❌ Watch failed to start: {}", e);
        std::process::exit(1);
    }
}

fn run_loop(config: &AppConfig, interval_secs: u64, top: usize, by: RankBy, notify: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let scanner = build_scanner(config)?;
        let universe = config.universe();
        let mut iteration = 0u64;

        info!(interval_secs = interval_secs, symbols = universe.len(), "Starting watch loop");

        // per-cycle failures are logged and the loop carries on
        loop {
            iteration += 1;
            let cycle_start = std::time::Instant::now();

            println!("\n━━━ Cycle {} ({}) ━━━", iteration, local_timestamp(config));
            let results = scanner.scan(&universe).await;
            let ranked = top_k(results, by, top);
            print_ranked_table(&ranked);

            if notify && !ranked.is_empty() {
                match send_summary(config, &ranked).await {
                    Ok(report) => {
                        let delivered = report.values().filter(|d| d.ok).count();
                        info!(iteration = iteration, delivered = delivered, total = report.len(), "Summary sent");
                    }
                    Err(e) => {
                        error!(iteration = iteration, error = %e, "Failed to send summary");
                    }
                }
            }

            info!(
                iteration = iteration,
                cycle_secs = cycle_start.elapsed().as_secs_f64(),
                next_cycle_secs = interval_secs,
                "Watch cycle completed"
            );
            sleep(Duration::from_secs(interval_secs)).await;
        }
    })
}

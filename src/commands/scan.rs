use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::services::{top_k, RankBy};

use super::{build_scanner, local_timestamp, print_delivery_report, print_ranked_table, send_summary};

pub fn run(top: usize, by: &str, notify: bool) {
    let by = match RankBy::from_str(by) {
        Ok(by) => by,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let config = AppConfig::from_env();
    match run_scan(&config, top, by, notify) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Scan failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_scan(config: &AppConfig, top: usize, by: RankBy, notify: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let scanner = build_scanner(config)?;
        let universe = config.universe();

        println!("🔍 Scanning {} symbols ({})...", universe.len(), local_timestamp(config));
        let results = scanner.scan(&universe).await;
        let ranked = top_k(results, by, top);

        print_ranked_table(&ranked);

        if notify {
            let report = send_summary(config, &ranked).await?;
            print_delivery_report(&report);
        }
        Ok(())
    })
}

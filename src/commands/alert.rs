use tracing::info;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::services::{top_k, RankBy, RecipientBook};

use super::{
    build_scanner, destinations, print_delivery_report, send_summary, telegram_client,
};

pub fn run(top: usize, by: &str, discover: bool, test: bool) {
    let by = match RankBy::from_str(by) {
        Ok(by) => by,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let config = AppConfig::from_env();
    match run_alert(&config, top, by, discover, test) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Alert failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_alert(config: &AppConfig, top: usize, by: RankBy, discover: bool, test: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let client = telegram_client(config)?;

        if discover {
            let sender_ids = client.poll_sender_ids().await?;
            let book = RecipientBook::new(config.recipients_file.clone());
            let added = book.merge(&sender_ids)?;
            info!(seen = sender_ids.len(), added = added, "Inbox discovery completed");
            println!("📬 Discovery: {} senders seen, {} new recorded", sender_ids.len(), added);
        }

        if test {
            let chat_ids = destinations(config);
            if chat_ids.is_empty() {
                return Err(Error::Config(
                    "No Telegram destinations configured".to_string(),
                ));
            }
            let message = "<b>Test message from niftypulse</b>\nIf you can read this, alerts are wired up.";
            let report = client.send_message(message, &chat_ids).await;
            print_delivery_report(&report);
            return Ok(());
        }

        let scanner = build_scanner(config)?;
        let universe = config.universe();
        println!("🔍 Scanning {} symbols for the alert...", universe.len());
        let results = scanner.scan(&universe).await;
        let ranked = top_k(results, by, top);

        let report = send_summary(config, &ranked).await?;
        print_delivery_report(&report);
        Ok(())
    })
}

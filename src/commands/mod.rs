pub mod alert;
pub mod portfolio;
pub mod scan;
pub mod status;
pub mod watch;

use chrono::Utc;
use std::collections::HashMap;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::models::AnalysisResult;
use crate::services::{
    format_ranked_summary, Delivery, MarketDataFetcher, RecipientBook, RetryPolicy, Scanner,
    TelegramClient,
};

/// Build the fetcher+scanner pair the way every command needs it.
pub(crate) fn build_scanner(config: &AppConfig) -> Result<Scanner> {
    let fetcher = MarketDataFetcher::new(config.data_dir.clone(), RetryPolicy::default())?;
    Ok(Scanner::new(fetcher, config.concurrency))
}

/// Now, rendered in the configured timezone.
pub(crate) fn local_timestamp(config: &AppConfig) -> String {
    Utc::now()
        .with_timezone(&config.timezone)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}

/// Telegram client from config; a missing token is a configuration error
/// surfaced only when a notification is actually requested.
pub(crate) fn telegram_client(config: &AppConfig) -> Result<TelegramClient> {
    let token = config
        .telegram_bot_token
        .clone()
        .ok_or_else(|| Error::Config("TELEGRAM_BOT_TOKEN is not set".to_string()))?;
    TelegramClient::new(token)
}

/// Destinations: hardcoded config ids first, then ids learned from the inbox,
/// deduplicated in that order.
pub(crate) fn destinations(config: &AppConfig) -> Vec<String> {
    let book = RecipientBook::new(config.recipients_file.clone());
    let mut ids = config.telegram_chat_ids.clone();
    for id in book.load() {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Send the ranked summary to every destination, returning per-chat outcomes.
pub(crate) async fn send_summary(
    config: &AppConfig,
    ranked: &[AnalysisResult],
) -> Result<HashMap<String, Delivery>> {
    let client = telegram_client(config)?;
    let chat_ids = destinations(config);
    if chat_ids.is_empty() {
        return Err(Error::Config(
            "No Telegram destinations configured (TELEGRAM_CHAT_IDS or recipients file)"
                .to_string(),
        ));
    }
    let message = format_ranked_summary(ranked, &local_timestamp(config));
    Ok(client.send_message(&message, &chat_ids).await)
}

/// Print the ranked table to stdout.
pub(crate) fn print_ranked_table(ranked: &[AnalysisResult]) {
    if ranked.is_empty() {
        println!("⚠️  No data available right now. Check logs for per-symbol failures.");
        return;
    }

    println!(
        "{:<4} {:<12} {:>10} {:>9} {:>6}  {:<12} {:>8}",
        "#", "Symbol", "Price", "%Change", "Score", "Signal", "Proj 5d"
    );
    for (i, r) in ranked.iter().enumerate() {
        let projected = r.projection.last().copied().unwrap_or(0.0);
        println!(
            "{:<4} {:<12} {:>10.2} {:>8.2}% {:>6}  {:<12} {:>7.2}%",
            i + 1,
            r.symbol,
            r.current_price,
            r.percent_change,
            r.score,
            r.signal.to_string(),
            projected,
        );
    }
}

/// Print per-destination delivery outcomes.
pub(crate) fn print_delivery_report(report: &HashMap<String, Delivery>) {
    let mut chat_ids: Vec<&String> = report.keys().collect();
    chat_ids.sort();
    for chat_id in chat_ids {
        let delivery = &report[chat_id];
        if delivery.ok {
            println!("✅ {} delivered", chat_id);
        } else {
            println!(
                "❌ {} failed: {}",
                chat_id,
                delivery.detail.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

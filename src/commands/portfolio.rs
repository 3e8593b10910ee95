use chrono::Utc;
use std::collections::HashMap;

use crate::cli::PortfolioAction;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::models::Portfolio;
use crate::services::{format_stop_loss_alert, MarketDataFetcher, RetryPolicy};

use super::{destinations, print_delivery_report, telegram_client};

pub fn run(action: PortfolioAction) {
    let config = AppConfig::from_env();
    let outcome = match action {
        PortfolioAction::Buy {
            symbol,
            price,
            quantity,
        } => buy(&config, &symbol, price, quantity),
        PortfolioAction::Sell { symbol } => sell(&config, &symbol),
        PortfolioAction::List => list(&config),
        PortfolioAction::Check { notify } => check(&config, notify),
    };

    if let Err(e) = outcome {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn buy(config: &AppConfig, symbol: &str, price: f64, quantity: i64) -> Result<()> {
    if price <= 0.0 || quantity <= 0 {
        return Err(Error::InvalidInput(
            "price and quantity must be positive".to_string(),
        ));
    }
    let symbol = symbol.to_uppercase();
    let mut portfolio = Portfolio::from_file(&config.portfolio_file)?;
    let now = Utc::now().with_timezone(&config.timezone).to_rfc3339();
    portfolio.buy(&symbol, price, quantity, now);
    portfolio.save(&config.portfolio_file)?;
    println!("✅ Bought {} x {} @ ₹{:.2}", quantity, symbol, price);
    Ok(())
}

fn sell(config: &AppConfig, symbol: &str) -> Result<()> {
    let symbol = symbol.to_uppercase();
    let mut portfolio = Portfolio::from_file(&config.portfolio_file)?;
    match portfolio.sell(&symbol) {
        Some(entry) => {
            portfolio.save(&config.portfolio_file)?;
            println!(
                "✅ Sold {} ({} held since {})",
                symbol, entry.quantity, entry.datetime
            );
            Ok(())
        }
        None => Err(Error::NotFound(format!("{} is not in the portfolio", symbol))),
    }
}

fn list(config: &AppConfig) -> Result<()> {
    let portfolio = Portfolio::from_file(&config.portfolio_file)?;
    if portfolio.is_empty() {
        println!("Portfolio is empty.");
        return Ok(());
    }

    println!(
        "{:<12} {:>10} {:>8} {:>12} {:>8}  {}",
        "Symbol", "Entry", "Qty", "Value", "Capital%", "Since"
    );
    for (symbol, entry) in &portfolio.entries {
        let value = entry.entry_price * entry.quantity as f64;
        let share = if config.total_capital > 0.0 {
            value / config.total_capital * 100.0
        } else {
            0.0
        };
        println!(
            "{:<12} {:>10.2} {:>8} {:>12.2} {:>7.2}%  {}",
            symbol, entry.entry_price, entry.quantity, value, share, entry.datetime
        );
    }
    Ok(())
}

fn check(config: &AppConfig, notify: bool) -> Result<()> {
    let portfolio = Portfolio::from_file(&config.portfolio_file)?;
    if portfolio.is_empty() {
        println!("Portfolio is empty, nothing to check.");
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let fetcher = MarketDataFetcher::new(config.data_dir.clone(), RetryPolicy::default())?;

        // current close per held symbol; unfetchable symbols are skipped
        let mut prices: HashMap<String, f64> = HashMap::new();
        for symbol in portfolio.entries.keys() {
            if let Some(bars) = fetcher.fetch(symbol).await {
                if let Some(last) = bars.last() {
                    prices.insert(symbol.clone(), last.close);
                }
            }
        }

        let breaches = portfolio.breaches(&prices, config.stop_loss_percent);
        if breaches.is_empty() {
            println!(
                "✅ No stop-loss breaches ({} positions, threshold {:.1}%)",
                portfolio.entries.len(),
                config.stop_loss_percent
            );
            return Ok(());
        }

        println!("⚠️  {} stop-loss breach(es):", breaches.len());
        for b in &breaches {
            println!(
                "   {} entry ₹{:.2} → now ₹{:.2} ({:.2}% down, qty {})",
                b.symbol, b.entry_price, b.current_price, b.loss_percent, b.quantity
            );
        }

        if notify {
            let client = telegram_client(config)?;
            let chat_ids = destinations(config);
            if chat_ids.is_empty() {
                return Err(Error::Config(
                    "No Telegram destinations configured".to_string(),
                ));
            }
            let message = format_stop_loss_alert(&breaches, config.partial_sell_percent);
            let report = client.send_message(&message, &chat_ids).await;
            print_delivery_report(&report);
        }
        Ok(())
    })
}

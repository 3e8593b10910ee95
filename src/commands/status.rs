use crate::config::AppConfig;
use crate::services::{cache_overview, get_cache_stats};

pub fn run() {
    let config = AppConfig::from_env();

    println!("📊 Fallback Cache Status\n");
    match show_status(&config) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn show_status(config: &AppConfig) -> crate::error::Result<()> {
    let stats = get_cache_stats(&config.data_dir)?;

    if !stats.has_data {
        println!(
            "⚠️  No cached data in {} yet. Run 'scan' first.",
            config.data_dir.display()
        );
        return Ok(());
    }

    println!("📁 Cache dir: {}", config.data_dir.display());
    println!("📈 Cached symbols: {}\n", stats.total_symbols);

    println!(
        "{:<14} {:>6}  {:<12} {:<12} {:>10}",
        "Symbol", "Rows", "First", "Last", "Close"
    );
    for info in cache_overview(&config.data_dir)? {
        println!(
            "{:<14} {:>6}  {:<12} {:<12} {:>10.2}",
            info.symbol, info.rows, info.first_date, info.last_date, info.last_close
        );
    }

    Ok(())
}

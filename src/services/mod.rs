pub mod cache;
pub mod fetcher;
pub mod market_stats;
pub mod ranker;
pub mod retry;
pub mod telegram;
pub mod yahoo;

pub use cache::BarCache;
pub use fetcher::MarketDataFetcher;
pub use market_stats::{cache_overview, get_cache_stats, CacheFileInfo, CacheStats};
pub use ranker::{fetch_and_analyze, rank, top_k, RankBy, Scanner};
pub use retry::RetryPolicy;
pub use telegram::{
    format_ranked_summary, format_stop_loss_alert, Delivery, RecipientBook, TelegramClient,
};
pub use yahoo::YahooClient;

mod analysis_result;
mod bar;
mod portfolio;
mod signal;

pub use analysis_result::AnalysisResult;
pub use bar::Bar;
pub use portfolio::{Portfolio, PortfolioEntry, StopLossBreach};
pub use signal::Signal;

use serde::Serialize;

use crate::analysis::IndicatorSnapshot;
use crate::models::{Bar, Signal};

/// One symbol's output for a scan cycle.
///
/// Created fresh on every cycle and never persisted as an entity; the bar
/// series is kept alongside for the CSV cache and for debugging.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub symbol: String,

    /// Latest close in the fetched window
    pub current_price: f64,

    /// Percent change from the first to the last close of the window
    pub percent_change: f64,

    /// Heuristic score in [0,100]; 0 is also the insufficient-data floor
    pub score: u8,

    pub signal: Signal,

    /// Latest indicator values the score was derived from
    pub snapshot: IndicatorSnapshot,

    /// Projected cumulative percent change for day offsets 1..=N
    pub projection: Vec<f64>,

    /// Underlying series (not serialized; cached separately as CSV)
    #[serde(skip)]
    pub bars: Vec<Bar>,
}

use serde::{Deserialize, Serialize};

/// The settled result of a single trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeResult {
    Win,
    Loss,
}

impl TradeResult {
    pub fn is_win(&self) -> bool {
        matches!(self, TradeResult::Win)
    }
}

impl From<bool> for TradeResult {
    fn from(won: bool) -> Self {
        if won { TradeResult::Win } else { TradeResult::Loss }
    }
}

/// Which persistence engine backs the counter store and the outcome log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

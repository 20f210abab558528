use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::ai::QTable;

/// Summary of a saved Q-table, stored in the file and in the `.meta.json` sidecar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QTableMetadata {
    pub entries: usize,
    pub games_trained: u64,
    /// Sum of visit counts over all entries.
    pub total_updates: u64,
    pub alpha: f64,
    /// Seconds since the Unix epoch.
    pub saved_at: u64,
}

impl QTableMetadata {
    pub fn describe(table: &QTable, games_trained: u64, alpha: f64) -> Self {
        QTableMetadata {
            entries: table.len(),
            games_trained,
            total_updates: table.total_visits(),
            alpha,
            saved_at: unix_now(),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

use crate::stats::action::ActionType;
use crate::stats::record::StatRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One line of the tracking page's stat history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub player_id: i64,
    pub player_name: String,
    pub action_type: ActionType,
    pub category: &'static str,
    pub label: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Stat history of a single game being tracked.
#[derive(Debug, Clone, Default)]
pub struct StatHistory {
    records: Vec<StatRecord>,
}

impl StatHistory {
    pub fn new(game_id: i64, records: Vec<StatRecord>) -> Self {
        let records = records
            .into_iter()
            .filter(|r| r.game_id == game_id)
            .collect();
        StatHistory { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record an undo removes: latest timestamp, highest id on ties.
    pub fn latest(&self) -> Option<&StatRecord> {
        self.records
            .iter()
            .max_by_key(|r| (r.timestamp, r.id))
    }

    pub fn remove(&mut self, stat_id: i64) -> Option<StatRecord> {
        let index = self.records.iter().position(|r| r.id == stat_id)?;
        Some(self.records.remove(index))
    }

    /// Entries newest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let mut sorted: Vec<&StatRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        sorted
            .into_iter()
            .map(|r| HistoryEntry {
                id: r.id,
                player_id: r.player_id,
                player_name: r
                    .player_name
                    .clone()
                    .unwrap_or_else(|| "Unknown Player".to_string()),
                action_type: r.action_type,
                category: r.action_type.display_name(),
                label: r.detail.label(),
                timestamp: r.timestamp,
            })
            .collect()
    }
}

use crate::stats::action::ActionType;
use crate::stats::record::Timestamp;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct BaseStatInput {
    pub player_id: i64,
    /// Redundant with the path; must match it when given.
    pub game_id: Option<i64>,
    pub action_type: ActionType,
    pub timestamp: Option<Timestamp>,
}

/// Normalized create payload: a base record plus the detail block for its type.
#[derive(Debug, Deserialize)]
pub struct CreateStatRequest {
    pub base_stat: BaseStatInput,
    pub serve_stat: Option<Value>,
    pub receive_stat: Option<Value>,
    pub attack_stat: Option<Value>,
    pub block_stat: Option<Value>,
    pub dig_stat: Option<Value>,
    pub set_stat: Option<Value>,
}

impl CreateStatRequest {
    /// Detail blocks that were sent, keyed like the payload.
    pub fn detail_blocks(self) -> Vec<(&'static str, Value)> {
        [
            ("serve_stat", self.serve_stat),
            ("receive_stat", self.receive_stat),
            ("attack_stat", self.attack_stat),
            ("block_stat", self.block_stat),
            ("dig_stat", self.dig_stat),
            ("set_stat", self.set_stat),
        ]
        .into_iter()
        .filter_map(|(key, block)| block.map(|b| (key, b)))
        .collect()
    }
}

/// Fast-entry button press.
#[derive(Debug, Deserialize)]
pub struct QuickStatRequest {
    pub player_id: i64,
    pub category: String,
    pub action: String,
    pub timestamp: Option<Timestamp>,
}

/// Flat payload of `/api/stats/{action-type}/`: base fields with the detail
/// fields alongside them.
#[derive(Debug, Deserialize)]
pub struct FlatStatPayload {
    pub game_id: i64,
    pub player_id: i64,
    pub action_type: Option<ActionType>,
    pub timestamp: Option<Timestamp>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

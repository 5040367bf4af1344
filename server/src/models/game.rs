use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub id: i64,
    pub date: NaiveDate,
    pub team1: Vec<i64>,
    pub team2: Vec<i64>,
    pub num_sets: Option<i64>,
    pub score: String,
}

/// Accepts both the `team1`/`team2` and `my_team`/`opponent_team` spellings.
/// `null` entries stand for line-up slots the user left empty.
#[derive(Debug, Deserialize)]
pub struct GameCreate {
    pub date: Option<NaiveDate>,
    #[serde(alias = "my_team")]
    pub team1: Vec<Option<i64>>,
    #[serde(alias = "opponent_team")]
    pub team2: Vec<Option<i64>>,
    pub num_sets: Option<i64>,
    pub score: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GameUpdate {
    pub score: String,
}

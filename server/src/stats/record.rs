use crate::error::AppError;
use crate::stats::action::{
    ActionType, AttackDirection, AttackType, DigQuality, ServeType, SetType,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

const MAX_OPPONENT_PASS_QUALITY: u8 = 2;
const MAX_PASS_RATING: u8 = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServeDetail {
    #[serde(default, alias = "is_missed")]
    pub is_missed_serve: bool,
    #[serde(default)]
    pub is_ace: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serve_type: Option<ServeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serve_target: Option<String>,
    /// Always present on output, `null` when unrated.
    #[serde(default)]
    pub opponent_pass_quality: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiveDetail {
    #[serde(default)]
    pub is_good_pass: bool,
    #[serde(default, alias = "is_error")]
    pub is_receive_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_rating: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackDetail {
    #[serde(default)]
    pub is_kill: bool,
    #[serde(default, alias = "is_error")]
    pub is_attack_error: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_direction: Option<AttackDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_type: Option<AttackType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDetail {
    #[serde(default, alias = "is_stuff")]
    pub is_stuff_block: bool,
    #[serde(default, alias = "is_touch")]
    pub is_soft_touch: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigDetail {
    #[serde(default, alias = "is_successful")]
    pub is_successful_dig: bool,
    #[serde(default, alias = "led_to_kill")]
    pub dig_led_to_kill: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dig_quality: Option<DigQuality>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetDetail {
    #[serde(default, alias = "is_error")]
    pub is_set_error: bool,
    #[serde(default, alias = "is_killable")]
    pub is_killable_set: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_type: Option<SetType>,
}

/// The category-specific half of a stat record. Exactly one block per record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatDetail {
    Serving(ServeDetail),
    ServeReceive(ReceiveDetail),
    Attack(AttackDetail),
    Block(BlockDetail),
    Dig(DigDetail),
    Set(SetDetail),
}

impl StatDetail {
    pub fn action_type(&self) -> ActionType {
        match self {
            StatDetail::Serving(_) => ActionType::Serving,
            StatDetail::ServeReceive(_) => ActionType::ServeReceive,
            StatDetail::Attack(_) => ActionType::Attack,
            StatDetail::Block(_) => ActionType::Block,
            StatDetail::Dig(_) => ActionType::Dig,
            StatDetail::Set(_) => ActionType::Set,
        }
    }

    /// A block with every flag cleared and no optional fields.
    pub fn empty(action_type: ActionType) -> Self {
        match action_type {
            ActionType::Serving => StatDetail::Serving(ServeDetail::default()),
            ActionType::ServeReceive => StatDetail::ServeReceive(ReceiveDetail::default()),
            ActionType::Attack => StatDetail::Attack(AttackDetail::default()),
            ActionType::Block => StatDetail::Block(BlockDetail::default()),
            ActionType::Dig => StatDetail::Dig(DigDetail::default()),
            ActionType::Set => StatDetail::Set(SetDetail::default()),
        }
    }

    /// Decodes the detail fields for `action_type` out of a JSON object.
    /// Keys belonging to other categories are ignored.
    pub fn from_fields(action_type: ActionType, fields: serde_json::Value) -> Result<Self, AppError> {
        let invalid =
            |e: serde_json::Error| AppError::Validation(format!("Invalid {} fields: {}", action_type, e));
        let detail = match action_type {
            ActionType::Serving => StatDetail::Serving(serde_json::from_value(fields).map_err(invalid)?),
            ActionType::ServeReceive => {
                StatDetail::ServeReceive(serde_json::from_value(fields).map_err(invalid)?)
            }
            ActionType::Attack => StatDetail::Attack(serde_json::from_value(fields).map_err(invalid)?),
            ActionType::Block => StatDetail::Block(serde_json::from_value(fields).map_err(invalid)?),
            ActionType::Dig => StatDetail::Dig(serde_json::from_value(fields).map_err(invalid)?),
            ActionType::Set => StatDetail::Set(serde_json::from_value(fields).map_err(invalid)?),
        };
        detail.validate()?;
        Ok(detail)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            StatDetail::Serving(d) => {
                if let Some(q) = d.opponent_pass_quality {
                    if q > MAX_OPPONENT_PASS_QUALITY {
                        return Err(AppError::Validation(format!(
                            "opponent_pass_quality must be 0-{}",
                            MAX_OPPONENT_PASS_QUALITY
                        )));
                    }
                }
            }
            StatDetail::ServeReceive(d) => {
                if let Some(r) = d.pass_rating {
                    if r > MAX_PASS_RATING {
                        return Err(AppError::Validation(format!(
                            "pass_rating must be 0-{}",
                            MAX_PASS_RATING
                        )));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Short label for the stat history list. A record with no flag set reads as
    /// the category's neutral outcome ("In", "Normal", ...).
    pub fn label(&self) -> &'static str {
        match self {
            StatDetail::Serving(d) => {
                if d.is_ace {
                    "Ace"
                } else if d.is_missed_serve {
                    "Miss"
                } else {
                    "In"
                }
            }
            StatDetail::ServeReceive(d) => {
                if d.is_good_pass {
                    "Good"
                } else if d.is_receive_error {
                    "Error"
                } else {
                    "Normal"
                }
            }
            StatDetail::Attack(d) => {
                if d.is_kill {
                    "Kill"
                } else if d.is_attack_error {
                    "Error"
                } else if d.is_blocked {
                    "Blocked"
                } else {
                    "Normal"
                }
            }
            StatDetail::Block(d) => {
                if d.is_stuff_block {
                    "Stuff"
                } else if d.is_soft_touch {
                    "Touch"
                } else {
                    "Miss"
                }
            }
            StatDetail::Dig(d) => {
                if d.is_successful_dig {
                    "Good"
                } else {
                    "Error"
                }
            }
            StatDetail::Set(d) => {
                if d.is_killable_set {
                    "Good"
                } else if d.is_set_error {
                    "Error"
                } else {
                    "Normal"
                }
            }
        }
    }
}

/// A stat ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStat {
    pub game_id: i64,
    pub player_id: i64,
    pub timestamp: DateTime<Utc>,
    pub detail: StatDetail,
}

impl NewStat {
    pub fn action_type(&self) -> ActionType {
        self.detail.action_type()
    }
}

/// A persisted stat: base record with its detail block flattened in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatRecord {
    pub id: i64,
    pub game_id: i64,
    pub player_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    pub action_type: ActionType,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub detail: StatDetail,
}

/// Incoming timestamps: Unix milliseconds or an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

impl Timestamp {
    /// Years outside 0000-9999 are rejected: they have no fixed-width RFC 3339 form.
    pub fn resolve(&self) -> Result<DateTime<Utc>, AppError> {
        let resolved = match self {
            Timestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            Timestamp::Text(text) => Some(parse_timestamp(text)?),
        };
        resolved
            .filter(|ts| (0..=9999).contains(&ts.year()))
            .ok_or_else(|| AppError::Validation(format!("Timestamp out of range: {:?}", self)))
    }
}

pub fn resolve_timestamp(ts: Option<&Timestamp>, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
    match ts {
        Some(ts) => ts.resolve(),
        None => Ok(now),
    }
}

/// Accepts RFC 3339, a naive ISO datetime (taken as UTC) or a bare date.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, AppError> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(AppError::Validation(format!("Invalid timestamp: {}", text)))
}

/// Storage form: fixed-width RFC 3339 so lexical order matches time order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

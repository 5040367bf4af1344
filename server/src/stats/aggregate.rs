use crate::stats::record::{StatDetail, StatRecord};
use crate::stats::summary::{bump, Tally};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Roster-level numbers for one player across every game.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerTotals {
    pub games_played: u32,
    pub total_kills: u32,
    pub total_aces: u32,
}

pub fn player_totals<'a, I>(records: I) -> PlayerTotals
where
    I: IntoIterator<Item = &'a StatRecord>,
{
    let mut games = HashSet::new();
    let mut totals = PlayerTotals::default();
    for record in records {
        games.insert(record.game_id);
        match &record.detail {
            StatDetail::Attack(d) => totals.total_kills += d.is_kill as u32,
            StatDetail::Serving(d) => totals.total_aces += d.is_ace as u32,
            _ => {}
        }
    }
    totals.games_played = games.len() as u32;
    totals
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServingBreakdown {
    pub total_serves: u32,
    pub missed_serves: u32,
    pub aces: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceiveBreakdown {
    pub total_receives: u32,
    pub good_passes: u32,
    pub receive_errors: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttackBreakdown {
    pub total_attacks: u32,
    pub kills: u32,
    pub attack_errors: u32,
    pub blocked: u32,
    /// `direction_<line|angle|cut|jumbo>` and `type_<hard|roll|tip>` counts,
    /// serialized alongside the counters.
    #[serde(flatten)]
    pub distribution: Tally,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockBreakdown {
    pub total_blocks: u32,
    pub stuff_blocks: u32,
    pub soft_touches: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DigBreakdown {
    pub total_digs: u32,
    pub successful_digs: u32,
    pub dig_led_to_kill: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetBreakdown {
    pub total_sets: u32,
    pub set_errors: u32,
    pub killable_sets: u32,
}

/// Player detail view. Categories without records are left out entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerCategories {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving: Option<ServingBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serve_receive: Option<ReceiveBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<AttackBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dig: Option<DigBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<SetBreakdown>,
    /// Keyed by `YYYY-MM-DD`; only dates with at least one serve appear.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub serving_by_date: BTreeMap<String, ServingBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerDetailStats {
    pub categories: PlayerCategories,
}

pub fn player_detail<'a, I>(records: I) -> PlayerDetailStats
where
    I: IntoIterator<Item = &'a StatRecord>,
{
    let mut c = PlayerCategories::default();
    for record in records {
        match &record.detail {
            StatDetail::Serving(d) => {
                add_serve(c.serving.get_or_insert_with(Default::default), d.is_missed_serve, d.is_ace);
                let day = record.timestamp.date_naive().format("%Y-%m-%d").to_string();
                add_serve(c.serving_by_date.entry(day).or_default(), d.is_missed_serve, d.is_ace);
            }
            StatDetail::ServeReceive(d) => {
                let b = c.serve_receive.get_or_insert_with(Default::default);
                b.total_receives += 1;
                b.good_passes += d.is_good_pass as u32;
                b.receive_errors += d.is_receive_error as u32;
            }
            StatDetail::Attack(d) => {
                let b = c.attack.get_or_insert_with(Default::default);
                b.total_attacks += 1;
                b.kills += d.is_kill as u32;
                b.attack_errors += d.is_attack_error as u32;
                b.blocked += d.is_blocked as u32;
                if let Some(direction) = d.attack_direction {
                    bump(&mut b.distribution, &format!("direction_{}", direction.as_str()));
                }
                if let Some(kind) = d.attack_type {
                    bump(&mut b.distribution, &format!("type_{}", kind.as_str()));
                }
            }
            StatDetail::Block(d) => {
                let b = c.block.get_or_insert_with(Default::default);
                b.total_blocks += 1;
                b.stuff_blocks += d.is_stuff_block as u32;
                b.soft_touches += d.is_soft_touch as u32;
            }
            StatDetail::Dig(d) => {
                let b = c.dig.get_or_insert_with(Default::default);
                b.total_digs += 1;
                b.successful_digs += d.is_successful_dig as u32;
                b.dig_led_to_kill += d.dig_led_to_kill as u32;
            }
            StatDetail::Set(d) => {
                let b = c.set.get_or_insert_with(Default::default);
                b.total_sets += 1;
                b.set_errors += d.is_set_error as u32;
                b.killable_sets += d.is_killable_set as u32;
            }
        }
    }
    PlayerDetailStats { categories: c }
}

fn add_serve(b: &mut ServingBreakdown, missed: bool, ace: bool) {
    b.total_serves += 1;
    b.missed_serves += missed as u32;
    b.aces += ace as u32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::action::{AttackDirection, AttackType};
    use crate::stats::encoder::encode;
    use chrono::{DateTime, TimeZone, Utc};

    fn rec(id: i64, game_id: i64, at: DateTime<Utc>, category: &str, action: &str) -> StatRecord {
        let stat = encode(category, action, 7, game_id, at).unwrap();
        StatRecord {
            id,
            game_id,
            player_id: 7,
            player_name: None,
            action_type: stat.action_type(),
            timestamp: stat.timestamp,
            detail: stat.detail,
        }
    }

    fn day(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_games_played_counts_distinct_games() {
        let records: Vec<StatRecord> = (0..5)
            .map(|i| rec(i, 3, day(1, 9), "attack", "Kill"))
            .collect();
        let totals = player_totals(&records);
        assert_eq!(totals.games_played, 1);
        assert_eq!(totals.total_kills, 5);
        assert_eq!(totals.total_aces, 0);
    }

    #[test]
    fn test_totals_across_games() {
        let records = vec![
            rec(1, 1, day(1, 9), "serve", "Ace"),
            rec(2, 2, day(2, 9), "serve", "Ace"),
            rec(3, 2, day(2, 9), "attack", "Error"),
            rec(4, 5, day(3, 9), "dig", "Good"),
        ];
        assert_eq!(
            player_totals(&records),
            PlayerTotals {
                games_played: 3,
                total_kills: 0,
                total_aces: 2,
            }
        );
    }

    #[test]
    fn test_no_records() {
        let records: Vec<StatRecord> = Vec::new();
        assert_eq!(player_totals(&records), PlayerTotals::default());
        let detail = player_detail(&records);
        assert_eq!(
            serde_json::to_value(detail).unwrap(),
            serde_json::json!({ "categories": {} })
        );
    }

    #[test]
    fn test_serving_by_date_buckets() {
        let records = vec![
            rec(1, 1, day(1, 9), "serve", "Ace"),
            rec(2, 1, day(1, 23), "serve", "Miss"),
            rec(3, 2, day(4, 10), "serve", "In"),
            rec(4, 2, day(4, 10), "set", "Good"),
        ];
        let detail = player_detail(&records).categories;

        assert_eq!(
            detail.serving,
            Some(ServingBreakdown {
                total_serves: 3,
                missed_serves: 1,
                aces: 1,
            })
        );
        let dates: Vec<&String> = detail.serving_by_date.keys().collect();
        assert_eq!(dates, vec!["2024-07-01", "2024-07-04"]);
        assert_eq!(detail.serving_by_date["2024-07-01"].total_serves, 2);
        assert_eq!(detail.set.as_ref().map(|s| s.killable_sets), Some(1));
        assert!(detail.attack.is_none());
    }

    #[test]
    fn test_attack_distribution_and_dig_keys() {
        let mut line_kill = rec(1, 1, day(2, 9), "attack", "Kill");
        let mut cut_error = rec(2, 1, day(2, 9), "attack", "Error");
        let mut line_tip = rec(3, 2, day(3, 9), "attack", "Blocked");
        for (record, direction, kind) in [
            (&mut line_kill, AttackDirection::Line, Some(AttackType::Hard)),
            (&mut cut_error, AttackDirection::Cut, None),
            (&mut line_tip, AttackDirection::Line, Some(AttackType::Tip)),
        ] {
            if let StatDetail::Attack(d) = &mut record.detail {
                d.attack_direction = Some(direction);
                d.attack_type = kind;
            }
        }
        let records = vec![
            line_kill,
            cut_error,
            line_tip,
            rec(4, 2, day(3, 9), "attack", "Kill"),
            rec(5, 2, day(3, 9), "dig", "Good"),
        ];

        let detail = player_detail(&records).categories;
        let attack = detail.attack.clone().unwrap();
        assert_eq!(attack.total_attacks, 4);
        assert_eq!(attack.distribution["direction_line"], 2);
        assert_eq!(attack.distribution["direction_cut"], 1);
        assert_eq!(attack.distribution["type_hard"], 1);
        assert_eq!(attack.distribution["type_tip"], 1);
        assert!(!attack.distribution.contains_key("type_roll"));

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["attack"]["kills"], 2);
        assert_eq!(value["attack"]["direction_line"], 2);
        assert_eq!(value["attack"]["type_tip"], 1);
        assert_eq!(value["dig"]["dig_led_to_kill"], 0);
        assert_eq!(value["dig"]["successful_digs"], 1);
    }
}

use crate::stats::record::{StatDetail, StatRecord};
use serde::Serialize;
use std::collections::BTreeMap;

pub type Tally = BTreeMap<String, u32>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServingSummary {
    pub total: u32,
    pub aces: u32,
    pub errors: u32,
    pub targets: Tally,
    pub opponent_pass_quality: Tally,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceiveSummary {
    pub total: u32,
    pub good_passes: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttackSummary {
    pub total: u32,
    pub kills: u32,
    pub errors: u32,
    pub blocked: u32,
    pub directions: Tally,
    pub types: Tally,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockSummary {
    pub total: u32,
    pub stuff_blocks: u32,
    pub soft_touches: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DigSummary {
    pub total: u32,
    pub successful: u32,
    pub led_to_kills: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetSummary {
    pub total: u32,
    pub errors: u32,
    pub killable: u32,
}

/// Per-(player, game) summary. All six categories are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatSummary {
    pub serving: ServingSummary,
    pub serve_receive: ReceiveSummary,
    pub attack: AttackSummary,
    pub block: BlockSummary,
    pub dig: DigSummary,
    pub set: SetSummary,
}

/// Reduces the records of one (player, game) pair. `None` means "no stats yet",
/// which callers must keep distinct from an all-zero summary.
pub fn summarize<'a, I>(records: I) -> Option<StatSummary>
where
    I: IntoIterator<Item = &'a StatRecord>,
{
    let mut summary = StatSummary::default();
    let mut seen = false;
    for record in records {
        seen = true;
        summary.add(&record.detail);
    }
    seen.then_some(summary)
}

impl StatSummary {
    pub fn add(&mut self, detail: &StatDetail) {
        match detail {
            StatDetail::Serving(d) => {
                let s = &mut self.serving;
                s.total += 1;
                s.aces += d.is_ace as u32;
                s.errors += d.is_missed_serve as u32;
                if let Some(target) = &d.serve_target {
                    bump(&mut s.targets, target);
                }
                if let Some(quality) = d.opponent_pass_quality {
                    bump(&mut s.opponent_pass_quality, &quality.to_string());
                }
            }
            StatDetail::ServeReceive(d) => {
                let s = &mut self.serve_receive;
                s.total += 1;
                s.good_passes += d.is_good_pass as u32;
                s.errors += d.is_receive_error as u32;
            }
            StatDetail::Attack(d) => {
                let s = &mut self.attack;
                s.total += 1;
                s.kills += d.is_kill as u32;
                s.errors += d.is_attack_error as u32;
                s.blocked += d.is_blocked as u32;
                if let Some(direction) = d.attack_direction {
                    bump(&mut s.directions, direction.as_str());
                }
                if let Some(kind) = d.attack_type {
                    bump(&mut s.types, kind.as_str());
                }
            }
            StatDetail::Block(d) => {
                let s = &mut self.block;
                s.total += 1;
                s.stuff_blocks += d.is_stuff_block as u32;
                s.soft_touches += d.is_soft_touch as u32;
            }
            StatDetail::Dig(d) => {
                let s = &mut self.dig;
                s.total += 1;
                s.successful += d.is_successful_dig as u32;
                s.led_to_kills += d.dig_led_to_kill as u32;
            }
            StatDetail::Set(d) => {
                let s = &mut self.set;
                s.total += 1;
                s.errors += d.is_set_error as u32;
                s.killable += d.is_killable_set as u32;
            }
        }
    }
}

pub(crate) fn bump(tally: &mut Tally, key: &str) {
    *tally.entry(key.to_string()).or_insert(0) += 1;
}

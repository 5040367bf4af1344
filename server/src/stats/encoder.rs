use crate::error::AppError;
use crate::stats::action::Category;
use crate::stats::record::{
    AttackDetail, BlockDetail, DigDetail, NewStat, ReceiveDetail, ServeDetail, SetDetail,
    StatDetail,
};
use chrono::{DateTime, Utc};

/// Turns a fast-entry button press into a stat record.
///
/// The category must be one of the six known keys. The action label is matched
/// exactly against the flags of that category; labels that match nothing
/// ("In", "Normal", or anything unexpected) leave every flag cleared.
pub fn encode(
    category: &str,
    action: &str,
    player_id: i64,
    game_id: i64,
    now: DateTime<Utc>,
) -> Result<NewStat, AppError> {
    let category: Category = category.parse()?;
    if !category.actions().contains(&action) {
        log::debug!("unrecognized {:?} action label {:?}", category, action);
    }

    Ok(NewStat {
        game_id,
        player_id,
        timestamp: now,
        detail: detail_for(category, action),
    })
}

fn detail_for(category: Category, action: &str) -> StatDetail {
    match category {
        Category::Serve => StatDetail::Serving(ServeDetail {
            is_ace: action == "Ace",
            is_missed_serve: action == "Miss",
            ..Default::default()
        }),
        Category::Receive => StatDetail::ServeReceive(ReceiveDetail {
            is_good_pass: action == "Good",
            is_receive_error: action == "Error",
            ..Default::default()
        }),
        Category::Attack => StatDetail::Attack(AttackDetail {
            is_kill: action == "Kill",
            is_attack_error: action == "Error",
            is_blocked: action == "Blocked",
            ..Default::default()
        }),
        Category::Block => StatDetail::Block(BlockDetail {
            is_stuff_block: action == "Stuff",
            is_soft_touch: action == "Touch",
        }),
        Category::Dig => StatDetail::Dig(DigDetail {
            is_successful_dig: action == "Good",
            ..Default::default()
        }),
        Category::Set => StatDetail::Set(SetDetail {
            is_killable_set: action == "Good",
            is_set_error: action == "Error",
            ..Default::default()
        }),
    }
}

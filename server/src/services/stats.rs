use crate::db::Db;
use crate::error::AppError;
use crate::models::stat::*;
use crate::services::games;
use crate::stats::action::{ActionType, AttackDirection, AttackType, DigQuality, ServeType, SetType};
use crate::stats::encoder;
use crate::stats::form;
use crate::stats::history::{HistoryEntry, StatHistory};
use crate::stats::record::{
    format_timestamp, resolve_timestamp, AttackDetail, BlockDetail, DigDetail, NewStat,
    ReceiveDetail, ServeDetail, SetDetail, StatDetail, StatRecord,
};
use crate::stats::summary::{summarize, StatSummary};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, Row, ToSql};
use serde_json::Value;
use std::collections::HashMap;

/// Label enums are stored as their lowercase text.
macro_rules! sql_label {
    ($($ty:ty),+ $(,)?) => {$(
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value.as_str()?.parse().map_err(|_| FromSqlError::InvalidType)
            }
        }
    )+};
}

sql_label!(ActionType, ServeType, AttackDirection, AttackType, SetType, DigQuality);

const SELECT_STATS: &str = "SELECT b.id, b.game_id, b.player_id, p.name, b.action_type, b.timestamp,
        sv.is_missed_serve, sv.is_ace, sv.serve_type, sv.serve_target, sv.opponent_pass_quality,
        rc.is_good_pass, rc.is_receive_error, rc.pass_rating,
        ak.is_kill, ak.is_attack_error, ak.is_blocked, ak.attack_direction, ak.attack_type,
        bl.is_stuff_block, bl.is_soft_touch,
        dg.is_successful_dig, dg.dig_led_to_kill, dg.dig_quality,
        st.is_set_error, st.is_killable_set, st.set_type
     FROM base_stats b
     JOIN players p ON p.id = b.player_id
     LEFT JOIN serve_stats sv ON sv.stat_id = b.id
     LEFT JOIN receive_stats rc ON rc.stat_id = b.id
     LEFT JOIN attack_stats ak ON ak.stat_id = b.id
     LEFT JOIN block_stats bl ON bl.stat_id = b.id
     LEFT JOIN dig_stats dg ON dg.stat_id = b.id
     LEFT JOIN set_stats st ON st.stat_id = b.id";

fn flag(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(row.get::<_, Option<bool>>(idx)?.unwrap_or(false))
}

fn stat_from_row(row: &Row<'_>) -> rusqlite::Result<StatRecord> {
    let action_type: ActionType = row.get(4)?;
    let raw_ts: String = row.get(5)?;
    let timestamp = DateTime::parse_from_rfc3339(&raw_ts)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    let detail = match action_type {
        ActionType::Serving => StatDetail::Serving(ServeDetail {
            is_missed_serve: flag(row, 6)?,
            is_ace: flag(row, 7)?,
            serve_type: row.get(8)?,
            serve_target: row.get(9)?,
            opponent_pass_quality: row.get(10)?,
        }),
        ActionType::ServeReceive => StatDetail::ServeReceive(ReceiveDetail {
            is_good_pass: flag(row, 11)?,
            is_receive_error: flag(row, 12)?,
            pass_rating: row.get(13)?,
        }),
        ActionType::Attack => StatDetail::Attack(AttackDetail {
            is_kill: flag(row, 14)?,
            is_attack_error: flag(row, 15)?,
            is_blocked: flag(row, 16)?,
            attack_direction: row.get(17)?,
            attack_type: row.get(18)?,
        }),
        ActionType::Block => StatDetail::Block(BlockDetail {
            is_stuff_block: flag(row, 19)?,
            is_soft_touch: flag(row, 20)?,
        }),
        ActionType::Dig => StatDetail::Dig(DigDetail {
            is_successful_dig: flag(row, 21)?,
            dig_led_to_kill: flag(row, 22)?,
            dig_quality: row.get(23)?,
        }),
        ActionType::Set => StatDetail::Set(SetDetail {
            is_set_error: flag(row, 24)?,
            is_killable_set: flag(row, 25)?,
            set_type: row.get(26)?,
        }),
    };

    Ok(StatRecord {
        id: row.get(0)?,
        game_id: row.get(1)?,
        player_id: row.get(2)?,
        player_name: row.get(3)?,
        action_type,
        timestamp,
        detail,
    })
}

/// Loads stat records matching `filter` (a fixed SQL predicate), newest first.
pub(crate) fn query_stats(
    conn: &Connection,
    filter: Option<&str>,
    params: &[&dyn ToSql],
) -> rusqlite::Result<Vec<StatRecord>> {
    let sql = match filter {
        Some(predicate) => format!(
            "{} WHERE {} ORDER BY b.timestamp DESC, b.id DESC",
            SELECT_STATS, predicate
        ),
        None => format!("{} ORDER BY b.timestamp DESC, b.id DESC", SELECT_STATS),
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, stat_from_row)?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

fn insert_detail(conn: &Connection, stat_id: i64, detail: &StatDetail) -> rusqlite::Result<usize> {
    match detail {
        StatDetail::Serving(d) => conn.execute(
            "INSERT INTO serve_stats (stat_id, is_missed_serve, is_ace, serve_type, serve_target,
             opponent_pass_quality) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                stat_id,
                d.is_missed_serve,
                d.is_ace,
                d.serve_type,
                d.serve_target,
                d.opponent_pass_quality,
            ],
        ),
        StatDetail::ServeReceive(d) => conn.execute(
            "INSERT INTO receive_stats (stat_id, is_good_pass, is_receive_error, pass_rating)
             VALUES (?1, ?2, ?3, ?4)",
            params![stat_id, d.is_good_pass, d.is_receive_error, d.pass_rating],
        ),
        StatDetail::Attack(d) => conn.execute(
            "INSERT INTO attack_stats (stat_id, is_kill, is_attack_error, is_blocked,
             attack_direction, attack_type) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                stat_id,
                d.is_kill,
                d.is_attack_error,
                d.is_blocked,
                d.attack_direction,
                d.attack_type,
            ],
        ),
        StatDetail::Block(d) => conn.execute(
            "INSERT INTO block_stats (stat_id, is_stuff_block, is_soft_touch) VALUES (?1, ?2, ?3)",
            params![stat_id, d.is_stuff_block, d.is_soft_touch],
        ),
        StatDetail::Dig(d) => conn.execute(
            "INSERT INTO dig_stats (stat_id, is_successful_dig, dig_led_to_kill, dig_quality)
             VALUES (?1, ?2, ?3, ?4)",
            params![stat_id, d.is_successful_dig, d.dig_led_to_kill, d.dig_quality],
        ),
        StatDetail::Set(d) => conn.execute(
            "INSERT INTO set_stats (stat_id, is_set_error, is_killable_set, set_type)
             VALUES (?1, ?2, ?3, ?4)",
            params![stat_id, d.is_set_error, d.is_killable_set, d.set_type],
        ),
    }
}

fn row_exists(conn: &Connection, table: &str, id: i64) -> rusqlite::Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table);
    conn.query_row(&sql, params![id], |row| row.get(0))
}

/// Persists a base record and its detail block in one transaction.
pub fn record_stat(db: &Db, stat: NewStat) -> Result<StatRecord, AppError> {
    stat.detail.validate()?;

    let record = db.with_tx(|tx| {
        if !row_exists(tx, "games", stat.game_id)? {
            return Err(AppError::NotFound("Game not found".into()));
        }
        if !row_exists(tx, "players", stat.player_id)? {
            return Err(AppError::ReferentialIntegrity(format!(
                "Player {} does not exist",
                stat.player_id
            )));
        }

        tx.execute(
            "INSERT INTO base_stats (game_id, player_id, action_type, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                stat.game_id,
                stat.player_id,
                stat.action_type(),
                format_timestamp(&stat.timestamp),
            ],
        )?;
        let stat_id = tx.last_insert_rowid();
        insert_detail(tx, stat_id, &stat.detail)?;

        query_stats(tx, Some("b.id = ?1"), &[&stat_id])?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("stat {} vanished after insert", stat_id)))
    })?;

    log::info!(
        "recorded {} stat {} for player {} in game {}",
        record.action_type,
        record.id,
        record.player_id,
        record.game_id
    );
    Ok(record)
}

/// `POST /api/games/{id}/stats` with `{base_stat, <kind>_stat}`.
pub fn create_normalized(
    db: &Db,
    game_id: i64,
    req: CreateStatRequest,
    now: DateTime<Utc>,
) -> Result<StatRecord, AppError> {
    if let Some(body_game) = req.base_stat.game_id {
        if body_game != game_id {
            return Err(AppError::Validation(format!(
                "base_stat.game_id {} does not match game {}",
                body_game, game_id
            )));
        }
    }
    let action_type = req.base_stat.action_type;
    let player_id = req.base_stat.player_id;
    let timestamp = resolve_timestamp(req.base_stat.timestamp.as_ref(), now)?;

    let mut detail = StatDetail::empty(action_type);
    for (key, block) in req.detail_blocks() {
        if key != action_type.detail_key() {
            return Err(AppError::Validation(format!(
                "{} does not belong to a {} stat",
                key, action_type
            )));
        }
        detail = StatDetail::from_fields(action_type, block)?;
    }

    record_stat(
        db,
        NewStat {
            game_id,
            player_id,
            timestamp,
            detail,
        },
    )
}

/// Fast entry: category key + button label, encoded server-side.
pub fn create_quick(
    db: &Db,
    game_id: i64,
    req: QuickStatRequest,
    now: DateTime<Utc>,
) -> Result<StatRecord, AppError> {
    let timestamp = resolve_timestamp(req.timestamp.as_ref(), now)?;
    let stat = encoder::encode(&req.category, &req.action, req.player_id, game_id, timestamp)?;
    record_stat(db, stat)
}

/// `POST /api/stats/{action-type}/` with the detail fields flat on the body.
pub fn create_flat(
    db: &Db,
    segment: &str,
    payload: FlatStatPayload,
    now: DateTime<Utc>,
) -> Result<StatRecord, AppError> {
    let action_type = ActionType::from_path_segment(segment)?;
    if let Some(body_type) = payload.action_type {
        if body_type != action_type {
            return Err(AppError::Validation(format!(
                "action_type {} does not match endpoint {}",
                body_type,
                action_type.path_segment()
            )));
        }
    }
    let timestamp = resolve_timestamp(payload.timestamp.as_ref(), now)?;
    let detail = StatDetail::from_fields(action_type, Value::Object(payload.fields))?;

    record_stat(
        db,
        NewStat {
            game_id: payload.game_id,
            player_id: payload.player_id,
            timestamp,
            detail,
        },
    )
}

/// Manual-entry form: raw string fields, coerced before decoding.
pub fn create_from_form(
    db: &Db,
    segment: &str,
    fields: HashMap<String, String>,
    now: DateTime<Utc>,
) -> Result<StatRecord, AppError> {
    let action_type = ActionType::from_path_segment(segment)?;
    let mut base = serde_json::Map::new();
    base.insert("action_type".into(), Value::String(action_type.as_str().into()));

    let payload = form::merge_into(base, form::merge_form_fields(fields));
    let payload: FlatStatPayload = serde_json::from_value(Value::Object(payload))
        .map_err(|e| AppError::Validation(format!("Invalid stat form: {}", e)))?;
    create_flat(db, segment, payload, now)
}

pub fn game_stats(db: &Db, game_id: i64) -> Result<Vec<StatRecord>, AppError> {
    games::get_game(db, game_id)?;
    Ok(db.with_conn(|conn| query_stats(conn, Some("b.game_id = ?1"), &[&game_id]))?)
}

pub fn game_history(db: &Db, game_id: i64) -> Result<Vec<HistoryEntry>, AppError> {
    let history = StatHistory::new(game_id, game_stats(db, game_id)?);
    Ok(history.entries())
}

pub fn delete_stat(db: &Db, game_id: i64, stat_id: i64) -> Result<StatRecord, AppError> {
    games::get_game(db, game_id)?;

    let deleted = db.with_tx(|tx| {
        let record = query_stats(tx, Some("b.game_id = ?1 AND b.id = ?2"), &[&game_id, &stat_id])?
            .pop()
            .ok_or_else(|| AppError::NotFound("Stat not found".into()))?;
        // Detail rows go with it through ON DELETE CASCADE.
        tx.execute("DELETE FROM base_stats WHERE id = ?1", params![stat_id])?;
        Ok::<_, AppError>(record)
    })?;

    log::info!("deleted stat {} from game {}", stat_id, game_id);
    Ok(deleted)
}

/// Undo: removes the most recent stat of the game.
pub fn undo_latest(db: &Db, game_id: i64) -> Result<StatRecord, AppError> {
    let mut history = StatHistory::new(game_id, game_stats(db, game_id)?);
    let latest = history
        .latest()
        .map(|r| r.id)
        .ok_or_else(|| AppError::NotFound("No stats to undo".into()))?;

    let removed = delete_stat(db, game_id, latest)?;
    history.remove(removed.id);
    log::debug!("undid stat {} in game {} ({} left)", removed.id, game_id, history.len());
    if history.is_empty() {
        log::info!("game {} has no stats left after undo", game_id);
    }
    Ok(removed)
}

pub fn player_game_summary(db: &Db, player_id: i64, game_id: i64) -> Result<StatSummary, AppError> {
    let records = db.with_conn(|conn| {
        query_stats(
            conn,
            Some("b.player_id = ?1 AND b.game_id = ?2"),
            &[&player_id, &game_id],
        )
    })?;
    summarize(&records)
        .ok_or_else(|| AppError::NotFound("No stats yet for this player/game".into()))
}

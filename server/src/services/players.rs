use crate::db::Db;
use crate::error::AppError;
use crate::models::player::*;
use crate::services::stats::query_stats;
use crate::stats::aggregate::{player_detail, player_totals, PlayerDetailStats};
use crate::stats::chart::{serving_series, ServingBucket};
use crate::stats::record::StatRecord;
use crate::validation;
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use std::collections::HashMap;

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        image_url: row.get(2)?,
    })
}

fn name_taken(db: &Db, name: &str, except: Option<i64>) -> Result<bool, AppError> {
    Ok(db.with_conn(|conn| {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM players WHERE name = ?1 AND id IS NOT ?2)",
            params![name, except],
            |row| row.get(0),
        )
    })?)
}

fn non_empty(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

pub fn list_players(db: &Db) -> Result<Vec<Player>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT id, name, image_url FROM players ORDER BY name")?;
        let rows = stmt.query_map([], player_from_row)?;
        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }
        Ok(players)
    })?)
}

pub fn create_player(db: &Db, req: PlayerCreate) -> Result<Player, AppError> {
    let name = validation::validate_player_name(&req.name)?;
    if name_taken(db, &name, None)? {
        log::warn!("rejected duplicate player name {:?}", name);
        return Err(AppError::DuplicateName(
            "Player with this name already exists".into(),
        ));
    }
    let image_url = non_empty(req.image_url);

    let id = db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO players (name, image_url) VALUES (?1, ?2)",
            params![name, image_url],
        )?;
        Ok(conn.last_insert_rowid())
    })?;

    log::info!("created player {} ({})", id, name);
    Ok(Player {
        id,
        name,
        image_url,
    })
}

pub fn get_player(db: &Db, player_id: i64) -> Result<Player, AppError> {
    db.with_conn(|conn| {
        conn.query_row(
            "SELECT id, name, image_url FROM players WHERE id = ?1",
            params![player_id],
            player_from_row,
        )
        .optional()
    })?
    .ok_or_else(|| AppError::NotFound("Player not found".into()))
}

pub fn update_player(db: &Db, player_id: i64, req: PlayerUpdate) -> Result<Player, AppError> {
    if req.name.is_none() && req.image_url.is_none() {
        return Err(AppError::Validation("Nothing to update".into()));
    }
    let mut player = get_player(db, player_id)?;

    if let Some(name) = req.name.as_deref() {
        let name = validation::validate_player_name(name)?;
        if name_taken(db, &name, Some(player_id))? {
            log::warn!("rejected rename of player {} to taken name {:?}", player_id, name);
            return Err(AppError::DuplicateName("Player name already exists".into()));
        }
        player.name = name;
    }
    if req.image_url.is_some() {
        player.image_url = non_empty(req.image_url);
    }

    db.with_conn(|conn| {
        conn.execute(
            "UPDATE players SET name = ?1, image_url = ?2 WHERE id = ?3",
            params![player.name, player.image_url, player_id],
        )
    })?;
    Ok(player)
}

/// Players referenced by any stat cannot be deleted.
pub fn delete_player(db: &Db, player_id: i64) -> Result<DeleteResult, AppError> {
    get_player(db, player_id)?;

    let stat_count: i64 = db.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM base_stats WHERE player_id = ?1",
            params![player_id],
            |row| row.get(0),
        )
    })?;
    if stat_count > 0 {
        log::warn!("refused to delete player {} with {} stats", player_id, stat_count);
        return Err(AppError::ReferentialIntegrity(
            "Cannot delete player in use (has stats)".into(),
        ));
    }

    db.with_conn(|conn| conn.execute("DELETE FROM players WHERE id = ?1", params![player_id]))?;
    log::info!("deleted player {}", player_id);
    Ok(DeleteResult { success: true })
}

/// Roster rows with cross-game totals, sorted by name.
pub fn player_summaries(db: &Db) -> Result<Vec<PlayerRosterRow>, AppError> {
    let players = list_players(db)?;
    let records = db.with_conn(|conn| query_stats(conn, None, &[]))?;

    let mut by_player: HashMap<i64, Vec<StatRecord>> = HashMap::new();
    for record in records {
        by_player.entry(record.player_id).or_default().push(record);
    }

    Ok(players
        .into_iter()
        .map(|p| {
            let totals = by_player
                .get(&p.id)
                .map(|records| player_totals(records))
                .unwrap_or_default();
            PlayerRosterRow {
                id: p.id,
                name: p.name,
                image_url: p.image_url,
                totals,
            }
        })
        .collect())
}

fn player_records(db: &Db, player_id: i64) -> Result<Vec<StatRecord>, AppError> {
    get_player(db, player_id)?;
    Ok(db.with_conn(|conn| query_stats(conn, Some("b.player_id = ?1"), &[&player_id]))?)
}

pub fn player_stats(db: &Db, player_id: i64) -> Result<PlayerDetailStats, AppError> {
    let records = player_records(db, player_id)?;
    Ok(player_detail(&records))
}

pub fn serving_chart(db: &Db, player_id: i64, today: NaiveDate) -> Result<Vec<ServingBucket>, AppError> {
    let detail = player_stats(db, player_id)?;
    Ok(serving_series(&detail.categories.serving_by_date, today))
}

use crate::db::Db;
use crate::error::AppError;
use crate::models::game::*;
use crate::validation;
use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row};

const SELECT_GAMES: &str = "SELECT id, date, team1, team2, num_sets, score FROM games";

fn bad_column<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<Game> {
    let date: String = row.get(1)?;
    let team1: String = row.get(2)?;
    let team2: String = row.get(3)?;
    Ok(Game {
        id: row.get(0)?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| bad_column(1, e))?,
        team1: serde_json::from_str(&team1).map_err(|e| bad_column(2, e))?,
        team2: serde_json::from_str(&team2).map_err(|e| bad_column(3, e))?,
        num_sets: row.get(4)?,
        score: row.get(5)?,
    })
}

pub fn create_game(db: &Db, req: GameCreate) -> Result<Game, AppError> {
    let (team1, team2) = validation::validate_teams(&req.team1, &req.team2)?;
    validation::validate_num_sets(req.num_sets)?;
    let score = match req.score.as_deref() {
        Some(score) => validation::validate_score(score)?,
        None => "0-0".to_string(),
    };
    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());

    let team1_json =
        serde_json::to_string(&team1).map_err(|e| AppError::Internal(e.to_string()))?;
    let team2_json =
        serde_json::to_string(&team2).map_err(|e| AppError::Internal(e.to_string()))?;

    let id = db.with_tx(|tx| {
        for player_id in team1.iter().chain(team2.iter()) {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM players WHERE id = ?1)",
                params![player_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(AppError::Validation(format!("Unknown player: {}", player_id)));
            }
        }
        tx.execute(
            "INSERT INTO games (date, team1, team2, num_sets, score) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                date.format("%Y-%m-%d").to_string(),
                team1_json,
                team2_json,
                req.num_sets,
                score,
            ],
        )?;
        Ok(tx.last_insert_rowid())
    })?;

    log::info!("created game {} ({:?} vs {:?}) on {}", id, team1, team2, date);
    Ok(Game {
        id,
        date,
        team1,
        team2,
        num_sets: req.num_sets,
        score,
    })
}

/// Newest games first.
pub fn list_games(db: &Db) -> Result<Vec<Game>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!("{} ORDER BY date DESC, id DESC", SELECT_GAMES))?;
        let rows = stmt.query_map([], game_from_row)?;
        let mut games = Vec::new();
        for row in rows {
            games.push(row?);
        }
        Ok(games)
    })?)
}

pub fn get_game(db: &Db, game_id: i64) -> Result<Game, AppError> {
    let result = db.with_conn(|conn| {
        conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_GAMES),
            params![game_id],
            game_from_row,
        )
    });

    match result {
        Ok(game) => Ok(game),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::NotFound("Game not found".into())),
        Err(e) => Err(AppError::from(e)),
    }
}

pub fn update_score(db: &Db, game_id: i64, req: GameUpdate) -> Result<Game, AppError> {
    let score = validation::validate_score(&req.score)?;
    let updated = db.with_conn(|conn| {
        conn.execute(
            "UPDATE games SET score = ?1 WHERE id = ?2",
            params![score, game_id],
        )
    })?;
    if updated == 0 {
        return Err(AppError::NotFound("Game not found".into()));
    }
    get_game(db, game_id)
}

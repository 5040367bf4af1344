use crate::db::Db;
use crate::error::AppError;
use crate::models::game::*;
use crate::services::games as service;
use crate::handlers::decode;
use ntex::util::Bytes;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn list_games(db: web::types::State<Arc<Db>>) -> Result<HttpResponse, AppError> {
    let games = service::list_games(&db)?;
    Ok(HttpResponse::Ok().json(&games))
}

pub async fn create_game(
    db: web::types::State<Arc<Db>>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let req: GameCreate = decode(&body)?;
    let game = service::create_game(&db, req)?;
    Ok(HttpResponse::Ok().json(&game))
}

pub async fn get_game(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let game = service::get_game(&db, path.into_inner())?;
    Ok(HttpResponse::Ok().json(&game))
}

pub async fn update_score(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let req: GameUpdate = decode(&body)?;
    let game = service::update_score(&db, path.into_inner(), req)?;
    Ok(HttpResponse::Ok().json(&game))
}

use crate::db::Db;
use crate::error::AppError;
use crate::models::stat::*;
use crate::services::stats as service;
use chrono::Utc;
use crate::handlers::decode;
use ntex::util::Bytes;
use ntex::web::{self, HttpResponse};
use std::collections::HashMap;
use std::sync::Arc;

pub async fn game_stats(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let records = service::game_stats(&db, path.into_inner())?;
    Ok(HttpResponse::Ok().json(&records))
}

pub async fn create_stat(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let req: CreateStatRequest = decode(&body)?;
    let record = service::create_normalized(&db, path.into_inner(), req, Utc::now())?;
    Ok(HttpResponse::Ok().json(&record))
}

pub async fn quick_stat(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let req: QuickStatRequest = decode(&body)?;
    let record = service::create_quick(&db, path.into_inner(), req, Utc::now())?;
    Ok(HttpResponse::Ok().json(&record))
}

pub async fn stat_history(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let entries = service::game_history(&db, path.into_inner())?;
    Ok(HttpResponse::Ok().json(&entries))
}

pub async fn undo_latest(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let removed = service::undo_latest(&db, path.into_inner())?;
    Ok(HttpResponse::Ok().json(&removed))
}

pub async fn delete_stat(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (game_id, stat_id) = path.into_inner();
    let removed = service::delete_stat(&db, game_id, stat_id)?;
    Ok(HttpResponse::Ok().json(&removed))
}

pub async fn create_flat(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let req: FlatStatPayload = decode(&body)?;
    let record = service::create_flat(&db, &path.into_inner(), req, Utc::now())?;
    Ok(HttpResponse::Ok().json(&record))
}

pub async fn create_from_form(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
    form: web::types::Form<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let record =
        service::create_from_form(&db, &path.into_inner(), form.into_inner(), Utc::now())?;
    Ok(HttpResponse::Ok().json(&record))
}

pub async fn player_game_summary(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (player_id, game_id) = path.into_inner();
    let summary = service::player_game_summary(&db, player_id, game_id)?;
    Ok(HttpResponse::Ok().json(&summary))
}

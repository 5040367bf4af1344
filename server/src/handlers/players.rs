use crate::config::Config;
use crate::db::Db;
use crate::error::AppError;
use crate::models::player::*;
use crate::services::{images, players as service};
use chrono::Utc;
use crate::handlers::decode;
use ntex::util::Bytes;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn list_players(db: web::types::State<Arc<Db>>) -> Result<HttpResponse, AppError> {
    let players = service::list_players(&db)?;
    Ok(HttpResponse::Ok().json(&players))
}

pub async fn create_player(
    db: web::types::State<Arc<Db>>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let req: PlayerCreate = decode(&body)?;
    let player = service::create_player(&db, req)?;
    Ok(HttpResponse::Ok().json(&player))
}

pub async fn player_summaries(
    db: web::types::State<Arc<Db>>,
) -> Result<HttpResponse, AppError> {
    let rows = service::player_summaries(&db)?;
    Ok(HttpResponse::Ok().json(&rows))
}

pub async fn get_player(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let player = service::get_player(&db, path.into_inner())?;
    Ok(HttpResponse::Ok().json(&player))
}

pub async fn update_player(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let req: PlayerUpdate = decode(&body)?;
    let player = service::update_player(&db, path.into_inner(), req)?;
    Ok(HttpResponse::Ok().json(&player))
}

pub async fn delete_player(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let result = service::delete_player(&db, path.into_inner())?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn player_stats(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let stats = service::player_stats(&db, path.into_inner())?;
    Ok(HttpResponse::Ok().json(&stats))
}

pub async fn serving_chart(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let today = Utc::now().date_naive();
    let series = service::serving_chart(&db, path.into_inner(), today)?;
    Ok(HttpResponse::Ok().json(&series))
}

pub async fn upload_image(
    db: web::types::State<Arc<Db>>,
    config: web::types::State<Config>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let req: ImageUpload = decode(&body)?;
    let result = images::upload_image(&db, req, config.max_image_bytes)?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn get_image(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let (content_type, data) = images::get_image(&db, &path.into_inner())?;
    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .header("Cache-Control", "public, max-age=31536000, immutable")
        .body(data))
}

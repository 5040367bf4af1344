mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod stats;
mod validation;

use config::Config;
use db::Db;
use env_logger::Env;
use ntex::web;
use ntex_cors::Cors;
use std::sync::Arc;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::from_env();

    let db = Db::open(&config.database_path).map_err(|e| {
        log::error!("failed to open database {}: {}", config.database_path, e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let db = Arc::new(db);

    log::info!(
        "BvB stats server starting on {} (database {})",
        config.bind_addr(),
        config.database_path
    );

    let bind_addr = config.bind_addr();
    web::HttpServer::new(move || {
        web::App::new()
            .state(db.clone())
            .state(web::types::PayloadConfig::new(config.body_limit()))
            .state(config.clone())
            .wrap(web::middleware::Logger::default())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            .route("/api/health", web::get().to(health))
            .configure(handlers::config)
    })
    .bind(bind_addr)?
    .run()
    .await
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::action::ActionType;
    use ntex::http::{header, StatusCode};
    use ntex::web::test;
    use serde_json::{json, Value};

    #[test]
    fn test_db_open_in_memory() {
        let db = Db::open_in_memory().expect("Failed to open in-memory DB");
        db.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN
                 ('players', 'games', 'base_stats', 'serve_stats', 'receive_stats',
                  'attack_stats', 'block_stats', 'dig_stats', 'set_stats', 'player_images')",
                [],
                |row| row.get(0),
            )?;
            assert_eq!(count, 10);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_track_game_then_undo() {
        let db = Db::open_in_memory().unwrap();
        let mut ids = Vec::new();
        for name in ["Kerri", "Misty", "April", "Alix"] {
            let player = services::players::create_player(
                &db,
                models::player::PlayerCreate {
                    name: name.into(),
                    image_url: None,
                },
            )
            .unwrap();
            ids.push(Some(player.id));
        }

        let game = services::games::create_game(
            &db,
            models::game::GameCreate {
                date: None,
                team1: ids[..2].to_vec(),
                team2: ids[2..].to_vec(),
                num_sets: Some(3),
                score: None,
            },
        )
        .unwrap();

        let now = chrono::Utc::now();
        for (category, action) in [("serve", "Ace"), ("serve", "In"), ("attack", "Kill")] {
            services::stats::create_quick(
                &db,
                game.id,
                models::stat::QuickStatRequest {
                    player_id: game.team1[0],
                    category: category.into(),
                    action: action.into(),
                    timestamp: None,
                },
                now,
            )
            .unwrap();
        }

        let summary = services::stats::player_game_summary(&db, game.team1[0], game.id).unwrap();
        assert_eq!(summary.serving.total, 2);
        assert_eq!(summary.serving.aces, 1);
        assert_eq!(summary.attack.kills, 1);

        let undone = services::stats::undo_latest(&db, game.id).unwrap();
        assert_eq!(undone.action_type, ActionType::Attack);
        assert_eq!(services::stats::game_history(&db, game.id).unwrap().len(), 2);

        let roster = services::players::player_summaries(&db).unwrap();
        let kerri = roster.iter().find(|r| r.name == "Kerri").unwrap();
        assert_eq!(kerri.totals.games_played, 1);
        assert_eq!(kerri.totals.total_aces, 1);
        assert_eq!(kerri.totals.total_kills, 0);
    }

    macro_rules! app {
        () => {
            test::init_service(
                web::App::new()
                    .state(Arc::new(Db::open_in_memory().unwrap()))
                    .state(Config::default())
                    .route("/api/health", web::get().to(health))
                    .configure(handlers::config),
            )
            .await
        };
    }

    #[ntex::test]
    async fn test_http_player_flow_and_error_kinds() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/health").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/players/")
            .set_json(&json!({ "name": "Kerri" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/players")
            .set_json(&json!({ "name": "Kerri" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["kind"], "duplicate_name");

        // "summary" must not be captured as a player id.
        let req = test::TestRequest::get().uri("/api/players/summary").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body[0]["games_played"], 0);

        let req = test::TestRequest::get().uri("/api/players/42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["kind"], "not_found");
    }

    #[ntex::test]
    async fn test_http_undecodable_bodies_are_validation_errors() {
        let app = app!();

        let bodies = [
            ("/api/players/", json!({ "nam": "x" })),
            ("/api/games/", json!({ "team1": [1, 2] })),
            ("/api/stats/attack/", json!({ "player_id": 1, "is_kill": true })),
            ("/api/games/1/stats/quick", json!({ "category": "serve" })),
        ];
        for (uri, body) in bodies {
            let req = test::TestRequest::post().uri(uri).set_json(&body).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
            assert_eq!(body["kind"], "validation", "{}", uri);
            assert!(body["error"].as_str().unwrap().contains("missing field"), "{}", uri);
        }

        let req = test::TestRequest::post()
            .uri("/api/players/")
            .header(header::CONTENT_TYPE, "application/json")
            .set_payload("{\"name\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["kind"], "validation");
    }

    #[ntex::test]
    async fn test_http_stat_entry_paths() {
        let app = app!();

        for name in ["A", "B", "C", "D"] {
            let req = test::TestRequest::post()
                .uri("/api/players/")
                .set_json(&json!({ "name": name }))
                .to_request();
            test::call_service(&app, req).await;
        }
        let req = test::TestRequest::post()
            .uri("/api/games/")
            .set_json(&json!({ "date": "2024-06-01", "my_team": [1, 2], "opponent_team": [3, 4] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/games/1/stats")
            .set_json(&json!({
                "base_stat": { "player_id": 1, "game_id": 1, "action_type": "serving" },
                "serve_stat": { "is_ace": true, "serve_type": "jump" }
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/stats/serve-receive/")
            .set_json(&json!({ "game_id": 1, "player_id": 1, "is_good_pass": true }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/stats/attack/form")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .set_payload("game_id=1&player_id=1&is_kill=true&attack_direction=line")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/games/1/stats/quick")
            .set_json(&json!({ "player_id": 1, "category": "spike", "action": "Kill" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["kind"], "unknown_category");

        let req = test::TestRequest::get()
            .uri("/api/stats/summary/player/1/game/1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["serving"]["aces"], 1);
        assert_eq!(body["serve_receive"]["good_passes"], 1);
        assert_eq!(body["attack"]["kills"], 1);

        let req = test::TestRequest::get()
            .uri("/api/stats/summary/player/2/game/1")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete().uri("/api/games/1/stats/latest").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/games/1/stats/history").to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }
}

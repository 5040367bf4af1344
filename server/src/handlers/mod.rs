pub mod games;
pub mod players;
pub mod stats;

use crate::error::AppError;
use ntex::web;
use serde::de::DeserializeOwned;

/// Decodes a JSON request body. Malformed bodies and missing fields surface
/// as `validation` errors instead of the framework's plain-text 400.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}

/// Registers every API route. Literal segments are registered before the
/// `{id}` patterns they would otherwise be captured by.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        // Players
        .route("/api/players/", web::get().to(players::list_players))
        .route("/api/players", web::get().to(players::list_players))
        .route("/api/players/", web::post().to(players::create_player))
        .route("/api/players", web::post().to(players::create_player))
        .route("/api/players/summary", web::get().to(players::player_summaries))
        .route("/api/players/upload-image", web::post().to(players::upload_image))
        .route("/api/players/images/{image_id}", web::get().to(players::get_image))
        .route("/api/players/{id}", web::get().to(players::get_player))
        .route("/api/players/{id}", web::patch().to(players::update_player))
        .route("/api/players/{id}", web::delete().to(players::delete_player))
        .route("/api/players/{id}/stats", web::get().to(players::player_stats))
        .route("/api/players/{id}/serving-chart", web::get().to(players::serving_chart))
        // Games
        .route("/api/games/", web::get().to(games::list_games))
        .route("/api/games", web::get().to(games::list_games))
        .route("/api/games/", web::post().to(games::create_game))
        .route("/api/games", web::post().to(games::create_game))
        .route("/api/games/{id}", web::get().to(games::get_game))
        .route("/api/games/{id}", web::patch().to(games::update_score))
        // Stat tracking
        .route("/api/games/{id}/stats", web::get().to(stats::game_stats))
        .route("/api/games/{id}/stats", web::post().to(stats::create_stat))
        .route("/api/games/{id}/stats/quick", web::post().to(stats::quick_stat))
        .route("/api/games/{id}/stats/history", web::get().to(stats::stat_history))
        .route("/api/games/{id}/stats/latest", web::delete().to(stats::undo_latest))
        .route("/api/games/{id}/stats/{stat_id}", web::delete().to(stats::delete_stat))
        .route(
            "/api/stats/summary/player/{player_id}/game/{game_id}",
            web::get().to(stats::player_game_summary),
        )
        .route("/api/stats/{action_type}/", web::post().to(stats::create_flat))
        .route("/api/stats/{action_type}", web::post().to(stats::create_flat))
        .route("/api/stats/{action_type}/form", web::post().to(stats::create_from_form));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::player::PlayerCreate;

    #[test]
    fn test_decode_reports_missing_fields_as_validation() {
        let err = decode::<PlayerCreate>(br#"{"nam": "x"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("name"));

        let err = decode::<PlayerCreate>(b"{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let ok: PlayerCreate = decode(br#"{"name": "Kerri"}"#).unwrap();
        assert_eq!(ok.name, "Kerri");
    }
}

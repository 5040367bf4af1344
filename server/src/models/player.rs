use crate::stats::aggregate::PlayerTotals;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerCreate {
    pub name: String,
    pub image_url: Option<String>,
}

/// Partial update. An empty `image_url` clears the image.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlayerRosterRow {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub totals: PlayerTotals,
}

#[derive(Debug, Deserialize)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: String,
    /// Base64 (standard alphabet) file contents.
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct ImageUploadResult {
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub success: bool,
}

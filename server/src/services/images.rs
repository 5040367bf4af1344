use crate::db::Db;
use crate::error::AppError;
use crate::models::player::{ImageUpload, ImageUploadResult};
use crate::validation;
use base64::Engine;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Stores a player photo keyed by the sha256 of its bytes and returns the
/// URL it is served from. Uploading the same bytes twice yields the same URL.
pub fn upload_image(
    db: &Db,
    req: ImageUpload,
    max_bytes: usize,
) -> Result<ImageUploadResult, AppError> {
    let content_type = req.content_type.trim().to_ascii_lowercase();
    let data = base64::engine::general_purpose::STANDARD
        .decode(req.data.trim())
        .map_err(|_| AppError::Validation("Invalid image encoding".into()))?;
    validation::validate_image(&content_type, data.len(), max_bytes)?;

    let digest = Sha256::digest(&data);
    let mut id = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(id, "{:02x}", byte);
    }

    db.with_conn(|conn| {
        conn.execute(
            "INSERT OR IGNORE INTO player_images (id, content_type, data) VALUES (?1, ?2, ?3)",
            params![id, content_type, data],
        )
    })?;

    log::info!(
        "stored image {} ({}, {} bytes, from {})",
        id,
        content_type,
        data.len(),
        req.filename.as_deref().unwrap_or("unnamed upload")
    );
    Ok(ImageUploadResult {
        image_url: format!("/api/players/images/{}", id),
    })
}

/// Content type and bytes of a stored image.
pub fn get_image(db: &Db, image_id: &str) -> Result<(String, Vec<u8>), AppError> {
    db.with_conn(|conn| {
        conn.query_row(
            "SELECT content_type, data FROM player_images WHERE id = ?1",
            params![image_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
    })?
    .ok_or_else(|| AppError::NotFound("Image not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn upload(content_type: &str, bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            filename: Some("kerri.png".into()),
            content_type: content_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    #[test]
    fn test_upload_then_fetch() {
        let db = Db::open_in_memory().unwrap();
        let stored = upload_image(&db, upload("image/png", PNG_HEADER), 1024).unwrap();
        assert!(stored.image_url.starts_with("/api/players/images/"));

        let id = stored.image_url.rsplit('/').next().unwrap();
        assert_eq!(id.len(), 64);
        let (content_type, data) = get_image(&db, id).unwrap();
        assert_eq!(content_type, "image/png");
        assert_eq!(data, PNG_HEADER);
    }

    #[test]
    fn test_same_bytes_same_url() {
        let db = Db::open_in_memory().unwrap();
        let first = upload_image(&db, upload("image/png", PNG_HEADER), 1024).unwrap();
        let second = upload_image(&db, upload("IMAGE/PNG", PNG_HEADER), 1024).unwrap();
        assert_eq!(first.image_url, second.image_url);
    }

    #[test]
    fn test_rejects_bad_uploads() {
        let db = Db::open_in_memory().unwrap();
        let kind = |req| upload_image(&db, req, 4).unwrap_err().kind();

        assert_eq!(kind(upload("text/plain", b"hi")), ErrorKind::Validation);
        assert_eq!(kind(upload("image/png", PNG_HEADER)), ErrorKind::Validation);
        assert_eq!(kind(upload("image/png", b"")), ErrorKind::Validation);

        let garbage = ImageUpload {
            filename: None,
            content_type: "image/png".into(),
            data: "not base64!!".into(),
        };
        assert_eq!(kind(garbage), ErrorKind::Validation);
    }

    #[test]
    fn test_missing_image() {
        let db = Db::open_in_memory().unwrap();
        assert_eq!(get_image(&db, "abc").unwrap_err().kind(), ErrorKind::NotFound);
    }
}

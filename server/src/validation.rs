use crate::error::AppError;

const MAX_PLAYER_NAME_LEN: usize = 64;
const TEAM_SIZE: usize = 2;
const MAX_SETS: i64 = 5;
const VALID_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

pub fn validate_player_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if trimmed.chars().count() > MAX_PLAYER_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Name must be at most {} characters",
            MAX_PLAYER_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Checks a game's line-up: two filled slots per team and nobody on both sides.
pub fn validate_teams(
    team1: &[Option<i64>],
    team2: &[Option<i64>],
) -> Result<(Vec<i64>, Vec<i64>), AppError> {
    if team1.len() != TEAM_SIZE || team2.len() != TEAM_SIZE {
        return Err(AppError::Validation(
            "Select exactly 2 players for each team".into(),
        ));
    }
    let team1: Option<Vec<i64>> = team1.iter().copied().collect();
    let team2: Option<Vec<i64>> = team2.iter().copied().collect();
    let (team1, team2) = match (team1, team2) {
        (Some(t1), Some(t2)) => (t1, t2),
        _ => {
            return Err(AppError::Validation(
                "All player positions must be filled".into(),
            ))
        }
    };

    if team1.iter().any(|id| team2.contains(id)) {
        return Err(AppError::Validation(
            "A player cannot be on both teams".into(),
        ));
    }
    if team1[0] == team1[1] || team2[0] == team2[1] {
        return Err(AppError::Validation(
            "A player cannot fill two positions".into(),
        ));
    }
    Ok((team1, team2))
}

/// Scores are `"X-Y"` with non-negative integers on both sides.
pub fn validate_score(score: &str) -> Result<String, AppError> {
    let trimmed = score.trim();
    let valid = trimmed
        .split_once('-')
        .map(|(a, b)| is_count(a) && is_count(b))
        .unwrap_or(false);
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(AppError::Validation(format!("Invalid score: {}", score)))
    }
}

fn is_count(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

pub fn validate_num_sets(num_sets: Option<i64>) -> Result<(), AppError> {
    match num_sets {
        Some(n) if !(1..=MAX_SETS).contains(&n) => Err(AppError::Validation(format!(
            "Number of sets must be 1-{}",
            MAX_SETS
        ))),
        _ => Ok(()),
    }
}

pub fn validate_image(content_type: &str, size: usize, max_size: usize) -> Result<(), AppError> {
    if !VALID_IMAGE_TYPES.contains(&content_type) {
        return Err(AppError::Validation(format!(
            "Unsupported image type: {}",
            content_type
        )));
    }
    if size == 0 {
        return Err(AppError::Validation("Image is empty".into()));
    }
    if size > max_size {
        return Err(AppError::Validation("Image too large".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_name() {
        assert_eq!(validate_player_name("  April Ross ").unwrap(), "April Ross");
        assert!(validate_player_name("   ").is_err());
        assert!(validate_player_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_teams_accept_valid_lineup() {
        let (t1, t2) = validate_teams(&[Some(1), Some(2)], &[Some(3), Some(4)]).unwrap();
        assert_eq!(t1, vec![1, 2]);
        assert_eq!(t2, vec![3, 4]);
    }

    #[test]
    fn test_teams_reject_player_on_both_sides() {
        let err = validate_teams(&[Some(1), Some(2)], &[Some(2), Some(3)]).unwrap_err();
        assert!(err.to_string().contains("both teams"));
    }

    #[test]
    fn test_teams_reject_wrong_sizes() {
        assert!(validate_teams(&[Some(1)], &[Some(3), Some(4)]).is_err());
        assert!(validate_teams(&[Some(1), Some(2), Some(5)], &[Some(3), Some(4)]).is_err());
        assert!(validate_teams(&[], &[]).is_err());
    }

    #[test]
    fn test_teams_reject_unfilled_or_repeated_slot() {
        let err = validate_teams(&[Some(1), None], &[Some(3), Some(4)]).unwrap_err();
        assert!(err.to_string().contains("must be filled"));
        assert!(validate_teams(&[Some(1), Some(1)], &[Some(3), Some(4)]).is_err());
    }

    #[test]
    fn test_score() {
        assert_eq!(validate_score("21-19").unwrap(), "21-19");
        assert_eq!(validate_score(" 0-0 ").unwrap(), "0-0");
        assert!(validate_score("21").is_err());
        assert!(validate_score("-1-2").is_err());
        assert!(validate_score("a-b").is_err());
    }

    #[test]
    fn test_num_sets() {
        assert!(validate_num_sets(None).is_ok());
        assert!(validate_num_sets(Some(3)).is_ok());
        assert!(validate_num_sets(Some(0)).is_err());
        assert!(validate_num_sets(Some(6)).is_err());
    }

    #[test]
    fn test_image() {
        assert!(validate_image("image/png", 10, 100).is_ok());
        assert!(validate_image("text/plain", 10, 100).is_err());
        assert!(validate_image("image/png", 0, 100).is_err());
        assert!(validate_image("image/png", 101, 100).is_err());
    }
}

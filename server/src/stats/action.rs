use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Serving,
    ServeReceive,
    Attack,
    Block,
    Dig,
    Set,
}

impl ActionType {
    pub const ALL: [ActionType; 6] = [
        ActionType::Serving,
        ActionType::ServeReceive,
        ActionType::Attack,
        ActionType::Block,
        ActionType::Dig,
        ActionType::Set,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Serving => "serving",
            ActionType::ServeReceive => "serve_receive",
            ActionType::Attack => "attack",
            ActionType::Block => "block",
            ActionType::Dig => "dig",
            ActionType::Set => "set",
        }
    }

    /// Dashed form used in `/api/stats/{action-type}/` paths.
    pub fn path_segment(self) -> String {
        self.as_str().replace('_', "-")
    }

    pub fn from_path_segment(segment: &str) -> Result<Self, AppError> {
        segment
            .trim_matches('/')
            .replace('-', "_")
            .parse()
            .map_err(|_| AppError::NotFound(format!("No stat endpoint for '{}'", segment)))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ActionType::Serving => "Serve",
            ActionType::ServeReceive => "Receive",
            ActionType::Attack => "Attack",
            ActionType::Block => "Block",
            ActionType::Dig => "Dig",
            ActionType::Set => "Set",
        }
    }

    /// Name of the detail block in the normalized create payload.
    pub fn detail_key(self) -> &'static str {
        match self {
            ActionType::Serving => "serve_stat",
            ActionType::ServeReceive => "receive_stat",
            ActionType::Attack => "attack_stat",
            ActionType::Block => "block_stat",
            ActionType::Dig => "dig_stat",
            ActionType::Set => "set_stat",
        }
    }
}

impl FromStr for ActionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionType::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Invalid action_type: {}", s)))
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fast-entry category keys as shown on the tracking page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Serve,
    Receive,
    Attack,
    Block,
    Dig,
    Set,
}

impl Category {
    pub fn action_type(self) -> ActionType {
        match self {
            Category::Serve => ActionType::Serving,
            Category::Receive => ActionType::ServeReceive,
            Category::Attack => ActionType::Attack,
            Category::Block => ActionType::Block,
            Category::Dig => ActionType::Dig,
            Category::Set => ActionType::Set,
        }
    }

    /// Buttons the fast-entry UI offers for this category.
    pub fn actions(self) -> &'static [&'static str] {
        match self {
            Category::Serve => &["In", "Miss", "Ace"],
            Category::Receive => &["Good", "Error"],
            Category::Attack => &["Kill", "Error", "Blocked"],
            Category::Block => &["Stuff", "Touch", "Miss"],
            Category::Dig => &["Good", "Error"],
            Category::Set => &["Good", "Error"],
        }
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serve" => Ok(Category::Serve),
            "receive" => Ok(Category::Receive),
            "attack" => Ok(Category::Attack),
            "block" => Ok(Category::Block),
            "dig" => Ok(Category::Dig),
            "set" => Ok(Category::Set),
            other => Err(AppError::UnknownCategory(other.to_string())),
        }
    }
}

/// Declares a closed string enum that is stored and serialized as its lowercase label.
macro_rules! label_enum {
    ($name:ident, $field:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(AppError::Validation(format!(
                        "Invalid {}: {}",
                        $field, other
                    ))),
                }
            }
        }
    };
}

label_enum!(ServeType, "serve_type", {
    Float => "float",
    Hybrid => "hybrid",
    Topspin => "topspin",
    Jump => "jump",
});

label_enum!(AttackDirection, "attack_direction", {
    Line => "line",
    Angle => "angle",
    Cut => "cut",
    Jumbo => "jumbo",
});

label_enum!(AttackType, "attack_type", {
    Hard => "hard",
    Roll => "roll",
    Tip => "tip",
});

label_enum!(SetType, "set_type", {
    Bump => "bump",
    Hand => "hand",
    Jump => "jump",
});

label_enum!(DigQuality, "dig_quality", {
    Good => "good",
    Playable => "playable",
    Poor => "poor",
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_category_mapping_is_total() {
        let pairs = [
            ("serve", ActionType::Serving),
            ("receive", ActionType::ServeReceive),
            ("attack", ActionType::Attack),
            ("block", ActionType::Block),
            ("dig", ActionType::Dig),
            ("set", ActionType::Set),
        ];
        for (key, expected) in pairs {
            let category: Category = key.parse().unwrap();
            assert_eq!(category.action_type(), expected);
        }
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let err = "spike".parse::<Category>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCategory);
        // Category keys are case sensitive.
        assert!("Serve".parse::<Category>().is_err());
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(ActionType::ServeReceive.path_segment(), "serve-receive");
        assert_eq!(
            ActionType::from_path_segment("serve-receive").unwrap(),
            ActionType::ServeReceive
        );
        assert_eq!(
            ActionType::from_path_segment("serving").unwrap(),
            ActionType::Serving
        );
        let err = ActionType::from_path_segment("spike").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_label_enums() {
        assert_eq!("jumbo".parse::<AttackDirection>().unwrap(), AttackDirection::Jumbo);
        assert_eq!(AttackType::Tip.as_str(), "tip");
        assert!("overhand".parse::<SetType>().is_err());
        let json = serde_json::to_string(&ServeType::Topspin).unwrap();
        assert_eq!(json, "\"topspin\"");
    }
}

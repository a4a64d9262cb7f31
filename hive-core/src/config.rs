//! Game options

use crate::error::ConfigError;
use crate::pieces::{PieceKind, STANDARD_BAG};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional expansion pieces. Each adds one piece per color to the bag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Expansions {
    pub mosquito: bool,
    pub ladybug: bool,
    pub mealworm: bool,
}

/// Rule options fixed for the lifetime of a game
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Lifts the queen placement deadline
    pub sandbox_mode: bool,
    pub expansions: Expansions,
}

impl GameConfig {
    pub fn sandbox() -> Self {
        Self {
            sandbox_mode: true,
            ..Default::default()
        }
    }

    /// Per-color (kind, count) list in bag order
    pub fn bag(&self) -> Vec<(PieceKind, usize)> {
        let mut bag = STANDARD_BAG.to_vec();
        if self.expansions.ladybug {
            bag.push((PieceKind::Ladybug, 1));
        }
        if self.expansions.mosquito {
            bag.push((PieceKind::Mosquito, 1));
        }
        if self.expansions.mealworm {
            bag.push((PieceKind::Mealworm, 1));
        }
        bag
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_bag() {
        let bag = GameConfig::default().bag();
        assert_eq!(bag.iter().map(|(_, n)| n).sum::<usize>(), 11);
        assert_eq!(bag[0], (PieceKind::Queen, 1));
    }

    #[test]
    fn test_expansion_bag() {
        let config = GameConfig {
            expansions: Expansions {
                mosquito: true,
                ladybug: true,
                mealworm: false,
            },
            ..Default::default()
        };
        let bag = config.bag();
        assert_eq!(bag.len(), 7);
        assert!(bag.contains(&(PieceKind::Mosquito, 1)));
        assert!(!bag.contains(&(PieceKind::Mealworm, 1)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"sandbox_mode": true}"#).unwrap();
        assert!(config.sandbox_mode);
        assert_eq!(config.expansions, Expansions::default());
    }

    #[test]
    fn test_misspelt_option_rejected() {
        assert!(serde_json::from_str::<GameConfig>(r#"{"sandbox_mod": true}"#).is_err());
        assert!(serde_json::from_str::<GameConfig>(r#"{"expansions": {"pillbug": true}}"#).is_err());
    }

    #[test]
    fn test_load_reports_unknown_field() {
        let path = std::env::temp_dir().join("hive_config_unknown_field.json");
        std::fs::write(&path, r#"{"sandbox_mod": true}"#).unwrap();
        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Parse { .. })));
        std::fs::remove_file(&path).ok();
    }
}

//! Game options and the fixed setup tables (role ratio, hand sizes,
//! saboteur reward values). Options load from TOML.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

/// Tunable game parameters. All fields default to the classic rules.
#[derive(Debug, Clone, Deserialize)]
pub struct GameOptions {
    #[serde(default = "default_min_players")]
    pub min_players: usize,
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    #[serde(default = "default_rounds")]
    pub rounds: usize,
    /// Seed for deck shuffles and allegiance assignment; entropy when unset.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_min_players() -> usize {
    3
}

fn default_max_players() -> usize {
    10
}

fn default_rounds() -> usize {
    3
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            min_players: default_min_players(),
            max_players: default_max_players(),
            rounds: default_rounds(),
            random_seed: None,
        }
    }
}

/// Load options from a TOML file at the given path.
pub fn load_options(path: &Path) -> Result<GameOptions, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let options: GameOptions = toml::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    tracing::info!(path = %path.display(), "loaded game options");
    Ok(options)
}

/// Saboteur/gold-digger split per player count.
#[derive(Debug, Clone, Copy)]
pub struct RoleSplit {
    pub saboteurs: usize,
    pub gold_diggers: usize,
}

pub static ROLE_RATIO: Lazy<HashMap<usize, RoleSplit>> = Lazy::new(|| {
    [
        (3, RoleSplit { saboteurs: 1, gold_diggers: 3 }),
        (4, RoleSplit { saboteurs: 1, gold_diggers: 4 }),
        (5, RoleSplit { saboteurs: 2, gold_diggers: 4 }),
        (6, RoleSplit { saboteurs: 2, gold_diggers: 5 }),
        (7, RoleSplit { saboteurs: 3, gold_diggers: 5 }),
        (8, RoleSplit { saboteurs: 3, gold_diggers: 6 }),
        (9, RoleSplit { saboteurs: 3, gold_diggers: 7 }),
        (10, RoleSplit { saboteurs: 4, gold_diggers: 7 }),
    ]
    .into_iter()
    .collect()
});

/// Cards dealt to each player at round start, by player count.
pub static INITIAL_HAND_SIZES: Lazy<HashMap<usize, usize>> = Lazy::new(|| {
    [(3, 6), (4, 6), (5, 6), (6, 5), (7, 5), (8, 4), (9, 4), (10, 4)]
        .into_iter()
        .collect()
});

/// Gold value owed to each saboteur when their side wins, by saboteur count.
pub static SABOTEUR_GOLD_VALUES: Lazy<HashMap<usize, u32>> =
    Lazy::new(|| [(0, 0), (1, 4), (2, 3), (3, 3), (4, 2)].into_iter().collect());

/// Reward cards handed out on a gold-digger win, capped regardless of
/// player count.
pub const MAX_REWARD_CARDS: usize = 9;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_options() {
        let options = GameOptions::default();
        assert_eq!(options.min_players, 3);
        assert_eq!(options.max_players, 10);
        assert_eq!(options.rounds, 3);
        assert!(options.random_seed.is_none());
    }

    #[test]
    fn test_load_options_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rounds = 5\nrandom_seed = 99").unwrap();
        let options = load_options(file.path()).unwrap();
        assert_eq!(options.rounds, 5);
        assert_eq!(options.random_seed, Some(99));
        // Unspecified fields keep their defaults.
        assert_eq!(options.min_players, 3);
        assert_eq!(options.max_players, 10);
    }

    #[test]
    fn test_load_options_missing_file() {
        assert!(load_options(Path::new("/nonexistent/options.toml")).is_err());
    }

    #[test]
    fn test_tables_cover_player_range() {
        for count in 3..=10 {
            assert!(ROLE_RATIO.contains_key(&count));
            assert!(INITIAL_HAND_SIZES.contains_key(&count));
            let split = ROLE_RATIO[&count];
            assert_eq!(split.saboteurs + split.gold_diggers, count + 1);
        }
        for saboteurs in 0..=4 {
            assert!(SABOTEUR_GOLD_VALUES.contains_key(&saboteurs));
        }
    }
}

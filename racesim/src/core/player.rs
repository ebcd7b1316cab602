use serde::{Deserialize, Serialize};

/// Difficulty tiers of computer-controlled players, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for AiDifficulty {
    fn default() -> Self {
        AiDifficulty::Medium
    }
}

/// * `name` - Player name, e.g. Alice
/// * `color` - CSS color of the player's car, e.g. #e10600
/// * `is_local` - True if the player enters moves on this machine
/// * `is_ai` - True if the player is computer-controlled
/// * `ai_difficulty` - (optional) Difficulty tier of a computer-controlled player, defaults to
/// medium
#[derive(Debug, Deserialize, Clone)]
pub struct PlayerPars {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_is_local")]
    pub is_local: bool,
    #[serde(default)]
    pub is_ai: bool,
    #[serde(default)]
    pub ai_difficulty: Option<AiDifficulty>,
}

fn default_color() -> String {
    String::from("#e10600")
}

fn default_is_local() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: usize,
    pub name: String,
    pub color: String,
    pub is_local: bool,
    ai_difficulty: Option<AiDifficulty>,
}

impl Player {
    pub fn new(id: usize, player_pars: &PlayerPars) -> Player {
        Player {
            id,
            name: player_pars.name.to_owned(),
            color: player_pars.color.to_owned(),
            is_local: player_pars.is_local,
            ai_difficulty: if player_pars.is_ai {
                Some(player_pars.ai_difficulty.unwrap_or_default())
            } else {
                None
            },
        }
    }

    pub fn is_ai(&self) -> bool {
        self.ai_difficulty.is_some()
    }

    /// get_ai_difficulty returns None for human players.
    pub fn get_ai_difficulty(&self) -> Option<AiDifficulty> {
        self.ai_difficulty
    }

    /// set_ai_difficulty changes the tier of a computer-controlled player. Human players are
    /// left untouched, the return value tells whether the change was applied.
    pub fn set_ai_difficulty(&mut self, difficulty: AiDifficulty) -> bool {
        if self.ai_difficulty.is_some() {
            self.ai_difficulty = Some(difficulty);
            true
        } else {
            false
        }
    }
}

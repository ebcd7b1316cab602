use crate::core::player::AiDifficulty;

/// Tunable parameter set of one difficulty tier.
/// * `straight_speed` - Desired speed on straights
/// * `corner_speed` - Desired speed through corners
/// * `crash_speed` - Speed above which the risk of crashing is penalized heavily
/// * `line_weight` - Weight of the racing line deviation penalty
/// * `avoid_weight` - Weight of the car avoidance penalty
/// * `overtaking` - Reward moves that pass cars ahead
/// * `defensive` - Reward staying ahead of cars behind
/// * `lookahead_depth` - Number of additional plies searched (0 = no lookahead)
/// * `jitter_std` - Standard deviation of the random noise added to every score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParams {
    pub straight_speed: f64,
    pub corner_speed: f64,
    pub crash_speed: f64,
    pub line_weight: f64,
    pub avoid_weight: f64,
    pub overtaking: bool,
    pub defensive: bool,
    pub lookahead_depth: u32,
    pub jitter_std: f64,
}

impl DifficultyParams {
    pub fn for_difficulty(difficulty: AiDifficulty) -> DifficultyParams {
        match difficulty {
            AiDifficulty::Easy => DifficultyParams {
                straight_speed: 3.0,
                corner_speed: 2.0,
                crash_speed: 4.0,
                line_weight: 1.0,
                avoid_weight: 8.0,
                overtaking: false,
                defensive: false,
                lookahead_depth: 0,
                jitter_std: 2.0,
            },
            AiDifficulty::Medium => DifficultyParams {
                straight_speed: 4.0,
                corner_speed: 2.5,
                crash_speed: 5.0,
                line_weight: 2.0,
                avoid_weight: 10.0,
                overtaking: false,
                defensive: true,
                lookahead_depth: 2,
                jitter_std: 1.0,
            },
            AiDifficulty::Hard => DifficultyParams {
                straight_speed: 5.0,
                corner_speed: 3.0,
                crash_speed: 6.0,
                line_weight: 3.0,
                avoid_weight: 12.0,
                overtaking: true,
                defensive: true,
                lookahead_depth: 3,
                jitter_std: 0.3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harder_tiers_drive_faster_and_search_deeper() {
        let easy = DifficultyParams::for_difficulty(AiDifficulty::Easy);
        let medium = DifficultyParams::for_difficulty(AiDifficulty::Medium);
        let hard = DifficultyParams::for_difficulty(AiDifficulty::Hard);

        assert!(easy.straight_speed < medium.straight_speed);
        assert!(medium.straight_speed < hard.straight_speed);
        assert!(easy.lookahead_depth < medium.lookahead_depth);
        assert!(medium.lookahead_depth < hard.lookahead_depth);
        assert!(easy.jitter_std > hard.jitter_std);
    }
}

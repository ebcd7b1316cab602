use crate::core::player::AiDifficulty;
use crate::core::race::GameState;
use helpers::geometry::Vec2;
use std::collections::VecDeque;

/// Session wraps the current race state together with a bounded history of previous states
/// so that moves can be taken back.
#[derive(Debug)]
pub struct Session {
    state: GameState,
    history: VecDeque<GameState>,
    history_depth: usize,
}

impl Session {
    pub fn new(state: GameState, history_depth: usize) -> Session {
        Session {
            state,
            history: VecDeque::with_capacity(history_depth),
            history_depth,
        }
    }

    pub fn get_state(&self) -> &GameState {
        &self.state
    }

    /// play applies a move of the active car. Moves that do not change the state (race over)
    /// are not recorded in the history.
    pub fn play(&mut self, acc: Vec2) -> &GameState {
        let next = self.state.apply_move(acc);
        if next.turn == self.state.turn {
            return &self.state;
        }

        if self.history_depth > 0 {
            if self.history.len() == self.history_depth {
                self.history.pop_front();
            }
            self.history
                .push_back(std::mem::replace(&mut self.state, next));
        } else {
            self.state = next;
        }

        &self.state
    }

    /// undo restores the state before the last move. Returns false if the history is empty.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(prev) => {
                self.state = prev;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn get_history_len(&self) -> usize {
        self.history.len()
    }

    /// set_ai_difficulty changes an AI player's tier in the current state. Earlier states in the
    /// history keep the tier they were played with.
    pub fn set_ai_difficulty(&mut self, player_id: usize, difficulty: AiDifficulty) -> bool {
        self.state.set_ai_difficulty(player_id, difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::PlayerPars;
    use crate::core::race::tests::new_state;

    #[test]
    fn undo_restores_the_previous_state() {
        let mut session = Session::new(new_state(2, 3), 10);
        assert!(!session.can_undo());

        session.play(Vec2::new(0.0, 1.0));
        assert_eq!(session.get_state().cars_list[0].pos, Vec2::new(7.0, 21.0));
        assert_eq!(session.get_state().current_player_idx, 1);

        assert!(session.undo());
        assert_eq!(session.get_state().cars_list[0].pos, Vec2::new(7.0, 20.0));
        assert_eq!(session.get_state().current_player_idx, 0);
        assert!(!session.undo());
    }

    #[test]
    fn history_is_bounded() {
        let mut session = Session::new(new_state(1, 3), 3);
        for _ in 0..5 {
            session.play(Vec2::ZERO);
        }
        assert_eq!(session.get_history_len(), 3);

        while session.undo() {}
        // the two oldest states were dropped
        assert_eq!(session.get_state().turn, 2);
    }

    #[test]
    fn difficulty_toggle_only_affects_ai_players() {
        let mut state = new_state(1, 3);
        let ai: PlayerPars =
            serde_json::from_str(r#"{"name": "Bot", "is_ai": true, "ai_difficulty": "easy"}"#)
                .unwrap();
        state.players_list.push(crate::core::player::Player::new(1, &ai));

        let mut session = Session::new(state, 5);
        assert!(!session.set_ai_difficulty(0, AiDifficulty::Hard));
        assert!(session.set_ai_difficulty(1, AiDifficulty::Hard));
        assert_eq!(
            session.get_state().players_list[1].get_ai_difficulty(),
            Some(AiDifficulty::Hard)
        );
        assert!(!session.set_ai_difficulty(7, AiDifficulty::Hard));
    }
}

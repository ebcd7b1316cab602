use crate::core::car::CarStatus;
use crate::core::race::{GameState, RaceEvent};
use serde::Serialize;
use std::path::Path;

/// One line of the final classification.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub position: usize,
    pub car_id: usize,
    pub name: String,
    pub status: CarStatus,
    pub laps: u32,
    pub finish_time: Option<u32>,
    pub moves: usize,
}

/// RaceResult contains all race information that is required for post-processing the results.
/// * `turns` - Number of moves played
/// * `completed` - False if the race was stopped before all cars were out or finished
/// * `events` - All events of the race in chronological order
#[derive(Debug, Serialize, Clone)]
pub struct RaceResult {
    pub target_laps: u32,
    pub turns: u32,
    pub completed: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub events: Vec<RaceEvent>,
}

impl RaceResult {
    pub fn from_state(state: &GameState, events: Vec<RaceEvent>) -> RaceResult {
        let leaderboard = state
            .get_leaderboard()
            .into_iter()
            .enumerate()
            .map(|(i, car_idx)| {
                let car = &state.cars_list[car_idx];
                LeaderboardEntry {
                    position: i + 1,
                    car_id: car.id,
                    name: car.name.to_owned(),
                    status: car.get_status(),
                    laps: car.current_lap,
                    finish_time: car.finish_time,
                    moves: car.trail.len() - 1,
                }
            })
            .collect();

        RaceResult {
            target_laps: state.target_laps,
            turns: state.turn,
            completed: state.game_finished(),
            leaderboard,
            events,
        }
    }

    /// print_leaderboard prints the final classification to the console output.
    pub fn print_leaderboard(&self) {
        println!(
            "RESULT: {} after {} moves ({} laps)",
            if self.completed {
                "Race finished"
            } else {
                "Race stopped"
            },
            self.turns,
            self.target_laps
        );
        for entry in self.leaderboard.iter() {
            let finish = match entry.finish_time {
                Some(t) => format!("finished in turn {}", t),
                None => format!("{:?}", entry.status).to_lowercase(),
            };
            println!(
                "RESULT: {:2}. {:<12} laps {:2}, moves {:4}, {}",
                entry.position, entry.name, entry.laps, entry.moves, finish
            );
        }
    }

    /// write_leaderboard_csv writes the final classification to a CSV file (by default
    /// output/last_run.csv). Returns the path to the written file.
    pub fn write_leaderboard_csv(&self, path: Option<&Path>) -> anyhow::Result<String> {
        let out_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let out_dir = Path::new("output");
                std::fs::create_dir_all(out_dir)?;
                out_dir.join("last_run.csv")
            }
        };

        let mut writer = csv::Writer::from_path(&out_path)?;
        for entry in self.leaderboard.iter() {
            writer.serialize(entry)?;
        }
        writer.flush()?;

        Ok(out_path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::race::tests::new_state;

    #[test]
    fn leaderboard_follows_race_order() {
        let mut state = new_state(3, 2);
        state.cars_list[0].crashed = true;
        state.cars_list[2].finished = true;
        state.cars_list[2].current_lap = 2;
        state.cars_list[2].finish_time = Some(30);

        let result = RaceResult::from_state(&state, Vec::new());
        let ids: Vec<usize> = result.leaderboard.iter().map(|e| e.car_id).collect();
        assert_eq!(ids, vec![2, 0, 1]);
        assert_eq!(result.leaderboard[0].position, 1);
        assert_eq!(result.leaderboard[0].status, CarStatus::Finished);
        assert!(!result.completed);
    }

    #[test]
    fn leaderboard_csv_is_written() {
        let state = new_state(2, 1);
        let result = RaceResult::from_state(&state, Vec::new());
        let path = std::env::temp_dir().join("gridrace_leaderboard_test.csv");

        let written = result.write_leaderboard_csv(Some(&path)).unwrap();
        let content = std::fs::read_to_string(&written).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("position,car_id,name,status,laps,finish_time,moves")
        );
        assert_eq!(lines.count(), 2);
    }
}

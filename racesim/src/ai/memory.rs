use crate::core::car::CarId;
use helpers::geometry::{centroid, Vec2};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Number of recent positions remembered per car.
const RECENT_LEN: usize = 12;

/// Cycle lengths checked by the loop detection.
const LOOP_PERIODS: [usize; 3] = [2, 3, 4];

/// A detected oscillation of a car between a few positions.
/// * `period` - Number of distinct positions in the cycle
/// * `positions` - Positions of the cycle
/// * `centroid` - Mean of the cycle positions
#[derive(Debug, Clone, PartialEq)]
pub struct LoopInfo {
    pub period: usize,
    pub positions: Vec<Vec2>,
    pub centroid: Vec2,
}

impl LoopInfo {
    pub fn contains(&self, p: Vec2) -> bool {
        self.positions.iter().any(|&q| q == p)
    }
}

#[derive(Debug, Clone, Default)]
struct CarMemory {
    recent: VecDeque<Vec2>,
    loops_detected: u32,
}

/// AiMemory holds the per-car history the AI needs across decisions. It is owned by the caller
/// and handed into every decision.
#[derive(Debug, Clone, Default)]
pub struct AiMemory {
    cars: HashMap<CarId, CarMemory>,
}

impl AiMemory {
    pub fn new() -> AiMemory {
        AiMemory::default()
    }

    /// record appends the current position of a car. Repeated calls with the position the car
    /// already holds (e.g. a decision taken twice for the same state) are ignored.
    pub fn record(&mut self, car_id: CarId, pos: Vec2) {
        let mem = self.cars.entry(car_id).or_default();
        if mem.recent.back() == Some(&pos) {
            return;
        }
        if mem.recent.len() == RECENT_LEN {
            mem.recent.pop_front();
        }
        mem.recent.push_back(pos);
    }

    /// detect_loop checks whether the most recent positions of a car repeat with a period of
    /// 2, 3 or 4 over at least two full cycles.
    pub fn detect_loop(&mut self, car_id: CarId) -> Option<LoopInfo> {
        let mem = self.cars.get_mut(&car_id)?;
        let recent: Vec<Vec2> = mem.recent.iter().copied().collect();
        let n = recent.len();

        for &period in LOOP_PERIODS.iter() {
            if n < 2 * period {
                continue;
            }
            let tail = &recent[n - 2 * period..];
            if (0..period).all(|i| tail[i] == tail[i + period]) {
                let positions = tail[period..].to_vec();
                mem.loops_detected += 1;
                debug!("Car {} is looping with period {}", car_id, period);
                return Some(LoopInfo {
                    period,
                    centroid: centroid(&positions),
                    positions,
                });
            }
        }

        None
    }

    pub fn get_loops_detected(&self, car_id: CarId) -> u32 {
        self.cars.get(&car_id).map_or(0, |mem| mem.loops_detected)
    }

    pub fn get_recent(&self, car_id: CarId) -> Vec<Vec2> {
        self.cars
            .get(&car_id)
            .map(|mem| mem.recent.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn forget(&mut self, car_id: CarId) {
        self.cars.remove(&car_id);
    }

    pub fn clear(&mut self) {
        self.cars.clear();
    }
}

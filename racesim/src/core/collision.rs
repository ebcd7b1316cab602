use crate::core::car::{Car, CarId};
use helpers::geometry::{distance_to_segment, Segment, Vec2};
use serde::Deserialize;

/// Resolution applied to a car whose move runs into another car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The mover keeps its previous position and loses all speed.
    Stop,
}

/// * `enabled` - Activate car-to-car collisions
/// * `radius` - A move collides if its path passes within this distance of another car
/// * `min_separation` - A move collides if it ends within this distance of another car
/// * `policy` - Resolution applied to the moving car
#[derive(Debug, Clone, Deserialize)]
pub struct CollisionPars {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default = "default_min_separation")]
    pub min_separation: f64,
    #[serde(default = "default_policy")]
    pub policy: CollisionPolicy,
}

fn default_radius() -> f64 {
    0.5
}

fn default_min_separation() -> f64 {
    1.0
}

fn default_policy() -> CollisionPolicy {
    CollisionPolicy::Stop
}

impl Default for CollisionPars {
    fn default() -> Self {
        CollisionPars {
            enabled: false,
            radius: default_radius(),
            min_separation: default_min_separation(),
            policy: default_policy(),
        }
    }
}

/// detect_collision returns the first active car (other than `mover_id`) that the move
/// from -> to runs into.
pub fn detect_collision(
    mover_id: CarId,
    from: Vec2,
    to: Vec2,
    cars_list: &[Car],
    pars: &CollisionPars,
) -> Option<CarId> {
    let path = Segment::new(from, to);

    cars_list
        .iter()
        .filter(|other| other.id != mover_id && other.is_active())
        .find(|other| {
            distance_to_segment(other.pos, &path) <= pars.radius
                || to.distance(other.pos) <= pars.min_separation
        })
        .map(|other| other.id)
}

/// resolve_collision returns the velocity and position of the mover after a collision.
pub fn resolve_collision(policy: CollisionPolicy, from: Vec2) -> (Vec2, Vec2) {
    match policy {
        CollisionPolicy::Stop => (Vec2::ZERO, from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::{Player, PlayerPars};

    fn car_at(id: CarId, x: f64, y: f64) -> Car {
        let pars: PlayerPars = serde_json::from_str(r#"{"name": "P"}"#).unwrap();
        Car::new(id, &Player::new(id, &pars), Vec2::new(x, y))
    }

    fn enabled() -> CollisionPars {
        CollisionPars {
            enabled: true,
            ..CollisionPars::default()
        }
    }

    #[test]
    fn path_through_another_car_collides() {
        let cars = vec![car_at(0, 7.0, 20.0), car_at(1, 7.0, 22.0)];
        let hit = detect_collision(0, Vec2::new(7.0, 20.0), Vec2::new(7.0, 24.0), &cars, &enabled());
        assert_eq!(hit, Some(1));
    }

    #[test]
    fn passing_at_a_distance_does_not_collide() {
        let cars = vec![car_at(0, 5.0, 20.0), car_at(1, 7.0, 20.0)];
        let hit = detect_collision(0, Vec2::new(5.0, 20.0), Vec2::new(5.0, 24.0), &cars, &enabled());
        assert_eq!(hit, None);
    }

    #[test]
    fn ending_exactly_at_the_minimum_separation_collides() {
        let cars = vec![car_at(0, 7.0, 20.0), car_at(1, 9.0, 23.0)];
        let hit = detect_collision(0, Vec2::new(7.0, 20.0), Vec2::new(8.0, 23.0), &cars, &enabled());
        assert_eq!(hit, Some(1));

        let hit = detect_collision(0, Vec2::new(7.0, 20.0), Vec2::new(7.0, 23.0), &cars, &enabled());
        assert_eq!(hit, None);
    }

    #[test]
    fn inactive_cars_are_ignored() {
        let mut cars = vec![car_at(0, 7.0, 20.0), car_at(1, 7.0, 22.0)];
        cars[1].crashed = true;
        let hit = detect_collision(0, Vec2::new(7.0, 20.0), Vec2::new(7.0, 22.0), &cars, &enabled());
        assert_eq!(hit, None);
    }

    #[test]
    fn stop_policy_holds_position() {
        let (vel, pos) = resolve_collision(CollisionPolicy::Stop, Vec2::new(7.0, 20.0));
        assert_eq!(vel, Vec2::ZERO);
        assert_eq!(pos, Vec2::new(7.0, 20.0));
    }
}

pub mod car;
pub mod collision;
pub mod handle_race;
pub mod lap_validation;
pub mod motion;
pub mod player;
pub mod race;
pub mod scheduler;
pub mod session;
pub mod track;

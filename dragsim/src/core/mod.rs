pub mod error;
pub mod handle_race;
pub mod kinematics;
pub mod outcome;
pub mod race;
pub mod scheduler;
pub mod vehicle;

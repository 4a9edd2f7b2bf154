pub mod game_repo;
pub mod matchup_repo;
pub mod models;
pub mod move_repo;
pub mod participant_repo;

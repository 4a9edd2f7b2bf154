pub mod config;
pub mod db;
pub mod errors;
pub mod game;
pub mod http;
pub mod metrics;
pub mod protocol;
pub mod ws;

pub mod games;
pub mod health;
pub mod presence;
pub mod routes;

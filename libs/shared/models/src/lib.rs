pub mod agenda;
pub mod auth;
pub mod error;

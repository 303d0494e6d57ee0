pub mod auth;
pub mod search;

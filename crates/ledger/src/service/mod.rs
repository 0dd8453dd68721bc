pub mod auth;
pub mod events;
pub mod registration;
pub mod reports;
pub mod signatures;

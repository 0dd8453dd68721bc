pub mod admin;
pub mod attendee;
pub mod auth;
pub mod event;
pub mod session;
pub mod trainer;

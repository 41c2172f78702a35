//! API endpoint handlers.
//!
//! Each module corresponds to a page or feature of the portal.
//! Handlers delegate to the domain modules and only shape the JSON.

pub mod auth;
pub mod chat;
pub mod clinician;
pub mod health;
pub mod patient;
pub mod simulation;
pub mod users;

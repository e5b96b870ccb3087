// src/handlers/mod.rs

pub mod auth;
pub mod courses;
pub mod progress;
pub mod sessions;
pub mod tasks;
pub mod users;

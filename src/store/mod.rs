// src/store/mod.rs

pub mod local;
pub mod orders;

pub use local::LocalCache;
pub use orders::OrderStore;

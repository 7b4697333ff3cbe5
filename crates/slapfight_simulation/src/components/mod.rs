//! Компоненты бойцов
//!
//! - actor: сторона боя (Side), здоровье (Health, HealthProvider)

pub mod actor;

pub use actor::*;

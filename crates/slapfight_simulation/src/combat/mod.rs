//! Combat rules module
//!
//! - damage: captured meter value → урон, counter → снижение урона
//! - progression: уровень/апгрейды/boss множители → границы meter'а и урон AI
//!
//! Состояние боя (ход, FSM бойцов) живёт в `turn`; здесь только правила.

pub mod damage;
pub mod progression;


// Re-export основных типов
pub use damage::{
    apply_counter_reduction, compute_ai_damage, compute_player_damage, CounterCapture,
    DamageContext,
};
pub use progression::{Progression, ScalingRules, StaticProgression};

//! SLAPFIGHT Simulation Core
//!
//! Пошаговый slap-fight на Bevy 0.16 (headless ECS)
//!
//! HYBRID ARCHITECTURE:
//! - ECS = правила матча (фазы хода, FSM бойцов, meter'ы, урон)
//! - Движок/клиент = анимации, input, UI (мосты: PlayerTap / SlapHit / MatchEvent)

use bevy::prelude::*;

// Публичные модули
pub mod combat;
pub mod combatant;
pub mod components;
pub mod config;
pub mod logger;
pub mod meter;
pub mod turn;

// Re-export базовых типов для удобства
pub use combat::{
    apply_counter_reduction, compute_ai_damage, compute_player_damage, CounterCapture,
    DamageContext, Progression, ScalingRules, StaticProgression,
};
pub use combatant::{
    AnimationClass, AnimationCue, CombatantState, CombatantStateMachine, StateChanged,
};
pub use components::*;
pub use config::{
    CombatantProfile, ConfigError, DamageRange, MatchConfig, MeterConfig, TurnTimings,
};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level,
    set_logger, set_logger_if_needed, LogLevel, LogPrinter,
};
pub use meter::{power_from_meter, triangle_value, OscillatingMeter};
pub use turn::{
    MatchEvent, PlayerTap, SlapHit, TurnController, TurnPhase, TurnPlugin, TurnScheduler,
    TurnStep,
};

/// Главный plugin симуляции
///
/// Вставляет `MatchConfig` + `TurnController` и подключает `TurnPlugin`.
/// Первый ход игрока стартует в `Startup`.
pub struct SlapFightPlugin {
    pub config: MatchConfig,
}

impl Default for SlapFightPlugin {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl SlapFightPlugin {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Дефолтный конфиг с другим seed (варианты анимаций, урон AI)
    pub fn with_seed(seed: u64) -> Self {
        Self::new(MatchConfig {
            seed,
            ..MatchConfig::default()
        })
    }
}

impl Plugin for SlapFightPlugin {
    fn build(&self, app: &mut App) {
        if let Err(err) = self.config.validate() {
            // Матч всё равно собирается: невалидные значения клампятся meter'ами/FSM
            log_warning(&format!("⚠️ MatchConfig validation failed: {}", err));
        }

        app
            // Fixed timestep 60Hz (тик meter'ов и таймеров хода)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .insert_resource(self.config.clone())
            .insert_resource(TurnController::new(&self.config))
            .add_plugins(TurnPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

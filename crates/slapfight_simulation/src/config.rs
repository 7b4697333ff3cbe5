//! Конфигурация матча: тайминги хода, параметры осцилляторов, профили бойцов
//!
//! Значения по умолчанию соответствуют текущему балансу игры.
//! Загрузка из RON: `MatchConfig::from_ron_str` / `from_ron_file` (+ validate).

use std::path::Path;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::progression::{ScalingRules, StaticProgression};

/// Ошибки загрузки/валидации конфигурации
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{field} must be a finite non-negative number of seconds (got {value})")]
    InvalidDuration { field: &'static str, value: f32 },

    #[error("{field} must be positive")]
    NonPositiveHealth { field: &'static str },

    #[error("meter `{meter}` is invalid: {reason}")]
    InvalidMeter { meter: &'static str, reason: String },

    #[error("counter meter bounds must lie in [0, 1] (got {min}..{max})")]
    CounterOutOfRange { min: f32, max: f32 },

    #[error("mega threshold of `{profile}` must lie in [0, 1] (got {value})")]
    InvalidMegaThreshold { profile: &'static str, value: f32 },
}

/// Тайминги хода (секунды)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnTimings {
    /// Пауза AI перед атакой (после старта AITurn)
    pub ai_wait_time: f32,
    /// Длительность атаки AI до возврата хода игроку
    pub ai_attack_time: f32,
    /// Задержка "получил пощёчину" перед стартом AITurn
    pub get_slapped_delay: f32,
}

impl Default for TurnTimings {
    fn default() -> Self {
        Self {
            ai_wait_time: 1.5,
            ai_attack_time: 1.2,
            get_slapped_delay: 1.0,
        }
    }
}

/// Параметры осциллятора (треугольная волна)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    pub min_value: f32,
    pub max_value: f32,
    /// Скорость фазы (единиц длины в секунду); <= 0 → meter стоит на месте
    pub angular_speed: f32,
    /// Длина периода фазы
    pub length: f32,
    pub ping_pong: bool,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self::power()
    }
}

impl MeterConfig {
    /// Power meter по умолчанию (целые значения урона)
    pub fn power() -> Self {
        Self {
            min_value: 5.0,
            max_value: 40.0,
            angular_speed: 1.2,
            length: 1.0,
            ping_pong: true,
        }
    }

    /// Counter system по умолчанию (доля поглощения урона)
    pub fn counter() -> Self {
        Self {
            min_value: 0.0,
            max_value: 0.8,
            angular_speed: 1.5,
            length: 1.0,
            ping_pong: true,
        }
    }

    fn validate(&self, meter: &'static str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidMeter {
            meter,
            reason: reason.to_string(),
        };

        if !self.min_value.is_finite() || !self.max_value.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if !self.angular_speed.is_finite() {
            return Err(invalid("angular_speed must be finite"));
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(invalid("length must be positive"));
        }
        Ok(())
    }
}

/// Диапазон урона AI (включительно)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: u32,
    pub max: u32,
}

impl Default for DamageRange {
    fn default() -> Self {
        Self { min: 8, max: 20 }
    }
}

impl DamageRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Доля урона от верхней границы диапазона (0..1), как `fraction_of_max` у meter'а
    pub fn fraction_of_max(&self, damage: u32) -> f32 {
        let hi = self.min.max(self.max);
        if hi == 0 {
            return 0.0;
        }
        (damage as f32 / hi as f32).clamp(0.0, 1.0)
    }
}

/// Профиль бойца: capability по состояниям, пулы анимаций, длительность атаки
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantProfile {
    /// Capability (input для игрока, AI logic для AI) в Idle
    pub capability_in_idle: bool,
    /// Capability в Waiting
    pub capability_in_waiting: bool,
    pub hit_variants: u8,
    pub mega_hit_variants: u8,
    pub attack_variants: u8,
    pub mega_attack_variants: u8,
    /// Порог силы (доля от max meter'а) для "mega" анимаций
    pub mega_threshold: f32,
    /// Время в Attacking до автоматического возврата в Idle
    pub attack_duration: f32,
}

impl Default for CombatantProfile {
    fn default() -> Self {
        Self::player()
    }
}

impl CombatantProfile {
    pub fn player() -> Self {
        Self {
            capability_in_idle: true,
            capability_in_waiting: false,
            hit_variants: 2,
            mega_hit_variants: 3,
            attack_variants: 2,
            mega_attack_variants: 2,
            mega_threshold: 0.5,
            attack_duration: 1.0,
        }
    }

    pub fn ai() -> Self {
        Self {
            capability_in_idle: true,
            capability_in_waiting: false,
            hit_variants: 2,
            mega_hit_variants: 4,
            attack_variants: 3,
            mega_attack_variants: 2,
            mega_threshold: 0.5,
            attack_duration: 1.2,
        }
    }

    fn validate(&self, profile: &'static str) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.mega_threshold) {
            return Err(ConfigError::InvalidMegaThreshold {
                profile,
                value: self.mega_threshold,
            });
        }
        check_duration("attack_duration", self.attack_duration)
    }
}

/// Полная конфигурация матча
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Seed для ChaCha8Rng (варианты анимаций, урон AI)
    pub seed: u64,
    pub timings: TurnTimings,
    pub power_meter: MeterConfig,
    pub counter_meter: MeterConfig,
    pub ai_damage: DamageRange,
    pub player: CombatantProfile,
    pub ai: CombatantProfile,
    pub player_max_health: u32,
    pub ai_max_health: u32,
    pub scaling: ScalingRules,
    pub progression: StaticProgression,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            timings: TurnTimings::default(),
            power_meter: MeterConfig::power(),
            counter_meter: MeterConfig::counter(),
            ai_damage: DamageRange::default(),
            player: CombatantProfile::player(),
            ai: CombatantProfile::ai(),
            player_max_health: 100,
            ai_max_health: 120,
            scaling: ScalingRules::default(),
            progression: StaticProgression::default(),
        }
    }
}

impl MatchConfig {
    /// Парсит RON и валидирует результат
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_ron_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_duration("timings.ai_wait_time", self.timings.ai_wait_time)?;
        check_duration("timings.ai_attack_time", self.timings.ai_attack_time)?;
        check_duration("timings.get_slapped_delay", self.timings.get_slapped_delay)?;

        self.power_meter.validate("power_meter")?;
        self.counter_meter.validate("counter_meter")?;

        let counter = self.counter_meter;
        let counter_range = 0.0..=1.0;
        if !counter_range.contains(&counter.min_value) || !counter_range.contains(&counter.max_value) {
            return Err(ConfigError::CounterOutOfRange {
                min: counter.min_value,
                max: counter.max_value,
            });
        }

        self.player.validate("player")?;
        self.ai.validate("ai")?;

        if self.player_max_health == 0 {
            return Err(ConfigError::NonPositiveHealth { field: "player_max_health" });
        }
        if self.ai_max_health == 0 {
            return Err(ConfigError::NonPositiveHealth { field: "ai_max_health" });
        }
        Ok(())
    }
}

fn check_duration(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}

//! Progression scaling
//!
//! Провайдер прогрессии (уровень, апгрейды, boss множители) внешний:
//! ядро только читает значения. `ScalingRules` переводит их в границы
//! power meter'а, диапазон урона AI и максимум HP AI — до начала хода.

use serde::{Deserialize, Serialize};

use crate::config::{DamageRange, MeterConfig};

/// Контракт внешнего провайдера прогрессии (read-only)
pub trait Progression: Send + Sync {
    fn level(&self) -> u32;
    fn upgrade_count(&self) -> u32;

    fn boss_health_multiplier(&self) -> f32 {
        1.0
    }

    fn boss_damage_multiplier(&self) -> f32 {
        1.0
    }
}

/// Снимок прогрессии на матч
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticProgression {
    pub level: u32,
    pub upgrade_count: u32,
    pub boss_health_multiplier: f32,
    pub boss_damage_multiplier: f32,
}

impl Default for StaticProgression {
    fn default() -> Self {
        Self {
            level: 1,
            upgrade_count: 0,
            boss_health_multiplier: 1.0,
            boss_damage_multiplier: 1.0,
        }
    }
}

impl StaticProgression {
    pub fn snapshot(progression: &dyn Progression) -> Self {
        Self {
            level: progression.level(),
            upgrade_count: progression.upgrade_count(),
            boss_health_multiplier: progression.boss_health_multiplier(),
            boss_damage_multiplier: progression.boss_damage_multiplier(),
        }
    }
}

impl Progression for StaticProgression {
    fn level(&self) -> u32 {
        self.level
    }

    fn upgrade_count(&self) -> u32 {
        self.upgrade_count
    }

    fn boss_health_multiplier(&self) -> f32 {
        self.boss_health_multiplier
    }

    fn boss_damage_multiplier(&self) -> f32 {
        self.boss_damage_multiplier
    }
}

/// Правила скейлинга
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingRules {
    /// +max power за каждый апгрейд
    pub power_per_upgrade: f32,
    /// Рост урона AI за уровень выше первого (доля)
    pub ai_damage_per_level: f32,
    /// Рост HP AI за уровень выше первого (доля)
    pub ai_health_per_level: f32,
}

impl Default for ScalingRules {
    fn default() -> Self {
        Self {
            power_per_upgrade: 5.0,
            ai_damage_per_level: 0.1,
            ai_health_per_level: 0.15,
        }
    }
}

impl ScalingRules {
    /// Границы power meter'а: max растёт с апгрейдами, min не меняется
    pub fn power_bounds(&self, base: &MeterConfig, progression: &dyn Progression) -> (f32, f32) {
        let bonus = progression.upgrade_count() as f32 * self.power_per_upgrade;
        (base.min_value, base.max_value + bonus)
    }

    /// Диапазон урона AI: × (1 + рост за уровень) × boss_damage_multiplier
    pub fn ai_damage(&self, base: DamageRange, progression: &dyn Progression) -> DamageRange {
        let factor = level_factor(progression.level(), self.ai_damage_per_level)
            * sanitize_multiplier(progression.boss_damage_multiplier());
        DamageRange::new(scale(base.min, factor), scale(base.max, factor))
    }

    /// Максимум HP AI: × (1 + рост за уровень) × boss_health_multiplier
    pub fn ai_max_health(&self, base: u32, progression: &dyn Progression) -> u32 {
        let factor = level_factor(progression.level(), self.ai_health_per_level)
            * sanitize_multiplier(progression.boss_health_multiplier());
        scale(base, factor)
    }
}

fn level_factor(level: u32, per_level: f32) -> f32 {
    1.0 + level.saturating_sub(1) as f32 * per_level.max(0.0)
}

fn sanitize_multiplier(multiplier: f32) -> f32 {
    if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    }
}

/// Округление с полом 1: скейлинг не обнуляет урон/HP
fn scale(value: u32, factor: f32) -> u32 {
    ((value as f32 * factor).round() as u32).max(1)
}

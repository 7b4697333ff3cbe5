//! Damage resolution
//!
//! Чистые функции: captured meter value → урон, counter value → снижение урона.
//! Единственная случайность — `compute_ai_damage`, RNG передаётся снаружи.

use rand::Rng;

use super::progression::Progression;

/// Урон игрока = захваченное значение power meter'а.
///
/// Границы meter'а уже учитывают апгрейды (скейлинг применяется до
/// конфигурации meter'а), поэтому здесь нет множителей.
/// Отрицательное значение → 0.
pub fn compute_player_damage(captured_power: i32) -> u32 {
    captured_power.max(0) as u32
}

/// Урон AI: равномерно в `[min(a, b), max(a, b)]` включительно.
pub fn compute_ai_damage<R: Rng + ?Sized>(min_damage: u32, max_damage: u32, rng: &mut R) -> u32 {
    let lo = min_damage.min(max_damage);
    let hi = min_damage.max(max_damage);
    rng.gen_range(lo..=hi)
}

/// Снижение урона counter'ом
///
/// Формула: `round(raw × (1 − counter))`, не меньше 1.
/// - counter 0.5, raw 30 → 15
/// - counter 0.99, raw 1 → 1 (floor)
///
/// Counter клампится в [0, 1]. Нулевой raw остаётся нулём: снижать нечего.
pub fn apply_counter_reduction(raw_damage: u32, counter_value: f32) -> u32 {
    if raw_damage == 0 {
        return 0;
    }
    CounterCapture::new(counter_value).reduce(raw_damage)
}

/// Захваченное значение counter'а (0..1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterCapture {
    pub counter_value: f32,
}

impl CounterCapture {
    pub fn new(counter_value: f32) -> Self {
        let counter_value = if counter_value.is_finite() {
            counter_value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { counter_value }
    }

    /// Множитель урона `(1 − counter)`
    pub fn multiplier(&self) -> f32 {
        1.0 - self.counter_value
    }

    pub fn reduce(&self, raw_damage: u32) -> u32 {
        let reduced = (raw_damage as f32 * self.multiplier()).round() as u32;
        reduced.clamp(1, raw_damage.max(1))
    }
}

/// Контекст одного удара игрока
///
/// Фиксирует захваченное значение и параметры прогрессии, с которыми
/// был сконфигурирован meter (для логов и событий).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageContext {
    pub raw_meter_value: i32,
    pub attacker_level: u32,
    pub upgrade_count: u32,
    pub boss_health_multiplier: f32,
    pub boss_damage_multiplier: f32,
}

impl DamageContext {
    pub fn new(raw_meter_value: i32, progression: &dyn Progression) -> Self {
        Self {
            raw_meter_value,
            attacker_level: progression.level(),
            upgrade_count: progression.upgrade_count(),
            boss_health_multiplier: progression.boss_health_multiplier(),
            boss_damage_multiplier: progression.boss_damage_multiplier(),
        }
    }

    pub fn final_damage(&self) -> u32 {
        compute_player_damage(self.raw_meter_value)
    }
}

//! Oscillating timing meters (Power Meter, Counter System)
//!
//! Треугольная волна между min и max. Фаза двигается по [0, length],
//! значение считается так:
//! ```text
//! normalized = phase / length
//! triangle   = 1 - |normalized * 2 - 1|
//! value      = clamp(triangle * (max - min) + min, lo, hi)
//! ```
//! Игрок "ловит" значение через `capture()`; UI читает `value()` каждый тик.

use crate::config::MeterConfig;


/// Треугольное преобразование фазы в значение meter'а.
///
/// `length <= 0` → значение на нижней точке волны (min).
pub fn triangle_value(phase: f32, length: f32, min_value: f32, max_value: f32) -> f32 {
    let lo = min_value.min(max_value);
    let hi = min_value.max(max_value);
    if length <= 0.0 || !length.is_finite() {
        return min_value.clamp(lo, hi);
    }

    let normalized = phase / length;
    let triangle = 1.0 - (normalized * 2.0 - 1.0).abs();
    (triangle * (max_value - min_value) + min_value).clamp(lo, hi)
}

/// Осциллятор с захватом значения.
#[derive(Debug, Clone)]
pub struct OscillatingMeter {
    min_value: f32,
    max_value: f32,
    angular_speed: f32,
    length: f32,
    ping_pong: bool,
    phase: f32,
    /// +1.0 / -1.0
    direction: f32,
    active: bool,
    current: f32,
    captured: Option<f32>,
}

impl OscillatingMeter {
    pub fn new(config: &MeterConfig) -> Self {
        let mut meter = Self {
            min_value: config.min_value,
            max_value: config.max_value,
            angular_speed: config.angular_speed,
            length: config.length,
            ping_pong: config.ping_pong,
            phase: 0.0,
            direction: 1.0,
            active: false,
            current: 0.0,
            captured: None,
        };
        meter.refresh_value();
        meter
    }

    /// Меняет границы (progression scaling); фаза и активность сохраняются.
    pub fn set_bounds(&mut self, min_value: f32, max_value: f32) {
        self.min_value = min_value;
        self.max_value = max_value;
        self.refresh_value();
    }

    /// Сброс фазы в 0, direction = +1, активация. Предыдущий захват забывается.
    pub fn start(&mut self) {
        self.phase = 0.0;
        self.direction = 1.0;
        self.active = true;
        self.captured = None;
        self.refresh_value();
    }

    /// Деактивация без захвата
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Полный сброс: стоп, фаза 0, захват очищен
    pub fn reset(&mut self) {
        self.active = false;
        self.phase = 0.0;
        self.direction = 1.0;
        self.captured = None;
        self.refresh_value();
    }

    /// Продвигает фазу на `dt * angular_speed * direction`.
    ///
    /// Ping-pong отражает перелёт через границу и разворачивает direction,
    /// иначе фаза заворачивается к 0. Нулевая/отрицательная скорость или
    /// длина — meter стоит на месте.
    pub fn tick(&mut self, dt: f32) {
        if !self.active || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        if !(self.angular_speed > 0.0) || !self.angular_speed.is_finite() {
            return;
        }
        if !(self.length > 0.0) || !self.length.is_finite() {
            return;
        }

        let step = dt * self.angular_speed;

        if self.ping_pong {
            // Развёртка на период 2*length: [0, L) — вперёд, [L, 2L) — назад
            let period = self.length * 2.0;
            let unfolded = if self.direction > 0.0 {
                self.phase
            } else {
                period - self.phase
            };
            let position = (unfolded + step).rem_euclid(period);

            if position < self.length {
                self.phase = position;
                self.direction = 1.0;
            } else {
                self.phase = period - position;
                self.direction = -1.0;
            }
        } else {
            self.phase = (self.phase + step).rem_euclid(self.length);
            self.direction = 1.0;
        }

        self.refresh_value();
    }

    /// Захват: только когда meter активен. Деактивирует и возвращает
    /// замороженное значение. На неактивном meter'е — no-op, `None`.
    pub fn capture(&mut self) -> Option<f32> {
        if !self.active {
            return None;
        }
        self.active = false;
        self.captured = Some(self.current);
        self.captured
    }

    /// Последнее захваченное значение (до следующего `start`/`reset`)
    pub fn captured(&self) -> Option<f32> {
        self.captured
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    /// Доля значения от max meter'а, 0..1 (порог mega-анимаций: "половина max")
    pub fn fraction_of_max(&self, value: f32) -> f32 {
        let (_, hi) = self.bounds();
        if !(hi > 0.0) || !value.is_finite() {
            return 0.0;
        }
        (value / hi).clamp(0.0, 1.0)
    }

    /// Позиция значения внутри [lo, hi], 0..1 (для UI)
    pub fn normalize(&self, value: f32) -> f32 {
        let (lo, hi) = self.bounds();
        if hi <= lo {
            return 0.0;
        }
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    }

    pub fn normalized_value(&self) -> f32 {
        self.normalize(self.current)
    }

    /// Отсортированные границы (lo, hi)
    pub fn bounds(&self) -> (f32, f32) {
        (
            self.min_value.min(self.max_value),
            self.min_value.max(self.max_value),
        )
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    fn refresh_value(&mut self) {
        self.current = triangle_value(self.phase, self.length, self.min_value, self.max_value);
    }
}

/// Power meter оперирует целым уроном
pub fn power_from_meter(value: f32) -> i32 {
    value.round() as i32
}

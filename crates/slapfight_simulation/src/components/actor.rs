//! Базовые типы бойцов: сторона (Player/AI) и здоровье

/// Сторона боя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Player => "Player",
            Side::Ai => "AI",
        }
    }
}

/// Контракт внешнего провайдера здоровья
///
/// Хранение здоровья не принадлежит ядру: контроллер только читает
/// значения и вызывает `take_damage`. Change-нотификация `(current, max)`
/// публикуется контроллером как `MatchEvent::HealthChanged`.
pub trait HealthProvider: Send + Sync {
    fn current(&self) -> u32;
    fn max(&self) -> u32;
    fn take_damage(&mut self, amount: u32);

    fn is_dead(&self) -> bool {
        self.current() == 0
    }

    /// Восстановить до максимума (reset матча)
    fn restore(&mut self);
}

/// Здоровье бойца
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Здоровье с произвольным текущим значением (clamp до max)
    pub fn with_current(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

impl HealthProvider for Health {
    fn current(&self) -> u32 {
        self.current
    }

    fn max(&self) -> u32 {
        self.max
    }

    fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    fn restore(&mut self) {
        self.current = self.max;
    }
}

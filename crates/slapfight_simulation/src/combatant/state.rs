//! Состояния бойца и анимационные cue.

use crate::components::Side;

/// FSM состояния бойца
///
/// Dead — терминальное: из него переходов нет.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CombatantState {
    /// Нейтральная стойка (активная сторона хода)
    #[default]
    Idle,
    /// Ждёт удара соперника
    Waiting,
    /// Реакция на пощёчину
    Hitted,
    /// Замах/удар
    Attacking,
    /// HP == 0
    Dead,
}

impl CombatantState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CombatantState::Dead)
    }
}

/// Класс анимации, выбранный enter-hook'ом
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationClass {
    Neutral,
    WaitingLoop,
    HitReaction,
    MegaHitReaction,
    Attack,
    MegaAttack,
    Death,
}

impl AnimationClass {
    pub fn is_mega(self) -> bool {
        matches!(self, AnimationClass::MegaHitReaction | AnimationClass::MegaAttack)
    }
}

/// Что проигрывать презентационному слою: класс + индекс варианта в пуле
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationCue {
    pub class: AnimationClass,
    pub variant: u8,
}

impl AnimationCue {
    pub fn new(class: AnimationClass, variant: u8) -> Self {
        Self { class, variant }
    }
}

/// Нотификация о смене состояния (публикуется после enter-hook)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateChanged {
    pub side: Side,
    pub from: CombatantState,
    pub to: CombatantState,
    pub cue: AnimationCue,
    pub capability_enabled: bool,
}

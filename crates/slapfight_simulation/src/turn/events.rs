//! Turn events
//!
//! Входящие (от внешних мостов):
//! - PlayerTap: input bridge (tap по экрану)
//! - SlapHit: animation-event bridge (удар достиг hit-кадра)
//!
//! Исходящие: MatchEvent (контроллер → UI, звук, эффекты)

use bevy::prelude::*;

use crate::combatant::StateChanged;
use crate::components::Side;

/// Фаза хода
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    PlayerTurn,
    AiTurn,
    /// Терминальная: продвигающие ход операции — no-op
    GameOver,
}

/// Tap игрока (input bridge)
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct PlayerTap;

/// Анимация удара достигла hit-кадра (animation-event bridge)
#[derive(Event, Debug, Clone, Copy)]
pub struct SlapHit {
    pub attacker: Side,
}

/// События матча (outbox контроллера → bevy Events)
#[derive(Event, Debug, Clone, PartialEq)]
pub enum MatchEvent {
    PhaseChanged {
        from: TurnPhase,
        to: TurnPhase,
    },
    StateChanged(StateChanged),
    /// Change-нотификация здоровья `(current, max)`
    HealthChanged {
        side: Side,
        current: u32,
        max: u32,
    },
    DamageDealt {
        attacker: Side,
        target: Side,
        damage: u32,
        target_died: bool,
    },
    /// Counter снизил входящий урон
    CounterApplied {
        counter_value: f32,
        raw_damage: u32,
        reduced_damage: u32,
    },
    GameOver {
        winner: Option<Side>,
    },
}

//! Turn orchestration module
//!
//! ECS ответственность:
//! - TurnController resource: фаза хода, FSM бойцов, meter'ы, урон
//! - Events: PlayerTap / SlapHit (входящие мосты), MatchEvent (исходящие)
//!
//! Внешняя ответственность (движок/клиент):
//! - Анимации: SlapHit на hit-кадре удара
//! - Input: PlayerTap
//! - UI: чтение meter'ов и MatchEvent

use bevy::prelude::*;

pub mod controller;
pub mod events;
pub mod scheduler;


// Re-export основных типов
pub use controller::TurnController;
pub use events::{MatchEvent, PlayerTap, SlapHit, TurnPhase};
pub use scheduler::{TurnScheduler, TurnStep};

use crate::components::Side;

/// Turn Plugin
///
/// Требует `TurnController` resource (вставляет `SlapFightPlugin`).
/// Регистрирует системы в FixedUpdate.
/// Порядок выполнения:
/// 1. advance_match — тик meter'ов, FSM таймеров, отложенных шагов
/// 2. handle_tap_input — PlayerTap → захват meter'а (значение этого тика)
/// 3. handle_slap_hits — SlapHit → apply_player_damage / apply_ai_damage
/// 4. publish_match_events — outbox контроллера → MatchEvent
pub struct TurnPlugin;

impl Plugin for TurnPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<PlayerTap>()
            .add_event::<SlapHit>()
            .add_event::<MatchEvent>();

        app.add_systems(Startup, begin_match);

        app.add_systems(
            FixedUpdate,
            (
                advance_match,
                handle_tap_input,
                handle_slap_hits,
                publish_match_events,
            )
                .chain(), // Последовательное выполнение
        );
    }
}

/// Система: первый ход игрока
pub fn begin_match(mut controller: ResMut<TurnController>) {
    controller.start_player_turn();
    crate::log_info("🥊 Match started");
}

/// Система: input bridge
pub fn handle_tap_input(mut taps: EventReader<PlayerTap>, mut controller: ResMut<TurnController>) {
    for _ in taps.read() {
        controller.player_tap();
    }
}

/// Система: один тик симуляции матча
pub fn advance_match(mut controller: ResMut<TurnController>, time: Res<Time<Fixed>>) {
    controller.tick(time.delta_secs());
}

/// Система: animation-event bridge
pub fn handle_slap_hits(mut hits: EventReader<SlapHit>, mut controller: ResMut<TurnController>) {
    for hit in hits.read() {
        match hit.attacker {
            Side::Player => controller.apply_player_damage(),
            Side::Ai => controller.apply_ai_damage(),
        }
    }
}

/// Система: публикация событий контроллера
pub fn publish_match_events(
    mut controller: ResMut<TurnController>,
    mut match_events: EventWriter<MatchEvent>,
) {
    for event in controller.drain_events() {
        match_events.write(event);
    }
}

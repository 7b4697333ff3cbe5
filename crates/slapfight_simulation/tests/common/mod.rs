//! Общие helpers для integration тестов
#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use slapfight_simulation::turn::publish_match_events;
use slapfight_simulation::*;

/// Все MatchEvent матча (Events<T> живут только два update'а)
#[derive(Resource, Default)]
pub struct MatchLog(pub Vec<MatchEvent>);

fn record_match_events(mut events: EventReader<MatchEvent>, mut log: ResMut<MatchLog>) {
    log.0.extend(events.read().cloned());
}

/// Headless App с матчем: ровно один FixedUpdate шаг на update
pub fn create_match_app(config: MatchConfig) -> App {
    let mut app = create_headless_app();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )))
    .init_resource::<MatchLog>()
    .add_plugins(SlapFightPlugin::new(config))
    .add_systems(FixedUpdate, record_match_events.after(publish_match_events));

    app.update(); // Startup: первый ход игрока
    app
}

pub fn controller(app: &App) -> &TurnController {
    app.world().resource::<TurnController>()
}

/// Крутит update'ы, пока предикат не станет true (или лимит тиков)
pub fn run_until(
    app: &mut App,
    max_ticks: usize,
    predicate: impl Fn(&TurnController) -> bool,
) -> bool {
    for _ in 0..max_ticks {
        if predicate(controller(app)) {
            return true;
        }
        app.update();
    }
    predicate(controller(app))
}

/// Один шаг "игрока + аниматора":
/// tap около пика meter'а, SlapHit пока атакующий в Attacking
/// (повторные hit'ы гасит latch контроллера).
pub fn drive_match_step(app: &mut App, power_threshold: f32, counter_threshold: f32) {
    let (tap, hit) = {
        let controller = controller(app);
        let tap = match controller.phase() {
            TurnPhase::PlayerTurn => {
                let meter = controller.power_meter();
                controller.player().capability_enabled()
                    && meter.is_active()
                    && meter.normalized_value() >= power_threshold
            }
            TurnPhase::AiTurn => {
                let meter = controller.counter_meter();
                meter.is_active() && meter.normalized_value() >= counter_threshold
            }
            TurnPhase::GameOver => false,
        };
        let hit = [Side::Player, Side::Ai]
            .into_iter()
            .find(|side| controller.combatant(*side).is(CombatantState::Attacking));
        (tap, hit)
    };

    if tap {
        app.world_mut().send_event(PlayerTap);
    }
    if let Some(attacker) = hit {
        app.world_mut().send_event(SlapHit { attacker });
    }
    app.update();
}

/// Полный матч до GameOver; возвращает число тиков
pub fn play_full_match(app: &mut App, max_ticks: usize) -> usize {
    for tick in 0..max_ticks {
        if controller(app).is_game_over() {
            return tick;
        }
        drive_match_step(app, 0.7, 0.5);
    }
    max_ticks
}

pub fn match_log(app: &App) -> Vec<MatchEvent> {
    app.world().resource::<MatchLog>().0.clone()
}

//! Headless матч SLAPFIGHT
//!
//! Запускает Bevy App без рендера: auto-tapper вместо input'а,
//! заглушка animation-event bridge вместо анимаций.
//!
//! Использование: `slapfight_simulation [match.ron]`

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use slapfight_simulation::turn::publish_match_events;
use slapfight_simulation::{
    create_headless_app, log_info, CombatantState, MatchConfig, MatchEvent, PlayerTap, Side,
    SlapFightPlugin, SlapHit, TurnController, TurnPhase,
};

const MAX_TICKS: usize = 20_000;
/// Hit-кадр анимации удара (сек от входа в Attacking)
const HIT_FRAME_DELAY: f32 = 0.4;
/// Порог нормализованного power meter'а для tap
const POWER_TAP_THRESHOLD: f32 = 0.8;
const COUNTER_TAP_THRESHOLD: f32 = 0.6;

/// Удары, ждущие hit-кадра
#[derive(Resource, Default)]
struct PendingHits(Vec<(Side, Timer)>);

fn main() {
    let config = load_config();
    println!("Starting SLAPFIGHT headless match (seed: {})", config.seed);

    let mut app = create_headless_app();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )))
    .init_resource::<PendingHits>()
    .add_plugins(SlapFightPlugin::new(config))
    .add_systems(
        FixedUpdate,
        (auto_tapper, animation_bridge)
            .chain()
            .after(publish_match_events),
    );

    for tick in 0..MAX_TICKS {
        app.update();

        let controller = app.world().resource::<TurnController>();
        if controller.is_game_over() {
            println!("Tick {}: game over", tick);
            break;
        }
        if tick % 600 == 0 {
            println!(
                "Tick {}: {:?}, HP player {:?} / AI {:?}",
                tick,
                controller.phase(),
                controller.health(Side::Player),
                controller.health(Side::Ai)
            );
        }
    }

    let controller = app.world().resource::<TurnController>();
    match controller.winner() {
        Some(side) => println!("Winner: {}", side.label()),
        None => println!("No winner (match did not finish in {} ticks)", MAX_TICKS),
    }
    println!(
        "Final HP: player {:?}, AI {:?}",
        controller.health(Side::Player),
        controller.health(Side::Ai)
    );
}

/// RON конфиг из первого аргумента, иначе дефолт
fn load_config() -> MatchConfig {
    let Some(path) = std::env::args().nth(1) else {
        return MatchConfig::default();
    };

    match MatchConfig::from_ron_file(Path::new(&path)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load {}: {} (using defaults)", path, err);
            MatchConfig::default()
        }
    }
}

/// Система: tap около пика meter'а
fn auto_tapper(controller: Res<TurnController>, mut taps: EventWriter<PlayerTap>) {
    let should_tap = match controller.phase() {
        TurnPhase::PlayerTurn => {
            let meter = controller.power_meter();
            controller.player().capability_enabled()
                && meter.is_active()
                && meter.normalized_value() >= POWER_TAP_THRESHOLD
        }
        TurnPhase::AiTurn => {
            let meter = controller.counter_meter();
            meter.is_active() && meter.normalized_value() >= COUNTER_TAP_THRESHOLD
        }
        TurnPhase::GameOver => false,
    };

    if should_tap {
        taps.write(PlayerTap);
    }
}

/// Система: Attacking → (hit-кадр) → SlapHit
fn animation_bridge(
    mut match_events: EventReader<MatchEvent>,
    mut pending: ResMut<PendingHits>,
    mut hits: EventWriter<SlapHit>,
    time: Res<Time<Fixed>>,
) {
    for event in match_events.read() {
        if let MatchEvent::StateChanged(change) = event {
            if change.to == CombatantState::Attacking {
                log_info(&format!(
                    "🎬 {} plays {:?} #{}",
                    change.side.label(),
                    change.cue.class,
                    change.cue.variant
                ));
                pending.0.push((
                    change.side,
                    Timer::from_seconds(HIT_FRAME_DELAY, TimerMode::Once),
                ));
            }
        }
    }

    let delta = time.delta();
    pending.0.retain_mut(|(attacker, timer)| {
        timer.tick(delta);
        if timer.finished() {
            hits.write(SlapHit { attacker: *attacker });
            return false;
        }
        true
    });
}

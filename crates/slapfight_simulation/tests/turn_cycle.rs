//! Turn cycle integration test
//!
//! Полный цикл хода через Bevy App (FixedUpdate 60Hz, ручное время):
//! - PlayerTap → захват power meter'а → Attacking
//! - SlapHit(Player) → урон AI → (задержка) AITurn
//! - AI атакует сам, SlapHit(Ai) → урон игроку → PlayerTurn
//! - Матч доигрывается до GameOver

mod common;

use bevy::prelude::*;
use common::*;
use slapfight_simulation::*;

#[test]
fn test_startup_begins_player_turn() {
    let app = create_match_app(MatchConfig::default());
    let controller = controller(&app);

    assert!(controller.is_player_turn());
    assert_eq!(controller.player().state(), CombatantState::Idle);
    assert_eq!(controller.ai().state(), CombatantState::Waiting);
    assert!(controller.power_meter().is_active());
    assert_eq!(controller.health(Side::Player), Some((100, 100)));
    assert_eq!(controller.health(Side::Ai), Some((120, 120)));
}

#[test]
fn test_power_meter_moves_in_fixed_update() {
    let mut app = create_match_app(MatchConfig::default());
    let (min_power, max_power) = controller(&app).power_meter().bounds();

    let moved = run_until(&mut app, 30, |controller| {
        controller.power_meter().value() > min_power
    });
    assert!(moved, "power meter не двигается");

    for _ in 0..300 {
        app.update();
        let value = controller(&app).power_meter().value();
        assert!(
            (min_power..=max_power).contains(&value),
            "power meter вышел за границы: {}",
            value
        );
    }
}

#[test]
fn test_full_turn_cycle() {
    let mut app = create_match_app(MatchConfig::default());

    // 1. Tap около середины волны
    assert!(run_until(&mut app, 120, |c| c.power_meter().normalized_value() >= 0.5));
    app.world_mut().send_event(PlayerTap);
    assert!(run_until(&mut app, 10, |c| c.player().is(CombatantState::Attacking)));
    let captured = controller(&app).power_meter().captured();
    assert!(captured.is_some());
    assert!(!controller(&app).power_meter().is_active());

    // 2. Hit-кадр удара игрока
    app.world_mut().send_event(SlapHit {
        attacker: Side::Player,
    });
    assert!(run_until(&mut app, 10, |c| c.ai().is(CombatantState::Hitted)));
    let expected_damage = captured.map(power_from_meter).unwrap_or_default() as u32;
    assert_eq!(
        controller(&app).health(Side::Ai),
        Some((120 - expected_damage, 120))
    );
    assert_eq!(controller(&app).pending_step(), Some(TurnStep::StartAiTurn));

    // 3. get_slapped_delay → AITurn
    assert!(run_until(&mut app, 120, |c| c.is_ai_turn()));
    assert!(controller(&app).counter_meter().is_active());
    assert_eq!(controller(&app).player().state(), CombatantState::Waiting);

    // 4. ai_wait_time → AI атакует
    assert!(run_until(&mut app, 200, |c| c.ai().is(CombatantState::Attacking)));
    assert!(run_until(&mut app, 5, |c| {
        c.pending_step() == Some(TurnStep::StartPlayerTurn)
    }));

    // 5. Hit-кадр удара AI (counter не захвачен → полный урон)
    app.world_mut().send_event(SlapHit { attacker: Side::Ai });
    assert!(run_until(&mut app, 10, |c| c.player().is(CombatantState::Hitted)));
    let (player_hp, _) = controller(&app).health(Side::Player).unwrap_or_default();
    assert!((80..=92).contains(&player_hp), "player HP = {}", player_hp);

    // 6. ai_attack_time → снова ход игрока
    assert!(run_until(&mut app, 200, |c| c.is_player_turn()));
    assert_eq!(controller(&app).player().state(), CombatantState::Idle);
    assert_eq!(controller(&app).ai().state(), CombatantState::Waiting);

    let log = match_log(&app);
    assert!(log.contains(&MatchEvent::PhaseChanged {
        from: TurnPhase::PlayerTurn,
        to: TurnPhase::AiTurn,
    }));
    assert!(log.contains(&MatchEvent::PhaseChanged {
        from: TurnPhase::AiTurn,
        to: TurnPhase::PlayerTurn,
    }));
}

#[test]
fn test_duplicate_slap_hits_are_ignored() {
    let mut app = create_match_app(MatchConfig::default());

    assert!(run_until(&mut app, 120, |c| c.power_meter().normalized_value() >= 0.5));
    app.world_mut().send_event(PlayerTap);
    assert!(run_until(&mut app, 10, |c| c.player().is(CombatantState::Attacking)));

    for _ in 0..3 {
        app.world_mut().send_event(SlapHit {
            attacker: Side::Player,
        });
    }
    assert!(run_until(&mut app, 10, |c| c.ai().is(CombatantState::Hitted)));

    let damage_events = match_log(&app)
        .iter()
        .filter(|event| matches!(event, MatchEvent::DamageDealt { target: Side::Ai, .. }))
        .count();
    assert_eq!(damage_events, 1);
}

#[test]
fn test_full_match_reaches_game_over() {
    let mut app = create_match_app(MatchConfig::default());

    let ticks = play_full_match(&mut app, 10_000);
    assert!(ticks < 10_000, "матч не закончился за {} тиков", ticks);

    let controller = controller(&app);
    assert!(controller.is_game_over());
    assert_eq!(controller.winner(), Some(Side::Player));
    assert_eq!(controller.ai().state(), CombatantState::Dead);
    assert_eq!(controller.health(Side::Ai).map(|(current, _)| current), Some(0));
    assert_eq!(controller.pending_step(), None);
    assert!(!controller.power_meter().is_active());
    assert!(!controller.counter_meter().is_active());

    let log = match_log(&app);
    assert!(log.contains(&MatchEvent::GameOver {
        winner: Some(Side::Player)
    }));
    assert!(log
        .iter()
        .any(|event| matches!(event, MatchEvent::CounterApplied { .. })));
}

#[test]
fn test_nothing_moves_after_game_over() {
    let mut app = create_match_app(MatchConfig::default());
    play_full_match(&mut app, 10_000);
    let events_before = match_log(&app).len();
    let player_state = controller(&app).player().state();
    let player_capability = controller(&app).player().capability_enabled();

    for _ in 0..120 {
        app.world_mut().send_event(PlayerTap);
        app.world_mut().send_event(SlapHit { attacker: Side::Ai });
        app.update();
    }

    let controller = controller(&app);
    assert!(controller.is_game_over());
    assert_eq!(controller.health(Side::Player).map(|(current, _)| current > 0), Some(true));
    assert_eq!(controller.player().state(), player_state);
    assert_eq!(controller.player().capability_enabled(), player_capability);
    assert_eq!(match_log(&app).len(), events_before);
}

#[test]
fn test_tap_captures_value_after_this_frames_tick() {
    let mut app = create_match_app(MatchConfig::default());
    for _ in 0..5 {
        app.update();
    }

    let dt = app.world().resource::<Time<Fixed>>().timestep().as_secs_f32();
    let mut expected = controller(&app).power_meter().clone();
    expected.tick(dt);

    app.world_mut().send_event(PlayerTap);
    app.update();

    let captured = controller(&app).power_meter().captured();
    assert!(
        captured.is_some_and(|value| (value - expected.value()).abs() < 1e-4),
        "captured {:?}, meter after this frame's tick {}",
        captured,
        expected.value()
    );
}

#[test]
fn test_ron_config_drives_match() {
    let config = MatchConfig::from_ron_str(
        r#"(
            seed: 7,
            player_max_health: 50,
            ai_max_health: 30,
            timings: (ai_wait_time: 0.5, ai_attack_time: 0.5, get_slapped_delay: 0.5),
        )"#,
    )
    .expect("valid RON config");

    let mut app = create_match_app(config);
    assert_eq!(controller(&app).health(Side::Ai), Some((30, 30)));

    let ticks = play_full_match(&mut app, 5_000);
    assert!(ticks < 5_000);
    assert!(controller(&app).winner().is_some());
}

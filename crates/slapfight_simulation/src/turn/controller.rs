//! Turn controller — оркестратор матча
//!
//! Единственный владелец фазы хода, обеих FSM бойцов и обоих meter'ов.
//! Цикл:
//! 1. PlayerTurn: power meter активен, tap → захват → Attacking игрока
//! 2. SlapHit(Player) → `apply_player_damage` → AI Hitted → (задержка) AITurn
//! 3. AITurn: counter активен, (ai_wait_time) → AI Attacking → тик → игрок держит позу
//! 4. SlapHit(Ai) → `apply_ai_damage` (counter снижает урон) → игрок Hitted
//! 5. (ai_attack_time) → PlayerTurn
//!
//! Смерть любого бойца → GameOver: отложенные шаги отменяются, meter'ы стоп.
//!
//! Порядок тика: meter'ы → FSM таймеры → отложенный шаг контроллера.

use bevy::prelude::Resource;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::events::{MatchEvent, TurnPhase};
use super::scheduler::{TurnScheduler, TurnStep};
use crate::combat::{
    apply_counter_reduction, compute_ai_damage, DamageContext, Progression, ScalingRules,
    StaticProgression,
};
use crate::combatant::{CombatantState, CombatantStateMachine};
use crate::components::{Health, HealthProvider, Side};
use crate::config::{DamageRange, MatchConfig, MeterConfig, TurnTimings};
use crate::meter::{power_from_meter, OscillatingMeter};

// Разные потоки RNG из одного seed
const PLAYER_RNG_STREAM: u64 = 0x5EED_0001;
const AI_RNG_STREAM: u64 = 0x5EED_0002;

#[derive(Resource)]
pub struct TurnController {
    phase: TurnPhase,
    timings: TurnTimings,
    player: CombatantStateMachine,
    ai: CombatantStateMachine,
    power_meter: OscillatingMeter,
    counter_meter: OscillatingMeter,
    player_health: Option<Box<dyn HealthProvider>>,
    ai_health: Option<Box<dyn HealthProvider>>,
    base_power: MeterConfig,
    base_ai_damage: DamageRange,
    ai_damage: DamageRange,
    scaling: ScalingRules,
    progression: StaticProgression,
    scheduler: TurnScheduler,
    /// Удар игрока уже засчитан в этом ходу (повторные hit-события игнорируются)
    player_strike_latched: bool,
    /// Удар AI уже засчитан в этом ходу
    ai_strike_latched: bool,
    /// Урон AI, выбранный при входе в Attacking (он же выбирает анимацию)
    pending_ai_damage: Option<u32>,
    rng: ChaCha8Rng,
    outbox: Vec<MatchEvent>,
}

impl TurnController {
    /// Контроллер с дефолтным здоровьем из конфига (HP AI скейлится прогрессией).
    ///
    /// Стартует в PlayerTurn-ready: Idle/Idle, meter'ы остановлены.
    /// Ход начинается вызовом `start_player_turn`.
    pub fn new(config: &MatchConfig) -> Self {
        let mut controller = Self::without_health(config);
        let ai_max = config
            .scaling
            .ai_max_health(config.ai_max_health, &config.progression);
        controller.attach_health(Side::Player, Box::new(Health::new(config.player_max_health)));
        controller.attach_health(Side::Ai, Box::new(Health::new(ai_max)));
        controller
    }

    /// Контроллер без провайдеров здоровья (подключаются через `attach_health`)
    pub fn without_health(config: &MatchConfig) -> Self {
        let mut controller = Self {
            phase: TurnPhase::PlayerTurn,
            timings: config.timings,
            player: CombatantStateMachine::new(
                Side::Player,
                config.player,
                config.seed ^ PLAYER_RNG_STREAM,
            ),
            ai: CombatantStateMachine::new(Side::Ai, config.ai, config.seed ^ AI_RNG_STREAM),
            power_meter: OscillatingMeter::new(&config.power_meter),
            counter_meter: OscillatingMeter::new(&config.counter_meter),
            player_health: None,
            ai_health: None,
            base_power: config.power_meter,
            base_ai_damage: config.ai_damage,
            ai_damage: config.ai_damage,
            scaling: config.scaling,
            progression: config.progression,
            scheduler: TurnScheduler::new(),
            player_strike_latched: false,
            ai_strike_latched: false,
            pending_ai_damage: None,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            outbox: Vec::new(),
        };
        let progression = config.progression;
        controller.apply_progression(&progression);
        controller
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_player_turn(&self) -> bool {
        self.phase == TurnPhase::PlayerTurn
    }

    pub fn is_ai_turn(&self) -> bool {
        self.phase == TurnPhase::AiTurn
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == TurnPhase::GameOver
    }

    pub fn player(&self) -> &CombatantStateMachine {
        &self.player
    }

    pub fn ai(&self) -> &CombatantStateMachine {
        &self.ai
    }

    pub fn combatant(&self, side: Side) -> &CombatantStateMachine {
        match side {
            Side::Player => &self.player,
            Side::Ai => &self.ai,
        }
    }

    pub fn power_meter(&self) -> &OscillatingMeter {
        &self.power_meter
    }

    pub fn counter_meter(&self) -> &OscillatingMeter {
        &self.counter_meter
    }

    pub fn ai_damage_range(&self) -> DamageRange {
        self.ai_damage
    }

    pub fn progression(&self) -> StaticProgression {
        self.progression
    }

    /// `(current, max)` или `None`, если провайдер не подключен
    pub fn health(&self, side: Side) -> Option<(u32, u32)> {
        self.health_ref(side)
            .map(|health| (health.current(), health.max()))
    }

    pub fn pending_step(&self) -> Option<TurnStep> {
        self.scheduler.pending()
    }

    /// Победитель (только после GameOver по смерти)
    pub fn winner(&self) -> Option<Side> {
        if !self.is_game_over() {
            return None;
        }
        match (self.player.is(CombatantState::Dead), self.ai.is(CombatantState::Dead)) {
            (false, true) => Some(Side::Player),
            (true, false) => Some(Side::Ai),
            _ => None,
        }
    }

    // ========================================================================
    // Wiring
    // ========================================================================

    pub fn attach_health(&mut self, side: Side, provider: Box<dyn HealthProvider>) {
        *self.health_slot(side) = Some(provider);
    }

    pub fn detach_health(&mut self, side: Side) -> Option<Box<dyn HealthProvider>> {
        self.health_slot(side).take()
    }

    /// Перенастраивает power meter и урон AI под прогрессию (до начала хода)
    pub fn apply_progression(&mut self, progression: &dyn Progression) {
        let (min_power, max_power) = self.scaling.power_bounds(&self.base_power, progression);
        self.power_meter.set_bounds(min_power, max_power);
        self.ai_damage = self.scaling.ai_damage(self.base_ai_damage, progression);
        self.progression = StaticProgression::snapshot(progression);

        crate::log(&format!(
            "📈 Progression applied: level {}, upgrades {}, power {:.0}..{:.0}, AI damage {}..{}",
            self.progression.level,
            self.progression.upgrade_count,
            min_power,
            max_power,
            self.ai_damage.min,
            self.ai_damage.max
        ));
    }

    // ========================================================================
    // Turn control
    // ========================================================================

    pub fn start_player_turn(&mut self) {
        if self.is_game_over() {
            crate::log("TurnController: start_player_turn ignored (game over)");
            return;
        }

        self.scheduler.cancel();
        self.player_strike_latched = false;
        self.set_phase(TurnPhase::PlayerTurn);

        self.player.set_state(CombatantState::Idle);
        self.ai.set_state(CombatantState::Waiting);
        self.power_meter.start();
        self.counter_meter.stop();

        self.collect_state_changes();
    }

    pub fn start_ai_turn(&mut self) {
        if self.is_game_over() {
            crate::log("TurnController: start_ai_turn ignored (game over)");
            return;
        }

        self.ai_strike_latched = false;
        self.pending_ai_damage = None;
        self.set_phase(TurnPhase::AiTurn);

        self.player.set_state(CombatantState::Waiting);
        self.ai.set_state(CombatantState::Idle);
        self.power_meter.stop();
        self.counter_meter.start();

        self.schedule(TurnStep::AiBeginAttack, self.timings.ai_wait_time);
        self.collect_state_changes();
    }

    /// Игрок атакует (ход не продвигается: это делает hit-событие)
    pub fn player_attacks(&mut self) -> bool {
        if !self.is_player_turn() {
            return false;
        }

        // Mega-пул: захваченное значение против доли max meter'а
        let value = self
            .power_meter
            .captured()
            .unwrap_or_else(|| self.power_meter.value());
        let power = self.power_meter.fraction_of_max(value);

        let attacked = self
            .player
            .set_state_with_power(CombatantState::Attacking, power);
        self.ai.maintain_waiting_pose();
        self.collect_state_changes();

        if attacked {
            crate::log(&format!("👋 Player attacks (power {:.2})", power));
        }
        attacked
    }

    /// Input bridge: tap.
    ///
    /// PlayerTurn — захват power meter'а и атака; AITurn — захват counter'а.
    pub fn player_tap(&mut self) -> bool {
        match self.phase {
            TurnPhase::PlayerTurn => {
                if !self.player.capability_enabled() {
                    crate::log("TurnController: tap ignored (player input disabled)");
                    return false;
                }
                let Some(value) = self.power_meter.capture() else {
                    return false;
                };
                crate::log(&format!("🎯 Power captured: {}", power_from_meter(value)));
                self.player_attacks()
            }
            TurnPhase::AiTurn => match self.counter_meter.capture() {
                Some(value) => {
                    crate::log(&format!("🛡️ Counter captured: {:.2}", value));
                    true
                }
                None => false,
            },
            TurnPhase::GameOver => false,
        }
    }

    /// Animation-event bridge: удар игрока достиг hit-кадра
    pub fn apply_player_damage(&mut self) {
        if !self.is_player_turn() {
            crate::log("TurnController: apply_player_damage ignored (not player turn)");
            return;
        }
        if self.player_strike_latched {
            crate::log("TurnController: apply_player_damage ignored (strike already applied)");
            return;
        }
        self.player_strike_latched = true;

        // Tap уже захватил значение; иначе захватываем сейчас
        let captured = self
            .power_meter
            .captured()
            .or_else(|| self.power_meter.capture());
        let raw = captured.map(power_from_meter).unwrap_or(0);
        let power = captured
            .map(|value| self.power_meter.fraction_of_max(value))
            .unwrap_or(0.0);

        let context = DamageContext::new(raw, &self.progression);
        let damage = context.final_damage();
        crate::log(&format!(
            "💥 Player slap: meter {} → {} damage (level {}, upgrades {})",
            context.raw_meter_value, damage, context.attacker_level, context.upgrade_count
        ));

        if self.deal_damage(Side::Ai, damage) {
            self.ai.force_set_state(CombatantState::Dead);
            self.collect_state_changes();
            self.check_game_over();
            return;
        }

        if self.ai.is(CombatantState::Waiting) {
            self.ai.set_state_with_power(CombatantState::Hitted, power);
            self.schedule(TurnStep::StartAiTurn, self.timings.get_slapped_delay);
        } else {
            // Без Waiting ход не продвигается (матч может встать)
            crate::log_warning(&format!(
                "⚠️ AI was {:?} when the slap landed; no AI turn scheduled",
                self.ai.state()
            ));
        }
        self.collect_state_changes();
    }

    /// Animation-event bridge: удар AI достиг hit-кадра
    pub fn apply_ai_damage(&mut self) {
        if !self.is_ai_turn() {
            crate::log("TurnController: apply_ai_damage ignored (not AI turn)");
            return;
        }
        if self.ai_strike_latched {
            crate::log("TurnController: apply_ai_damage ignored (strike already applied)");
            return;
        }
        self.ai_strike_latched = true;

        let raw = match self.pending_ai_damage.take() {
            Some(damage) => damage,
            None => self.roll_ai_damage(),
        };

        let mut damage = raw;
        if !self.counter_meter.is_active() {
            if let Some(counter_value) = self.counter_meter.captured().filter(|value| *value > 0.0) {
                damage = apply_counter_reduction(raw, counter_value);
                self.outbox.push(MatchEvent::CounterApplied {
                    counter_value,
                    raw_damage: raw,
                    reduced_damage: damage,
                });
                crate::log(&format!(
                    "🛡️ Counter {:.2}: {} → {} damage",
                    counter_value, raw, damage
                ));
            }
        }

        if self.deal_damage(Side::Player, damage) {
            self.player.force_set_state(CombatantState::Dead);
            self.collect_state_changes();
            self.check_game_over();
            return;
        }

        if self.player.is(CombatantState::Waiting) {
            let power = self.ai_damage.fraction_of_max(raw);
            self.player.set_state_with_power(CombatantState::Hitted, power);
        }
        self.collect_state_changes();
    }

    /// GameOver, если кто-то из бойцов в Dead. Возвращает `is_game_over()`.
    pub fn check_game_over(&mut self) -> bool {
        if self.is_game_over() {
            return true;
        }
        if !self.player.is(CombatantState::Dead) && !self.ai.is(CombatantState::Dead) {
            return false;
        }

        self.halt();
        self.set_phase(TurnPhase::GameOver);
        let winner = self.winner();
        self.outbox.push(MatchEvent::GameOver { winner });
        crate::log_info(&format!(
            "🏁 Game over, winner: {}",
            winner.map(Side::label).unwrap_or("none")
        ));
        true
    }

    /// Административная остановка: GameOver без победителя по смерти
    pub fn stop_all_turns(&mut self) {
        self.halt();
        if !self.is_game_over() {
            self.set_phase(TurnPhase::GameOver);
            self.outbox.push(MatchEvent::GameOver { winner: self.winner() });
        }
        crate::log_info("⏹️ All turns stopped");
    }

    /// Новый матч: Idle/Idle, HP восстановлены, фаза PlayerTurn-ready
    pub fn reset_game(&mut self) {
        self.scheduler.cancel();
        self.power_meter.reset();
        self.counter_meter.reset();
        self.player_strike_latched = false;
        self.ai_strike_latched = false;
        self.pending_ai_damage = None;

        self.player.reset();
        self.ai.reset();
        for side in [Side::Player, Side::Ai] {
            let restored = self.health_slot(side).as_mut().map(|health| {
                health.restore();
                (health.current(), health.max())
            });
            if let Some((current, max)) = restored {
                self.outbox.push(MatchEvent::HealthChanged { side, current, max });
            }
        }

        self.set_phase(TurnPhase::PlayerTurn);
        self.collect_state_changes();
        crate::log_info("🔄 Match reset");
    }

    /// Один тик симуляции
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        // Meter'ы двигаются до любых чтений значения в этом тике
        self.power_meter.tick(dt);
        self.counter_meter.tick(dt);

        self.player.tick(dt);
        self.ai.tick(dt);

        if let Some(step) = self.scheduler.tick(dt) {
            self.run_step(step);
        }
        self.collect_state_changes();
    }

    /// Забирает накопленные события
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        self.collect_state_changes();
        std::mem::take(&mut self.outbox)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn run_step(&mut self, step: TurnStep) {
        crate::log(&format!("⏱️ Step fired: {:?}", step));
        match step {
            TurnStep::StartAiTurn => self.start_ai_turn(),
            TurnStep::AiBeginAttack => {
                if !self.is_ai_turn() {
                    return;
                }
                if !self.ai.capability_enabled() {
                    crate::log_warning(&format!(
                        "⚠️ AI cannot attack from {:?}; attack skipped",
                        self.ai.state()
                    ));
                    self.schedule(TurnStep::StartPlayerTurn, self.timings.ai_attack_time);
                    return;
                }

                let damage = self.roll_ai_damage();
                self.pending_ai_damage = Some(damage);
                let power = self.ai_damage.fraction_of_max(damage);
                self.ai.set_state_with_power(CombatantState::Attacking, power);
                self.schedule(TurnStep::HoldPlayerPose, 0.0);
            }
            TurnStep::HoldPlayerPose => {
                self.player.maintain_waiting_pose();
                self.schedule(TurnStep::StartPlayerTurn, self.timings.ai_attack_time);
            }
            TurnStep::StartPlayerTurn => self.start_player_turn(),
        }
    }

    fn schedule(&mut self, step: TurnStep, delay_secs: f32) {
        self.scheduler.schedule(step, delay_secs);
    }

    /// Отмена всех отложенных переходов (шаг хода, возвраты FSM в Idle)
    /// и остановка обоих meter'ов
    fn halt(&mut self) {
        if let Some(step) = self.scheduler.cancel() {
            crate::log(&format!("⏱️ Pending {:?} cancelled", step));
        }
        for fsm in [&mut self.player, &mut self.ai] {
            if fsm.cancel_pending_return() {
                crate::log(&format!("⏱️ {}: return to Idle cancelled", fsm.side().label()));
            }
        }
        self.power_meter.stop();
        self.counter_meter.stop();
    }

    fn set_phase(&mut self, phase: TurnPhase) {
        let from = self.phase;
        self.phase = phase;
        self.outbox.push(MatchEvent::PhaseChanged { from, to: phase });
        crate::log(&format!("🔁 Phase {:?} → {:?}", from, phase));
    }

    fn roll_ai_damage(&mut self) -> u32 {
        compute_ai_damage(self.ai_damage.min, self.ai_damage.max, &mut self.rng)
    }

    /// Урон по цели. Возвращает `true`, если цель умерла от этого удара.
    fn deal_damage(&mut self, target: Side, damage: u32) -> bool {
        let applied = self.health_slot(target).as_mut().map(|health| {
            let was_alive = !health.is_dead();
            if damage > 0 {
                health.take_damage(damage);
            }
            (was_alive, health.current(), health.max(), health.is_dead())
        });
        let Some((was_alive, current, max, dead)) = applied else {
            crate::log_warning(&format!(
                "⚠️ No health provider wired for {}; {} damage skipped",
                target.label(),
                damage
            ));
            return false;
        };
        let target_died = was_alive && dead;

        if damage > 0 {
            self.outbox.push(MatchEvent::HealthChanged {
                side: target,
                current,
                max,
            });
        }
        self.outbox.push(MatchEvent::DamageDealt {
            attacker: target.opponent(),
            target,
            damage,
            target_died,
        });
        crate::log(&format!(
            "❤️ {} takes {} damage (HP: {}/{})",
            target.label(),
            damage,
            current,
            max
        ));
        dead
    }

    fn collect_state_changes(&mut self) {
        for change in self.player.drain_changes() {
            self.outbox.push(MatchEvent::StateChanged(change));
        }
        for change in self.ai.drain_changes() {
            self.outbox.push(MatchEvent::StateChanged(change));
        }
    }

    fn health_ref(&self, side: Side) -> Option<&dyn HealthProvider> {
        match side {
            Side::Player => self.player_health.as_deref(),
            Side::Ai => self.ai_health.as_deref(),
        }
    }

    fn health_slot(&mut self, side: Side) -> &mut Option<Box<dyn HealthProvider>> {
        match side {
            Side::Player => &mut self.player_health,
            Side::Ai => &mut self.ai_health,
        }
    }
}

//! Combatant FSM: Idle / Waiting / Hitted / Attacking / Dead.
//!
//! Enter/exit hooks диспатчатся через `match` по состоянию. Поведение,
//! специфичное для игрока или AI, задаётся `CombatantProfile`
//! (capability по состояниям, размеры пулов анимаций, длительность атаки).

use std::time::Duration;

use bevy::prelude::{Timer, TimerMode};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::state::{AnimationClass, AnimationCue, CombatantState, StateChanged};
use crate::components::Side;
use crate::config::CombatantProfile;

pub struct CombatantStateMachine {
    side: Side,
    profile: CombatantProfile,
    state: CombatantState,
    capability_enabled: bool,
    cue: AnimationCue,
    /// Сила последнего удара как доля от max (0..1), выбирает mega/normal пул
    last_power: f32,
    /// Отложенный возврат Attacking → Idle
    return_to_idle: Option<Timer>,
    /// Защита от рекурсивного set_state из hook'а
    in_transition: bool,
    rng: ChaCha8Rng,
    changes: Vec<StateChanged>,
}

impl CombatantStateMachine {
    pub fn new(side: Side, profile: CombatantProfile, seed: u64) -> Self {
        Self {
            side,
            capability_enabled: profile.capability_in_idle,
            profile,
            state: CombatantState::Idle,
            cue: AnimationCue::new(AnimationClass::Neutral, 0),
            last_power: 0.0,
            return_to_idle: None,
            in_transition: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
            changes: Vec::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn state(&self) -> CombatantState {
        self.state
    }

    pub fn is(&self, state: CombatantState) -> bool {
        self.state == state
    }

    pub fn capability_enabled(&self) -> bool {
        self.capability_enabled
    }

    pub fn animation_cue(&self) -> AnimationCue {
        self.cue
    }

    pub fn last_power(&self) -> f32 {
        self.last_power
    }

    pub fn profile(&self) -> &CombatantProfile {
        &self.profile
    }

    /// Запланирован ли возврат в Idle (только в Attacking)
    pub fn has_pending_return(&self) -> bool {
        self.return_to_idle.is_some()
    }

    /// Veto: из Dead никуда. Остальные переходы разрешены.
    pub fn can_transition_to(&self, _target: CombatantState) -> bool {
        !self.state.is_terminal()
    }

    /// Переход с учётом veto. `false` если переход не состоялся.
    pub fn set_state(&mut self, next: CombatantState) -> bool {
        if self.state == next || !self.can_transition_to(next) {
            return false;
        }
        self.transition(next)
    }

    /// Переход в обход veto (смерть должна пройти всегда).
    ///
    /// Dead остаётся терминальным и здесь: выход из него только через `reset`.
    pub fn force_set_state(&mut self, next: CombatantState) -> bool {
        if self.state == next || self.state.is_terminal() {
            return false;
        }
        self.transition(next)
    }

    /// Запоминает силу удара (0..1) и переходит — Hitted/Attacking выберут пул по ней
    pub fn set_state_with_power(&mut self, next: CombatantState, power: f32) -> bool {
        if self.state.is_terminal() || self.in_transition {
            return false;
        }
        self.last_power = if power.is_finite() { power.clamp(0.0, 1.0) } else { 0.0 };
        self.set_state(next)
    }

    /// "Держать позу ожидания": Idle/Attacking → Waiting.
    ///
    /// Hitted не прерывается (реакция доигрывает), Dead не трогаем.
    pub fn maintain_waiting_pose(&mut self) -> bool {
        match self.state {
            CombatantState::Idle | CombatantState::Attacking => self.set_state(CombatantState::Waiting),
            _ => false,
        }
    }

    /// Отменяет отложенный возврат Attacking → Idle (конец матча замораживает позу)
    pub fn cancel_pending_return(&mut self) -> bool {
        self.return_to_idle.take().is_some()
    }

    /// Тикает отложенный возврат в Idle
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let finished = match self.return_to_idle.as_mut() {
            Some(timer) => {
                timer.tick(Duration::from_secs_f32(dt));
                timer.finished()
            }
            None => false,
        };

        if finished {
            self.return_to_idle = None;
            if self.state == CombatantState::Attacking {
                self.set_state(CombatantState::Idle);
            }
        }
    }

    /// Сброс на новый матч: Idle без veto, таймеры и сила удара очищены
    pub fn reset(&mut self) {
        let from = self.state;
        self.return_to_idle = None;
        self.in_transition = false;
        self.last_power = 0.0;
        self.state = CombatantState::Idle;
        self.on_enter(CombatantState::Idle);

        if from != CombatantState::Idle {
            self.push_change(from, CombatantState::Idle);
        }
    }

    pub fn drain_changes(&mut self) -> Vec<StateChanged> {
        std::mem::take(&mut self.changes)
    }

    fn transition(&mut self, next: CombatantState) -> bool {
        if self.in_transition {
            crate::log_warning(&format!(
                "⚠️ {}: re-entrant transition to {:?} rejected (in {:?})",
                self.side.label(),
                next,
                self.state
            ));
            return false;
        }

        self.in_transition = true;
        let from = self.state;
        self.on_exit(from);
        self.state = next;
        self.on_enter(next);
        self.in_transition = false;

        crate::log(&format!("🎭 {}: {:?} → {:?}", self.side.label(), from, next));
        self.push_change(from, next);
        true
    }

    fn on_exit(&mut self, state: CombatantState) {
        if state == CombatantState::Attacking {
            // Устаревший возврат в Idle не должен сработать после смены состояния
            self.return_to_idle = None;
        }
    }

    fn on_enter(&mut self, state: CombatantState) {
        match state {
            CombatantState::Idle => {
                self.capability_enabled = self.profile.capability_in_idle;
                self.cue = AnimationCue::new(AnimationClass::Neutral, 0);
            }
            CombatantState::Waiting => {
                self.capability_enabled = self.profile.capability_in_waiting;
                self.cue = AnimationCue::new(AnimationClass::WaitingLoop, 0);
            }
            CombatantState::Hitted => {
                self.capability_enabled = false;
                let (class, pool) = if self.is_mega() {
                    (AnimationClass::MegaHitReaction, self.profile.mega_hit_variants)
                } else {
                    (AnimationClass::HitReaction, self.profile.hit_variants)
                };
                let variant = self.pick_variant(pool);
                self.cue = AnimationCue::new(class, variant);
            }
            CombatantState::Attacking => {
                self.capability_enabled = false;
                let (class, pool) = if self.is_mega() {
                    (AnimationClass::MegaAttack, self.profile.mega_attack_variants)
                } else {
                    (AnimationClass::Attack, self.profile.attack_variants)
                };
                let variant = self.pick_variant(pool);
                self.cue = AnimationCue::new(class, variant);
                self.return_to_idle = Some(Timer::from_seconds(
                    self.profile.attack_duration.max(0.0),
                    TimerMode::Once,
                ));
            }
            CombatantState::Dead => {
                self.capability_enabled = false;
                self.return_to_idle = None;
                self.cue = AnimationCue::new(AnimationClass::Death, 0);
            }
        }
    }

    fn is_mega(&self) -> bool {
        self.last_power >= self.profile.mega_threshold
    }

    /// Случайный индекс в пуле; пустой пул → вариант 0
    fn pick_variant(&mut self, pool: u8) -> u8 {
        if pool == 0 {
            return 0;
        }
        self.rng.gen_range(0..pool)
    }

    fn push_change(&mut self, from: CombatantState, to: CombatantState) {
        self.changes.push(StateChanged {
            side: self.side,
            from,
            to,
            cue: self.cue,
            capability_enabled: self.capability_enabled,
        });
    }
}

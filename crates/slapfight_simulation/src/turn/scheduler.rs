//! Отложенные шаги хода (один cancellable handle на контроллер)
//!
//! Новый `schedule` явно отменяет предыдущий шаг: одновременно ждёт
//! не больше одного продолжения.

use std::time::Duration;

use bevy::prelude::{Timer, TimerMode};

/// Шаги, которые контроллер откладывает во времени
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnStep {
    /// После "get-slapped" задержки — ход AI
    StartAiTurn,
    /// После ai_wait_time — AI → Attacking
    AiBeginAttack,
    /// Тик спустя — игрок держит позу ожидания
    HoldPlayerPose,
    /// После ai_attack_time — снова ход игрока
    StartPlayerTurn,
}

#[derive(Debug, Clone)]
struct PendingStep {
    step: TurnStep,
    timer: Timer,
}

#[derive(Debug, Clone, Default)]
pub struct TurnScheduler {
    pending: Option<PendingStep>,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel-then-reschedule. Возвращает отменённый шаг, если был.
    ///
    /// `delay_secs == 0` — шаг сработает на следующем тике.
    pub fn schedule(&mut self, step: TurnStep, delay_secs: f32) -> Option<TurnStep> {
        let replaced = self.cancel();
        if let Some(previous) = replaced {
            crate::log(&format!(
                "⏱️ Scheduler: {:?} superseded by {:?}",
                previous, step
            ));
        }

        let delay = if delay_secs.is_finite() { delay_secs.max(0.0) } else { 0.0 };
        self.pending = Some(PendingStep {
            step,
            timer: Timer::from_seconds(delay, TimerMode::Once),
        });
        replaced
    }

    pub fn cancel(&mut self) -> Option<TurnStep> {
        self.pending.take().map(|pending| pending.step)
    }

    pub fn pending(&self) -> Option<TurnStep> {
        self.pending.as_ref().map(|pending| pending.step)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn remaining_secs(&self) -> Option<f32> {
        self.pending
            .as_ref()
            .map(|pending| pending.timer.remaining_secs())
    }

    /// Тикает таймер; по истечении забирает шаг и возвращает его
    pub fn tick(&mut self, dt: f32) -> Option<TurnStep> {
        if !dt.is_finite() || dt <= 0.0 {
            return None;
        }

        let pending = self.pending.as_mut()?;
        pending.timer.tick(Duration::from_secs_f32(dt));
        if pending.timer.finished() {
            return self.pending.take().map(|pending| pending.step);
        }
        None
    }
}

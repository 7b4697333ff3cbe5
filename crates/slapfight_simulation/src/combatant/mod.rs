//! Combatant state machines (одна на игрока, одна на AI)

pub mod fsm;
pub mod state;


pub use fsm::CombatantStateMachine;
pub use state::{AnimationClass, AnimationCue, CombatantState, StateChanged};

//! Unidirectional application state: actions are reduced into [`AppState`],
//! effects turn requests into service calls, and the [`Dispatcher`] drives
//! both from an explicit queue.

pub mod actions;
pub mod dispatcher;
pub mod effects;
pub mod reducer;
pub mod selectors;

pub use actions::{Action, DaySnapshot};
pub use dispatcher::Dispatcher;
pub use effects::{run_effects, EffectContext};
pub use reducer::{reduce, AppState, BudgetState, Notice, NoticeKind, SpinnerState};

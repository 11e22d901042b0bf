//! Pure calendar and series logic: occurrence math, month keys, scope resolution.

pub mod month;
pub mod recurrence;
pub mod scope;

pub use month::{month_of, month_span, months_ahead, months_touched, previous_month};
pub use recurrence::{expand, next_occurrence, DEFAULT_SERIES_CAP};
pub use scope::{plan_goal_refunds, plan_goal_syncs, resolve_affected, GoalSync, SeriesSnapshot};

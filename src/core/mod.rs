//! Engine services orchestrating storage, recurrence math, and goal sync.

pub mod services;

//! bs-components: generic component library.
//!
//! Provides physics-free building blocks:
//! - Day, week and year schedules producing a time series from profiles
//! - A linear calculator combining variables of other components
//!
//! `default_factory()` registers every type under its definition-file name.

pub mod calculator;
pub mod common;
pub mod day_schedule;
pub mod week_schedule;
pub mod year_schedule;

use bs_model::ComponentFactory;

// Re-exports
pub use calculator::Calculator;
pub use day_schedule::{DaySchedule, Interpolation};
pub use week_schedule::WeekSchedule;
pub use year_schedule::YearSchedule;

/// Factory with every component type of this crate.
pub fn default_factory() -> ComponentFactory {
    ComponentFactory::new()
        .with(day_schedule::TYPE, DaySchedule::boxed)
        .with(week_schedule::TYPE, WeekSchedule::boxed)
        .with(year_schedule::TYPE, YearSchedule::boxed)
        .with(calculator::TYPE, Calculator::boxed)
}

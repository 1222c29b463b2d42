//! Weekly profile made of day schedules.

use bs_core::Real;
use bs_model::{Component, ComponentCore, Components, ModelResult, Parameter, Resolver};
use chrono::{Datelike, NaiveDateTime};

use crate::common::{length_mismatch, require_defined};
use crate::day_schedule::{self, DaySchedule};

pub const TYPE: &str = "Week_schedule";

/// Seven day schedules (Monday first), or one used for every day.
#[derive(Debug, Clone)]
pub struct WeekSchedule {
    core: ComponentCore,
}

impl WeekSchedule {
    pub fn new(name: &str) -> Self {
        let mut core = ComponentCore::new(TYPE, name);
        core.add_parameter(Parameter::component_list(
            "days_schedules",
            &[],
            &[day_schedule::TYPE],
        ));
        Self { core }
    }

    pub fn boxed(name: &str) -> Box<dyn Component> {
        Box::new(Self::new(name))
    }

    /// Value at `date`, read from the day schedule of its weekday.
    pub fn value_at(&self, date: NaiveDateTime, others: &Components<'_>) -> ModelResult<Real> {
        let days = self.core.component_refs("days_schedules")?;
        let index = if days.len() == 1 {
            0
        } else {
            date.weekday().num_days_from_monday() as usize
        };
        let day = days.get(index).copied().ok_or(bs_core::BsError::IndexOob {
            what: "week schedule days",
            index,
            len: days.len(),
        })?;
        others.downcast::<DaySchedule>(day)?.value_at_date(date)
    }
}

impl Component for WeekSchedule {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn check(&mut self, resolver: &dyn Resolver) -> Vec<String> {
        let mut errors = self.core.check(resolver);
        let len = self
            .core
            .text_list("days_schedules")
            .map(|days| days.len())
            .unwrap_or_default();
        if len != 1 && len != 7 {
            errors.push(length_mismatch(&self.core, "days_schedules", len, "1 or 7"));
        } else if let Some(error) = require_defined(&self.core, "days_schedules") {
            errors.push(error);
        }
        errors
    }
}

//! Yearly schedule producing the `values` time series.

use bs_core::{BsError, Real};
use bs_model::{
    Component, ComponentCore, Components, ModelError, ModelResult, Parameter, Resolver, StepInfo,
    Variable,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::common::{length_mismatch, require_defined};
use crate::week_schedule::{self, WeekSchedule};

pub const TYPE: &str = "Year_schedule";

/// Week schedules applied over periods of the year.
///
/// `periods` holds the `dd/mm` start date of every period after the first,
/// which begins on 1 January; `weeks_schedules` has one entry per period.
/// While daylight saving is active the schedule is read one hour later, so
/// profiles follow local clock time.
#[derive(Debug, Clone)]
pub struct YearSchedule {
    core: ComponentCore,
}

impl YearSchedule {
    pub fn new(name: &str) -> Self {
        let mut core = ComponentCore::new(TYPE, name);
        core.add_parameter(Parameter::text_list("periods", &[]));
        core.add_parameter(Parameter::component_list(
            "weeks_schedules",
            &[],
            &[week_schedule::TYPE],
        ));
        core.add_variable(Variable::new("values", ""));
        Self { core }
    }

    pub fn boxed(name: &str) -> Box<dyn Component> {
        Box::new(Self::new(name))
    }

    fn period_starts(&self) -> ModelResult<Vec<(u32, u32)>> {
        self.core
            .text_list("periods")?
            .into_iter()
            .map(|text| {
                parse_day_month(text).ok_or(ModelError::from(BsError::InvalidArg {
                    what: "period must be a dd/mm date",
                }))
            })
            .collect()
    }

    /// Schedule value at `date` (clock time).
    pub fn value_at(&self, date: NaiveDateTime, others: &Components<'_>) -> ModelResult<Real> {
        let starts = self.period_starts()?;
        let weeks = self.core.component_refs("weeks_schedules")?;
        let key = (date.month(), date.day());
        let index = starts.iter().filter(|start| **start <= key).count();
        let week = weeks.get(index).copied().ok_or(BsError::IndexOob {
            what: "year schedule weeks",
            index,
            len: weeks.len(),
        })?;
        others.downcast::<WeekSchedule>(week)?.value_at(date, others)
    }
}

/// `(month, day)` of a `dd/mm` date, 29/02 included.
fn parse_day_month(text: &str) -> Option<(u32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{}/2000", text.trim()), "%d/%m/%Y").ok()?;
    Some((date.month(), date.day()))
}

impl Component for YearSchedule {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn check(&mut self, resolver: &dyn Resolver) -> Vec<String> {
        let mut errors = self.core.check(resolver);
        let periods = self.core.text_list("periods").unwrap_or_default();
        let mut previous = None;
        for text in &periods {
            match parse_day_month(text) {
                Some(start) if previous.is_some_and(|p| p >= start) => errors.push(format!(
                    "Error: {}, parameter 'periods': '{text}' is not after the previous period.",
                    self.core.name()
                )),
                Some(start) => previous = Some(start),
                None => errors.push(format!(
                    "Error: {}, parameter 'periods': '{text}' does not match format (dd/mm).",
                    self.core.name()
                )),
            }
        }
        let weeks = self
            .core
            .text_list("weeks_schedules")
            .map(|w| w.len())
            .unwrap_or_default();
        if weeks != periods.len() + 1 {
            let expected = format!("{} (one more than periods)", periods.len() + 1);
            errors.push(length_mismatch(&self.core, "weeks_schedules", weeks, &expected));
        } else if let Some(error) = require_defined(&self.core, "weeks_schedules") {
            errors.push(error);
        }
        errors
    }

    fn pre_iteration(&mut self, step: &StepInfo, others: &Components<'_>) -> ModelResult<()> {
        self.core.copy_shadow_values(step.time_index, others)?;
        let clock = if step.daylight_saving {
            step.date + Duration::hours(1)
        } else {
            step.date
        };
        let value = self.value_at(clock, others)?;
        self.core
            .variable_mut("values")?
            .set(step.time_index, value)?;
        Ok(())
    }
}

//! Daily profile: a value for every second of the day.

use bs_core::{BsError, Real};
use bs_model::{Component, ComponentCore, ModelError, ModelResult, Parameter, Resolver};
use chrono::{NaiveDateTime, Timelike};

use crate::common::{DAY_SECONDS, length_mismatch};

pub const TYPE: &str = "Day_schedule";

/// How values are read between the profile's breakpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    /// Hold each value for its whole period.
    Step,
    /// Ramp linearly from each value to the next across the period.
    Linear,
}

impl Interpolation {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "STEP" => Some(Interpolation::Step),
            "LINEAR" => Some(Interpolation::Linear),
            _ => None,
        }
    }
}

/// Profile built from consecutive periods starting at midnight.
///
/// `time_steps[i]` is the length in seconds of period `i`, whose value is
/// `values[i]`. The last value covers the rest of the day, so `values` has
/// one element more than `time_steps`.
#[derive(Debug, Clone)]
pub struct DaySchedule {
    core: ComponentCore,
}

impl DaySchedule {
    pub fn new(name: &str) -> Self {
        let mut core = ComponentCore::new(TYPE, name);
        core.add_parameter(
            Parameter::float_list("time_steps", &[], "s")
                .with_min(0.0)
                .with_max(DAY_SECONDS),
        );
        core.add_parameter(Parameter::float_list("values", &[0.0], ""));
        core.add_parameter(Parameter::options(
            "interpolation",
            "STEP",
            &["STEP", "LINEAR"],
        ));
        Self { core }
    }

    pub fn boxed(name: &str) -> Box<dyn Component> {
        Box::new(Self::new(name))
    }

    pub fn interpolation(&self) -> ModelResult<Interpolation> {
        let text = self.core.text("interpolation")?;
        Interpolation::parse(text).ok_or_else(|| ModelError::ParameterType {
            component: self.core.name().to_string(),
            parameter: "interpolation".into(),
            expected: "STEP or LINEAR",
        })
    }

    /// Value `seconds` after midnight.
    pub fn value_at(&self, seconds: Real) -> ModelResult<Real> {
        let steps = self.core.float_list("time_steps")?;
        let values = self.core.float_list("values")?;
        let interpolation = self.interpolation()?;
        let value = |i: usize| {
            values.get(i).copied().ok_or(BsError::IndexOob {
                what: "day schedule values",
                index: i,
                len: values.len(),
            })
        };

        let mut start = 0.0;
        for (i, length) in steps.iter().enumerate() {
            let end = start + length;
            if seconds < end {
                return Ok(match interpolation {
                    Interpolation::Step => value(i)?,
                    Interpolation::Linear => {
                        let (from, to) = (value(i)?, value(i + 1)?);
                        from + (to - from) * (seconds - start) / length
                    }
                });
            }
            start = end;
        }
        Ok(value(steps.len())?)
    }

    /// Value at the time of day of `date`.
    pub fn value_at_date(&self, date: NaiveDateTime) -> ModelResult<Real> {
        let time = date.time();
        let seconds =
            time.num_seconds_from_midnight() as Real + time.nanosecond() as Real * 1e-9;
        self.value_at(seconds)
    }
}

impl Component for DaySchedule {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn check(&mut self, resolver: &dyn Resolver) -> Vec<String> {
        let mut errors = self.core.check(resolver);
        let (Ok(steps), Ok(values)) = (
            self.core.float_list("time_steps"),
            self.core.float_list("values"),
        ) else {
            return errors;
        };
        if values.len() != steps.len() + 1 {
            let expected = format!("{} (one more than time_steps)", steps.len() + 1);
            errors.push(length_mismatch(&self.core, "values", values.len(), &expected));
        }
        let total: Real = steps.iter().sum();
        if total > DAY_SECONDS {
            errors.push(format!(
                "Error: {}, parameter 'time_steps' adds up to {total} s, more than one day.",
                self.core.name()
            ));
        }
        errors
    }
}

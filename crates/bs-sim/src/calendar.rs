//! Interval-centered timestamps and the daylight-saving window.

use bs_model::StepInfo;
use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{SimError, SimResult};
use crate::settings::RunSettings;

/// Open interval of dates flagged as daylight saving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DaylightSaving {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DaylightSaving {
    /// Strictly between `start` and `end`; both boundaries are excluded.
    pub fn contains(&self, date: NaiveDateTime) -> bool {
        date > self.start && date < self.end
    }
}

/// Time axis of a run: step `i` is stamped at the middle of its interval,
/// `initial_time + time_step / 2 + i * time_step`.
///
/// Construction fails unless every step's date is representable, so
/// [`Calendar::date`] only fails for indices past the end of the run.
#[derive(Clone, Debug, PartialEq)]
pub struct Calendar {
    first: NaiveDateTime,
    time_step: i64,
    n_time_steps: usize,
    daylight_saving: Option<DaylightSaving>,
}

impl Calendar {
    pub fn new(settings: &RunSettings) -> SimResult<Self> {
        let out_of_range = || SimError::InvalidSettings {
            what: format!(
                "{} steps of {} s from {} go past the last supported date",
                settings.n_time_steps,
                settings.time_step,
                settings.initial_time.format(crate::settings::DATE_FORMAT)
            ),
        };
        // Half a step in milliseconds keeps odd step lengths exact.
        let first = settings
            .time_step
            .checked_mul(500)
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|half| settings.initial_time.checked_add_signed(half))
            .ok_or_else(out_of_range)?;
        let calendar = Self {
            first,
            time_step: settings.time_step,
            n_time_steps: settings.n_time_steps,
            daylight_saving: settings.daylight_saving,
        };
        // Dates are monotonic, so the last one bounds all the others.
        if let Some(last) = settings.n_time_steps.checked_sub(1) {
            calendar.offset(last).ok_or_else(out_of_range)?;
        }
        Ok(calendar)
    }

    pub fn len(&self) -> usize {
        self.n_time_steps
    }

    pub fn is_empty(&self) -> bool {
        self.n_time_steps == 0
    }

    fn offset(&self, time_index: usize) -> Option<NaiveDateTime> {
        let seconds = i64::try_from(time_index)
            .ok()?
            .checked_mul(self.time_step)?;
        self.first
            .checked_add_signed(TimeDelta::try_seconds(seconds)?)
    }

    pub fn date(&self, time_index: usize) -> SimResult<NaiveDateTime> {
        self.offset(time_index)
            .ok_or_else(|| SimError::InvalidSettings {
                what: format!("step {time_index} is past the last supported date"),
            })
    }

    pub fn is_daylight_saving(&self, date: NaiveDateTime) -> bool {
        self.daylight_saving.is_some_and(|w| w.contains(date))
    }

    /// Context for the hooks of step `time_index`.
    pub fn step(&self, time_index: usize) -> SimResult<StepInfo> {
        let date = self.date(time_index)?;
        Ok(StepInfo {
            time_index,
            date,
            daylight_saving: self.is_daylight_saving(date),
            delta_t: self.time_step as f64,
        })
    }

    /// Every step's timestamp.
    pub fn dates(&self) -> SimResult<Vec<NaiveDateTime>> {
        (0..self.n_time_steps).map(|i| self.date(i)).collect()
    }
}

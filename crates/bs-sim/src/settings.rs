//! Global project parameters and the run settings parsed from them.

use bs_model::{Parameter, ParameterSet};
use chrono::NaiveDateTime;

use crate::calendar::DaylightSaving;
use crate::error::{SimError, SimResult};

/// Format of every date-valued parameter: `dd/mm/yyyy HH:MM:SS`.
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Type priority used to order the execution list.
pub const DEFAULT_SIMULATION_ORDER: &[&str] = &[
    "File_data",
    "File_met",
    "Day_schedule",
    "Week_schedule",
    "Year_schedule",
    "Material",
    "Glazing",
    "Frame",
    "Construction",
    "Opening_type",
    "Space_type",
    "Exterior_surface",
    "Virtual_exterior_surface",
    "Underground_surface",
    "Interior_surface",
    "Virtual_interior_surface",
    "Opening",
    "Space",
    "Building",
];

const DEFAULT_INITIAL_TIME: &str = "01/01/2001 00:00:00";
const DEFAULT_DST_START: &str = "25/03/2001 02:00:00";
const DEFAULT_DST_END: &str = "28/10/2001 02:00:00";

pub fn parse_date(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, DATE_FORMAT)
}

/// The global parameters every project starts with.
pub fn global_parameters() -> ParameterSet {
    let mut set = ParameterSet::new();
    set.insert(Parameter::integer("time_step", 3600, "s").with_min(1.0));
    set.insert(Parameter::integer("n_time_steps", 8760, "").with_min(1.0));
    set.insert(Parameter::text("initial_time", DEFAULT_INITIAL_TIME));
    set.insert(Parameter::boolean("daylight_saving", false));
    set.insert(Parameter::text("daylight_saving_start_time", DEFAULT_DST_START));
    set.insert(Parameter::text("daylight_saving_end_time", DEFAULT_DST_END));
    set.insert(Parameter::integer("n_max_iteration", 1000, "").with_min(1.0));
    set.insert(Parameter::text_list("simulation_order", DEFAULT_SIMULATION_ORDER));
    set
}

/// Typed view of the global parameters for one run.
///
/// The type priority is not part of it; ordering reads the
/// `simulation_order` parameter directly.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSettings {
    /// Step length (seconds)
    pub time_step: i64,
    pub n_time_steps: usize,
    /// Start of the first interval
    pub initial_time: NaiveDateTime,
    /// Window in which steps are flagged as daylight saving, if enabled
    pub daylight_saving: Option<DaylightSaving>,
    /// Cap on iteration passes per step
    pub n_max_iteration: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            time_step: 3600,
            n_time_steps: 8760,
            initial_time: parse_date(DEFAULT_INITIAL_TIME).unwrap_or_default(),
            daylight_saving: None,
            n_max_iteration: 1000,
        }
    }
}

impl RunSettings {
    /// Parse the global parameters. Bad dates and non-positive counts fail.
    pub fn from_parameters(parameters: &ParameterSet) -> SimResult<Self> {
        let time_step = positive(parameters, "time_step")?;
        let n_time_steps = positive(parameters, "n_time_steps")?;
        let n_max_iteration = positive(parameters, "n_max_iteration")?;
        let initial_time = date(parameters, "initial_time")?;
        let daylight_saving = if flag(parameters, "daylight_saving")? {
            Some(DaylightSaving {
                start: date(parameters, "daylight_saving_start_time")?,
                end: date(parameters, "daylight_saving_end_time")?,
            })
        } else {
            None
        };
        Ok(Self {
            time_step,
            n_time_steps: n_time_steps as usize,
            initial_time,
            daylight_saving,
            n_max_iteration: n_max_iteration as usize,
        })
    }
}

fn invalid(what: impl Into<String>) -> SimError {
    SimError::InvalidSettings { what: what.into() }
}

fn positive(parameters: &ParameterSet, name: &str) -> SimResult<i64> {
    match parameters.get(name).and_then(Parameter::as_i64) {
        Some(v) if v >= 1 => Ok(v),
        Some(v) => Err(invalid(format!("{name} must be at least 1, got {v}"))),
        None => Err(invalid(format!("{name} must be an integer"))),
    }
}

fn flag(parameters: &ParameterSet, name: &str) -> SimResult<bool> {
    parameters
        .get(name)
        .and_then(Parameter::as_bool)
        .ok_or_else(|| invalid(format!("{name} must be a boolean")))
}

fn date(parameters: &ParameterSet, name: &str) -> SimResult<NaiveDateTime> {
    let text = parameters
        .get(name)
        .and_then(Parameter::as_str)
        .ok_or_else(|| invalid(format!("{name} must be text")))?;
    parse_date(text).map_err(|_| {
        invalid(format!(
            "{name}: {text} does not match format (dd/mm/yyyy HH:MM:SS)"
        ))
    })
}

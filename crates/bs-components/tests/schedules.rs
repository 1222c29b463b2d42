//! Schedules and calculators driven by a project.

use bs_components::{YearSchedule, default_factory};
use bs_core::MemorySink;
use bs_model::Component;
use bs_sim::Project;

fn set(project: &mut Project, component: &str, parameter: &str, value: impl Into<bs_model::ParamValue>) {
    let errors = project
        .component_mut(component)
        .unwrap()
        .core_mut()
        .set_parameter(parameter, value);
    assert!(errors.is_empty(), "{errors:?}");
}

/// Office profile: 100 from 08:00 to 18:00 on weekdays, 0 otherwise.
fn office(initial_time: &str, n_time_steps: i64) -> Project {
    let mut p = Project::new("office", default_factory()).with_sink(MemorySink::new());
    assert!(p.set_parameter("initial_time", initial_time).is_empty());
    assert!(p.set_parameter("n_time_steps", n_time_steps).is_empty());

    p.new_component("Day_schedule", "working").unwrap();
    set(&mut p, "working", "time_steps", vec![28_800.0, 36_000.0]);
    set(&mut p, "working", "values", vec![0.0, 100.0, 0.0]);
    p.new_component("Day_schedule", "closed").unwrap();

    p.new_component("Week_schedule", "week").unwrap();
    set(
        &mut p,
        "week",
        "days_schedules",
        vec!["working", "working", "working", "working", "working", "closed", "closed"],
    );
    p.new_component("Week_schedule", "holidays").unwrap();
    set(&mut p, "holidays", "days_schedules", vec!["closed"]);

    p.new_component("Year_schedule", "year").unwrap();
    set(&mut p, "year", "periods", vec!["01/08", "01/09"]);
    set(&mut p, "year", "weeks_schedules", vec!["week", "holidays", "week"]);

    p.new_component("Calculator", "load").unwrap();
    set(&mut p, "load", "input_variables", vec!["occupancy = year.values"]);
    set(&mut p, "load", "coefficients", vec![2.0]);
    set(&mut p, "load", "constant", 1.0);
    set(&mut p, "load", "output_unit", "W");
    p
}

#[test]
fn schedules_follow_weekdays_and_periods() {
    // 1 January 2001 is a Monday.
    let mut p = office("01/01/2001 00:00:00", 24 * 7);
    assert!(p.check().is_empty());
    let summary = p.simulate().unwrap();
    assert!(summary.all_converged());

    let values = p.component("year").unwrap().core().variable("values").unwrap().values().to_vec();
    assert_eq!(values[0], 0.0);
    assert_eq!(values[8], 100.0);
    assert_eq!(values[17], 100.0);
    assert_eq!(values[18], 0.0);
    // Saturday 6 January, 10:30.
    assert_eq!(values[5 * 24 + 10], 0.0);

    let load = p.component("load").unwrap().core().variable("output").unwrap();
    assert_eq!(load.unit(), "W");
    assert_eq!(load.values()[8], 201.0);
    assert_eq!(load.values()[0], 1.0);
}

#[test]
fn calculator_needs_a_confirming_pass() {
    let mut p = office("01/01/2001 00:00:00", 3);
    assert!(p.check().is_empty());
    let summary = p.simulate().unwrap();
    assert!(summary.steps.iter().all(|s| s.passes == 2 && s.converged));
}

#[test]
fn execution_order_follows_schedule_priority() {
    let mut p = office("01/01/2001 00:00:00", 1);
    assert!(p.check().is_empty());
    let types: Vec<String> = p
        .ordered_component_list()
        .into_iter()
        .map(|id| p.get(id).unwrap().type_name().to_string())
        .collect();
    assert_eq!(
        types,
        vec![
            "Day_schedule",
            "Day_schedule",
            "Week_schedule",
            "Week_schedule",
            "Year_schedule",
            "Calculator",
        ]
    );
}

#[test]
fn holiday_period_uses_its_own_week() {
    // Monday 6 August 2001.
    let mut p = office("06/08/2001 00:00:00", 24);
    assert!(p.check().is_empty());
    p.simulate().unwrap();
    let year = p.downcast::<YearSchedule>("year").unwrap();
    assert!(year.core().variable("values").unwrap().values().iter().all(|v| *v == 0.0));
}

#[test]
fn daylight_saving_shifts_the_schedule_by_one_hour() {
    // Monday 2 July 2001; the step stamped 07:30 reads 08:30 clock time.
    let mut p = office("02/07/2001 00:00:00", 24);
    assert!(p.check().is_empty());
    p.simulate().unwrap();
    let without = p.component("year").unwrap().core().variable("values").unwrap().values()[7];
    assert_eq!(without, 0.0);

    assert!(p.set_parameter("daylight_saving", true).is_empty());
    p.simulate().unwrap();
    let values = p.component("year").unwrap().core().variable("values").unwrap().values();
    assert_eq!(values[7], 100.0);
    assert_eq!(values[17], 0.0);
}

#[test]
fn missing_schedule_references_are_reported() {
    let mut p = Project::new("broken", default_factory()).with_sink(MemorySink::new());
    p.new_component("Week_schedule", "week").unwrap();
    set(&mut p, "week", "days_schedules", vec!["nowhere", "nowhere"]);
    p.new_component("Year_schedule", "year").unwrap();
    let errors = p.check();
    // Two unresolved names, a bad day count, and a year with no weeks.
    assert_eq!(errors.len(), 4, "{errors:?}");
    assert!(errors.iter().any(|e| e.contains("'days_schedules' has 2 elements, expected 1 or 7")));
    assert!(errors.iter().any(|e| e.contains("'weeks_schedules' has 0 elements")));
}

#[test]
fn shadow_units_settle_on_the_first_check() {
    // Referrers are registered before what they read, so the first pass
    // sees units that later checks change.
    let mut p = Project::new("chain", default_factory()).with_sink(MemorySink::new());
    for name in ["e", "d", "c"] {
        p.new_component("Calculator", name).unwrap();
    }
    set(&mut p, "e", "input_variables", vec!["y = d.x"]);
    set(&mut p, "e", "coefficients", vec![1.0]);
    set(&mut p, "d", "input_variables", vec!["x = c.output"]);
    set(&mut p, "d", "coefficients", vec![1.0]);
    set(&mut p, "c", "output_unit", "W");

    let unit = |p: &Project, component: &str, key: &str| {
        p.component(component)
            .unwrap()
            .core()
            .variable(key)
            .unwrap()
            .unit()
            .to_string()
    };
    assert!(p.check().is_empty());
    assert_eq!(unit(&p, "d", "x"), "W");
    assert_eq!(unit(&p, "e", "y"), "W");

    assert!(p.check().is_empty());
    assert_eq!(unit(&p, "d", "x"), "W");
    assert_eq!(unit(&p, "e", "y"), "W");
}

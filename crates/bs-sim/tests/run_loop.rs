//! Time loop: pass counts, buffers, timestamps and hook failures.

mod common;

use bs_sim::{RunPhase, SimError, parse_date};
use common::{Node, project};

#[test]
fn always_converging_components_take_one_pass_per_step() {
    let (mut p, _) = project(5);
    p.new_component("Space", "a").unwrap();
    p.new_component("Widget", "b").unwrap();
    assert!(p.check().is_empty());

    let summary = p.simulate().unwrap();
    assert_eq!(summary.steps.len(), 5);
    assert!(summary.steps.iter().all(|s| s.passes == 1 && s.converged));
    assert_eq!(summary.total_passes(), 5);
}

#[test]
fn convergence_from_the_kth_pass_takes_exactly_k_passes() {
    let (mut p, _) = project(3);
    p.new_component("Space", "a").unwrap();
    p.new_component("Space", "b").unwrap();
    p.component_mut("b")
        .unwrap()
        .core_mut()
        .set_parameter("converge_at", 4_i64);
    assert!(p.check().is_empty());

    let summary = p.simulate().unwrap();
    assert!(summary.steps.iter().all(|s| s.passes == 4 && s.converged));
    // Every component runs in every pass, converged or not.
    let a = p.downcast::<Node>("a").unwrap();
    assert_eq!(a.passes_seen, vec![4, 4, 4]);
}

#[test]
fn never_converging_component_hits_the_cap_and_the_run_completes() {
    let (mut p, _) = project(2);
    assert!(p.set_parameter("n_max_iteration", 7_i64).is_empty());
    p.new_component("Space", "a").unwrap();
    p.component_mut("a")
        .unwrap()
        .core_mut()
        .set_parameter("converge_at", 0_i64);

    let summary = p.simulate().unwrap();
    assert_eq!(summary.steps.len(), 2);
    assert!(summary.steps.iter().all(|s| s.passes == 7 && !s.converged));
    assert_eq!(summary.unconverged_steps(), vec![0, 1]);
    assert_eq!(p.phase(), RunPhase::Idle);
    assert_eq!(p.downcast::<Node>("a").unwrap().post_simulation_calls, 1);
}

#[test]
fn buffers_are_sized_by_every_run() {
    let (mut p, _) = project(6);
    p.new_component("Space", "a").unwrap();
    assert!(p.check().is_empty());
    p.simulate().unwrap();
    for v in p.component("a").unwrap().core().variable_dict().iter() {
        assert_eq!(v.len(), 6);
    }

    assert!(p.set_parameter("n_time_steps", 2_i64).is_empty());
    p.simulate().unwrap();
    for v in p.component("a").unwrap().core().variable_dict().iter() {
        assert_eq!(v.len(), 2);
    }
}

#[test]
fn dates_are_interval_centered() {
    let (p, _) = project(2);
    assert_eq!(
        p.dates().unwrap(),
        vec![
            parse_date("01/01/2001 00:30:00").unwrap(),
            parse_date("01/01/2001 01:30:00").unwrap(),
        ]
    );
}

#[test]
fn daylight_saving_flag_excludes_the_window_boundaries() {
    let (mut p, _) = project(4);
    assert!(p.set_parameter("initial_time", "25/03/2001 00:30:00").is_empty());
    assert!(p.set_parameter("daylight_saving", true).is_empty());
    assert!(
        p.set_parameter("daylight_saving_start_time", "25/03/2001 02:00:00")
            .is_empty()
    );
    assert!(
        p.set_parameter("daylight_saving_end_time", "25/03/2001 03:00:00")
            .is_empty()
    );
    assert!(p.set_parameter("time_step", 1800_i64).is_empty());
    p.new_component("Space", "a").unwrap();
    assert!(p.check().is_empty());
    p.simulate().unwrap();

    // 00:45, 01:15, 01:45, 02:15 -> only the last is inside.
    let dst = p.component("a").unwrap().core().variable("dst").unwrap();
    assert_eq!(dst.values(), &[0.0, 0.0, 0.0, 1.0]);

    assert!(p.set_parameter("initial_time", "25/03/2001 01:45:00").is_empty());
    p.simulate().unwrap();
    // 02:00 is the start and 03:00 the end of the window.
    let dst = p.component("a").unwrap().core().variable("dst").unwrap();
    assert_eq!(dst.values(), &[0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn unresolved_reference_fails_the_run_loudly() {
    let (mut p, _) = project(3);
    p.new_component("Needy", "n").unwrap();
    assert!(p.check().is_empty());

    let err = p.simulate().unwrap_err();
    match err {
        SimError::Component {
            component, hook, ..
        } => {
            assert_eq!(component, "n");
            assert_eq!(hook, "iteration");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(p.phase(), RunPhase::Idle);
}

#[test]
fn shadow_values_reach_the_referencing_component() {
    let (mut p, _) = project(3);
    p.new_component("Space", "source").unwrap();
    p.new_component("Space", "reader").unwrap();
    p.component_mut("reader")
        .unwrap()
        .core_mut()
        .set_parameter("input", "x_source = source.x");
    assert!(p.check().is_empty());
    p.simulate().unwrap();

    // source writes x in pre_iteration and runs first, so the reader's copy
    // sees the value of the same step.
    let copied = p.component("reader").unwrap().core().variable("x_source").unwrap();
    assert_eq!(copied.values(), &[0.0, 10.0, 20.0]);
    assert_eq!(copied.unit(), "m");
}

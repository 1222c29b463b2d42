//! The project: component registry, structural check and the time loop.

use core::fmt;
use std::collections::HashSet;

use bs_core::{CompId, LogSink, TracingSink};
use bs_model::{
    Component, ComponentArena, ComponentFactory, Components, Directory, ModelResult, ParamValue,
    Parameter, ParameterSet, ReferenceClosure,
};
use chrono::NaiveDateTime;

use crate::calendar::Calendar;
use crate::error::{SimError, SimResult};
use crate::lifecycle::{RunPhase, Transition};
use crate::order::{ExecutionPlan, execution_order};
use crate::settings::{RunSettings, global_parameters, parse_date};

const DEFAULT_DESCRIPTION: &str = "Description of the project";

/// Outcome of one time step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// Iteration passes run (between 1 and `n_max_iteration`).
    pub passes: usize,
    pub converged: bool,
}

/// Per-step record of a completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: Vec<StepReport>,
}

impl RunSummary {
    pub fn total_passes(&self) -> usize {
        self.steps.iter().map(|s| s.passes).sum()
    }

    pub fn all_converged(&self) -> bool {
        self.steps.iter().all(|s| s.converged)
    }

    /// Steps that hit the iteration cap without converging.
    pub fn unconverged_steps(&self) -> Vec<usize> {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.converged)
            .map(|(i, _)| i)
            .collect()
    }
}

/// A set of components simulated together.
///
/// The project owns every component in an arena. Components that are
/// registered (created or added, and not deleted) are the roots of the
/// execution list; anything they reference is simulated too.
pub struct Project {
    name: String,
    description: String,
    parameters: ParameterSet,
    arena: ComponentArena,
    registry: Vec<CompId>,
    factory: ComponentFactory,
    sink: Box<dyn LogSink>,
    phase: RunPhase,
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("name", &self.name)
            .field("components", &self.registry.len())
            .field("phase", &self.phase)
            .finish()
    }
}

impl Project {
    pub fn new(name: &str, factory: ComponentFactory) -> Self {
        Self {
            name: name.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            parameters: global_parameters(),
            arena: ComponentArena::new(),
            registry: Vec::new(),
            factory,
            sink: Box::new(TracingSink::new()),
            phase: RunPhase::Idle,
        }
    }

    /// Replace the message sink.
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn set_sink(&mut self, sink: Box<dyn LogSink>) {
        self.sink = sink;
    }

    pub fn print(&mut self, message: &str, add_new_line: bool) {
        self.sink.print(message, add_new_line);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn factory(&self) -> &ComponentFactory {
        &self.factory
    }

    /// Prefix of every project-level message.
    pub fn error_header(&self) -> String {
        format!("Error: Project \"{}\". ", self.name)
    }

    // ---- global parameters ----

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Assign a global parameter; `name` and `description` set the project's
    /// own fields. Problems are returned as messages.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<ParamValue>) -> Vec<String> {
        let value = value.into();
        match (name, &value) {
            ("name", ParamValue::Text(text)) => {
                self.name = text.clone();
                Vec::new()
            }
            ("description", ParamValue::Text(text)) => {
                self.description = text.clone();
                Vec::new()
            }
            ("name" | "description", other) => vec![format!(
                "{}{name} must be text, got '{other}'.",
                self.error_header()
            )],
            _ => match self.parameters.get_mut(name) {
                Some(parameter) => parameter.set(&self.name, value),
                None => vec![format!(
                    "{}Parameter {name} does not exist.",
                    self.error_header()
                )],
            },
        }
    }

    /// Typed run settings parsed from the global parameters.
    pub fn settings(&self) -> SimResult<RunSettings> {
        RunSettings::from_parameters(&self.parameters)
    }

    // ---- components ----

    /// Create a component through the factory and register it.
    pub fn new_component(&mut self, type_name: &str, name: &str) -> SimResult<CompId> {
        let component =
            self.factory
                .create(type_name, name)
                .ok_or_else(|| SimError::UnknownComponentType {
                    type_name: type_name.to_string(),
                })?;
        Ok(self.add_component(component))
    }

    /// Store and register an already built component.
    pub fn add_component(&mut self, component: Box<dyn Component>) -> CompId {
        let id = self.arena.insert(component);
        self.registry.push(id);
        id
    }

    /// Unregister a component. It stays in the arena, so references bound
    /// to it before the removal keep working until the next `check()`.
    pub fn del_component(&mut self, id: CompId) -> bool {
        let before = self.registry.len();
        self.registry.retain(|r| *r != id);
        self.registry.len() != before
    }

    /// Id of the first registered component called `name`.
    pub fn component_id(&self, name: &str) -> Option<CompId> {
        self.registry
            .iter()
            .copied()
            .find(|id| self.arena.get(*id).is_some_and(|c| c.name() == name))
    }

    pub fn component(&self, name: &str) -> Option<&(dyn Component + 'static)> {
        self.arena.get(self.component_id(name)?)
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut (dyn Component + 'static)> {
        let id = self.component_id(name)?;
        self.arena.get_mut(id)
    }

    pub fn get(&self, id: CompId) -> Option<&(dyn Component + 'static)> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: CompId) -> Option<&mut (dyn Component + 'static)> {
        self.arena.get_mut(id)
    }

    /// Registered component `name` as its concrete type.
    pub fn downcast<T: Component>(&self, name: &str) -> Option<&T> {
        self.component(name)?.as_any().downcast_ref::<T>()
    }

    pub fn arena(&self) -> &ComponentArena {
        &self.arena
    }

    /// Registered components, in registration order.
    pub fn component_list(&self) -> &[CompId] {
        &self.registry
    }

    pub fn component_list_of_type(&self, type_name: &str) -> Vec<CompId> {
        self.registry
            .iter()
            .copied()
            .filter(|id| {
                self.arena
                    .get(*id)
                    .is_some_and(|c| c.type_name() == type_name)
            })
            .collect()
    }

    pub fn referenced_components(&self, id: CompId) -> ReferenceClosure {
        self.arena.referenced_components(id)
    }

    fn simulation_order(&self) -> Vec<String> {
        self.parameters
            .get("simulation_order")
            .and_then(Parameter::as_str_list)
            .map(|types| types.into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn plan(&self) -> ExecutionPlan {
        execution_order(&self.arena, &self.registry, &self.simulation_order())
    }

    /// The execution list for the current bindings.
    pub fn ordered_component_list(&self) -> Vec<CompId> {
        self.plan().order
    }

    fn describe(&self, id: CompId) -> String {
        self.arena
            .get(id)
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| format!("#{id}"))
    }

    // ---- check ----

    /// Validate globals and every component in execution order.
    ///
    /// Prints `ok` or each problem through the sink and returns the problems.
    pub fn check(&mut self) -> Vec<String> {
        let header = self.error_header();
        self.sink.line(&format!("Checking project: {}", self.name));

        let mut directory = Directory::new(&self.arena, &self.registry);
        let mut errors = Vec::new();
        for parameter in self.parameters.iter_mut() {
            errors.extend(parameter.check(&self.name, &directory));
        }
        errors.extend(self.date_errors(&header));
        if let Ok(settings) = self.settings() {
            if let Err(err) = Calendar::new(&settings) {
                errors.push(format!("{header}{err}"));
            }
        }

        // A check can change the variables a later lookup sees (shadow units
        // follow their source), so passes repeat until the directory settles.
        let order = self.plan().order;
        let mut component_errors = Vec::new();
        for _ in 0..=order.len() {
            let published = directory.clone();
            component_errors = self.check_components(&order, &mut directory, &header);
            if directory == published {
                break;
            }
        }
        errors.extend(component_errors);

        // Bindings changed above; cycles are judged on the new ones.
        for cycle in self.plan().cycles {
            let mut path: Vec<String> = cycle.iter().map(|id| self.describe(*id)).collect();
            if let Some(first) = path.first().cloned() {
                path.push(first);
            }
            errors.push(format!("{header}reference cycle: {}", path.join(" -> ")));
        }

        if errors.is_empty() {
            self.sink.line("ok");
        } else {
            for error in &errors {
                self.sink.line(error);
            }
        }
        errors
    }

    fn check_components(
        &mut self,
        order: &[CompId],
        directory: &mut Directory,
        header: &str,
    ) -> Vec<String> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();
        for id in order {
            let Some(component) = self.arena.get_mut(*id) else {
                continue;
            };
            errors.extend(component.check(directory));
            directory.refresh(component);
            let name = component.name().to_string();
            if !names.insert(name.clone()) {
                errors.push(format!(
                    "{header}'{name}' is used by two or more components as name"
                ));
            }
        }
        errors
    }

    fn date_errors(&self, header: &str) -> Vec<String> {
        let mut names = vec!["initial_time"];
        let daylight_saving = self
            .parameters
            .get("daylight_saving")
            .and_then(Parameter::as_bool)
            .unwrap_or(false);
        if daylight_saving {
            names.push("daylight_saving_start_time");
            names.push("daylight_saving_end_time");
        }
        names
            .into_iter()
            .filter_map(|name| {
                let text = self.parameters.get(name)?.as_str()?;
                parse_date(text).err().map(|_| {
                    format!("{header}{name}: {text} does not match format (dd/mm/yyyy HH:MM:SS)")
                })
            })
            .collect()
    }

    // ---- simulation ----

    /// Interval-centered timestamp of every step.
    pub fn dates(&self) -> SimResult<Vec<NaiveDateTime>> {
        Calendar::new(&self.settings()?)?.dates()
    }

    /// Run every step of the simulation.
    ///
    /// Does not call `check()`; unresolved references surface as errors
    /// from the hooks that dereference them.
    pub fn simulate(&mut self) -> SimResult<RunSummary> {
        if self.phase != RunPhase::Idle {
            return Err(SimError::Lifecycle {
                phase: self.phase,
                transition: Transition::PreSimulation,
            });
        }
        let settings = self.settings()?;
        let result = self.run(&settings);
        if result.is_err() {
            self.phase = RunPhase::Idle;
        }
        result
    }

    fn advance(&mut self, transition: Transition) -> SimResult<()> {
        self.phase = self
            .phase
            .next(transition)
            .ok_or(SimError::Lifecycle {
                phase: self.phase,
                transition,
            })?;
        Ok(())
    }

    fn hook<R>(
        &mut self,
        id: CompId,
        hook: &'static str,
        f: impl FnOnce(&mut (dyn Component + 'static), &Components<'_>) -> ModelResult<R>,
    ) -> SimResult<R> {
        self.arena
            .with_component(id, f)?
            .map_err(|source| SimError::Component {
                component: self.describe(id),
                hook,
                source,
            })
    }

    fn run(&mut self, settings: &RunSettings) -> SimResult<RunSummary> {
        let calendar = Calendar::new(settings)?;
        let order = self.ordered_component_list();
        let n = settings.n_time_steps;
        let delta_t = settings.time_step as f64;

        self.advance(Transition::PreSimulation)?;
        for id in &order {
            self.hook(*id, "pre_simulation", |c, others| {
                c.pre_simulation(n, delta_t, others)
            })?;
        }

        let title = format!("Simulating {}: ", self.name);
        self.sink.print(&title, false);
        let mut progress = Progress::new(n);
        let mut summary = RunSummary {
            steps: Vec::with_capacity(n),
        };

        for i in 0..n {
            for percent in progress.advance(i) {
                self.sink.print(&format!("{percent}% "), false);
            }
            let step = calendar.step(i)?;

            self.advance(Transition::PreIteration)?;
            for id in &order {
                self.hook(*id, "pre_iteration", |c, others| {
                    c.pre_iteration(&step, others)
                })?;
            }

            let mut passes = 0;
            let mut converged = false;
            while !converged && passes < settings.n_max_iteration {
                self.advance(Transition::Iteration)?;
                let mut all = true;
                for id in &order {
                    let done = self.hook(*id, "iteration", |c, others| {
                        c.iteration(&step, passes, others)
                    })?;
                    all &= done;
                }
                passes += 1;
                converged = all;
            }
            self.advance(Transition::EndIterations)?;
            tracing::debug!(step = i, passes, converged, "step finished");

            for id in &order {
                self.hook(*id, "post_iteration", |c, others| {
                    c.post_iteration(&step, converged, others)
                })?;
            }
            self.advance(Transition::PostIteration)?;
            summary.steps.push(StepReport { passes, converged });
        }

        self.sink.print(" End", true);
        for id in &order {
            self.hook(*id, "post_simulation", |c, others| c.post_simulation(others))?;
        }
        self.advance(Transition::PostSimulation)?;
        Ok(summary)
    }
}

/// Emits each 10 % threshold once, as soon as a step crosses it.
struct Progress {
    n: usize,
    next: usize,
}

impl Progress {
    fn new(n: usize) -> Self {
        Self { n, next: 10 }
    }

    fn advance(&mut self, time_index: usize) -> Vec<usize> {
        let done = 100 * (time_index + 1);
        let mut crossed = Vec::new();
        while self.next <= 100 && done >= self.next * self.n {
            crossed.push(self.next);
            self.next += 10;
        }
        crossed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bs_core::MemorySink;
    use bs_model::{ComponentCore, Variable};

    struct Plain {
        core: ComponentCore,
    }

    impl Component for Plain {
        fn core(&self) -> &ComponentCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ComponentCore {
            &mut self.core
        }
    }

    fn plain(name: &str) -> Box<dyn Component> {
        let mut core = ComponentCore::new("Plain", name);
        core.add_variable(Variable::new("x", ""));
        Box::new(Plain { core })
    }

    fn project() -> (Project, MemorySink) {
        let sink = MemorySink::new();
        let factory = ComponentFactory::new().with("Plain", plain);
        (Project::new("test", factory).with_sink(sink.clone()), sink)
    }

    #[test]
    fn progress_reports_each_threshold_once() {
        let mut p = Progress::new(4);
        let all: Vec<Vec<usize>> = (0..4).map(|i| p.advance(i)).collect();
        assert_eq!(
            all,
            vec![vec![10, 20], vec![30, 40, 50], vec![60, 70], vec![80, 90, 100]]
        );
    }

    #[test]
    fn new_component_uses_the_factory() {
        let (mut project, _) = project();
        let id = project.new_component("Plain", "a").unwrap();
        assert_eq!(project.component_id("a"), Some(id));
        assert!(project.downcast::<Plain>("a").is_some());
        assert!(matches!(
            project.new_component("Space", "s"),
            Err(SimError::UnknownComponentType { .. })
        ));
        assert_eq!(project.component_list(), &[id]);
    }

    #[test]
    fn del_component_unregisters_but_keeps_the_slot() {
        let (mut project, _) = project();
        let id = project.new_component("Plain", "a").unwrap();
        assert!(project.del_component(id));
        assert!(!project.del_component(id));
        assert!(project.component("a").is_none());
        assert!(project.get(id).is_some());
    }

    #[test]
    fn set_parameter_routes_name_and_reports_unknown_keys() {
        let (mut project, _) = project();
        assert!(project.set_parameter("name", "house").is_empty());
        assert_eq!(project.name(), "house");
        let errors = project.set_parameter("colour", "red");
        assert_eq!(errors, vec!["Error: Project \"house\". Parameter colour does not exist."]);
        assert!(project.set_parameter("n_time_steps", 24_i64).is_empty());
        assert_eq!(project.settings().unwrap().n_time_steps, 24);
    }

    #[test]
    fn check_prints_ok_for_an_empty_project() {
        let (mut project, sink) = project();
        assert!(project.check().is_empty());
        assert_eq!(sink.lines(), vec!["Checking project: test", "ok"]);
    }

    #[test]
    fn check_reports_bad_dates_only_when_relevant() {
        let (mut project, _) = project();
        project.set_parameter("daylight_saving_end_time", "never");
        assert!(project.check().is_empty());
        project.set_parameter("daylight_saving", true);
        let errors = project.check();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("daylight_saving_end_time: never"));
    }

    #[test]
    fn check_reports_runs_past_the_date_range() {
        let (mut project, _) = project();
        assert!(project.set_parameter("time_step", 10_000_000_000_000_i64).is_empty());
        assert!(project.set_parameter("n_time_steps", 2_i64).is_empty());
        let errors = project.check();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("go past the last supported date"));
        assert!(matches!(
            project.dates(),
            Err(SimError::InvalidSettings { .. })
        ));
        assert!(project.simulate().is_err());
        assert_eq!(project.phase(), RunPhase::Idle);
    }

    #[test]
    fn simulate_prints_progress() {
        let (mut project, sink) = project();
        project.set_parameter("n_time_steps", 10_i64);
        project.new_component("Plain", "a").unwrap();
        let summary = project.simulate().unwrap();
        assert_eq!(summary.steps.len(), 10);
        assert!(summary.all_converged());
        assert_eq!(
            sink.lines(),
            vec!["Simulating test: 10% 20% 30% 40% 50% 60% 70% 80% 90% 100%  End"]
        );
        assert_eq!(project.phase(), RunPhase::Idle);
    }

    #[test]
    fn simulate_rejects_invalid_settings() {
        let (mut project, _) = project();
        project.set_parameter("initial_time", "yesterday");
        assert!(matches!(
            project.simulate(),
            Err(SimError::InvalidSettings { .. })
        ));
        assert_eq!(project.phase(), RunPhase::Idle);
    }
}

//! Test components shared by the integration suites.
#![allow(dead_code)]

use bs_core::MemorySink;
use bs_model::{
    Component, ComponentCore, ComponentFactory, Components, ModelResult, Parameter, StepInfo,
    Variable,
};
use bs_sim::Project;

/// Generic node: references other components, converges after a configurable
/// number of passes and records what it saw.
pub struct Node {
    pub core: ComponentCore,
    pub passes_seen: Vec<usize>,
    pub post_simulation_calls: usize,
}

impl Component for Node {
    fn core(&self) -> &ComponentCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn pre_iteration(&mut self, step: &StepInfo, others: &Components<'_>) -> ModelResult<()> {
        self.core.copy_shadow_values(step.time_index, others)?;
        let x = 10.0 * step.time_index as f64;
        self.core.variable_mut("x")?.set(step.time_index, x)?;
        Ok(())
    }

    fn iteration(&mut self, step: &StepInfo, iteration: usize, _: &Components<'_>) -> ModelResult<bool> {
        let pass = iteration + 1;
        if self.passes_seen.len() <= step.time_index {
            self.passes_seen.push(0);
        }
        self.passes_seen[step.time_index] = pass;
        let converge_at = self.core.integer("converge_at")?;
        Ok(converge_at > 0 && pass as i64 >= converge_at)
    }

    fn post_iteration(
        &mut self,
        step: &StepInfo,
        _converged: bool,
        _: &Components<'_>,
    ) -> ModelResult<()> {
        let flag = if step.daylight_saving { 1.0 } else { 0.0 };
        self.core.variable_mut("dst")?.set(step.time_index, flag)?;
        Ok(())
    }

    fn post_simulation(&mut self, _: &Components<'_>) -> ModelResult<()> {
        self.post_simulation_calls += 1;
        Ok(())
    }
}

pub fn node(type_name: &str, name: &str) -> Box<dyn Component> {
    let mut core = ComponentCore::new(type_name, name);
    core.add_parameter(Parameter::component_list("refs", &[], &[]));
    core.add_parameter(Parameter::variable("input", "not_defined"));
    core.add_parameter(Parameter::integer("converge_at", 1, ""));
    core.add_variable(Variable::new("x", "m"));
    core.add_variable(Variable::new("dst", ""));
    Box::new(Node {
        core,
        passes_seen: Vec::new(),
        post_simulation_calls: 0,
    })
}

fn space(name: &str) -> Box<dyn Component> {
    node("Space", name)
}

fn opening(name: &str) -> Box<dyn Component> {
    node("Opening", name)
}

fn widget(name: &str) -> Box<dyn Component> {
    node("Widget", name)
}

/// Needs a bound `target` in every pass.
pub struct Needy {
    core: ComponentCore,
}

impl Component for Needy {
    fn core(&self) -> &ComponentCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn iteration(&mut self, _: &StepInfo, _: usize, others: &Components<'_>) -> ModelResult<bool> {
        let target = self.core.component_ref("target")?;
        others.get(target)?;
        Ok(true)
    }
}

fn needy(name: &str) -> Box<dyn Component> {
    let mut core = ComponentCore::new("Needy", name);
    core.add_parameter(Parameter::component("target", "not_defined", &[]));
    Box::new(Needy { core })
}

pub fn factory() -> ComponentFactory {
    ComponentFactory::new()
        .with("Space", space)
        .with("Opening", opening)
        .with("Widget", widget)
        .with("Needy", needy)
}

pub fn project(n_time_steps: i64) -> (Project, MemorySink) {
    let sink = MemorySink::new();
    let mut project = Project::new("test", factory()).with_sink(sink.clone());
    assert!(project.set_parameter("n_time_steps", n_time_steps).is_empty());
    (project, sink)
}

pub fn set_refs(project: &mut Project, name: &str, refs: &[&str]) {
    let errors = project
        .component_mut(name)
        .unwrap()
        .core_mut()
        .set_parameter("refs", refs.to_vec());
    assert!(errors.is_empty(), "{errors:?}");
}

//! Applying definitions to projects and exporting projects as definitions.

use bs_model::{Component, ParamValue};
use bs_sim::{Project, SimError};

use crate::schema::{ComponentDef, ProjectDef};

/// Load `def` into `project`, then check the project.
///
/// Globals are applied first, then every component is created through the
/// project's factory (named `<type>_X` when the entry has no name) and its
/// parameters are set. Problems found while loading are printed through the
/// project's sink and do not stop the load. Returns the errors of the final
/// `Project::check`.
pub fn read_definition(project: &mut Project, def: &ProjectDef) -> Vec<String> {
    let mut problems = Vec::new();
    for (key, value) in &def.parameters {
        problems.extend(project.set_parameter(key, value.clone()));
    }
    for component in &def.components {
        problems.extend(load_component(project, component));
    }
    for problem in &problems {
        project.print(problem, true);
    }
    project.print("Reading completed.", true);
    project.check()
}

fn load_component(project: &mut Project, def: &ComponentDef) -> Vec<String> {
    let Some(type_name) = def.type_name.as_deref() else {
        return vec![format!(
            "{}Component does not contain \"type\" parameter {}",
            project.error_header(),
            def.name.as_deref().unwrap_or("(unnamed)")
        )];
    };
    let name = def
        .name
        .clone()
        .unwrap_or_else(|| format!("{type_name}_X"));
    match project.new_component(type_name, &name) {
        Ok(id) => match project.get_mut(id) {
            Some(component) => component.core_mut().set_parameters(&def.parameters),
            None => Vec::new(),
        },
        Err(SimError::UnknownComponentType { type_name }) => vec![format!(
            "{}Component type {type_name} does not exist.",
            project.error_header()
        )],
        Err(other) => vec![format!("{}{other}", project.error_header())],
    }
}

/// Export globals and every registered component, in registration order.
pub fn write_definition(project: &Project) -> ProjectDef {
    let mut parameters = project
        .parameters()
        .iter()
        .map(|p| (p.name().to_string(), p.value()))
        .collect::<std::collections::BTreeMap<_, _>>();
    parameters.insert("name".into(), ParamValue::from(project.name()));
    parameters.insert("description".into(), ParamValue::from(project.description()));

    let components = project
        .component_list()
        .iter()
        .filter_map(|id| project.get(*id))
        .map(component_def)
        .collect();

    ProjectDef {
        parameters,
        components,
    }
}

fn component_def(component: &(dyn Component + 'static)) -> ComponentDef {
    let core = component.core();
    let mut parameters: std::collections::BTreeMap<String, ParamValue> = core
        .parameters()
        .iter()
        .map(|p| (p.name().to_string(), p.value()))
        .collect();
    parameters.insert("description".into(), ParamValue::from(core.description()));
    ComponentDef {
        type_name: Some(core.type_name().to_string()),
        name: Some(core.name().to_string()),
        parameters,
    }
}

//! The `Component` trait and the state every component type embeds.
//!
//! A component type is a struct holding a [`ComponentCore`] plus whatever
//! it caches between hooks. The trait supplies the generic behavior
//! (parameter checking, shadow variables, buffer allocation); types override
//! the hooks they need and usually call back into the core first.

use core::any::Any;
use std::collections::BTreeMap;

use bs_core::{CompId, Real};
use chrono::NaiveDateTime;

use crate::arena::Components;
use crate::error::{ModelError, ModelResult};
use crate::parameter::{ParamKind, Parameter};
use crate::parameter_set::ParameterSet;
use crate::reference::{NOT_DEFINED, Resolver, VarBinding};
use crate::value::ParamValue;
use crate::variable::{Variable, VariableSet};

const DEFAULT_DESCRIPTION: &str = "Description of the component";

/// Per-step context handed to the step hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInfo {
    pub time_index: usize,
    /// Interval-centered timestamp of the step.
    pub date: NaiveDateTime,
    pub daylight_saving: bool,
    /// Step length in seconds.
    pub delta_t: Real,
}

/// Upcast helper so `dyn Component` can be downcast to its concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Identity, parameters and variables shared by every component type.
#[derive(Debug, Clone)]
pub struct ComponentCore {
    id: Option<CompId>,
    name: String,
    type_name: String,
    description: String,
    parameters: ParameterSet,
    variables: VariableSet,
    shadows: Vec<String>,
}

impl ComponentCore {
    pub fn new(type_name: &str, name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            type_name: type_name.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            parameters: ParameterSet::new(),
            variables: VariableSet::new(),
            shadows: Vec::new(),
        }
    }

    /// Record the arena slot. Called by the arena on insertion.
    pub fn attach(&mut self, id: CompId) {
        self.id = Some(id);
    }

    pub fn id(&self) -> Option<CompId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    // ---- parameters ----

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.insert(parameter);
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> ModelResult<&Parameter> {
        self.parameters
            .get(name)
            .ok_or_else(|| ModelError::ParameterNotFound {
                component: self.name.clone(),
                parameter: name.to_string(),
            })
    }

    pub fn parameter_mut(&mut self, name: &str) -> ModelResult<&mut Parameter> {
        let component = &self.name;
        self.parameters
            .get_mut(name)
            .ok_or_else(|| ModelError::ParameterNotFound {
                component: component.clone(),
                parameter: name.to_string(),
            })
    }

    /// Assign one parameter. An unknown name is reported like a bad value.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<ParamValue>) -> Vec<String> {
        match self.parameters.get_mut(name) {
            Some(p) => p.set(&self.name, value),
            None => vec![unknown_parameter(&self.name, name)],
        }
    }

    /// Bulk-apply definition values.
    ///
    /// `type` must equal the component's type, `name` and `description` set
    /// the core fields, every other key must name a parameter.
    pub fn set_parameters(&mut self, values: &BTreeMap<String, ParamValue>) -> Vec<String> {
        let mut errors = Vec::new();
        for (key, value) in values {
            match key.as_str() {
                "type" => {
                    if value.as_str() != Some(self.type_name.as_str()) {
                        errors.push(format!(
                            "Error: {}, type '{value}' does not match the component type '{}'.",
                            self.name, self.type_name
                        ));
                    }
                }
                "name" => match value.as_str() {
                    Some(name) => self.name = name.to_string(),
                    None => errors.push(format!(
                        "Error: {}, name must be text, got '{value}'.",
                        self.name
                    )),
                },
                "description" => match value.as_str() {
                    Some(text) => self.description = text.to_string(),
                    None => errors.push(format!(
                        "Error: {}, description must be text, got '{value}'.",
                        self.name
                    )),
                },
                _ => errors.extend(self.set_parameter(key, value.clone())),
            }
        }
        errors
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: &'static str,
        read: impl FnOnce(&'a Parameter) -> Option<T>,
    ) -> ModelResult<T> {
        let parameter = self.parameter(name)?;
        read(parameter).ok_or_else(|| ModelError::ParameterType {
            component: self.name.clone(),
            parameter: name.to_string(),
            expected,
        })
    }

    pub fn float(&self, name: &str) -> ModelResult<Real> {
        self.typed(name, "float", Parameter::as_f64)
    }

    pub fn integer(&self, name: &str) -> ModelResult<i64> {
        self.typed(name, "integer", Parameter::as_i64)
    }

    pub fn boolean(&self, name: &str) -> ModelResult<bool> {
        self.typed(name, "boolean", Parameter::as_bool)
    }

    pub fn text(&self, name: &str) -> ModelResult<&str> {
        self.typed(name, "text", Parameter::as_str)
    }

    pub fn float_list(&self, name: &str) -> ModelResult<Vec<Real>> {
        self.typed(name, "float list", Parameter::as_f64_list)
    }

    pub fn text_list(&self, name: &str) -> ModelResult<Vec<&str>> {
        self.typed(name, "text list", Parameter::as_str_list)
    }

    /// Whether a reference parameter names a target other than `not_defined`.
    pub fn is_defined(&self, name: &str) -> bool {
        self.parameters
            .get(name)
            .and_then(Parameter::as_str)
            .is_some_and(|target| target != NOT_DEFINED)
    }

    /// Bound component of a component reference, failing when unbound.
    pub fn component_ref(&self, name: &str) -> ModelResult<CompId> {
        self.optional_component_ref(name)?
            .ok_or_else(|| self.unresolved(name))
    }

    /// Bound component of a component reference, `None` when unbound.
    pub fn optional_component_ref(&self, name: &str) -> ModelResult<Option<CompId>> {
        match self.parameter(name)?.kind() {
            ParamKind::ComponentRef(r) => Ok(r.binding()),
            _ => Err(self.wrong_kind(name, "component reference")),
        }
    }

    /// Bound components of a component reference list; every element must be bound.
    pub fn component_refs(&self, name: &str) -> ModelResult<Vec<CompId>> {
        match self.parameter(name)?.kind() {
            ParamKind::ComponentRefList(r) => r
                .bindings()
                .iter()
                .map(|b| b.ok_or_else(|| self.unresolved(name)))
                .collect(),
            _ => Err(self.wrong_kind(name, "component reference list")),
        }
    }

    /// Binding of a variable reference, failing when unbound.
    pub fn variable_ref(&self, name: &str) -> ModelResult<&VarBinding> {
        match self.parameter(name)?.kind() {
            ParamKind::VariableRef(r) => r.binding().ok_or_else(|| self.unresolved(name)),
            _ => Err(self.wrong_kind(name, "variable reference")),
        }
    }

    /// Bindings of a variable reference list; every element must be bound.
    pub fn variable_refs(&self, name: &str) -> ModelResult<Vec<&VarBinding>> {
        match self.parameter(name)?.kind() {
            ParamKind::VariableRefList(r) => r
                .bindings()
                .iter()
                .map(|b| b.as_ref().ok_or_else(|| self.unresolved(name)))
                .collect(),
            _ => Err(self.wrong_kind(name, "variable reference list")),
        }
    }

    fn unresolved(&self, name: &str) -> ModelError {
        ModelError::UnresolvedReference {
            component: self.name.clone(),
            parameter: name.to_string(),
        }
    }

    fn wrong_kind(&self, name: &str, expected: &'static str) -> ModelError {
        ModelError::ParameterType {
            component: self.name.clone(),
            parameter: name.to_string(),
            expected,
        }
    }

    // ---- variables ----

    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.add(variable);
    }

    pub fn variable(&self, key: &str) -> ModelResult<&Variable> {
        self.variables
            .get(key)
            .ok_or_else(|| ModelError::VariableNotFound {
                component: self.name.clone(),
                variable: key.to_string(),
            })
    }

    pub fn variable_mut(&mut self, key: &str) -> ModelResult<&mut Variable> {
        let component = &self.name;
        self.variables
            .get_mut(key)
            .ok_or_else(|| ModelError::VariableNotFound {
                component: component.clone(),
                variable: key.to_string(),
            })
    }

    /// Every variable, in creation order.
    pub fn variable_dict(&self) -> &VariableSet {
        &self.variables
    }

    // ---- generic lifecycle ----

    /// Validate every parameter, resolve references and rebuild the shadow
    /// variables of resolved variable references.
    pub fn check(&mut self, resolver: &dyn Resolver) -> Vec<String> {
        for key in self.shadows.drain(..) {
            self.variables.remove(&key);
        }
        let mut errors = Vec::new();
        for parameter in self.parameters.iter_mut() {
            errors.extend(parameter.check(&self.name, resolver));
        }
        for parameter in self.parameters.iter() {
            for binding in parameter.variable_bindings() {
                if self.id == Some(binding.component) && binding.key == binding.symbol {
                    continue;
                }
                if self.variables.contains(&binding.symbol) {
                    errors.push(format!(
                        "Error: {}, parameter '{}': symbol '{}' is already a variable of the component.",
                        self.name,
                        parameter.name(),
                        binding.symbol
                    ));
                    continue;
                }
                self.variables
                    .add(Variable::new(&binding.symbol, &binding.unit));
                self.shadows.push(binding.symbol.clone());
            }
        }
        errors
    }

    /// Components bound by any reference parameter, in parameter order.
    pub fn referenced_components(&self) -> Vec<CompId> {
        self.parameters
            .iter()
            .flat_map(Parameter::referenced_components)
            .collect()
    }

    /// Size every variable buffer to `n_time_steps` zeros.
    pub fn initialise_variables(&mut self, n_time_steps: usize) {
        for variable in self.variables.iter_mut() {
            variable.initialise(n_time_steps);
        }
    }

    /// Copy the referenced values at `time_index` into the shadow variables.
    pub fn copy_shadow_values(
        &mut self,
        time_index: usize,
        others: &Components<'_>,
    ) -> ModelResult<()> {
        for parameter in self.parameters.iter() {
            for binding in parameter.variable_bindings() {
                if !self.shadows.contains(&binding.symbol) {
                    continue;
                }
                let value = if self.id == Some(binding.component) {
                    let source =
                        self.variables
                            .get(&binding.key)
                            .ok_or_else(|| ModelError::VariableNotFound {
                                component: self.name.clone(),
                                variable: binding.key.clone(),
                            })?;
                    source.value(time_index)?
                } else {
                    others.variable_value(binding.component, &binding.key, time_index)?
                };
                if let Some(shadow) = self.variables.get_mut(&binding.symbol) {
                    shadow.set(time_index, value)?;
                }
            }
        }
        Ok(())
    }
}

fn unknown_parameter(owner: &str, name: &str) -> String {
    format!("Error: {owner}, parameter '{name}' does not exist.")
}

/// A simulated building element.
///
/// Hooks run in the project's execution order. Each hook gets the other
/// components through a read-only [`Components`] view; the running
/// component's own slot is vacated for the duration of the call.
pub trait Component: AsAny {
    fn core(&self) -> &ComponentCore;

    fn core_mut(&mut self) -> &mut ComponentCore;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn type_name(&self) -> &str {
        self.core().type_name()
    }

    /// Validate the definition. Problems are returned, never raised.
    fn check(&mut self, resolver: &dyn Resolver) -> Vec<String> {
        self.core_mut().check(resolver)
    }

    fn pre_simulation(
        &mut self,
        n_time_steps: usize,
        _delta_t: Real,
        _others: &Components<'_>,
    ) -> ModelResult<()> {
        self.core_mut().initialise_variables(n_time_steps);
        Ok(())
    }

    fn pre_iteration(&mut self, step: &StepInfo, others: &Components<'_>) -> ModelResult<()> {
        self.core_mut().copy_shadow_values(step.time_index, others)
    }

    /// One pass of the step. Returns whether this component has converged.
    fn iteration(
        &mut self,
        _step: &StepInfo,
        _iteration: usize,
        _others: &Components<'_>,
    ) -> ModelResult<bool> {
        Ok(true)
    }

    fn post_iteration(
        &mut self,
        _step: &StepInfo,
        _converged: bool,
        _others: &Components<'_>,
    ) -> ModelResult<()> {
        Ok(())
    }

    fn post_simulation(&mut self, _others: &Components<'_>) -> ModelResult<()> {
        Ok(())
    }
}

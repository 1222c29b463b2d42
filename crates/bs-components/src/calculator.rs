//! Linear combination of variables of other components.

use bs_core::{Real, Tolerances, nearly_equal};
use bs_model::{
    Component, ComponentCore, Components, ModelResult, Parameter, Resolver, StepInfo, Variable,
};

use crate::common::length_mismatch;

pub const TYPE: &str = "Calculator";

/// `output = constant + Σ coefficients[i] * input_variables[i]`.
///
/// Inputs are read from their owners on every pass, so values produced
/// earlier in the same pass are used at once. The calculator reports
/// convergence once its output stops changing between passes.
#[derive(Debug, Clone)]
pub struct Calculator {
    core: ComponentCore,
    last_pass: Option<Real>,
    tolerances: Tolerances,
}

impl Calculator {
    pub fn new(name: &str) -> Self {
        let mut core = ComponentCore::new(TYPE, name);
        core.add_parameter(Parameter::variable_list("input_variables", &[]));
        core.add_parameter(Parameter::float_list("coefficients", &[], ""));
        core.add_parameter(Parameter::float("constant", 0.0, ""));
        core.add_parameter(Parameter::text("output_unit", ""));
        core.add_variable(Variable::new("output", ""));
        Self {
            core,
            last_pass: None,
            tolerances: Tolerances::default(),
        }
    }

    pub fn boxed(name: &str) -> Box<dyn Component> {
        Box::new(Self::new(name))
    }

    fn evaluate(&self, time_index: usize, others: &Components<'_>) -> ModelResult<Real> {
        let coefficients = self.core.float_list("coefficients")?;
        let mut sum = self.core.float("constant")?;
        for (binding, coefficient) in self
            .core
            .variable_refs("input_variables")?
            .into_iter()
            .zip(coefficients)
        {
            let value = if self.core.id() == Some(binding.component) {
                self.core.variable(&binding.key)?.value(time_index)?
            } else {
                others.variable_value(binding.component, &binding.key, time_index)?
            };
            sum += coefficient * value;
        }
        Ok(sum)
    }
}

impl Component for Calculator {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn check(&mut self, resolver: &dyn Resolver) -> Vec<String> {
        let unit = self.core.text("output_unit").unwrap_or_default().to_string();
        if self.core.variable("output").map(|v| v.unit() != unit).unwrap_or(true) {
            self.core.add_variable(Variable::new("output", &unit));
        }
        let mut errors = self.core.check(resolver);
        let inputs = self
            .core
            .text_list("input_variables")
            .map(|v| v.len())
            .unwrap_or_default();
        let coefficients = self
            .core
            .float_list("coefficients")
            .map(|c| c.len())
            .unwrap_or_default();
        if inputs != coefficients {
            errors.push(length_mismatch(
                &self.core,
                "coefficients",
                coefficients,
                &inputs.to_string(),
            ));
        }
        errors
    }

    fn pre_iteration(&mut self, step: &StepInfo, others: &Components<'_>) -> ModelResult<()> {
        self.last_pass = None;
        self.core.copy_shadow_values(step.time_index, others)
    }

    fn iteration(
        &mut self,
        step: &StepInfo,
        _iteration: usize,
        others: &Components<'_>,
    ) -> ModelResult<bool> {
        let value = self.evaluate(step.time_index, others)?;
        self.core
            .variable_mut("output")?
            .set(step.time_index, value)?;
        let converged = self
            .last_pass
            .is_some_and(|last| nearly_equal(last, value, self.tolerances));
        self.last_pass = Some(value);
        Ok(converged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_reports_coefficient_mismatch_and_sets_output_unit() {
        struct Empty;
        impl Resolver for Empty {
            fn find_component(&self, _: &str) -> Option<bs_model::ResolvedComponent<'_>> {
                None
            }
            fn find_variable(&self, _: bs_core::CompId, _: &str) -> Option<&str> {
                None
            }
        }

        let mut calc = Calculator::new("calc");
        calc.core_mut().set_parameter("coefficients", vec![1.0]);
        calc.core_mut().set_parameter("output_unit", "W");
        let errors = calc.check(&Empty);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'coefficients' has 1 elements, expected 0"));
        assert_eq!(calc.core().variable("output").unwrap().unit(), "W");
    }

    #[test]
    fn constant_only_converges_on_the_second_pass() {
        let mut calc = Calculator::new("calc");
        calc.core_mut().set_parameter("constant", 4.5);
        let others = Components::detached();
        calc.pre_simulation(1, 3600.0, &others).unwrap();
        let step = StepInfo {
            time_index: 0,
            date: chrono::NaiveDateTime::default(),
            daylight_saving: false,
            delta_t: 3600.0,
        };
        calc.pre_iteration(&step, &others).unwrap();
        assert!(!calc.iteration(&step, 0, &others).unwrap());
        assert!(calc.iteration(&step, 1, &others).unwrap());
        assert_eq!(calc.core().variable("output").unwrap().values(), &[4.5]);
    }
}

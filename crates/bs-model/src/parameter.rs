//! Typed, validated component parameters.
//!
//! The set of parameter kinds is closed: scalars, homogeneous lists, and the
//! four reference kinds. `set` validates the value kind, `check` validates
//! constraints and resolves references. Both report problems as strings.

use bs_core::{CompId, ensure_finite};

use crate::reference::{
    ComponentRef, ComponentRefList, Resolver, VarBinding, VariableRef, VariableRefList,
};
use crate::value::ParamValue;

/// Floats in `I64_LOW..I64_HIGH` convert to `i64` without saturating.
const I64_LOW: f64 = i64::MIN as f64;
const I64_HIGH: f64 = i64::MAX as f64;

pub(crate) fn error_header(owner: &str, param: &str) -> String {
    format!("Error: {owner}, parameter '{param}'")
}

/// Kind of a scalar value or of every element of a list.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarKind {
    Boolean,
    Integer,
    Float,
    Text,
    /// Text restricted to a fixed set of options.
    Options(Vec<String>),
}

impl ScalarKind {
    fn name(&self) -> &'static str {
        match self {
            ScalarKind::Boolean => "boolean",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Text => "text",
            ScalarKind::Options(_) => "option",
        }
    }

    /// Convert `value` to this kind. Integers are accepted for floats and
    /// integral floats for integers.
    fn coerce(&self, value: &ParamValue) -> Result<ParamValue, String> {
        let mismatch = || {
            format!(
                "{} value '{value}' is not a valid {}",
                value.kind_name(),
                self.name()
            )
        };
        match (self, value) {
            (ScalarKind::Boolean, ParamValue::Boolean(_)) => Ok(value.clone()),
            (ScalarKind::Integer, ParamValue::Integer(_)) => Ok(value.clone()),
            (ScalarKind::Integer, ParamValue::Float(v))
                if v.fract() == 0.0 && (I64_LOW..I64_HIGH).contains(v) =>
            {
                Ok(ParamValue::Integer(*v as i64))
            }
            (ScalarKind::Float, ParamValue::Float(v)) => ensure_finite(*v, "float parameter")
                .map(ParamValue::Float)
                .map_err(|e| e.to_string()),
            (ScalarKind::Float, ParamValue::Integer(v)) => Ok(ParamValue::Float(*v as f64)),
            (ScalarKind::Text | ScalarKind::Options(_), ParamValue::Text(_)) => Ok(value.clone()),
            _ => Err(mismatch()),
        }
    }

    fn validate(&self, value: &ParamValue, bounds: &Bounds) -> Option<String> {
        if let ScalarKind::Options(options) = self {
            let text = value.as_str().unwrap_or_default();
            if !options.iter().any(|o| o == text) {
                return Some(format!(
                    "'{text}' is not one of the options [{}]",
                    options.join(", ")
                ));
            }
            return None;
        }
        bounds.validate(value.as_f64()?)
    }
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    fn validate(&self, v: f64) -> Option<String> {
        if let Some(min) = self.min {
            if v < min {
                return Some(format!("{v} is less than the minimum {min}"));
            }
        }
        if let Some(max) = self.max {
            if v > max {
                return Some(format!("{v} is greater than the maximum {max}"));
            }
        }
        None
    }
}

/// Single scalar value.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarParam {
    pub(crate) kind: ScalarKind,
    pub(crate) value: ParamValue,
    pub(crate) bounds: Bounds,
}

/// Homogeneous list of scalar values; bounds apply to every element.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParam {
    pub(crate) kind: ScalarKind,
    pub(crate) values: Vec<ParamValue>,
    pub(crate) bounds: Bounds,
}

/// The closed set of parameter variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Scalar(ScalarParam),
    List(ListParam),
    ComponentRef(ComponentRef),
    ComponentRefList(ComponentRefList),
    VariableRef(VariableRef),
    VariableRefList(VariableRefList),
}

/// A named, unit-tagged parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    unit: String,
    kind: ParamKind,
}

impl Parameter {
    fn scalar(name: &str, kind: ScalarKind, value: ParamValue, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            kind: ParamKind::Scalar(ScalarParam {
                kind,
                value,
                bounds: Bounds::default(),
            }),
        }
    }

    fn list(name: &str, kind: ScalarKind, values: Vec<ParamValue>, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            kind: ParamKind::List(ListParam {
                kind,
                values,
                bounds: Bounds::default(),
            }),
        }
    }

    pub fn boolean(name: &str, value: bool) -> Self {
        Self::scalar(name, ScalarKind::Boolean, value.into(), "")
    }

    pub fn integer(name: &str, value: i64, unit: &str) -> Self {
        Self::scalar(name, ScalarKind::Integer, value.into(), unit)
    }

    pub fn float(name: &str, value: f64, unit: &str) -> Self {
        Self::scalar(name, ScalarKind::Float, value.into(), unit)
    }

    pub fn text(name: &str, value: &str) -> Self {
        Self::scalar(name, ScalarKind::Text, value.into(), "")
    }

    pub fn options(name: &str, value: &str, options: &[&str]) -> Self {
        let options = options.iter().map(|o| o.to_string()).collect();
        Self::scalar(name, ScalarKind::Options(options), value.into(), "")
    }

    pub fn float_list(name: &str, values: &[f64], unit: &str) -> Self {
        let values = values.iter().map(|v| ParamValue::Float(*v)).collect();
        Self::list(name, ScalarKind::Float, values, unit)
    }

    pub fn text_list(name: &str, values: &[&str]) -> Self {
        let values = values.iter().map(|v| ParamValue::from(*v)).collect();
        Self::list(name, ScalarKind::Text, values, "")
    }

    /// Reference to one component whose type is in `allowed_types`
    /// (an empty set allows any type).
    pub fn component(name: &str, target: &str, allowed_types: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            unit: String::new(),
            kind: ParamKind::ComponentRef(ComponentRef {
                target: target.to_string(),
                allowed_types: allowed_types.iter().map(|t| t.to_string()).collect(),
                binding: None,
            }),
        }
    }

    pub fn component_list(name: &str, targets: &[&str], allowed_types: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            unit: String::new(),
            kind: ParamKind::ComponentRefList(ComponentRefList {
                targets: targets.iter().map(|t| t.to_string()).collect(),
                allowed_types: allowed_types.iter().map(|t| t.to_string()).collect(),
                bindings: vec![None; targets.len()],
            }),
        }
    }

    /// Reference to a variable, written `"symbol = component.variable"`.
    pub fn variable(name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: String::new(),
            kind: ParamKind::VariableRef(VariableRef {
                target: target.to_string(),
                binding: None,
            }),
        }
    }

    pub fn variable_list(name: &str, targets: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            unit: String::new(),
            kind: ParamKind::VariableRefList(VariableRefList {
                targets: targets.iter().map(|t| t.to_string()).collect(),
                bindings: vec![None; targets.len()],
            }),
        }
    }

    /// Set the inclusive lower bound (scalar and list parameters only).
    pub fn with_min(mut self, min: f64) -> Self {
        if let Some(bounds) = self.bounds_mut() {
            bounds.min = Some(min);
        }
        self
    }

    /// Set the inclusive upper bound (scalar and list parameters only).
    pub fn with_max(mut self, max: f64) -> Self {
        if let Some(bounds) = self.bounds_mut() {
            bounds.max = Some(max);
        }
        self
    }

    fn bounds_mut(&mut self) -> Option<&mut Bounds> {
        match &mut self.kind {
            ParamKind::Scalar(p) => Some(&mut p.bounds),
            ParamKind::List(p) => Some(&mut p.bounds),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// Whether this is one of the four reference kinds.
    pub fn is_reference(&self) -> bool {
        !matches!(self.kind, ParamKind::Scalar(_) | ParamKind::List(_))
    }

    /// Current value in definition form. References export their names.
    pub fn value(&self) -> ParamValue {
        match &self.kind {
            ParamKind::Scalar(p) => p.value.clone(),
            ParamKind::List(p) => ParamValue::List(p.values.clone()),
            ParamKind::ComponentRef(r) => ParamValue::Text(r.target.clone()),
            ParamKind::ComponentRefList(r) => text_list_value(&r.targets),
            ParamKind::VariableRef(r) => ParamValue::Text(r.target.clone()),
            ParamKind::VariableRefList(r) => text_list_value(&r.targets),
        }
    }

    /// Assign a new value.
    ///
    /// A value of the wrong kind is rejected and the parameter keeps its
    /// previous value. A value of the right kind that violates bounds or
    /// options is stored and reported; `check()` keeps reporting it.
    /// Assigning a reference clears its binding.
    pub fn set(&mut self, owner: &str, value: impl Into<ParamValue>) -> Vec<String> {
        let value = value.into();
        let header = error_header(owner, &self.name);
        match &mut self.kind {
            ParamKind::Scalar(p) => match p.kind.coerce(&value) {
                Ok(v) => {
                    let violation = p.kind.validate(&v, &p.bounds);
                    p.value = v;
                    violation
                        .map(|msg| vec![format!("{header}: {msg}.")])
                        .unwrap_or_default()
                }
                Err(msg) => vec![format!("{header}: {msg}.")],
            },
            ParamKind::List(p) => {
                let items = match value.as_list() {
                    Some(items) => items,
                    None => {
                        return vec![format!(
                            "{header}: {} value '{value}' is not a list.",
                            value.kind_name()
                        )];
                    }
                };
                let mut coerced = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match p.kind.coerce(item) {
                        Ok(v) => coerced.push(v),
                        Err(msg) => return vec![format!("{header}[{i}]: {msg}.")],
                    }
                }
                p.values = coerced;
                validate_list(&header, p)
            }
            ParamKind::ComponentRef(r) => match value {
                ParamValue::Text(target) => {
                    r.target = target;
                    r.binding = None;
                    Vec::new()
                }
                other => vec![reference_mismatch(&header, &other)],
            },
            ParamKind::ComponentRefList(r) => match text_items(&value) {
                Some(targets) => {
                    r.bindings = vec![None; targets.len()];
                    r.targets = targets;
                    Vec::new()
                }
                None => vec![reference_mismatch(&header, &value)],
            },
            ParamKind::VariableRef(r) => match value {
                ParamValue::Text(target) => {
                    r.target = target;
                    r.binding = None;
                    Vec::new()
                }
                other => vec![reference_mismatch(&header, &other)],
            },
            ParamKind::VariableRefList(r) => match text_items(&value) {
                Some(targets) => {
                    r.bindings = vec![None; targets.len()];
                    r.targets = targets;
                    Vec::new()
                }
                None => vec![reference_mismatch(&header, &value)],
            },
        }
    }

    /// Validate constraints and resolve references against `resolver`.
    pub fn check(&mut self, owner: &str, resolver: &dyn Resolver) -> Vec<String> {
        let header = error_header(owner, &self.name);
        match &mut self.kind {
            ParamKind::Scalar(p) => p
                .kind
                .validate(&p.value, &p.bounds)
                .map(|msg| vec![format!("{header}: {msg}.")])
                .unwrap_or_default(),
            ParamKind::List(p) => validate_list(&header, p),
            ParamKind::ComponentRef(r) => r.resolve(owner, &self.name, resolver),
            ParamKind::ComponentRefList(r) => r.resolve(owner, &self.name, resolver),
            ParamKind::VariableRef(r) => r.resolve(owner, &self.name, resolver),
            ParamKind::VariableRefList(r) => r.resolve(owner, &self.name, resolver),
        }
    }

    /// Components bound by this parameter, in element order.
    pub fn referenced_components(&self) -> Vec<CompId> {
        match &self.kind {
            ParamKind::ComponentRef(r) => r.binding.into_iter().collect(),
            ParamKind::ComponentRefList(r) => r.bindings.iter().flatten().copied().collect(),
            ParamKind::VariableRef(r) => r.binding.iter().map(|b| b.component).collect(),
            ParamKind::VariableRefList(r) => {
                r.bindings.iter().flatten().map(|b| b.component).collect()
            }
            ParamKind::Scalar(_) | ParamKind::List(_) => Vec::new(),
        }
    }

    /// Resolved variable bindings, in element order.
    pub fn variable_bindings(&self) -> Vec<&VarBinding> {
        match &self.kind {
            ParamKind::VariableRef(r) => r.binding.iter().collect(),
            ParamKind::VariableRefList(r) => r.bindings.iter().flatten().collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match &self.kind {
            ParamKind::Scalar(p) => p.value.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match &self.kind {
            ParamKind::Scalar(p) => p.value.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.kind {
            ParamKind::Scalar(p) => p.value.as_bool(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ParamKind::Scalar(p) => p.value.as_str(),
            ParamKind::ComponentRef(r) => Some(&r.target),
            ParamKind::VariableRef(r) => Some(&r.target),
            _ => None,
        }
    }

    pub fn as_f64_list(&self) -> Option<Vec<f64>> {
        match &self.kind {
            ParamKind::List(p) => p.values.iter().map(ParamValue::as_f64).collect(),
            _ => None,
        }
    }

    pub fn as_str_list(&self) -> Option<Vec<&str>> {
        match &self.kind {
            ParamKind::List(p) => p.values.iter().map(ParamValue::as_str).collect(),
            ParamKind::ComponentRefList(r) => Some(r.targets.iter().map(String::as_str).collect()),
            ParamKind::VariableRefList(r) => Some(r.targets.iter().map(String::as_str).collect()),
            _ => None,
        }
    }
}

fn validate_list(header: &str, p: &ListParam) -> Vec<String> {
    p.values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            p.kind
                .validate(v, &p.bounds)
                .map(|msg| format!("{header}[{i}]: {msg}."))
        })
        .collect()
}

fn text_list_value(items: &[String]) -> ParamValue {
    ParamValue::List(items.iter().map(|t| ParamValue::Text(t.clone())).collect())
}

fn text_items(value: &ParamValue) -> Option<Vec<String>> {
    value
        .as_list()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn reference_mismatch(header: &str, value: &ParamValue) -> String {
    format!(
        "{header}: {} value '{value}' is not a valid reference.",
        value.kind_name()
    )
}

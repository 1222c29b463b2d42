//! Reference parameters: bindings to other components and their variables.
//!
//! A reference holds the name written in the definition until `check()`
//! resolves it. Resolution binds to an arena id or leaves the binding empty.
//! A failed lookup never panics: it is reported as a message and the binding
//! stays `None`.

use bs_core::CompId;

use crate::parameter::error_header;

/// Marks a reference that is intentionally left empty.
pub const NOT_DEFINED: &str = "not_defined";

/// A registered component found by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedComponent<'a> {
    pub id: CompId,
    pub type_name: &'a str,
}

/// Name lookup used while checking parameters.
pub trait Resolver {
    /// Find a registered component by name.
    fn find_component(&self, name: &str) -> Option<ResolvedComponent<'_>>;

    /// Unit of variable `key` on component `id`, if that variable exists.
    fn find_variable(&self, id: CompId, key: &str) -> Option<&str>;
}

/// A resolved variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBinding {
    /// Component owning the referenced variable.
    pub component: CompId,
    /// Key of the referenced variable on that component.
    pub key: String,
    /// Key of the shadow variable on the referencing component.
    pub symbol: String,
    pub unit: String,
}

/// Parsed `"<symbol> = <component>.<variable>"` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableTarget<'a> {
    pub symbol: &'a str,
    pub component: &'a str,
    pub variable: &'a str,
}

/// Split a variable reference target.
///
/// The `<symbol> =` prefix is optional; without it the symbol is the
/// variable key. The component name may contain dots, the variable key may
/// not.
pub fn parse_variable_target(target: &str) -> Option<VariableTarget<'_>> {
    let (symbol, path) = match target.split_once('=') {
        Some((symbol, path)) => (Some(symbol.trim()), path.trim()),
        None => (None, target.trim()),
    };
    let (component, variable) = path.rsplit_once('.')?;
    let (component, variable) = (component.trim(), variable.trim());
    if component.is_empty() || variable.is_empty() {
        return None;
    }
    let symbol = symbol.unwrap_or(variable);
    if symbol.is_empty() {
        return None;
    }
    Some(VariableTarget {
        symbol,
        component,
        variable,
    })
}

fn resolve_component(
    target: &str,
    allowed_types: &[String],
    resolver: &dyn Resolver,
) -> Result<Option<CompId>, String> {
    if target == NOT_DEFINED {
        return Ok(None);
    }
    let found = resolver
        .find_component(target)
        .ok_or_else(|| format!("component '{target}' not found"))?;
    if !allowed_types.is_empty() && !allowed_types.iter().any(|t| t == found.type_name) {
        return Err(format!(
            "component '{target}' is of type '{}', expected one of [{}]",
            found.type_name,
            allowed_types.join(", ")
        ));
    }
    Ok(Some(found.id))
}

fn resolve_variable(target: &str, resolver: &dyn Resolver) -> Result<Option<VarBinding>, String> {
    if target == NOT_DEFINED {
        return Ok(None);
    }
    let parsed = parse_variable_target(target).ok_or_else(|| {
        format!("'{target}' does not match the format 'symbol = component.variable'")
    })?;
    let found = resolver
        .find_component(parsed.component)
        .ok_or_else(|| format!("component '{}' not found", parsed.component))?;
    let unit = resolver
        .find_variable(found.id, parsed.variable)
        .ok_or_else(|| {
            format!(
                "component '{}' has no variable '{}'",
                parsed.component, parsed.variable
            )
        })?;
    Ok(Some(VarBinding {
        component: found.id,
        key: parsed.variable.to_string(),
        symbol: parsed.symbol.to_string(),
        unit: unit.to_string(),
    }))
}

/// Reference to one component, restricted to a set of types.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRef {
    pub(crate) target: String,
    pub(crate) allowed_types: Vec<String>,
    pub(crate) binding: Option<CompId>,
}

impl ComponentRef {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    pub fn binding(&self) -> Option<CompId> {
        self.binding
    }

    pub(crate) fn resolve(&mut self, owner: &str, param: &str, resolver: &dyn Resolver) -> Vec<String> {
        self.binding = None;
        match resolve_component(&self.target, &self.allowed_types, resolver) {
            Ok(binding) => {
                self.binding = binding;
                Vec::new()
            }
            Err(msg) => vec![format!("{}: {msg}.", error_header(owner, param))],
        }
    }
}

/// Element-wise list of component references sharing one allowed-type set.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRefList {
    pub(crate) targets: Vec<String>,
    pub(crate) allowed_types: Vec<String>,
    pub(crate) bindings: Vec<Option<CompId>>,
}

impl ComponentRefList {
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    pub fn bindings(&self) -> &[Option<CompId>] {
        &self.bindings
    }

    pub(crate) fn resolve(&mut self, owner: &str, param: &str, resolver: &dyn Resolver) -> Vec<String> {
        let mut errors = Vec::new();
        self.bindings = self
            .targets
            .iter()
            .enumerate()
            .map(
                |(i, target)| match resolve_component(target, &self.allowed_types, resolver) {
                    Ok(binding) => binding,
                    Err(msg) => {
                        errors.push(format!("{}[{i}]: {msg}.", error_header(owner, param)));
                        None
                    }
                },
            )
            .collect();
        errors
    }
}

/// Reference to a variable of another component.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRef {
    pub(crate) target: String,
    pub(crate) binding: Option<VarBinding>,
}

impl VariableRef {
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Shadow variable key, available before resolution.
    pub fn symbol(&self) -> Option<&str> {
        parse_variable_target(&self.target).map(|t| t.symbol)
    }

    pub fn binding(&self) -> Option<&VarBinding> {
        self.binding.as_ref()
    }

    pub(crate) fn resolve(&mut self, owner: &str, param: &str, resolver: &dyn Resolver) -> Vec<String> {
        self.binding = None;
        match resolve_variable(&self.target, resolver) {
            Ok(binding) => {
                self.binding = binding;
                Vec::new()
            }
            Err(msg) => vec![format!("{}: {msg}.", error_header(owner, param))],
        }
    }
}

/// Element-wise list of variable references.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRefList {
    pub(crate) targets: Vec<String>,
    pub(crate) bindings: Vec<Option<VarBinding>>,
}

impl VariableRefList {
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn bindings(&self) -> &[Option<VarBinding>] {
        &self.bindings
    }

    pub(crate) fn resolve(&mut self, owner: &str, param: &str, resolver: &dyn Resolver) -> Vec<String> {
        let mut errors = Vec::new();
        self.bindings = self
            .targets
            .iter()
            .enumerate()
            .map(|(i, target)| match resolve_variable(target, resolver) {
                Ok(binding) => binding,
                Err(msg) => {
                    errors.push(format!("{}[{i}]: {msg}.", error_header(owner, param)));
                    None
                }
            })
            .collect();
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_symbol() {
        let t = parse_variable_target("T_ext = meteo.temperature").unwrap();
        assert_eq!(t.symbol, "T_ext");
        assert_eq!(t.component, "meteo");
        assert_eq!(t.variable, "temperature");
    }

    #[test]
    fn parse_without_symbol_uses_variable_key() {
        let t = parse_variable_target("meteo.temperature").unwrap();
        assert_eq!(t.symbol, "temperature");
    }

    #[test]
    fn parse_component_name_with_dots() {
        let t = parse_variable_target("x = zone.1.temperature").unwrap();
        assert_eq!(t.component, "zone.1");
        assert_eq!(t.variable, "temperature");
    }

    #[test]
    fn parse_rejects_malformed_targets() {
        assert!(parse_variable_target("meteo").is_none());
        assert!(parse_variable_target("x = .temperature").is_none());
        assert!(parse_variable_target(" = meteo.temperature").is_none());
    }
}

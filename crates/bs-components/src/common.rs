//! Helpers shared by the component types.

use bs_model::{ComponentCore, ParamKind};

/// Seconds in a day.
pub const DAY_SECONDS: f64 = 86_400.0;

/// Error message for a reference parameter that must name a component.
pub fn require_defined(core: &ComponentCore, parameter: &str) -> Option<String> {
    let defined = match core.parameter(parameter).map(|p| p.kind()) {
        Ok(ParamKind::ComponentRefList(r)) => r
            .targets()
            .iter()
            .all(|t| t != bs_model::NOT_DEFINED),
        Ok(_) => core.is_defined(parameter),
        Err(_) => false,
    };
    (!defined).then(|| {
        format!(
            "Error: {}, parameter '{parameter}' must be defined.",
            core.name()
        )
    })
}

/// Error message for a list parameter whose length is not `expected`.
pub fn length_mismatch(
    core: &ComponentCore,
    parameter: &str,
    len: usize,
    expected: &str,
) -> String {
    format!(
        "Error: {}, parameter '{parameter}' has {len} elements, expected {expected}.",
        core.name()
    )
}

//! Execution ordering.
//!
//! The execution list is derived from scratch whenever it is needed: it
//! depends only on the arena's current bindings, the registry and the type
//! priority list.

use bs_core::CompId;
use bs_model::ComponentArena;

/// Execution list plus any reference cycles met while building it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub order: Vec<CompId>,
    /// Distinct cycles, each rotated to start at its smallest id.
    pub cycles: Vec<Vec<CompId>>,
}

/// Order every component reachable from `registry`.
///
/// 1. Union of each registered component's reference closure, deduplicated
///    in first-discovery order.
/// 2. For each type in `priority`, the collected components of that type in
///    discovery order.
/// 3. The remaining components, in discovery order.
pub fn execution_order(
    arena: &ComponentArena,
    registry: &[CompId],
    priority: &[String],
) -> ExecutionPlan {
    let mut discovered: Vec<CompId> = Vec::new();
    let mut cycles: Vec<Vec<CompId>> = Vec::new();
    for root in registry {
        let closure = arena.referenced_components(*root);
        for id in closure.components {
            if !discovered.contains(&id) {
                discovered.push(id);
            }
        }
        for cycle in closure.cycles {
            let cycle = canonical(cycle);
            if !cycles.contains(&cycle) {
                cycles.push(cycle);
            }
        }
    }

    let type_of = |id: CompId| arena.get(id).map(|c| c.type_name().to_string());
    let mut order = Vec::with_capacity(discovered.len());
    for type_name in priority {
        for id in &discovered {
            if type_of(*id).as_deref() == Some(type_name.as_str()) && !order.contains(id) {
                order.push(*id);
            }
        }
    }
    for id in discovered {
        if !order.contains(&id) {
            order.push(id);
        }
    }
    ExecutionPlan { order, cycles }
}

fn canonical(mut cycle: Vec<CompId>) -> Vec<CompId> {
    if let Some(start) = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(i, _)| i)
    {
        cycle.rotate_left(start);
    }
    cycle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_rotation() {
        let ids: Vec<CompId> = [3, 1, 2].into_iter().map(CompId::from_index).collect();
        let rotated = canonical(ids.clone());
        assert_eq!(rotated, vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn empty_registry_gives_empty_plan() {
        let arena = ComponentArena::new();
        let plan = execution_order(&arena, &[], &["Space".to_string()]);
        assert!(plan.order.is_empty());
        assert!(plan.cycles.is_empty());
    }
}

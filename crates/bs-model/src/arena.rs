//! Component storage, cross-component access and reference traversal.
//!
//! Components live in slots addressed by [`CompId`]. A hook runs against its
//! own component taken out of the arena and a [`Components`] view of the
//! remaining slots, so it can mutate itself and read everyone else.

use core::fmt;

use bs_core::{CompId, Real};

use crate::component::Component;
use crate::error::{ModelError, ModelResult};
use crate::reference::{ResolvedComponent, Resolver};
use crate::variable::Variable;

type Slot = Option<Box<dyn Component>>;

/// Owner of every component of a project.
///
/// Slots are never reused: an id stays valid for the lifetime of the arena.
#[derive(Default)]
pub struct ComponentArena {
    slots: Vec<Slot>,
}

impl fmt::Debug for ComponentArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentArena")
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl ComponentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `component` and stamp it with its new id.
    pub fn insert(&mut self, mut component: Box<dyn Component>) -> CompId {
        let id = CompId::from_index(self.slots.len() as u32);
        component.core_mut().attach(id);
        self.slots.push(Some(component));
        id
    }

    pub fn get(&self, id: CompId) -> Option<&(dyn Component + 'static)> {
        self.slots.get(id.slot())?.as_deref()
    }

    pub fn get_mut(&mut self, id: CompId) -> Option<&mut (dyn Component + 'static)> {
        self.slots.get_mut(id.slot())?.as_deref_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Ids of occupied slots, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = CompId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| CompId::from_index(i as u32))
    }

    /// Read-only view of every slot.
    pub fn view(&self) -> Components<'_> {
        Components { slots: &self.slots }
    }

    /// Run `f` on component `id` with the rest of the arena as a read-only view.
    ///
    /// The component is moved out of its slot for the duration of the call;
    /// lookups of `id` through the view fail with `ComponentUnavailable`.
    pub fn with_component<R>(
        &mut self,
        id: CompId,
        f: impl FnOnce(&mut (dyn Component + 'static), &Components<'_>) -> R,
    ) -> ModelResult<R> {
        let slot = id.slot();
        let mut component = self
            .slots
            .get_mut(slot)
            .and_then(Option::take)
            .ok_or(ModelError::ComponentUnavailable { id })?;
        let out = f(component.as_mut(), &Components { slots: &self.slots });
        self.slots[slot] = Some(component);
        Ok(out)
    }

    /// Every component reachable from `root` through bound references.
    ///
    /// Post-order: a component appears after everything it references, and
    /// `root` is last. Each component appears once. A back edge to a
    /// component still being visited is recorded as a cycle and not
    /// followed. A component referencing itself is not a cycle.
    pub fn referenced_components(&self, root: CompId) -> ReferenceClosure {
        let mut walk = Walk {
            marks: vec![Mark::Unvisited; self.slots.len()],
            path: Vec::new(),
            closure: ReferenceClosure::default(),
        };
        walk.visit(self, root);
        walk.closure
    }
}

/// Result of a reference traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceClosure {
    pub components: Vec<CompId>,
    /// Each cycle as the path from the revisited component back to itself.
    pub cycles: Vec<Vec<CompId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Walk {
    marks: Vec<Mark>,
    path: Vec<CompId>,
    closure: ReferenceClosure,
}

impl Walk {
    fn visit(&mut self, arena: &ComponentArena, id: CompId) {
        match self.marks.get(id.slot()).copied() {
            None | Some(Mark::Done) => return,
            Some(Mark::InProgress) => {
                if let Some(start) = self.path.iter().position(|p| *p == id) {
                    self.closure.cycles.push(self.path[start..].to_vec());
                }
                return;
            }
            Some(Mark::Unvisited) => {}
        }
        self.marks[id.slot()] = Mark::InProgress;
        self.path.push(id);
        if let Some(component) = arena.get(id) {
            for next in component.core().referenced_components() {
                if next != id {
                    self.visit(arena, next);
                }
            }
        }
        self.path.pop();
        self.marks[id.slot()] = Mark::Done;
        self.closure.components.push(id);
    }
}

/// Read-only access to the components not currently running.
#[derive(Clone, Copy)]
pub struct Components<'a> {
    slots: &'a [Slot],
}

impl fmt::Debug for Components<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Components")
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl Components<'static> {
    /// A view with no components, for driving hooks outside a project.
    pub fn detached() -> Self {
        Components { slots: &[] }
    }
}

impl<'a> Components<'a> {
    pub fn get(&self, id: CompId) -> ModelResult<&'a (dyn Component + 'static)> {
        self.slots
            .get(id.slot())
            .and_then(|slot| slot.as_deref())
            .ok_or(ModelError::ComponentUnavailable { id })
    }

    /// Component `id` as its concrete type.
    pub fn downcast<T: Component>(&self, id: CompId) -> ModelResult<&'a T> {
        let component = self.get(id)?;
        component
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| ModelError::WrongComponentType {
                name: component.name().to_string(),
                expected: core::any::type_name::<T>(),
            })
    }

    pub fn variable(&self, id: CompId, key: &str) -> ModelResult<&'a Variable> {
        self.get(id)?.core().variable(key)
    }

    pub fn variable_value(&self, id: CompId, key: &str, time_index: usize) -> ModelResult<Real> {
        Ok(self.variable(id, key)?.value(time_index)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DirectoryEntry {
    id: CompId,
    name: String,
    type_name: String,
    /// (key, unit) of every variable.
    variables: Vec<(String, String)>,
}

impl DirectoryEntry {
    fn of(id: CompId, component: &dyn Component) -> Self {
        let core = component.core();
        Self {
            id,
            name: core.name().to_string(),
            type_name: core.type_name().to_string(),
            variables: core
                .variable_dict()
                .iter()
                .map(|v| (v.key().to_string(), v.unit().to_string()))
                .collect(),
        }
    }
}

/// Snapshot of the registered components used to resolve names during check.
///
/// Checking mutates one component at a time, so name resolution cannot
/// borrow the arena. After a component is checked, [`Directory::refresh`]
/// publishes its new variables (shadows included) to later lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    pub fn new(arena: &ComponentArena, registry: &[CompId]) -> Self {
        let entries = registry
            .iter()
            .filter_map(|id| arena.get(*id).map(|c| DirectoryEntry::of(*id, c)))
            .collect();
        Self { entries }
    }

    pub fn refresh(&mut self, component: &dyn Component) {
        let Some(id) = component.core().id() else {
            return;
        };
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            *entry = DirectoryEntry::of(id, component);
        }
    }
}

impl Resolver for Directory {
    fn find_component(&self, name: &str) -> Option<ResolvedComponent<'_>> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| ResolvedComponent {
                id: e.id,
                type_name: &e.type_name,
            })
    }

    fn find_variable(&self, id: CompId, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)?
            .variables
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, unit)| unit.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentCore;
    use crate::parameter::Parameter;
    use crate::reference::NOT_DEFINED;

    struct Node {
        core: ComponentCore,
    }

    impl Component for Node {
        fn core(&self) -> &ComponentCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ComponentCore {
            &mut self.core
        }
    }

    fn node(name: &str, refs: &[&str]) -> Box<dyn Component> {
        let mut core = ComponentCore::new("Node", name);
        core.add_parameter(Parameter::component_list("next", refs, &[]));
        core.add_variable(Variable::new("x", "m"));
        Box::new(Node { core })
    }

    fn checked(nodes: Vec<Box<dyn Component>>) -> (ComponentArena, Vec<CompId>) {
        let mut arena = ComponentArena::new();
        let ids: Vec<CompId> = nodes.into_iter().map(|n| arena.insert(n)).collect();
        let directory = Directory::new(&arena, &ids);
        for id in &ids {
            let errors = arena.get_mut(*id).unwrap().check(&directory);
            assert!(errors.is_empty(), "{errors:?}");
        }
        (arena, ids)
    }

    #[test]
    fn closure_of_isolated_component_is_itself() {
        let (arena, ids) = checked(vec![node("a", &[])]);
        let closure = arena.referenced_components(ids[0]);
        assert_eq!(closure.components, vec![ids[0]]);
        assert!(closure.cycles.is_empty());
    }

    #[test]
    fn closure_is_post_order_and_deduplicated() {
        // d -> [b, c], b -> [a], c -> [a]
        let (arena, ids) = checked(vec![
            node("a", &[]),
            node("b", &["a"]),
            node("c", &["a"]),
            node("d", &["b", "c"]),
        ]);
        let closure = arena.referenced_components(ids[3]);
        assert_eq!(closure.components, vec![ids[0], ids[1], ids[2], ids[3]]);
    }

    #[test]
    fn cycles_terminate_and_are_reported() {
        let (arena, ids) = checked(vec![node("a", &["b"]), node("b", &["a"])]);
        let closure = arena.referenced_components(ids[0]);
        assert_eq!(closure.components, vec![ids[1], ids[0]]);
        assert_eq!(closure.cycles, vec![vec![ids[0], ids[1]]]);
    }

    #[test]
    fn self_reference_is_not_a_cycle() {
        let (arena, ids) = checked(vec![node("a", &["a", NOT_DEFINED])]);
        let closure = arena.referenced_components(ids[0]);
        assert_eq!(closure.components, vec![ids[0]]);
        assert!(closure.cycles.is_empty());
    }

    #[test]
    fn vacated_slot_is_unavailable_inside_with_component() {
        let (mut arena, ids) = checked(vec![node("a", &[]), node("b", &[])]);
        let (own, other) = arena
            .with_component(ids[0], |component, others| {
                component.core_mut().set_description("visited");
                (
                    others.get(ids[0]).is_err(),
                    others.get(ids[1]).map(|c| c.name().to_string()),
                )
            })
            .unwrap();
        assert!(own);
        assert_eq!(other.unwrap(), "b");
        assert_eq!(arena.get(ids[0]).unwrap().core().description(), "visited");
    }

    #[test]
    fn downcast_to_concrete_type() {
        let (arena, ids) = checked(vec![node("a", &[])]);
        let view = arena.view();
        assert_eq!(view.downcast::<Node>(ids[0]).unwrap().core.name(), "a");
        assert!(view.variable_value(ids[0], "x", 0).is_err());
        assert!(matches!(
            view.variable(ids[0], "y"),
            Err(ModelError::VariableNotFound { .. })
        ));
    }

    #[test]
    fn directory_resolves_first_match_by_name() {
        let (arena, ids) = checked(vec![node("a", &[]), node("a", &[])]);
        let directory = Directory::new(&arena, &ids);
        assert_eq!(directory.find_component("a").map(|c| c.id), Some(ids[0]));
        assert_eq!(directory.find_variable(ids[1], "x"), Some("m"));
        assert!(directory.find_component("z").is_none());
    }
}

//! bs-model: component model layer for bsim.
//!
//! Provides:
//! - Typed, validated parameters, including references to other components
//!   and to their variables, resolved by name
//! - Unit-tagged time-series variables
//! - The `Component` trait (check + four-hook simulation lifecycle) and the
//!   `ComponentCore` every component type embeds
//! - The component arena with cycle-safe reference traversal
//! - An explicit type-name factory
//!
//! # Example
//!
//! ```
//! use bs_model::{ComponentArena, ComponentCore, Component, Parameter};
//!
//! struct Wall {
//!     core: ComponentCore,
//! }
//!
//! impl Component for Wall {
//!     fn core(&self) -> &ComponentCore {
//!         &self.core
//!     }
//!     fn core_mut(&mut self) -> &mut ComponentCore {
//!         &mut self.core
//!     }
//! }
//!
//! let mut core = ComponentCore::new("Wall", "north_wall");
//! core.add_parameter(Parameter::float("area", 10.0, "m²").with_min(0.0));
//!
//! let mut arena = ComponentArena::new();
//! let id = arena.insert(Box::new(Wall { core }));
//! assert_eq!(arena.referenced_components(id).components, vec![id]);
//! ```

pub mod arena;
pub mod component;
pub mod error;
pub mod factory;
pub mod parameter;
pub mod parameter_set;
pub mod reference;
pub mod value;
pub mod variable;

// Re-exports for ergonomics
pub use arena::{ComponentArena, Components, Directory, ReferenceClosure};
pub use component::{AsAny, Component, ComponentCore, StepInfo};
pub use error::{ModelError, ModelResult};
pub use factory::{ComponentFactory, Constructor};
pub use parameter::{Bounds, ParamKind, Parameter, ScalarKind};
pub use parameter_set::ParameterSet;
pub use reference::{NOT_DEFINED, ResolvedComponent, Resolver, VarBinding};
pub use value::ParamValue;
pub use variable::{Variable, VariableSet};

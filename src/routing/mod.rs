//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Setup (before serving):
//!     Resource::new(name, template)      → pattern.rs (compile template)
//!     resource.within(parent).get(..)    → resource.rs (method bindings)
//!     DispatcherBuilder::register(..)    → declaration order preserved
//!     DispatcherBuilder::build()         → resolve parents, freeze table
//!
//! Per request:
//!     Dispatcher::dispatch(method, path)
//!     → scan routes in registration order
//!     → Return: ExistentMatch or NonExistentMatch(NotFound | MethodNotAllowed)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)
//! - A miss is a value, not an error

pub mod dispatcher;
pub mod error;
pub mod matching;
pub mod pattern;
pub mod resource;

pub use dispatcher::{Dispatcher, DispatcherBuilder, Route};
pub use error::{ConfigurationError, DuplicateBindingError, PatternError, SetupError, SetupResult};
pub use matching::{ExistentMatch, Match, NonExistentMatch, Reason};
pub use pattern::{Params, Pattern, Segment};
pub use resource::{Binding, Resource};

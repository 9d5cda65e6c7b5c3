//! # Eddy
//!
//! Effects as data: describe a computation once, run it as often as you like.
//!
//! An [`Effect<R, E, A>`] reads an environment `R`, may fail with a typed error
//! `E`, and otherwise produces an `A`. Effects are plain values built from a
//! small closed set of nodes; a [`Runtime`] walks them with an explicit loop, so
//! arbitrarily long chains of [`and_then`](Effect::and_then) never overflow the
//! stack.
//!
//! Failures come in two tiers, modelled by [`Cause`]:
//! - **typed failures** (`Cause::Fail`) live in the effect's error channel and are
//!   handled with [`fold_m`](Effect::fold_m), [`recover`](Effect::recover),
//!   [`or_else`](Effect::or_else) and [`either`](Effect::either);
//! - **defects** (`Cause::Die`) are panics and escalations that no recovery
//!   combinator absorbs. [`catch`](Effect::catch) narrows defects of one payload
//!   type back into the typed channel.
//!
//! ## Quick Example
//!
//! ```rust
//! use eddy::{Effect, Outcome};
//!
//! #[derive(Clone)]
//! struct Inventory {
//!     stock: u32,
//! }
//!
//! fn reserve(quantity: u32) -> Effect<Inventory, String, u32> {
//!     Effect::access(|inv: &Inventory| inv.stock).require(
//!         move |stock| *stock >= quantity,
//!         move |stock| format!("only {} left, wanted {}", stock, quantity),
//!     )
//! }
//!
//! let inventory = Inventory { stock: 3 };
//! assert_eq!(reserve(2).run_with(inventory.clone()), 3);
//!
//! let too_many = reserve(5).either::<std::convert::Infallible>();
//! assert_eq!(
//!     too_many.run_with(inventory),
//!     Outcome::failure("only 3 left, wanted 5".to_string())
//! );
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cause;
pub mod effect;
pub mod error;
pub mod outcome;
pub mod runtime;
pub mod testing;

// Re-exports
pub use cause::{Cause, Defect};
pub use effect::{Callable, Effect, FunctionArguments, NamedArgs, IO, UIO, URIO};
pub use error::{RuntimeError, TypeMatchError, UnhandledFailure};
pub use outcome::Outcome;
pub use runtime::{Runtime, RuntimeConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cause::{Cause, Defect};
    pub use crate::effect::{access, environment, fail, succeed};
    pub use crate::effect::{Effect, FunctionArguments, IO, UIO, URIO};
    pub use crate::outcome::Outcome;
    pub use crate::runtime::Runtime;
}

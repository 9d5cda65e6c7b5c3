//! Effect descriptions.
//!
//! An [`Effect<R, E, A>`] is an immutable description of a computation that
//! needs an environment of type `R`, may fail with a typed error `E`, and
//! otherwise produces an `A`. Building an effect performs nothing; a
//! [`Runtime`](crate::Runtime) evaluates it, as many times as you like.
//!
//! # Core Concepts
//!
//! - **Environment**: dependencies are bound with [`Effect::provide`] and read
//!   with [`Effect::access`] / [`Effect::environment`]. A `provide` scope ends
//!   when its inner effect ends, on success and on failure alike.
//! - **Typed failures**: [`Effect::fail`] values flow through the error channel
//!   and are handled with [`Effect::fold_m`], [`Effect::recover`],
//!   [`Effect::or_else`] or [`Effect::either`].
//! - **Defects**: panics raised by [`Effect::effect_partial`] thunks, escalations
//!   via [`Effect::or_die`] and [`Effect::asserting`], and unmatched
//!   [`Effect::at_type`] dispatch. No typed recovery combinator absorbs them;
//!   only [`Effect::catch`] can narrow a defect of a given payload type back into
//!   the error channel.
//!
//! # Examples
//!
//! ```rust
//! use eddy::Effect;
//!
//! #[derive(Clone)]
//! struct Config {
//!     greeting: String,
//! }
//!
//! let greet = Effect::<Config, String, String>::access(|c: &Config| c.greeting.clone())
//!     .map(|g| format!("{}, world", g))
//!     .require(|s| s.len() < 64, |_| "greeting too long".to_string());
//!
//! let config = Config { greeting: "hello".to_string() };
//! assert_eq!(greet.run_with(config), "hello, world");
//! ```
//!
//! Deep chains are evaluated by an explicit loop, so they do not consume native
//! stack:
//!
//! ```rust
//! use eddy::UIO;
//!
//! let mut counter = UIO::succeed(0_u64);
//! for _ in 0..50_000 {
//!     counter = counter.and_then(|n| UIO::succeed(n + 1));
//! }
//! assert_eq!(counter.run(), 50_000);
//! ```

mod callable;
mod combinators;
mod constructors;
mod dispatch;
pub(crate) mod node;

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;

use self::node::{Node, Subtree};

pub use callable::{Callable, FunctionArguments, NamedArgs};
pub use constructors::{access, environment, fail, succeed};

/// An immutable, reusable description of a computation.
///
/// * `R` - The environment the computation reads
/// * `E` - The typed error it may fail with
/// * `A` - The value it produces
///
/// Cloning is cheap: clones share the same node tree.
pub struct Effect<R, E, A> {
    root: Subtree,
    _marker: PhantomData<fn(R) -> (E, A)>,
}

/// An effect that needs no environment.
pub type IO<E, A> = Effect<(), E, A>;

/// An effect that needs no environment and cannot fail.
pub type UIO<A> = Effect<(), Infallible, A>;

/// An effect that reads `R` and cannot fail.
pub type URIO<R, A> = Effect<R, Infallible, A>;

impl<R, E, A> Effect<R, E, A> {
    pub(crate) fn from_node(node: Node) -> Self {
        Effect {
            root: Subtree::new(node),
            _marker: PhantomData,
        }
    }

    pub(crate) fn node(&self) -> &Node {
        self.root.node()
    }

    pub(crate) fn into_node(self) -> Node {
        self.root.into_node()
    }
}

impl<R, E, A> Clone for Effect<R, E, A> {
    fn clone(&self) -> Self {
        Effect {
            root: self.root.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R, E, A> fmt::Debug for Effect<R, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("node", &self.node().kind())
            .finish()
    }
}

//! Converting between plain functions and effects.
//!
//! A function of `n` arguments corresponds to an effect whose environment is the
//! [`FunctionArguments`] holding those arguments: [`Effect::from_callable`] goes
//! one way and [`Effect::to_callable`] the other.
//!
//! # Example
//!
//! ```rust
//! use std::convert::Infallible;
//! use eddy::{Effect, FunctionArguments};
//!
//! fn describe(id: u32, name: String) -> String {
//!     format!("{}: {}", id, name)
//! }
//!
//! let effect: Effect<FunctionArguments<(u32, String)>, Infallible, String> =
//!     Effect::from_callable(describe);
//! let args = FunctionArguments::new((7_u32, "seven".to_string()));
//! assert_eq!(effect.run_with(args), "7: seven");
//!
//! let back = effect.to_callable();
//! assert_eq!(back((8, "eight".to_string())), "8: eight");
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::Effect;

/// The arguments of one call: a positional tuple plus named arguments.
#[derive(Debug, Clone)]
pub struct FunctionArguments<Args> {
    /// Positional arguments, in order.
    pub args: Args,
    /// Named arguments.
    pub named: NamedArgs,
}

impl<Args> FunctionArguments<Args> {
    /// Positional arguments only.
    pub fn new(args: Args) -> Self {
        FunctionArguments {
            args,
            named: NamedArgs::default(),
        }
    }

    /// Add a named argument, replacing any earlier one with the same name.
    pub fn with_named<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.named.insert(name, value);
        self
    }
}

/// Named arguments, kept in name order.
#[derive(Clone, Default)]
pub struct NamedArgs(BTreeMap<String, Arc<dyn Any + Send + Sync>>);

impl NamedArgs {
    /// Bind `name` to `value`. Returns `true` if an earlier binding was replaced.
    pub fn insert<T>(&mut self, name: impl Into<String>, value: T) -> bool
    where
        T: Any + Send + Sync,
    {
        self.0.insert(name.into(), Arc::new(value)).is_some()
    }

    /// The argument named `name`, if it exists and is a `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.0.get(name).and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns `true` if an argument named `name` exists, whatever its type.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Argument names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of named arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no named arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for NamedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// A function callable with a tuple of positional arguments.
///
/// Implemented for every `Fn` of up to six arguments.
pub trait Callable<Args>: Send + Sync + 'static {
    /// The function's return type.
    type Output;

    /// Call with the positional arguments spread out.
    fn call(&self, args: Args) -> Self::Output;
}

macro_rules! impl_callable {
    ($($arg:ident: $ty:ident),*) => {
        impl<Func, Out, $($ty),*> Callable<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Out + Send + Sync + 'static,
        {
            type Output = Out;

            #[allow(clippy::unused_unit)]
            fn call(&self, args: ($($ty,)*)) -> Out {
                let ($($arg,)*) = args;
                self($($arg),*)
            }
        }
    };
}

impl_callable!();
impl_callable!(a1: A1);
impl_callable!(a1: A1, a2: A2);
impl_callable!(a1: A1, a2: A2, a3: A3);
impl_callable!(a1: A1, a2: A2, a3: A3, a4: A4);
impl_callable!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
impl_callable!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6);

impl<Args, E, A> Effect<FunctionArguments<Args>, E, A>
where
    Args: Clone + Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Represent `f` as an effect reading its arguments from the environment.
    ///
    /// The call is evaluated like [`effect_partial`](Effect::effect_partial): a
    /// panic inside `f` is a defect that [`catch`](Effect::catch) can narrow.
    pub fn from_callable<F>(f: F) -> Self
    where
        F: Callable<Args, Output = A>,
    {
        let f = Arc::new(f);
        Effect::access_m(move |call: &FunctionArguments<Args>| {
            let f = Arc::clone(&f);
            let args = call.args.clone();
            Effect::effect_partial(move || f.call(args.clone()))
        })
    }

    /// Like [`from_callable`](Effect::from_callable), for functions that read
    /// named arguments too.
    pub fn from_callable_named<F>(f: F) -> Self
    where
        F: Fn(&FunctionArguments<Args>) -> A + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Effect::access_m(move |call: &FunctionArguments<Args>| {
            let f = Arc::clone(&f);
            let call = call.clone();
            Effect::effect_partial(move || f(&call))
        })
    }
}

impl<Args, E, A> Effect<FunctionArguments<Args>, E, A>
where
    Args: Send + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Turn this effect back into a function of its positional arguments.
    ///
    /// Each call runs the effect on a fresh [`Runtime`](crate::Runtime). A typed
    /// failure or a defect unwinds out of the call, exactly as
    /// [`Effect::run`] would.
    pub fn to_callable(self) -> impl Fn(Args) -> A + Send + Sync {
        move |args| self.run_with(FunctionArguments::new(args))
    }

    /// Turn this effect into a function of its full [`FunctionArguments`].
    pub fn to_callable_named(self) -> impl Fn(FunctionArguments<Args>) -> A + Send + Sync {
        move |call| self.run_with(call)
    }
}

//! Constructors lifting values, thunks and environment readers into effects.
//!
//! Values captured at construction time (`succeed`, `fail`, `die`, `provide`)
//! must be `Clone`: an effect can be run many times and every run gets its own
//! copy. Values produced while running (by thunks and continuations) carry no
//! such requirement.

use std::any::{self, Any};
use std::sync::Arc;

use super::node::{erase, erase_cause, Node, Slot};
use super::Effect;
use crate::cause::Cause;
use crate::error::RuntimeError;
use crate::outcome::Outcome;

impl<R, E, A> Effect<R, E, A>
where
    R: 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// An effect that immediately succeeds with `value`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::IO;
    ///
    /// assert_eq!(IO::<String, _>::succeed(42).run(), 42);
    /// ```
    pub fn succeed(value: A) -> Self
    where
        A: Clone + Sync,
    {
        Effect::from_node(Node::Succeed(Slot::shared(value)))
    }

    /// An effect that immediately fails with `error`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::{IO, Outcome};
    ///
    /// let effect = IO::<_, i32>::fail("nope").either::<std::convert::Infallible>();
    /// assert_eq!(effect.run(), Outcome::failure("nope"));
    /// ```
    pub fn fail(error: E) -> Self
    where
        E: Clone + Sync,
    {
        Effect::halt_with(move || Cause::Fail(error.clone()))
    }

    /// Lift an [`Outcome`]: a `Success` succeeds, a `Failure` fails.
    pub fn from_outcome(outcome: Outcome<E, A>) -> Self
    where
        E: Clone + Sync,
        A: Clone + Sync,
    {
        match outcome {
            Outcome::Success(value) => Effect::succeed(value),
            Outcome::Failure(error) => Effect::fail(error),
        }
    }

    /// Lift a standard `Result`.
    pub fn from_result(result: Result<A, E>) -> Self
    where
        E: Clone + Sync,
        A: Clone + Sync,
    {
        Effect::from_outcome(Outcome::from_result(result))
    }

    /// Lift an `Option`, failing with `on_none()` when it is empty.
    pub fn from_option<F>(option: Option<A>, on_none: F) -> Self
    where
        A: Clone + Sync,
        F: Fn() -> E + Send + Sync + 'static,
    {
        match option {
            Some(value) => Effect::succeed(value),
            None => Effect::halt_with(move || Cause::Fail(on_none())),
        }
    }

    /// An effect that fails with the cause produced by `cause`, invoked once per run.
    pub fn halt_with<F>(cause: F) -> Self
    where
        F: Fn() -> Cause<E> + Send + Sync + 'static,
    {
        Effect::from_node(Node::FailCause(Arc::new(move || erase_cause(cause()))))
    }

    /// An effect that fails with an owned cause.
    ///
    /// Meant for handlers that re-raise the cause they were given, e.g. in
    /// [`fold_cause_m`](Effect::fold_cause_m). The cause is moved into the node,
    /// so evaluating the same node a second time yields a
    /// [`RuntimeError::AlreadyConsumed`] defect; build reusable failures with
    /// [`fail`](Effect::fail) or [`halt_with`](Effect::halt_with) instead.
    pub fn halt(cause: Cause<E>) -> Self {
        Effect::from_node(Node::halt_once(erase_cause(cause)))
    }

    /// An effect that dies with `payload` as its defect.
    pub fn die<T>(payload: T) -> Self
    where
        T: Any + Clone + Send + Sync,
    {
        Effect::halt_with(move || Cause::die(payload.clone()))
    }

    /// Wrap a side-effecting thunk that must not panic.
    ///
    /// A panic inside `thunk` is a contract violation: it unwinds straight out of
    /// the running [`Runtime`](crate::Runtime) and cannot be narrowed by
    /// [`catch`](Effect::catch).
    pub fn effect_total<F>(thunk: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Effect::from_node(Node::EffectTotal(Arc::new(move || erase(thunk()))))
    }

    /// Wrap a side-effecting thunk that may panic.
    ///
    /// A panic becomes a defect carrying the panic payload. It propagates to the
    /// nearest enclosing [`catch`](Effect::catch) for its payload type, or out of
    /// the run.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::{IO, Outcome};
    ///
    /// #[derive(Debug, Clone, PartialEq)]
    /// struct Timeout;
    ///
    /// let flaky = IO::<Timeout, u32>::effect_partial(|| std::panic::panic_any(Timeout))
    ///     .catch::<Timeout>()
    ///     .either::<std::convert::Infallible>();
    ///
    /// assert_eq!(flaky.run(), Outcome::failure(Timeout));
    /// ```
    pub fn effect_partial<F>(thunk: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Effect::from_node(Node::EffectPartial(Arc::new(move || erase(thunk()))))
    }

    /// Read the bound environment and continue with the effect `f` builds from it.
    pub fn access_m<F>(f: F) -> Self
    where
        F: Fn(&R) -> Effect<R, E, A> + Send + Sync + 'static,
    {
        Effect::from_node(Node::ReadEnvironment(Arc::new(
            move |env: Option<&(dyn Any + Send)>| match env {
                None => Node::die(RuntimeError::MissingEnvironment {
                    expected: any::type_name::<R>(),
                }),
                Some(env) => match env.downcast_ref::<R>() {
                    Some(env) => f(env).into_node(),
                    None => Node::die(RuntimeError::EnvironmentMismatch {
                        expected: any::type_name::<R>(),
                    }),
                },
            },
        )))
    }

    /// Read the bound environment and project a value out of it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::URIO;
    ///
    /// let len = URIO::access(|s: &String| s.len());
    /// assert_eq!(len.run_with("hello".to_string()), 5);
    /// ```
    pub fn access<F>(f: F) -> Self
    where
        F: Fn(&R) -> A + Send + Sync + 'static,
    {
        Effect::access_m(move |env| Effect::now(f(env)))
    }

    /// Read the bound environment and succeed or fail with what `f` returns.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&R) -> Result<A, E> + Send + Sync + 'static,
    {
        Effect::access_m(move |env| match f(env) {
            Ok(value) => Effect::now(value),
            Err(error) => Effect::fail_now(error),
        })
    }

    /// Succeed with a value produced at run time.
    pub(crate) fn now(value: A) -> Self {
        Effect::from_node(Node::succeed_once(erase(value)))
    }

    /// Fail with an error produced at run time.
    pub(crate) fn fail_now(error: E) -> Self {
        Effect::halt(Cause::Fail(error))
    }
}

impl<R, E> Effect<R, E, R>
where
    R: Clone + Send + 'static,
    E: Send + 'static,
{
    /// Read a copy of the bound environment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::URIO;
    ///
    /// assert_eq!(URIO::<u8, u8>::environment().run_with(7), 7);
    /// ```
    pub fn environment() -> Self {
        Effect::access(R::clone)
    }
}

/// Free-function form of [`Effect::succeed`].
pub fn succeed<R, E, A>(value: A) -> Effect<R, E, A>
where
    R: 'static,
    E: Send + 'static,
    A: Clone + Send + Sync + 'static,
{
    Effect::succeed(value)
}

/// Free-function form of [`Effect::fail`].
pub fn fail<R, E, A>(error: E) -> Effect<R, E, A>
where
    R: 'static,
    E: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    Effect::fail(error)
}

/// Free-function form of [`Effect::environment`].
pub fn environment<R, E>() -> Effect<R, E, R>
where
    R: Clone + Send + 'static,
    E: Send + 'static,
{
    Effect::environment()
}

/// Free-function form of [`Effect::access`].
pub fn access<R, E, A, F>(f: F) -> Effect<R, E, A>
where
    R: 'static,
    E: Send + 'static,
    A: Send + 'static,
    F: Fn(&R) -> A + Send + Sync + 'static,
{
    Effect::access(f)
}

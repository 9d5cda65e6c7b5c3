//! Sequencing, error-channel and environment combinators.
//!
//! Every combinator wraps the receiver's node in a new `FlatMap`, `Fold` or
//! `Provide` node; nothing here evaluates anything.

use std::any::Any;
use std::sync::Arc;

use super::node::{erase, erase_cause, pass_through, typed_cause, with_value, Node, Slot};
use super::Effect;
use crate::cause::Cause;
use crate::outcome::Outcome;

impl<R, E, A> Effect<R, E, A>
where
    R: 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Transform the success value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::IO;
    ///
    /// let effect = IO::<String, _>::succeed(5).map(|x| x * 2);
    /// assert_eq!(effect.run(), 10);
    /// ```
    pub fn map<B, F>(self, f: F) -> Effect<R, E, B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        Effect::from_node(self.into_node().flat_map(Arc::new(move |value| {
            with_value(value, |a: A| Node::succeed_once(erase(f(a))))
        })))
    }

    /// [`map`](Effect::map) for a function built at run time that owns its captures.
    pub(crate) fn map_once<B, F>(self, f: F) -> Effect<R, E, B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Effect::from_node(self.into_node().flat_map_once(move |value| {
            with_value(value, |a: A| Node::succeed_once(erase(f(a))))
        }))
    }

    /// Feed the success value to `f` and continue with the effect it returns.
    ///
    /// Short-circuits on failure: `f` is never called. Chains of any length are
    /// evaluated without growing the native stack.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::IO;
    ///
    /// let effect = IO::<String, _>::succeed(1)
    ///     .and_then(|x| IO::succeed(x + 1))
    ///     .and_then(|x| IO::succeed(x + 1));
    /// assert_eq!(effect.run(), 3);
    /// ```
    pub fn and_then<B, F>(self, f: F) -> Effect<R, E, B>
    where
        B: Send + 'static,
        F: Fn(A) -> Effect<R, E, B> + Send + Sync + 'static,
    {
        Effect::from_node(
            self.into_node()
                .flat_map(Arc::new(move |value| with_value(value, |a: A| f(a).into_node()))),
        )
    }

    /// Run `that` after this effect, discarding this effect's value.
    pub fn then<B>(self, that: Effect<R, E, B>) -> Effect<R, E, B>
    where
        B: Send + 'static,
    {
        self.and_then(move |_| that.clone())
    }

    /// Run this effect, then `that`, and pair their values.
    ///
    /// The first failure in left-to-right order wins; `that` does not run if
    /// this effect fails.
    pub fn zip<B>(self, that: Effect<R, E, B>) -> Effect<R, E, (A, B)>
    where
        B: Send + 'static,
    {
        self.and_then(move |a| that.clone().map_once(move |b| (a, b)))
    }

    /// Like [`zip`](Effect::zip), combining the two values with `f`.
    pub fn zip_with<B, C, F>(self, that: Effect<R, E, B>, f: F) -> Effect<R, E, C>
    where
        B: Send + 'static,
        C: Send + 'static,
        F: Fn(A, B) -> C + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.and_then(move |a| {
            let f = Arc::clone(&f);
            that.clone().map_once(move |b| f(a, b))
        })
    }

    /// Transform the typed error. Defects are left alone.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::{IO, Outcome};
    ///
    /// let effect = IO::<_, ()>::fail(404_u16)
    ///     .map_err(|code| format!("status {}", code))
    ///     .either::<std::convert::Infallible>();
    /// assert_eq!(effect.run(), Outcome::failure("status 404".to_string()));
    /// ```
    pub fn map_err<E2, F>(self, f: F) -> Effect<R, E2, A>
    where
        E2: Send + 'static,
        F: Fn(E) -> E2 + Send + Sync + 'static,
    {
        Effect::from_node(self.into_node().fold(
            Arc::new(move |cause| Node::halt_once(erase_cause(typed_cause::<E>(cause).map(&f)))),
            pass_through(),
        ))
    }

    /// Branch on the full [`Cause`] of a failure, or on the success value.
    ///
    /// This is the only combinator that observes defects. Handlers that do not
    /// want to deal with a cause can hand it back with [`Effect::halt`].
    pub fn fold_cause_m<E2, B, F, G>(self, on_cause: F, on_success: G) -> Effect<R, E2, B>
    where
        E2: Send + 'static,
        B: Send + 'static,
        F: Fn(Cause<E>) -> Effect<R, E2, B> + Send + Sync + 'static,
        G: Fn(A) -> Effect<R, E2, B> + Send + Sync + 'static,
    {
        Effect::from_node(self.into_node().fold(
            Arc::new(move |cause| on_cause(typed_cause::<E>(cause)).into_node()),
            Arc::new(move |value| with_value(value, |a: A| on_success(a).into_node())),
        ))
    }

    /// Branch on the typed error or the success value. Defects are re-raised.
    pub fn fold_m<E2, B, F, G>(self, on_failure: F, on_success: G) -> Effect<R, E2, B>
    where
        E2: Send + 'static,
        B: Send + 'static,
        F: Fn(E) -> Effect<R, E2, B> + Send + Sync + 'static,
        G: Fn(A) -> Effect<R, E2, B> + Send + Sync + 'static,
    {
        self.fold_cause_m(
            move |cause| match cause.failure_or_cause() {
                Ok(error) => on_failure(error),
                Err(defect) => Effect::halt(Cause::Die(defect)),
            },
            on_success,
        )
    }

    /// Collapse both channels into a single value.
    pub fn fold<E2, B, F, G>(self, on_failure: F, on_success: G) -> Effect<R, E2, B>
    where
        E2: Send + 'static,
        B: Send + 'static,
        F: Fn(E) -> B + Send + Sync + 'static,
        G: Fn(A) -> B + Send + Sync + 'static,
    {
        self.fold_m(
            move |e| Effect::now(on_failure(e)),
            move |a| Effect::now(on_success(a)),
        )
    }

    /// Handle a typed failure with an effect. Success values and defects pass through.
    pub fn recover<E2, F>(self, f: F) -> Effect<R, E2, A>
    where
        E2: Send + 'static,
        F: Fn(E) -> Effect<R, E2, A> + Send + Sync + 'static,
    {
        self.fold_m(f, Effect::now)
    }

    /// Reify the error channel into the success value.
    ///
    /// The resulting effect has no typed failures left; `E2` is free so the
    /// result composes with whatever error type its context needs. Defects still
    /// propagate.
    pub fn either<E2>(self) -> Effect<R, E2, Outcome<E, A>>
    where
        E2: Send + 'static,
    {
        self.fold_m(
            |e| Effect::now(Outcome::Failure(e)),
            |a| Effect::now(Outcome::Success(a)),
        )
    }

    /// Escalate a typed failure to a defect whose payload is the error itself.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::panic::{self, AssertUnwindSafe};
    /// use eddy::IO;
    ///
    /// let effect = IO::<_, ()>::fail("unreachable").or_die::<std::convert::Infallible>();
    /// let payload = panic::catch_unwind(AssertUnwindSafe(|| effect.run())).unwrap_err();
    /// assert_eq!(payload.downcast_ref::<&str>(), Some(&"unreachable"));
    /// ```
    pub fn or_die<E2>(self) -> Effect<R, E2, A>
    where
        E2: Send + 'static,
    {
        self.fold_cause_m(
            |cause| match cause {
                Cause::Fail(error) => Effect::halt(Cause::die(error)),
                Cause::Die(defect) => Effect::halt(Cause::Die(defect)),
            },
            Effect::now,
        )
    }

    /// On a typed failure, discard the error and run `that` in the same environment.
    pub fn or_else<E2>(self, that: Effect<R, E2, A>) -> Effect<R, E2, A>
    where
        E2: Send + 'static,
    {
        self.fold_m(move |_| that.clone(), Effect::now)
    }

    /// Exchange the error and success channels.
    pub fn swap(self) -> Effect<R, A, E> {
        self.fold_m(Effect::now, Effect::fail_now)
    }

    /// Fail with `to_error(&a)` unless `predicate(&a)` holds.
    pub fn require<P, F>(self, predicate: P, to_error: F) -> Self
    where
        P: Fn(&A) -> bool + Send + Sync + 'static,
        F: Fn(&A) -> E + Send + Sync + 'static,
    {
        self.and_then(move |a| {
            if predicate(&a) {
                Effect::now(a)
            } else {
                Effect::fail_now(to_error(&a))
            }
        })
    }

    /// Die with `to_error(&a)` as the defect payload unless `predicate(&a)` holds.
    ///
    /// Unlike [`require`](Effect::require) the error does not enter the typed
    /// channel; [`catch`](Effect::catch) can narrow it back.
    pub fn asserting<P, F, X>(self, predicate: P, to_error: F) -> Self
    where
        P: Fn(&A) -> bool + Send + Sync + 'static,
        F: Fn(&A) -> X + Send + Sync + 'static,
        X: Any + Send,
    {
        self.and_then(move |a| {
            if predicate(&a) {
                Effect::now(a)
            } else {
                Effect::halt(Cause::die(to_error(&a)))
            }
        })
    }

    /// Narrow defects whose payload is exactly an `X` into the typed channel.
    ///
    /// Any other defect keeps propagating.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::{IO, Outcome};
    ///
    /// #[derive(Debug, PartialEq)]
    /// enum AppError {
    ///     Parse(std::num::ParseIntError),
    /// }
    ///
    /// impl From<std::num::ParseIntError> for AppError {
    ///     fn from(e: std::num::ParseIntError) -> Self {
    ///         AppError::Parse(e)
    ///     }
    /// }
    ///
    /// let parsed = IO::<AppError, i32>::effect_partial(|| match "x1".parse::<i32>() {
    ///     Ok(n) => n,
    ///     Err(e) => std::panic::panic_any(e),
    /// })
    /// .catch::<std::num::ParseIntError>()
    /// .either::<std::convert::Infallible>();
    ///
    /// assert!(matches!(parsed.run(), Outcome::Failure(AppError::Parse(_))));
    /// ```
    pub fn catch<X>(self) -> Self
    where
        X: Any,
        E: From<X>,
    {
        self.fold_cause_m(
            |cause| match cause {
                Cause::Fail(error) => Effect::halt(Cause::Fail(error)),
                Cause::Die(defect) => match defect.downcast::<X>() {
                    Ok(payload) => Effect::fail_now(E::from(payload)),
                    Err(defect) => Effect::halt(Cause::Die(defect)),
                },
            },
            Effect::now,
        )
    }

    /// Bind `env` as the environment of this effect.
    ///
    /// The binding is scoped: once this effect finishes, successfully or not,
    /// readers see the previously bound environment again. The result reads no
    /// environment of its own, so `R0` is free.
    pub fn provide<R0>(self, env: R) -> Effect<R0, E, A>
    where
        R: Clone + Send + Sync,
    {
        Effect::from_node(self.into_node().provide(Slot::shared(env)))
    }

    /// [`provide`](Effect::provide) a value produced at run time.
    pub(crate) fn provide_once<R0>(self, env: R) -> Effect<R0, E, A>
    where
        R: Send,
    {
        Effect::from_node(self.into_node().provide(Slot::once(erase(env))))
    }
}

impl<R, E, A> Effect<R, E, Outcome<E, A>>
where
    R: 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Inverse of [`either`](Effect::either): a `Failure` value becomes a failure.
    pub fn absolve(self) -> Effect<R, E, A> {
        self.and_then(|outcome| match outcome {
            Outcome::Success(a) => Effect::now(a),
            Outcome::Failure(e) => Effect::fail_now(e),
        })
    }
}

impl<R, E, A> Effect<R, E, Effect<R, E, A>>
where
    R: 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Run the effect this effect produces.
    pub fn flatten(self) -> Effect<R, E, A> {
        self.and_then(|inner| inner)
    }
}

impl<R1, R2, E, A> Effect<R1, E, Effect<R2, E, A>>
where
    R1: Clone + Send + Sync + 'static,
    R2: Clone + Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Swap the order in which two nested environments are supplied.
    ///
    /// An effect reading `R1` that produces an effect reading `R2` becomes an
    /// effect reading `R2` that produces an effect reading `R1`. Supplying both
    /// environments to either form gives the same result.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::URIO;
    ///
    /// let nested = URIO::access(|text: &String| {
    ///     let text = text.clone();
    ///     URIO::access(move |times: &usize| text.repeat(*times))
    /// });
    ///
    /// let swapped = nested.swap_environments::<std::convert::Infallible>();
    /// let inner = swapped.run_with(2_usize);
    /// assert_eq!(inner.run_with("ab".to_string()), "abab");
    /// ```
    pub fn swap_environments<E2>(self) -> Effect<R2, E2, Effect<R1, E, A>>
    where
        E2: Send + 'static,
    {
        Effect::access(move |r2: &R2| {
            let r2 = r2.clone();
            self.clone()
                .and_then(move |inner| inner.provide(r2.clone()))
        })
    }
}

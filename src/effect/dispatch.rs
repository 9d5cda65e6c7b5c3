//! Type-directed dispatch over a success value.
//!
//! [`match_types`](Effect::match_types) parks the success value inside a
//! [`TypeMatchError`] defect. Each [`at_type`](Effect::at_type) that follows
//! inspects the parked value: if it is exactly the case's type, the case's
//! handler runs with the value as its environment and its result becomes the new
//! success value; otherwise the defect travels on to the next case. A defect
//! that survives every case escapes the run.
//!
//! ```rust
//! use eddy::{Effect, IO};
//!
//! #[derive(Clone)]
//! struct Circle(f64);
//! #[derive(Clone)]
//! struct Square(f64);
//!
//! let square = IO::<String, _>::succeed(Square(2.0))
//!     .match_types::<f64>()
//!     .at_type(Effect::access(|c: &Circle| 3.0 * c.0 * c.0))
//!     .at_type(Effect::access(|s: &Square| s.0 * s.0));
//!
//! assert_eq!(square.run(), 4.0);
//! ```

use std::any::Any;

use super::Effect;
use crate::cause::Cause;
use crate::error::TypeMatchError;

impl<R, E, A> Effect<R, E, A>
where
    R: 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Park the success value for dispatch by the [`at_type`](Effect::at_type)
    /// cases that follow. `B` is the type every case produces.
    pub fn match_types<B>(self) -> Effect<R, E, B>
    where
        A: Any,
        B: Send + 'static,
    {
        self.and_then(|a| Effect::halt(Cause::die(TypeMatchError::new(a))))
    }

    /// Register a dispatch case for values of exactly type `T`.
    ///
    /// On a match, `handler` runs with the parked value as its environment.
    /// Cases are tried in registration order and the first match wins, so a
    /// second case for the same `T` is unreachable. Typed failures, successes
    /// and unrelated defects pass through untouched.
    pub fn at_type<T>(self, handler: Effect<T, E, A>) -> Self
    where
        T: Send + 'static,
    {
        self.fold_cause_m(
            move |cause| match cause {
                Cause::Fail(error) => Effect::halt(Cause::Fail(error)),
                Cause::Die(defect) => match defect.downcast::<TypeMatchError>() {
                    Ok(pending) => match pending.take::<T>() {
                        Ok(value) => handler.clone().provide_once(value),
                        Err(pending) => Effect::halt(Cause::die(pending)),
                    },
                    Err(defect) => Effect::halt(Cause::Die(defect)),
                },
            },
            Effect::now,
        )
    }
}

//! Why an effect did not produce a value.
//!
//! A [`Cause`] is either a typed, recoverable failure ([`Cause::Fail`]) or a
//! [`Defect`] ([`Cause::Die`]): an unexpected panic, an unmatched type dispatch,
//! or a typed error deliberately escalated with
//! [`Effect::or_die`](crate::Effect::or_die).
//!
//! Recovery combinators (`fold_m`, `recover`, `either`, `or_else`) only ever see
//! the `Fail` side; they go through [`Cause::failure_or_cause`] and re-raise
//! anything that projects to a defect.

use std::any::{self, Any};
use std::fmt;

/// The reason an effect failed.
#[derive(Debug)]
pub enum Cause<E> {
    /// A typed failure from the effect's error channel.
    Fail(E),
    /// An unrecoverable defect.
    Die(Defect),
}

impl<E> Cause<E> {
    /// Create a typed failure.
    pub fn fail(error: E) -> Self {
        Cause::Fail(error)
    }

    /// Create a defect carrying `payload`.
    pub fn die<T: Any + Send>(payload: T) -> Self {
        Cause::Die(Defect::new(payload))
    }

    /// Returns `true` for `Fail`.
    pub fn is_fail(&self) -> bool {
        matches!(self, Cause::Fail(_))
    }

    /// Returns `true` for `Die`.
    pub fn is_die(&self) -> bool {
        matches!(self, Cause::Die(_))
    }

    /// The typed failure, if any.
    pub fn failure(&self) -> Option<&E> {
        match self {
            Cause::Fail(e) => Some(e),
            Cause::Die(_) => None,
        }
    }

    /// The defect, if any.
    pub fn defect(&self) -> Option<&Defect> {
        match self {
            Cause::Fail(_) => None,
            Cause::Die(d) => Some(d),
        }
    }

    /// Transform the typed failure. Defects are carried over unchanged.
    pub fn map<E2, F>(self, f: F) -> Cause<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Cause::Fail(e) => Cause::Fail(f(e)),
            Cause::Die(d) => Cause::Die(d),
        }
    }

    /// Project the cause for a recovery handler.
    ///
    /// `Ok(e)` is the recoverable error a handler may consume. `Err(defect)` is
    /// not recoverable and must be re-raised.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::Cause;
    ///
    /// assert_eq!(Cause::<&str>::fail("oops").failure_or_cause().ok(), Some("oops"));
    /// assert!(Cause::<&str>::die(42_u8).failure_or_cause().is_err());
    /// ```
    pub fn failure_or_cause(self) -> Result<E, Defect> {
        match self {
            Cause::Fail(e) => Ok(e),
            Cause::Die(d) => Err(d),
        }
    }
}

/// An unexpected failure: a panic payload, or a value deliberately escalated out
/// of the typed channel.
///
/// The payload keeps its runtime type, so it can be narrowed back with
/// [`downcast`](Defect::downcast) (this is what
/// [`Effect::catch`](crate::Effect::catch) does) or re-raised verbatim with
/// [`std::panic::resume_unwind`].
pub struct Defect {
    payload: Box<dyn Any + Send>,
    type_name: Option<&'static str>,
}

impl Defect {
    /// Wrap a typed payload.
    pub fn new<T: Any + Send>(payload: T) -> Self {
        Defect {
            payload: Box::new(payload),
            type_name: Some(any::type_name::<T>()),
        }
    }

    /// Wrap an already-erased payload, typically one caught from a panic.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        Defect {
            payload,
            type_name: None,
        }
    }

    /// Returns `true` if the payload is exactly a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    /// Borrow the payload as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Take the payload out as a `T`, or get the defect back untouched.
    pub fn downcast<T: Any>(self) -> Result<T, Defect> {
        let Defect { payload, type_name } = self;
        match payload.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(payload) => Err(Defect { payload, type_name }),
        }
    }

    /// The message of a `panic!("...")` style payload.
    pub fn message(&self) -> Option<&str> {
        if let Some(s) = self.payload.downcast_ref::<&'static str>() {
            Some(s)
        } else {
            self.payload.downcast_ref::<String>().map(String::as_str)
        }
    }

    /// Name of the payload type, when the defect was built from a typed value.
    pub fn type_name(&self) -> Option<&'static str> {
        self.type_name
    }

    /// Release the raw payload, e.g. for [`std::panic::resume_unwind`].
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }
}

impl fmt::Debug for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Defect")
            .field("type_name", &self.type_name.unwrap_or("<erased>"))
            .field("message", &self.message())
            .finish()
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.message(), self.type_name) {
            (Some(message), _) => write!(f, "defect: {}", message),
            (None, Some(name)) => write!(f, "defect: value of type {}", name),
            (None, None) => write!(f, "defect: opaque panic payload"),
        }
    }
}

//! The closed, type-erased node set every [`Effect`](crate::Effect) is built from.
//!
//! The typed facade guarantees that values flowing between nodes have the types
//! their consumers expect. Should that ever be violated, consumers produce a
//! [`RuntimeError::ValueMismatch`] defect instead of panicking.

use std::any::{self, Any};
use std::cell::RefCell;
use std::mem;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::cause::Cause;
use crate::error::RuntimeError;

/// A value in flight between nodes.
pub(crate) type Value = Box<dyn Any + Send>;

/// Continuation fed a success value.
pub(crate) type Continuation = Arc<dyn Fn(Value) -> Node + Send + Sync>;

/// Continuation fed a failure cause.
pub(crate) type CauseHandler = Arc<dyn Fn(Cause<Value>) -> Node + Send + Sync>;

/// Continuation fed the innermost bound environment, `None` when nothing is bound.
pub(crate) type Reader = Arc<dyn Fn(Option<&(dyn Any + Send)>) -> Node + Send + Sync>;

pub(crate) type Thunk = Arc<dyn Fn() -> Value + Send + Sync>;

pub(crate) type CauseThunk = Arc<dyn Fn() -> Cause<Value> + Send + Sync>;

/// Where a node's payload comes from on each evaluation.
#[derive(Clone)]
pub(crate) enum Slot {
    /// A fresh copy per evaluation.
    Shared(Thunk),
    /// A value owned by a node built at run time; yields it exactly once.
    Once(Arc<Mutex<Option<Value>>>),
}

impl Slot {
    pub(crate) fn shared<T>(value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Slot::Shared(Arc::new(move || erase(value.clone())))
    }

    pub(crate) fn once(value: Value) -> Self {
        Slot::Once(Arc::new(Mutex::new(Some(value))))
    }

    pub(crate) fn take(&self) -> Option<Value> {
        match self {
            Slot::Shared(make) => Some(make()),
            Slot::Once(cell) => cell.lock().unwrap_or_else(PoisonError::into_inner).take(),
        }
    }
}

/// A child node.
///
/// Dropping a subtree is iterative, so a chain of any depth is released without
/// growing the native stack.
#[derive(Clone)]
pub(crate) struct Subtree(Arc<Node>);

impl Subtree {
    pub(crate) fn new(node: Node) -> Self {
        Subtree(Arc::new(node))
    }

    pub(crate) fn node(&self) -> &Node {
        &self.0
    }

    /// The child itself when this is its only owner, a shallow copy otherwise.
    pub(crate) fn into_node(mut self) -> Node {
        let shared = mem::replace(&mut self.0, vacant());
        Arc::try_unwrap(shared).unwrap_or_else(|shared| Node::clone(&shared))
    }
}

thread_local! {
    /// Subtrees released on this thread while a drain is running, `None` when idle.
    static RELEASED: RefCell<Option<Vec<Arc<Node>>>> = const { RefCell::new(None) };
}

impl Drop for Subtree {
    fn drop(&mut self) {
        let mut root = Some(mem::replace(&mut self.0, vacant()));
        let owner = RELEASED.try_with(|released| {
            let mut released = released.borrow_mut();
            match released.as_mut() {
                Some(queue) => {
                    queue.extend(root.take());
                    false
                }
                None => {
                    *released = Some(Vec::new());
                    true
                }
            }
        });
        if !matches!(owner, Ok(true)) {
            return;
        }

        // Children, including effects captured by continuations, land in the
        // queue instead of being dropped on the native stack.
        let _drain = Drain;
        while let Some(next) = root {
            drop(next);
            root = RELEASED
                .try_with(|released| released.borrow_mut().as_mut().and_then(Vec::pop))
                .ok()
                .flatten();
        }
    }
}

/// Ends the drain on this thread, also when a captured value panics on drop.
struct Drain;

impl Drop for Drain {
    fn drop(&mut self) {
        let leftover = RELEASED
            .try_with(|released| released.borrow_mut().take())
            .ok()
            .flatten();
        drop(leftover);
    }
}

fn vacant() -> Arc<Node> {
    static VACANT: OnceLock<Arc<Node>> = OnceLock::new();
    Arc::clone(VACANT.get_or_init(|| Arc::new(Node::Succeed(Slot::Once(Arc::default())))))
}

/// One step of an effect description.
#[derive(Clone)]
pub(crate) enum Node {
    Succeed(Slot),
    FailCause(CauseThunk),
    EffectTotal(Thunk),
    EffectPartial(Thunk),
    FlatMap(Subtree, Continuation),
    Fold(Subtree, CauseHandler, Continuation),
    Provide(Slot, Subtree),
    ReadEnvironment(Reader),
}

impl Node {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Succeed(_) => "Succeed",
            Node::FailCause(_) => "FailCause",
            Node::EffectTotal(_) => "EffectTotal",
            Node::EffectPartial(_) => "EffectPartial",
            Node::FlatMap(..) => "FlatMap",
            Node::Fold(..) => "Fold",
            Node::Provide(..) => "Provide",
            Node::ReadEnvironment(_) => "ReadEnvironment",
        }
    }

    pub(crate) fn succeed_once(value: Value) -> Node {
        Node::Succeed(Slot::once(value))
    }

    pub(crate) fn halt_once(cause: Cause<Value>) -> Node {
        let cell = Mutex::new(Some(cause));
        Node::FailCause(Arc::new(move || {
            let cause = cell.lock().unwrap_or_else(PoisonError::into_inner).take();
            cause.unwrap_or_else(|| Cause::die(RuntimeError::AlreadyConsumed))
        }))
    }

    pub(crate) fn die(error: RuntimeError) -> Node {
        Node::FailCause(Arc::new(move || Cause::die(error.clone())))
    }

    pub(crate) fn flat_map(self, k: Continuation) -> Node {
        Node::FlatMap(Subtree::new(self), k)
    }

    /// Like [`flat_map`](Node::flat_map) for continuations built at run time
    /// around owned values.
    pub(crate) fn flat_map_once<F>(self, k: F) -> Node
    where
        F: FnOnce(Value) -> Node + Send + 'static,
    {
        let cell = Mutex::new(Some(k));
        self.flat_map(Arc::new(move |value| {
            let k = cell.lock().unwrap_or_else(PoisonError::into_inner).take();
            match k {
                Some(k) => k(value),
                None => Node::die(RuntimeError::AlreadyConsumed),
            }
        }))
    }

    pub(crate) fn fold(self, on_cause: CauseHandler, on_success: Continuation) -> Node {
        Node::Fold(Subtree::new(self), on_cause, on_success)
    }

    pub(crate) fn provide(self, env: Slot) -> Node {
        Node::Provide(env, Subtree::new(self))
    }
}

pub(crate) fn erase<T: Send + 'static>(value: T) -> Value {
    Box::new(value)
}

/// Continuation that passes a success value through.
pub(crate) fn pass_through() -> Continuation {
    Arc::new(Node::succeed_once)
}

/// Recover the typed value and continue with it.
pub(crate) fn with_value<T, K>(value: Value, k: K) -> Node
where
    T: 'static,
    K: FnOnce(T) -> Node,
{
    match value.downcast::<T>() {
        Ok(value) => k(*value),
        Err(_) => Node::die(RuntimeError::ValueMismatch {
            expected: any::type_name::<T>(),
        }),
    }
}

pub(crate) fn typed_cause<E: 'static>(cause: Cause<Value>) -> Cause<E> {
    match cause {
        Cause::Fail(value) => match value.downcast::<E>() {
            Ok(error) => Cause::Fail(*error),
            Err(_) => Cause::die(RuntimeError::ValueMismatch {
                expected: any::type_name::<E>(),
            }),
        },
        Cause::Die(defect) => Cause::Die(defect),
    }
}

pub(crate) fn erase_cause<E: Send + 'static>(cause: Cause<E>) -> Cause<Value> {
    cause.map(erase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_slot_yields_a_single_time() {
        let slot = Slot::once(erase(3_i32));
        assert!(slot.take().is_some());
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_shared_slot_yields_fresh_copies() {
        let slot = Slot::shared(String::from("x"));
        for _ in 0..3 {
            let value = slot.take().unwrap();
            assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("x"));
        }
    }

    #[test]
    fn test_dropping_a_deep_chain_does_not_overflow() {
        let mut node = Node::succeed_once(erase(0_u64));
        for _ in 0..200_000 {
            node = node.flat_map(pass_through());
        }
        assert_eq!(node.kind(), "FlatMap");
        drop(node);
    }

    #[test]
    fn test_dropping_nodes_nested_in_continuations_does_not_overflow() {
        let mut node = Node::succeed_once(erase(0_u64));
        for _ in 0..200_000 {
            let next = Subtree::new(node);
            node = Node::succeed_once(erase(1_u64))
                .flat_map(Arc::new(move |_| next.node().clone()));
        }
        drop(node);
        RELEASED.with(|released| assert!(released.borrow().is_none()));
    }

    #[test]
    fn test_with_value_reports_mismatch() {
        let node = with_value(erase(1_u8), |s: String| Node::succeed_once(erase(s)));
        assert_eq!(node.kind(), "FailCause");
    }
}

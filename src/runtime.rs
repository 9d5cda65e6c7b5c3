//! The trampolined interpreter.
//!
//! [`Runtime`] evaluates an effect's node tree with an explicit loop and a
//! heap-allocated frame stack, so neither long `and_then` chains nor deeply
//! nested handlers consume native stack. Each runtime owns its environment
//! stack; independent runs, including concurrent ones on other threads, use
//! independent runtimes.

use std::any::{self, Any};
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::cause::{Cause, Defect};
use crate::effect::node::{typed_cause, CauseHandler, Continuation, Node, Value};
use crate::effect::Effect;
use crate::error::RuntimeError;
use crate::outcome::Outcome;

/// Settings for a [`Runtime`].
///
/// # Example
///
/// ```rust
/// use eddy::{Runtime, RuntimeConfig};
///
/// let config = RuntimeConfig::default()
///     .with_label("checkout")
///     .with_frame_capacity(256);
/// let runtime = Runtime::with_config(config);
/// assert_eq!(runtime.config().label(), "checkout");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    label: Cow<'static, str>,
    frame_capacity: usize,
    environment_capacity: usize,
}

impl RuntimeConfig {
    /// Name recorded on the `run` tracing span.
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Frames preallocated for each run.
    pub fn with_frame_capacity(mut self, capacity: usize) -> Self {
        self.frame_capacity = capacity;
        self
    }

    /// Environment slots preallocated by the runtime.
    pub fn with_environment_capacity(mut self, capacity: usize) -> Self {
        self.environment_capacity = capacity;
        self
    }

    /// The configured label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The configured frame capacity.
    pub fn frame_capacity(&self) -> usize {
        self.frame_capacity
    }

    /// The configured environment capacity.
    pub fn environment_capacity(&self) -> usize {
        self.environment_capacity
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            label: Cow::Borrowed("eddy"),
            frame_capacity: 32,
            environment_capacity: 4,
        }
    }
}

/// Evaluates effects.
///
/// A runtime can be reused for any number of runs; every run starts and ends
/// with the runtime's environment stack in the same state, even when a thunk
/// panics.
///
/// # Example
///
/// ```rust
/// use eddy::{Cause, IO, Outcome, Runtime};
///
/// let mut runtime = Runtime::new();
///
/// let ok = IO::<String, _>::succeed(20).map(|n| n + 1);
/// assert_eq!(runtime.run(&ok), 21);
///
/// let failed = IO::<String, u8>::fail("no".to_string());
/// match runtime.run_outcome(&failed) {
///     Outcome::Failure(Cause::Fail(e)) => assert_eq!(e, "no"),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub struct Runtime {
    config: RuntimeConfig,
    environments: Vec<Value>,
    last_steps: u64,
}

enum Frame {
    Apply(Continuation),
    Fold(CauseHandler, Continuation),
    Restore(usize),
}

enum Step {
    Succeeded(Value),
    Failed(Cause<Value>),
}

impl Runtime {
    /// A runtime with the default configuration.
    pub fn new() -> Self {
        Runtime::with_config(RuntimeConfig::default())
    }

    /// A runtime with the given configuration.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Runtime {
            environments: Vec::with_capacity(config.environment_capacity),
            config,
            last_steps: 0,
        }
    }

    /// The runtime's configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Nodes dispatched by the most recent run.
    pub fn last_run_steps(&self) -> u64 {
        self.last_steps
    }

    /// Run `effect` and return its value.
    ///
    /// # Panics
    ///
    /// A typed failure `e` unwinds with `e` itself as the panic payload. A
    /// defect unwinds with the defect's payload, unchanged. Either can be
    /// recovered with [`std::panic::catch_unwind`].
    pub fn run<E, A>(&mut self, effect: &Effect<(), E, A>) -> A
    where
        E: Send + 'static,
        A: 'static,
    {
        match self.run_outcome(effect) {
            Outcome::Success(value) => value,
            Outcome::Failure(Cause::Fail(error)) => panic::resume_unwind(Box::new(error)),
            Outcome::Failure(Cause::Die(defect)) => panic::resume_unwind(defect.into_payload()),
        }
    }

    /// Run `effect` and reify how it ended.
    ///
    /// Panics from [`effect_total`](Effect::effect_total) thunks and from
    /// continuations are not defects and still unwind.
    pub fn run_outcome<E, A>(&mut self, effect: &Effect<(), E, A>) -> Outcome<Cause<E>, A>
    where
        E: Send + 'static,
        A: 'static,
    {
        match self.evaluate(effect.node().clone()) {
            Step::Succeeded(value) => match value.downcast::<A>() {
                Ok(value) => Outcome::Success(*value),
                Err(_) => Outcome::Failure(Cause::die(RuntimeError::ValueMismatch {
                    expected: any::type_name::<A>(),
                })),
            },
            Step::Failed(cause) => Outcome::Failure(typed_cause::<E>(cause)),
        }
    }

    fn evaluate(&mut self, root: Node) -> Step {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("run", label = %self.config.label).entered();

        let mut scope = EnvironmentScope::new(&mut self.environments);
        let mut frames: Vec<Frame> = Vec::with_capacity(self.config.frame_capacity);
        let mut steps: u64 = 0;
        let mut current = root;

        let finished = 'run: loop {
            steps += 1;
            let step = match current {
                Node::Succeed(slot) => match slot.take() {
                    Some(value) => Step::Succeeded(value),
                    None => Step::Failed(Cause::die(RuntimeError::AlreadyConsumed)),
                },
                Node::FailCause(cause) => Step::Failed(cause()),
                Node::EffectTotal(thunk) => Step::Succeeded(thunk()),
                Node::EffectPartial(thunk) => {
                    match panic::catch_unwind(AssertUnwindSafe(|| thunk())) {
                        Ok(value) => Step::Succeeded(value),
                        Err(payload) => {
                            #[cfg(feature = "tracing")]
                            tracing::trace!("partial effect panicked, raising a defect");
                            Step::Failed(Cause::Die(Defect::from_payload(payload)))
                        }
                    }
                }
                Node::FlatMap(inner, k) => {
                    frames.push(Frame::Apply(k));
                    current = inner.into_node();
                    continue 'run;
                }
                Node::Fold(inner, on_cause, on_success) => {
                    frames.push(Frame::Fold(on_cause, on_success));
                    current = inner.into_node();
                    continue 'run;
                }
                Node::Provide(env, inner) => match env.take() {
                    Some(env) => {
                        frames.push(Frame::Restore(scope.depth()));
                        scope.push(env);
                        #[cfg(feature = "tracing")]
                        tracing::trace!(depth = scope.depth(), "environment bound");
                        current = inner.into_node();
                        continue 'run;
                    }
                    None => Step::Failed(Cause::die(RuntimeError::AlreadyConsumed)),
                },
                Node::ReadEnvironment(read) => {
                    current = read(scope.top());
                    continue 'run;
                }
            };

            loop {
                match frames.pop() {
                    None => break 'run step,
                    Some(Frame::Restore(depth)) => {
                        scope.truncate(depth);
                        #[cfg(feature = "tracing")]
                        tracing::trace!(depth, "environment restored");
                    }
                    Some(Frame::Apply(k)) => {
                        if let Step::Succeeded(value) = step {
                            current = k(value);
                            continue 'run;
                        }
                    }
                    Some(Frame::Fold(on_cause, on_success)) => {
                        current = match step {
                            Step::Succeeded(value) => on_success(value),
                            Step::Failed(cause) => on_cause(cause),
                        };
                        continue 'run;
                    }
                }
            }
        };

        drop(scope);
        self.last_steps = steps;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            steps,
            succeeded = matches!(finished, Step::Succeeded(_)),
            "run finished"
        );
        finished
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("bound_environments", &self.environments.len())
            .field("last_steps", &self.last_steps)
            .finish()
    }
}

/// The environment stack of one run. Dropping it, including during unwinding,
/// restores the stack to the depth it had when the run started.
struct EnvironmentScope<'a> {
    stack: &'a mut Vec<Value>,
    base: usize,
}

impl<'a> EnvironmentScope<'a> {
    fn new(stack: &'a mut Vec<Value>) -> Self {
        let base = stack.len();
        EnvironmentScope { stack, base }
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn push(&mut self, env: Value) {
        self.stack.push(env);
    }

    fn top(&self) -> Option<&(dyn Any + Send)> {
        self.stack.last().map(|env| env.as_ref())
    }

    fn truncate(&mut self, depth: usize) {
        self.stack.truncate(depth);
    }
}

impl Drop for EnvironmentScope<'_> {
    fn drop(&mut self) {
        self.stack.truncate(self.base);
    }
}

impl<E, A> Effect<(), E, A>
where
    E: Send + 'static,
    A: 'static,
{
    /// Run on a fresh [`Runtime`]. See [`Runtime::run`] for how failures surface.
    pub fn run(&self) -> A {
        Runtime::new().run(self)
    }

    /// Run on a fresh [`Runtime`] and reify how it ended.
    pub fn run_outcome(&self) -> Outcome<Cause<E>, A> {
        Runtime::new().run_outcome(self)
    }
}

impl<R, E, A> Effect<R, E, A>
where
    R: Send + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Provide `env` and run on a fresh [`Runtime`].
    pub fn run_with(&self, env: R) -> A {
        self.clone().provide_once::<()>(env).run()
    }
}

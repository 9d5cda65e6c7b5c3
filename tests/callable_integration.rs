//! Integration tests for converting between plain functions and effects.

use proptest::prelude::*;
use std::convert::Infallible;
use std::panic;

use eddy::testing::capture_defect;
use eddy::{Effect, FunctionArguments, Outcome, URIO};

type Args3 = FunctionArguments<(i32, String, f64)>;

fn describe(arg_1: i32, arg_2: String, arg_3: f64) -> String {
    format!("{} {} {}", arg_1, arg_2, arg_3)
}

#[test]
fn test_from_callable_reads_positional_arguments() {
    let program: Effect<Args3, Infallible, String> = Effect::from_callable(describe);
    let args = FunctionArguments::new((42, "foo".to_string(), 2.5));
    assert_eq!(program.run_with(args), "42 foo 2.5");
}

#[test]
fn test_to_callable_round_trip() {
    let program: Effect<Args3, Infallible, String> = Effect::from_callable(describe);
    let g = program.to_callable();
    assert_eq!(g((42, "foo".to_string(), 2.5)), describe(42, "foo".to_string(), 2.5));
    // callable more than once
    assert_eq!(g((1, "bar".to_string(), 0.5)), "1 bar 0.5");
}

proptest! {
    #[test]
    fn prop_to_callable_inverts_from_callable(
        arg_1 in any::<i32>(),
        arg_2 in ".{0,12}",
        arg_3 in any::<f64>()
    ) {
        let program: Effect<Args3, Infallible, String> = Effect::from_callable(describe);
        let g = program.to_callable();
        prop_assert_eq!(g((arg_1, arg_2.clone(), arg_3)), describe(arg_1, arg_2, arg_3));
    }

    #[test]
    fn prop_named_arguments_reach_the_callable(name in "[a-z]{1,8}", value in any::<u32>()) {
        let lookup = name.clone();
        let program: Effect<FunctionArguments<()>, Infallible, Option<u32>> =
            Effect::from_callable_named(move |call: &FunctionArguments<()>| {
                call.named.get::<u32>(&lookup).copied()
            });
        let g = program.to_callable_named();
        prop_assert_eq!(g(FunctionArguments::new(()).with_named(name, value)), Some(value));
    }
}

#[test]
fn test_nullary_callable() {
    let program: Effect<FunctionArguments<()>, Infallible, u8> = Effect::from_callable(|| 7_u8);
    assert_eq!(program.to_callable()(()), 7);
}

#[test]
fn test_named_arguments_round_trip() {
    let program: Effect<FunctionArguments<(i32,)>, Infallible, String> =
        Effect::from_callable_named(|call: &FunctionArguments<(i32,)>| {
            let scale = call.named.get::<f64>("scale").copied().unwrap_or(1.0);
            format!("{}", f64::from(call.args.0) * scale)
        });
    let g = program.to_callable_named();
    assert_eq!(g(FunctionArguments::new((4,)).with_named("scale", 2.5_f64)), "10");
    assert_eq!(g(FunctionArguments::new((4,))), "4");
}

#[test]
fn test_function_arguments_keep_names_in_order() {
    let call = FunctionArguments::new(())
        .with_named("volume", 11_u32)
        .with_named("animal", "cat");
    assert_eq!(call.named.names().collect::<Vec<_>>(), vec!["animal", "volume"]);
    assert_eq!(call.named.get::<u32>("volume"), Some(&11));
    assert_eq!(call.named.get::<i64>("volume"), None);
    assert!(call.named.contains("animal"));
    assert_eq!(call.named.len(), 2);
    assert_eq!(format!("{:?}", call.named), r#"{"animal", "volume"}"#);
}

#[derive(Debug, Clone)]
struct Cat;

impl Cat {
    fn meow(&self, volume: u32) -> &'static str {
        if volume < 10 {
            "meow"
        } else {
            "MEOW!"
        }
    }
}

#[test]
fn test_method_callable_with_swapped_environments() {
    let meow = URIO::<Cat, Cat>::environment()
        .map(|cat| {
            Effect::<FunctionArguments<(u32,)>, Infallible, &'static str>::from_callable(
                move |volume: u32| cat.meow(volume),
            )
        })
        .swap_environments::<Infallible>()
        .to_callable();

    assert_eq!(meow((11,)).run_with(Cat), "MEOW!");
    assert_eq!(meow((3,)).run_with(Cat), "meow");
}

#[test]
fn test_method_callable_with_named_arguments() {
    let meow = URIO::<Cat, Cat>::environment()
        .map(|cat| {
            Effect::<FunctionArguments<()>, Infallible, &'static str>::from_callable_named(
                move |call: &FunctionArguments<()>| {
                    cat.meow(call.named.get::<u32>("volume").copied().unwrap_or(0))
                },
            )
        })
        .swap_environments::<Infallible>()
        .to_callable_named();

    let call = FunctionArguments::new(()).with_named("volume", 11_u32);
    assert_eq!(meow(call).run_with(Cat), "MEOW!");
}

#[derive(Debug, Clone, PartialEq)]
struct SomeError(String);

#[derive(Debug, Clone)]
struct SomeApi;

impl SomeApi {
    fn thing_that_may_fail(&self, _bippy: &str) -> i32 {
        panic::panic_any(SomeError("Murphy's Law".to_string()))
    }
}

#[test]
fn test_panicking_callable_is_narrowed_by_catch() {
    let safer_thing = URIO::<SomeApi, SomeApi>::environment()
        .map(|api| {
            Effect::<FunctionArguments<(String,)>, SomeError, i32>::from_callable(
                move |bippy: String| api.thing_that_may_fail(&bippy),
            )
            .catch::<SomeError>()
            .either::<Infallible>()
        })
        .swap_environments::<Infallible>()
        .to_callable();

    assert_eq!(
        safer_thing(("bippy".to_string(),)).run_with(SomeApi),
        Outcome::failure(SomeError("Murphy's Law".to_string()))
    );
}

#[test]
fn test_uncaught_callable_panic_escapes_the_call() {
    let program: Effect<FunctionArguments<(String,)>, SomeError, i32> =
        Effect::from_callable(|bippy: String| SomeApi.thing_that_may_fail(&bippy));
    let g = program.to_callable();
    let defect = capture_defect(|| g(("bippy".to_string(),))).unwrap_err();
    assert_eq!(
        defect.downcast_ref::<SomeError>(),
        Some(&SomeError("Murphy's Law".to_string()))
    );
}

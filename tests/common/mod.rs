#![allow(dead_code)]

use oneconfig_commands::builder::*;
use oneconfig_commands::{CommandError, CommandTree, DispatchError, ParserRegistry, Value};

/// The reference fixture: a `test` command with overloads at the root and
/// under the `something` subcommand.
pub fn test_tree() -> CommandTree {
    let parsers = ParserRegistry::with_defaults();
    CommandBuilder::command(&parsers, "test")
        .alias("t")
        .then(
            runs("chicken")
                .with([int_arg(), int_arg()])
                .does(|args| Ok(Some(Value::new(args.get::<i32>(0)? + args.get::<i32>(1)?)))),
        )
        .and_then(|b| b.then(runs("bob").with([short_arg()]).does(|_| Ok(None))))
        .and_then(|b| {
            b.then(
                runs("pair")
                    .with([int_arg(), int_arg()])
                    .does(|_| Ok(Some(Value::new("ints".to_string())))),
            )
        })
        .and_then(|b| {
            b.then(
                runs("pair")
                    .with([string_arg(), string_arg()])
                    .does(|_| Ok(Some(Value::new("strings".to_string())))),
            )
        })
        .and_then(|b| {
            b.then(
                runs("say")
                    .with([greedy_string_arg()])
                    .does(|args| Ok(Some(Value::new(args.get::<String>(0)?)))),
            )
        })
        .and_then(|b| {
            b.subcommand("something", |sub| {
                sub.alias("sth")
                    .then(runs("a").with([string_arg()]).does(|_| Ok(None)))?
                    .then(
                        runs("a")
                            .with([string_arg(), string_arg()])
                            .does(|_| Ok(Some(Value::new(0i32)))),
                    )?
                    .then(runs("gar").with([bool_arg(), bool_arg(), bool_arg()]).does(|_| Ok(None)))
            })
        })
        .expect("fixture tree builds")
        .build()
}

pub fn int_result(result: Result<Option<Value>, CommandError>) -> Option<i32> {
    result
        .expect("command executes")
        .and_then(|value| value.downcast::<i32>().ok())
}

pub fn string_result(result: Result<Option<Value>, CommandError>) -> Option<String> {
    result
        .expect("command executes")
        .and_then(|value| value.downcast::<String>().ok())
}

pub fn is_unknown_command(result: &Result<Option<Value>, CommandError>) -> bool {
    matches!(
        result,
        Err(CommandError::Dispatch(DispatchError::UnknownCommand { .. }))
    )
}

pub fn is_no_matching_overload(result: &Result<Option<Value>, CommandError>) -> bool {
    matches!(
        result,
        Err(CommandError::Dispatch(DispatchError::NoMatchingOverload { .. }))
    )
}

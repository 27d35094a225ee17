use crate::{
    arguments::{Arguments, OutOfTokens},
    value::Value,
};
use std::any::{type_name, Any, TypeId};
use std::str::FromStr;
use thiserror::Error;

/// Why a parser rejected its input. Overload resolution treats every variant
/// as "try the next leaf".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("Not enough arguments")]
    OutOfTokens,
    #[error("'{token}' is not a valid {expected}")]
    Invalid {
        token: String,
        expected: &'static str,
    },
}

impl From<OutOfTokens> for ParseFailure {
    fn from(_: OutOfTokens) -> Self {
        ParseFailure::OutOfTokens
    }
}

pub type ParseResult<T> = Result<T, ParseFailure>;

/// Describes the slot a completion request is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub index: usize,
    pub label: Option<String>,
    pub greedy: bool,
}

/// Converts tokens into one typed value.
///
/// Parsers are registered once and shared by every leaf that declares their
/// output type, so they must not keep per-call state.
pub trait ArgumentParser: Send + Sync + 'static {
    type Output: Any + Send + Sync;

    /// Short display name, used in usage lines and by declarative factories.
    fn name(&self) -> &'static str;

    fn parse(&self, args: &mut Arguments<'_>) -> ParseResult<Self::Output>;

    /// Suggestions for the token under the cursor, which may be partial.
    fn complete(&self, _args: &mut Arguments<'_>, _slot: &SlotInfo) -> Vec<String> {
        Vec::new()
    }
}

/// Object-safe view of an [`ArgumentParser`], as stored in the registry.
pub trait DynArgumentParser: Send + Sync {
    fn target(&self) -> TypeId;
    fn target_name(&self) -> &'static str;
    fn display_name(&self) -> &'static str;
    fn parse_value(&self, args: &mut Arguments<'_>) -> ParseResult<Value>;
    fn suggest(&self, args: &mut Arguments<'_>, slot: &SlotInfo) -> Vec<String>;
}

impl<P: ArgumentParser> DynArgumentParser for P {
    fn target(&self) -> TypeId {
        TypeId::of::<P::Output>()
    }

    fn target_name(&self) -> &'static str {
        type_name::<P::Output>()
    }

    fn display_name(&self) -> &'static str {
        self.name()
    }

    fn parse_value(&self, args: &mut Arguments<'_>) -> ParseResult<Value> {
        self.parse(args).map(Value::new)
    }

    fn suggest(&self, args: &mut Arguments<'_>, slot: &SlotInfo) -> Vec<String> {
        self.complete(args, slot)
    }
}

fn parse_number<T: FromStr>(args: &mut Arguments<'_>, expected: &'static str) -> ParseResult<T> {
    let token = args.poll()?;
    token.parse::<T>().map_err(|_| ParseFailure::Invalid {
        token: token.to_string(),
        expected,
    })
}

macro_rules! number_parser {
    ($parser:ident, $type:ty, $name:literal) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $parser;

        impl ArgumentParser for $parser {
            type Output = $type;

            fn name(&self) -> &'static str {
                $name
            }

            fn parse(&self, args: &mut Arguments<'_>) -> ParseResult<$type> {
                parse_number(args, $name)
            }
        }
    };
}

number_parser!(IntegerParser, i32, "int");
number_parser!(ShortParser, i16, "short");
number_parser!(LongParser, i64, "long");
number_parser!(FloatParser, f32, "float");
number_parser!(DoubleParser, f64, "double");

/// Reads "true" (in any case) as true and every other token as false.
/// Only running out of tokens fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanParser;

impl ArgumentParser for BooleanParser {
    type Output = bool;

    fn name(&self) -> &'static str {
        "boolean"
    }

    fn parse(&self, args: &mut Arguments<'_>) -> ParseResult<bool> {
        Ok(args.poll()?.eq_ignore_ascii_case("true"))
    }

    fn complete(&self, args: &mut Arguments<'_>, _slot: &SlotInfo) -> Vec<String> {
        let partial = args.peek().unwrap_or_default().to_ascii_lowercase();
        let matching: Vec<&str> = ["true", "false"]
            .into_iter()
            .filter(|candidate| candidate.starts_with(&partial))
            .collect();
        match matching.as_slice() {
            [single] => vec![single.to_string()],
            _ => vec!["true".to_string(), "false".to_string()],
        }
    }
}

/// One token, or the rest of the line when the cursor is greedy.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringParser;

impl ArgumentParser for StringParser {
    type Output = String;

    fn name(&self) -> &'static str {
        "string"
    }

    fn parse(&self, args: &mut Arguments<'_>) -> ParseResult<String> {
        if args.is_greedy() {
            Ok(args.take_rest())
        } else {
            Ok(args.poll()?.to_string())
        }
    }
}

type ChoiceSource<T> = Box<dyn Fn() -> Vec<(String, T)> + Send + Sync>;

/// Looks a token up in a named set of values, ignoring case.
///
/// The set is either fixed at construction or produced on every call, which
/// suits lookups like "currently online players".
pub struct ChoiceParser<T> {
    name: &'static str,
    source: ChoiceSource<T>,
}

impl<T: Clone + Send + Sync + 'static> ChoiceParser<T> {
    pub fn fixed<S: Into<String>>(
        name: &'static str,
        choices: impl IntoIterator<Item = (S, T)>,
    ) -> Self {
        let choices: Vec<(String, T)> = choices
            .into_iter()
            .map(|(label, value)| (label.into(), value))
            .collect();
        Self {
            name,
            source: Box::new(move || choices.clone()),
        }
    }

    pub fn dynamic(
        name: &'static str,
        source: impl Fn() -> Vec<(String, T)> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            source: Box::new(source),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ArgumentParser for ChoiceParser<T> {
    type Output = T;

    fn name(&self) -> &'static str {
        self.name
    }

    fn parse(&self, args: &mut Arguments<'_>) -> ParseResult<T> {
        let token = args.poll()?;
        (self.source)()
            .into_iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(token))
            .map(|(_, value)| value)
            .ok_or_else(|| ParseFailure::Invalid {
                token: token.to_string(),
                expected: self.name,
            })
    }

    fn complete(&self, args: &mut Arguments<'_>, _slot: &SlotInfo) -> Vec<String> {
        let partial = args.peek().unwrap_or_default().to_ascii_lowercase();
        (self.source)()
            .into_iter()
            .map(|(label, _)| label)
            .filter(|label| label.to_ascii_lowercase().starts_with(&partial))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    fn slot() -> SlotInfo {
        SlotInfo {
            index: 0,
            label: None,
            greedy: false,
        }
    }

    #[test]
    fn numbers_fail_without_panicking() {
        let input = tokens(&["12", "x", "3.5"]);
        let mut args = Arguments::new(&input);
        assert_eq!(IntegerParser.parse(&mut args), Ok(12));
        assert_eq!(
            IntegerParser.parse(&mut args),
            Err(ParseFailure::Invalid {
                token: "x".to_string(),
                expected: "int"
            })
        );
        assert_eq!(DoubleParser.parse(&mut args), Ok(3.5));
        assert_eq!(FloatParser.parse(&mut args), Err(ParseFailure::OutOfTokens));
    }

    #[test]
    fn short_rejects_out_of_range() {
        let input = tokens(&["40000"]);
        let mut args = Arguments::new(&input);
        assert!(ShortParser.parse(&mut args).is_err());
    }

    #[test]
    fn boolean_is_lenient() {
        let input = tokens(&["TRUE", "yes", "false"]);
        let mut args = Arguments::new(&input);
        assert_eq!(BooleanParser.parse(&mut args), Ok(true));
        assert_eq!(BooleanParser.parse(&mut args), Ok(false));
        assert_eq!(BooleanParser.parse(&mut args), Ok(false));
    }

    #[test]
    fn boolean_completion() {
        let complete = |partial: &str| {
            let input = tokens(&[partial]);
            BooleanParser.complete(&mut Arguments::new(&input), &slot())
        };
        assert_eq!(complete("tr"), vec!["true"]);
        assert_eq!(complete("F"), vec!["false"]);
        assert_eq!(complete(""), vec!["true", "false"]);
        assert_eq!(complete("x"), vec!["true", "false"]);
    }

    #[test]
    fn string_respects_greedy_flag() {
        let input = tokens(&["a", "b", "c"]);
        let mut args = Arguments::new(&input);
        assert_eq!(StringParser.parse(&mut args), Ok("a".to_string()));
        args.set_greedy(true);
        assert_eq!(StringParser.parse(&mut args), Ok("b c".to_string()));
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Creative,
        Spectator,
    }

    #[test]
    fn choices_match_ignoring_case() {
        let parser = ChoiceParser::fixed("mode", [("creative", Mode::Creative), ("spectator", Mode::Spectator)]);
        let input = tokens(&["Creative", "adventure"]);
        let mut args = Arguments::new(&input);
        assert_eq!(parser.parse(&mut args), Ok(Mode::Creative));
        assert!(parser.parse(&mut args).is_err());

        let partial = tokens(&["sp"]);
        assert_eq!(
            parser.complete(&mut Arguments::new(&partial), &slot()),
            vec!["spectator"]
        );
    }

    #[test]
    fn dynamic_choices_are_read_per_call() {
        use std::sync::{Arc, Mutex};

        let online = Arc::new(Mutex::new(vec!["alice".to_string()]));
        let source = Arc::clone(&online);
        let parser = ChoiceParser::dynamic("player", move || {
            source
                .lock()
                .map(|names| names.iter().map(|n| (n.clone(), n.clone())).collect())
                .unwrap_or_default()
        });

        let input = tokens(&["bob"]);
        assert!(parser.parse(&mut Arguments::new(&input)).is_err());
        online.lock().unwrap().push("bob".to_string());
        assert_eq!(parser.parse(&mut Arguments::new(&input)), Ok("bob".to_string()));
    }
}

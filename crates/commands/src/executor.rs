use crate::{
    argument_parser::{ParseFailure, ParseResult},
    argument_set::ArgumentSet,
    arguments::Arguments,
    error::{CommandError, CommandResult, DispatchError},
    node::{BoundSlot, CommandNode, Leaf},
    tree::{to_tokens, CommandTree},
    value::Value,
};
use tracing::{debug, trace};

enum Resolution<'a> {
    Matched { leaf: &'a Leaf, values: Vec<Value> },
    NoCandidates,
    NoOverload,
}

impl CommandTree {
    /// Runs the leaf matching `tokens` (given without the command name) and
    /// returns whatever it produced.
    pub fn execute<S: AsRef<str>>(&self, tokens: &[S]) -> CommandResult<Option<Value>> {
        let tokens = to_tokens(tokens);
        let descent = self.descend(&tokens);
        let remaining = &tokens[descent.consumed..];

        match resolve(descent.node, remaining) {
            Resolution::Matched { leaf, values } => {
                debug!(
                    "Executing /{} with {} argument(s)",
                    descent.path.join(" "),
                    values.len()
                );
                (leaf.executor)(&ArgumentSet::new(values)).map_err(CommandError::Execution)
            }
            Resolution::NoCandidates if !remaining.is_empty() => {
                Err(DispatchError::UnknownCommand {
                    path: descent.path,
                    token: remaining[0].clone(),
                }
                .into())
            }
            Resolution::NoCandidates | Resolution::NoOverload => {
                Err(DispatchError::NoMatchingOverload {
                    path: descent.path,
                    tokens: remaining.to_vec(),
                }
                .into())
            }
        }
    }
}

/// The tokens a leaf would parse, or `None` if the leaf is named and the next
/// token is not one of its names.
pub(crate) fn candidate_tokens<'t>(leaf: &Leaf, tokens: &'t [String]) -> Option<&'t [String]> {
    if leaf.names.is_empty() {
        return Some(tokens);
    }
    match tokens.split_first() {
        Some((first, rest)) if leaf.answers_to(first) => Some(rest),
        _ => None,
    }
}

/// Parses `tokens` into one value per slot on a fresh cursor. Every token
/// must be consumed.
pub(crate) fn parse_slots(slots: &[BoundSlot], tokens: &[String]) -> ParseResult<Vec<Value>> {
    let mut args = Arguments::new(tokens);
    let last = slots.len().saturating_sub(1);
    let mut values = Vec::with_capacity(slots.len());

    for (index, slot) in slots.iter().enumerate() {
        args.set_greedy(slot.greedy && index == last);
        values.push(slot.parser.parse_value(&mut args)?);
    }

    match args.peek() {
        Some(token) => Err(ParseFailure::Invalid {
            token: token.to_string(),
            expected: "end of input",
        }),
        None => Ok(values),
    }
}

fn resolve<'a>(node: &'a CommandNode, tokens: &[String]) -> Resolution<'a> {
    let mut had_candidate = false;

    for (index, leaf) in node.leaves.iter().enumerate() {
        let Some(arg_tokens) = candidate_tokens(leaf, tokens) else {
            continue;
        };
        had_candidate = true;

        if !leaf.accepts_count(arg_tokens.len()) {
            trace!(
                "Overload {} of '{}' takes {} argument(s), got {}",
                index,
                node.name,
                leaf.slots.len(),
                arg_tokens.len()
            );
            continue;
        }

        match parse_slots(&leaf.slots, arg_tokens) {
            Ok(values) => return Resolution::Matched { leaf, values },
            Err(failure) => trace!("Overload {} of '{}' rejected: {}", index, node.name, failure),
        }
    }

    if had_candidate {
        Resolution::NoOverload
    } else {
        Resolution::NoCandidates
    }
}

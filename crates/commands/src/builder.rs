use crate::{
    argument_set::ArgumentSet,
    error::{CommandResult, RegistrationError},
    node::{BoundSlot, CommandNode, Executor, Leaf},
    parser_registry::{ParserRegistry, SharedParser},
    tree::CommandTree,
    value::Value,
};
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SlotTarget {
    Type { id: TypeId, name: &'static str },
    Named(String),
}

/// An argument declaration that has not been bound to a parser yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    target: SlotTarget,
    label: Option<String>,
    greedy: bool,
}

impl Slot {
    pub fn of<T: Any>() -> Self {
        Self {
            target: SlotTarget::Type {
                id: TypeId::of::<T>(),
                name: type_name::<T>(),
            },
            label: None,
            greedy: false,
        }
    }

    /// Captures the rest of the line. Only valid as the last slot.
    pub fn greedy<T: Any>() -> Self {
        Self {
            greedy: true,
            ..Self::of::<T>()
        }
    }

    /// A slot bound by parser display name, e.g. `"int"`.
    pub fn named(parser: impl Into<String>) -> Self {
        Self {
            target: SlotTarget::Named(parser.into()),
            label: None,
            greedy: false,
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn into_greedy(mut self) -> Self {
        self.greedy = true;
        self
    }

    fn bind(self, parsers: &ParserRegistry) -> Result<BoundSlot, RegistrationError> {
        let parser: SharedParser = match &self.target {
            SlotTarget::Type { id, name } => parsers.resolve_type(*id, name)?,
            SlotTarget::Named(name) => parsers.resolve_named(name)?,
        };
        Ok(BoundSlot {
            parser,
            label: self.label,
            greedy: self.greedy,
        })
    }
}

pub fn int_arg() -> Slot {
    Slot::of::<i32>()
}

pub fn short_arg() -> Slot {
    Slot::of::<i16>()
}

pub fn long_arg() -> Slot {
    Slot::of::<i64>()
}

pub fn float_arg() -> Slot {
    Slot::of::<f32>()
}

pub fn double_arg() -> Slot {
    Slot::of::<f64>()
}

pub fn bool_arg() -> Slot {
    Slot::of::<bool>()
}

pub fn string_arg() -> Slot {
    Slot::of::<String>()
}

pub fn greedy_string_arg() -> Slot {
    Slot::greedy::<String>()
}

/// A leaf under construction: names and slots, but no function yet.
#[derive(Debug, Clone)]
pub struct LeafBuilder {
    names: Vec<String>,
    slots: Vec<Slot>,
    description: Option<String>,
}

/// Starts a leaf invoked as `name <args...>` at the node it is attached to.
pub fn runs(name: impl Into<String>) -> LeafBuilder {
    LeafBuilder {
        names: vec![name.into()],
        slots: Vec::new(),
        description: None,
    }
}

/// Starts a leaf invoked directly at the node it is attached to.
pub fn runs_default() -> LeafBuilder {
    LeafBuilder {
        names: Vec::new(),
        slots: Vec::new(),
        description: None,
    }
}

impl LeafBuilder {
    /// Adds another name the same leaf answers to.
    pub fn or(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn with(mut self, slots: impl IntoIterator<Item = Slot>) -> Self {
        self.slots.extend(slots);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn does<F>(self, executor: F) -> LeafDefinition
    where
        F: Fn(&ArgumentSet) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        self.does_shared(Arc::new(executor))
    }

    pub fn does_shared(self, executor: Executor) -> LeafDefinition {
        LeafDefinition {
            leaf: self,
            executor,
        }
    }
}

/// A complete leaf, ready to be attached with [`CommandBuilder::then`].
#[derive(Clone)]
pub struct LeafDefinition {
    leaf: LeafBuilder,
    executor: Executor,
}

/// Fluent construction of a [`CommandTree`].
///
/// Parsers are resolved as each leaf is attached, so a missing parser fails
/// the `then` call rather than the first execution.
#[derive(Clone)]
pub struct CommandBuilder {
    parsers: Arc<ParserRegistry>,
    node: CommandNode,
}

impl CommandBuilder {
    pub fn command(parsers: &ParserRegistry, name: impl Into<String>) -> Self {
        Self {
            parsers: Arc::new(parsers.clone()),
            node: CommandNode::new(name),
        }
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.node.add_alias(alias);
        self
    }

    pub fn then(mut self, definition: LeafDefinition) -> CommandResult<Self> {
        let LeafDefinition { leaf, executor } = definition;
        let leaf_name = leaf
            .names
            .first()
            .cloned()
            .unwrap_or_else(|| self.node.name().to_string());

        let slots = leaf
            .slots
            .into_iter()
            .map(|slot| slot.bind(&self.parsers))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(slot) = slots.iter().rev().skip(1).find(|slot| slot.greedy) {
            return Err(RegistrationError::GreedySlotNotLast {
                leaf: leaf_name,
                slot: slot.display_name().to_string(),
            }
            .into());
        }

        debug!(
            "Registered '{}' under '{}' with {} argument(s)",
            leaf_name,
            self.node.name(),
            slots.len()
        );
        self.node.add_leaf(Leaf {
            names: leaf.names,
            slots,
            description: leaf.description,
            executor,
        })?;
        Ok(self)
    }

    /// Attaches leaves to the child `name`, creating it if it does not exist.
    pub fn subcommand<F>(mut self, name: &str, define: F) -> CommandResult<Self>
    where
        F: FnOnce(CommandBuilder) -> CommandResult<CommandBuilder>,
    {
        let child = self.node.child_entry(name)?;
        let scoped = CommandBuilder {
            parsers: Arc::clone(&self.parsers),
            node: std::mem::replace(child, CommandNode::new(name)),
        };

        let scoped = define(scoped)?;
        *self.node.child_entry(name)? = scoped.node;
        self.node.index_aliases(name)?;
        Ok(self)
    }

    pub fn build(self) -> CommandTree {
        CommandTree::new(self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;

    fn nothing(_: &ArgumentSet) -> anyhow::Result<Option<Value>> {
        Ok(None)
    }

    #[test]
    fn unknown_parser_fails_at_build_time() {
        struct Unregistered;

        let parsers = ParserRegistry::with_defaults();
        let result = CommandBuilder::command(&parsers, "test")
            .then(runs("x").with([Slot::of::<Unregistered>()]).does(nothing));
        assert!(matches!(
            result,
            Err(CommandError::Registration(RegistrationError::NoParserFound { .. }))
        ));
    }

    #[test]
    fn greedy_slot_must_be_last() {
        let parsers = ParserRegistry::with_defaults();
        let result = CommandBuilder::command(&parsers, "test").then(
            runs("say")
                .with([greedy_string_arg().labeled("message"), int_arg()])
                .does(nothing),
        );
        assert!(matches!(
            result,
            Err(CommandError::Registration(RegistrationError::GreedySlotNotLast { leaf, slot }))
                if leaf == "say" && slot == "message"
        ));
    }

    #[test]
    fn leaf_names_cannot_shadow_subcommands() {
        let parsers = ParserRegistry::with_defaults();
        let result = CommandBuilder::command(&parsers, "test")
            .subcommand("tp", |b| b.then(runs_default().does(nothing)))
            .and_then(|b| b.then(runs("tp").with([int_arg()]).does(nothing)));
        assert!(matches!(
            result,
            Err(CommandError::Registration(RegistrationError::DuplicateName { name, .. })) if name == "tp"
        ));
    }

    #[test]
    fn sibling_aliases_must_be_unique() {
        let parsers = ParserRegistry::with_defaults();
        let result = CommandBuilder::command(&parsers, "test")
            .subcommand("teleport", |b| b.alias("tp").then(runs_default().does(nothing)))
            .and_then(|b| b.subcommand("tpa", |b| b.alias("tp").then(runs_default().does(nothing))));
        assert!(matches!(
            result,
            Err(CommandError::Registration(RegistrationError::DuplicateName { name, .. })) if name == "tp"
        ));
    }

    #[test]
    fn subcommand_is_reused() {
        let parsers = ParserRegistry::with_defaults();
        let tree = CommandBuilder::command(&parsers, "test")
            .subcommand("sub", |b| b.then(runs("a").does(nothing)))
            .and_then(|b| b.subcommand("sub", |b| b.then(runs("b").does(nothing))))
            .unwrap()
            .build();
        assert_eq!(tree.root().children().len(), 1);
        assert_eq!(tree.root().children()[0].leaves().len(), 2);
    }

    #[test]
    fn replacing_a_parser_does_not_rebind_built_leaves() {
        use crate::argument_parser::{ArgumentParser, ParseResult};
        use crate::arguments::Arguments;

        struct Shout;

        impl ArgumentParser for Shout {
            type Output = String;

            fn name(&self) -> &'static str {
                "shout"
            }

            fn parse(&self, args: &mut Arguments<'_>) -> ParseResult<String> {
                Ok(args.poll()?.to_uppercase())
            }
        }

        let mut parsers = ParserRegistry::with_defaults();
        let echo = || {
            runs("echo")
                .with([string_arg()])
                .does(|args| Ok(Some(Value::new(args.get::<String>(0)?))))
        };
        let before = CommandBuilder::command(&parsers, "test")
            .then(echo())
            .unwrap()
            .build();
        parsers.register(Shout);
        let after = CommandBuilder::command(&parsers, "test")
            .then(echo())
            .unwrap()
            .build();

        let run = |tree: &CommandTree| {
            tree.execute(&["echo", "hi"])
                .unwrap()
                .and_then(|value| value.downcast::<String>().ok())
        };
        assert_eq!(run(&before).as_deref(), Some("hi"));
        assert_eq!(run(&after).as_deref(), Some("HI"));
    }
}

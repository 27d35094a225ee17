use crate::{
    argument_set::ArgumentSet,
    builder::{runs, runs_default, CommandBuilder, Slot},
    error::{CommandResult, RegistrationError},
    node::Executor,
    parser_registry::ParserRegistry,
    tree::CommandTree,
    value::Value,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// A strategy for turning some source object into a [`CommandTree`].
///
/// `Ok(None)` means the source is not something this factory understands,
/// which lets several factories be tried in turn.
pub trait CommandFactory: Send + Sync {
    fn create(
        &self,
        parsers: &ParserRegistry,
        source: &dyn Any,
    ) -> CommandResult<Option<CommandTree>>;
}

type Define = Box<dyn Fn(CommandBuilder) -> CommandResult<CommandBuilder> + Send + Sync>;

/// A command described by code run against a fresh builder.
pub struct BuilderSource {
    name: String,
    define: Define,
}

impl BuilderSource {
    pub fn new<F>(name: impl Into<String>, define: F) -> Self
    where
        F: Fn(CommandBuilder) -> CommandResult<CommandBuilder> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            define: Box::new(define),
        }
    }
}

/// Understands [`BuilderSource`] and ready-made [`CommandBuilder`] values.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuilderFactory;

impl CommandFactory for BuilderFactory {
    fn create(
        &self,
        parsers: &ParserRegistry,
        source: &dyn Any,
    ) -> CommandResult<Option<CommandTree>> {
        if let Some(source) = source.downcast_ref::<BuilderSource>() {
            let builder = CommandBuilder::command(parsers, source.name.clone());
            return Ok(Some((source.define)(builder)?.build()));
        }
        if let Some(builder) = source.downcast_ref::<CommandBuilder>() {
            return Ok(Some(builder.clone().build()));
        }
        Ok(None)
    }
}

/// Data-only description of a command, suitable for config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub leaves: Vec<LeafSpec>,
    #[serde(default)]
    pub subcommands: Vec<CommandSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafSpec {
    /// Empty for a leaf invoked directly at its node.
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
    pub handler: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Parser display name, e.g. `"int"` or `"string"`.
    pub parser: String,
    pub label: Option<String>,
    #[serde(default)]
    pub greedy: bool,
}

/// Builds trees from [`CommandSpec`] values, looking leaf functions up by
/// handler name.
#[derive(Default, Clone)]
pub struct DeclarativeFactory {
    handlers: FxHashMap<String, Executor>,
}

impl DeclarativeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ArgumentSet) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn build(&self, parsers: &ParserRegistry, spec: &CommandSpec) -> CommandResult<CommandTree> {
        let builder = CommandBuilder::command(parsers, spec.name.clone());
        let builder = self.apply(builder, spec)?;
        debug!("Built command '{}' from its declaration", spec.name);
        Ok(builder.build())
    }

    fn apply(&self, mut builder: CommandBuilder, spec: &CommandSpec) -> CommandResult<CommandBuilder> {
        for alias in &spec.aliases {
            builder = builder.alias(alias.clone());
        }

        for leaf in &spec.leaves {
            let executor = self.handlers.get(&leaf.handler).cloned().ok_or_else(|| {
                RegistrationError::UnknownHandler {
                    handler: leaf.handler.clone(),
                    command: spec.name.clone(),
                }
            })?;

            let mut names = leaf.names.iter();
            let mut leaf_builder = match names.next() {
                Some(first) => runs(first.clone()),
                None => runs_default(),
            };
            for name in names {
                leaf_builder = leaf_builder.or(name.clone());
            }
            if let Some(description) = &leaf.description {
                leaf_builder = leaf_builder.describe(description.clone());
            }

            let slots = leaf.arguments.iter().map(|argument| {
                let slot = Slot::named(argument.parser.clone());
                let slot = match &argument.label {
                    Some(label) => slot.labeled(label.clone()),
                    None => slot,
                };
                if argument.greedy {
                    slot.into_greedy()
                } else {
                    slot
                }
            });

            builder = builder.then(leaf_builder.with(slots).does_shared(executor))?;
        }

        for subcommand in &spec.subcommands {
            builder = builder.subcommand(&subcommand.name, |scoped| self.apply(scoped, subcommand))?;
        }

        Ok(builder)
    }
}

impl CommandFactory for DeclarativeFactory {
    fn create(
        &self,
        parsers: &ParserRegistry,
        source: &dyn Any,
    ) -> CommandResult<Option<CommandTree>> {
        match source.downcast_ref::<CommandSpec>() {
            Some(spec) => self.build(parsers, spec).map(Some),
            None => Ok(None),
        }
    }
}

/// Tries each factory in order and keeps the first tree produced.
#[derive(Default)]
pub struct FactoryChain {
    factories: Vec<Box<dyn CommandFactory>>,
}

impl FactoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, factory: impl CommandFactory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }
}

impl CommandFactory for FactoryChain {
    fn create(
        &self,
        parsers: &ParserRegistry,
        source: &dyn Any,
    ) -> CommandResult<Option<CommandTree>> {
        for factory in &self.factories {
            if let Some(tree) = factory.create(parsers, source)? {
                return Ok(Some(tree));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_fields_default() {
        let spec: CommandSpec = toml::from_str(
            r#"
name = "ping"

[[leaves]]
handler = "pong"
"#,
        )
        .unwrap();
        assert!(spec.aliases.is_empty());
        assert!(spec.subcommands.is_empty());
        assert_eq!(
            spec.leaves,
            [LeafSpec {
                names: Vec::new(),
                arguments: Vec::new(),
                handler: "pong".to_string(),
                description: None,
            }]
        );
    }

    #[test]
    fn handlers_are_shared_between_leaves() {
        let parsers = ParserRegistry::with_defaults();
        let spec: CommandSpec = toml::from_str(
            r#"
name = "num"

[[leaves]]
names = ["int"]
handler = "first"
arguments = [{ parser = "int" }]

[[leaves]]
names = ["long"]
handler = "first"
arguments = [{ parser = "long" }]
"#,
        )
        .unwrap();
        let factory = DeclarativeFactory::new().handler("first", |args| {
            Ok(Some(Value::new(args.value(0)?.type_name().to_string())))
        });
        let tree = factory.build(&parsers, &spec).unwrap();

        let run = |tokens: &[&str]| {
            tree.execute(tokens)
                .unwrap()
                .and_then(|value| value.downcast::<String>().ok())
        };
        assert_eq!(run(&["int", "1"]).as_deref(), Some("i32"));
        assert_eq!(run(&["long", "1"]).as_deref(), Some("i64"));
    }
}

use crate::config::ConsoleConfig;
use anyhow::{anyhow, bail};
use oneconfig_commands::argument_parser::ChoiceParser;
use oneconfig_commands::builder::*;
use oneconfig_commands::factory::{
    BuilderFactory, BuilderSource, CommandFactory, DeclarativeFactory, FactoryChain,
};
use oneconfig_commands::{
    ArgumentSet, CommandError, CommandRegistry, CommandResult, DispatchError, ParserRegistry,
    Value,
};
use std::any::Any;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
    Nearest,
}

pub fn parsers() -> ParserRegistry {
    let mut parsers = ParserRegistry::with_defaults();
    parsers.register(ChoiceParser::fixed(
        "rounding",
        [
            ("floor", Rounding::Floor),
            ("ceil", Rounding::Ceil),
            ("nearest", Rounding::Nearest),
        ],
    ));
    parsers
}

/// Renders a leaf result for the terminal.
pub fn render(value: &Value) -> String {
    match value.downcast_ref::<String>() {
        Some(text) => text.clone(),
        None => format!("{:?}", value),
    }
}

fn number(value: &Value) -> Option<f64> {
    if let Some(v) = value.downcast_ref::<i32>() {
        Some(f64::from(*v))
    } else if let Some(v) = value.downcast_ref::<i16>() {
        Some(f64::from(*v))
    } else if let Some(v) = value.downcast_ref::<i64>() {
        Some(*v as f64)
    } else if let Some(v) = value.downcast_ref::<f32>() {
        Some(f64::from(*v))
    } else {
        value.downcast_ref::<f64>().copied()
    }
}

fn echo(args: &ArgumentSet) -> anyhow::Result<Option<Value>> {
    let line = args.iter().map(render).collect::<Vec<_>>().join(" ");
    Ok(Some(Value::new(line)))
}

fn sum(args: &ArgumentSet) -> anyhow::Result<Option<Value>> {
    let mut total = 0.0;
    for (index, value) in args.iter().enumerate() {
        total += number(value)
            .ok_or_else(|| anyhow!("argument {} ({}) is not a number", index, value.type_name()))?;
    }
    Ok(Some(Value::new(total)))
}

fn count(args: &ArgumentSet) -> anyhow::Result<Option<Value>> {
    Ok(Some(Value::new(args.len() as i64)))
}

fn calc(builder: CommandBuilder) -> CommandResult<CommandBuilder> {
    builder
        .alias("c")
        .then(
            runs("add")
                .with([int_arg(), int_arg()])
                .describe("Adds two integers")
                .does(|args| {
                    let sum = args
                        .get::<i32>(0)?
                        .checked_add(args.get::<i32>(1)?)
                        .ok_or_else(|| anyhow!("integer overflow"))?;
                    Ok(Some(Value::new(sum)))
                }),
        )?
        .then(
            runs("add")
                .with([double_arg(), double_arg()])
                .describe("Adds two decimals")
                .does(|args| Ok(Some(Value::new(args.get::<f64>(0)? + args.get::<f64>(1)?)))),
        )?
        .then(
            runs("div")
                .with([int_arg().labeled("dividend"), int_arg().labeled("divisor")])
                .does(|args| {
                    let divisor = args.get::<i32>(1)?;
                    if divisor == 0 {
                        bail!("division by zero");
                    }
                    match args.get::<i32>(0)?.checked_div(divisor) {
                        Some(quotient) => Ok(Some(Value::new(quotient))),
                        None => bail!("division overflow"),
                    }
                }),
        )?
        .then(
            runs("round")
                .with([double_arg(), Slot::of::<Rounding>()])
                .does(|args| {
                    let value = args.get::<f64>(0)?;
                    let rounded = match args.get::<Rounding>(1)? {
                        Rounding::Floor => value.floor(),
                        Rounding::Ceil => value.ceil(),
                        Rounding::Nearest => value.round(),
                    };
                    // i64::MAX as f64 rounds up to 2^63
                    if !(rounded >= i64::MIN as f64 && rounded < i64::MAX as f64) {
                        bail!("{:?} is out of range", value);
                    }
                    Ok(Some(Value::new(rounded as i64)))
                }),
        )?
        .subcommand("cmp", |cmp| {
            cmp.then(
                runs("eq")
                    .or("equals")
                    .with([long_arg(), long_arg()])
                    .does(|args| Ok(Some(Value::new(args.get::<i64>(0)? == args.get::<i64>(1)?)))),
            )?
            .then(
                runs("not")
                    .with([bool_arg()])
                    .describe("Anything but \"true\" counts as false")
                    .does(|args| Ok(Some(Value::new(!args.get::<bool>(0)?)))),
            )
        })
}

fn echo_command(builder: CommandBuilder) -> CommandResult<CommandBuilder> {
    builder
        .alias("say")
        .then(runs_default().with([greedy_string_arg().labeled("message")]).does(echo))
}

fn declarative_factory() -> DeclarativeFactory {
    DeclarativeFactory::new()
        .handler("echo", echo)
        .handler("sum", sum)
        .handler("count", count)
}

fn create(
    factories: &FactoryChain,
    parsers: &ParserRegistry,
    source: &dyn Any,
) -> anyhow::Result<oneconfig_commands::CommandTree> {
    factories
        .create(parsers, source)?
        .ok_or_else(|| anyhow!("no factory understands this command source"))
}

/// Registers the built-in commands, the commands declared in `config`, and
/// finally `help`, which lists everything registered before it.
pub fn build_registry(config: &ConsoleConfig) -> anyhow::Result<CommandRegistry> {
    let parsers = parsers();
    let factories = FactoryChain::new()
        .with(BuilderFactory)
        .with(declarative_factory());
    let mut registry = CommandRegistry::new();

    for source in [
        BuilderSource::new("calc", calc),
        BuilderSource::new("echo", echo_command),
    ] {
        registry.register(create(&factories, &parsers, &source)?)?;
    }

    for spec in config.commands.iter().flatten() {
        let tree = create(&factories, &parsers, spec)?;
        info!("Loaded command /{} from config", tree.name());
        registry.register(tree)?;
    }

    for (alias, replacement) in config.command_aliases.iter().flatten() {
        registry.add_custom_alias(alias.trim(), replacement.trim());
    }

    let mut usage = registry.usage();
    usage.push("/help [<command>] - Lists commands".to_string());
    let usage = Arc::new(usage);
    let filtered = Arc::clone(&usage);

    let help = CommandBuilder::command(&parsers, "help")
        .then(runs_default().does(move |_| Ok(Some(Value::new(usage.join("\n"))))))?
        .then(runs_default().with([string_arg().labeled("command")]).does(move |args| {
            let prefix = format!("/{}", args.get::<String>(0)?);
            let lines: Vec<&str> = filtered
                .iter()
                .map(String::as_str)
                .filter(|line| *line == prefix || line.starts_with(&format!("{} ", prefix)))
                .collect();
            if lines.is_empty() {
                bail!("Command not found: {}", prefix);
            }
            Ok(Some(Value::new(lines.join("\n"))))
        }))?
        .build();
    registry.register(help)?;

    debug!("{} commands registered", registry.trees().len());
    Ok(registry)
}

pub struct Console {
    registry: CommandRegistry,
    prompt: String,
}

impl Console {
    pub fn new(registry: CommandRegistry, prompt: impl Into<String>) -> Self {
        Self {
            registry,
            prompt: prompt.into(),
        }
    }

    /// Executes one line and returns what should be printed.
    pub fn run_line(&self, line: &str) -> Result<Option<String>, Vec<String>> {
        match self.registry.execute_line(line) {
            Ok(result) => Ok(result.as_ref().map(render)),
            Err(CommandError::Dispatch(err)) => {
                let mut lines = vec![format!("Error: {}", err)];
                if let DispatchError::NoMatchingOverload { path, .. } = &err {
                    lines.extend(
                        self.registry
                            .usage_at(path)
                            .into_iter()
                            .map(|usage| format!("Usage: {}", usage)),
                    );
                }
                Err(lines)
            }
            Err(CommandError::Execution(err)) => {
                warn!("Command '{}' failed: {:#}", line.trim(), err);
                Err(vec![format!("Error: {}", err)])
            }
            Err(err) => Err(vec![format!("Error: {}", err)]),
        }
    }

    pub fn complete(&self, line: &str) -> Vec<String> {
        self.registry.autocomplete_line(line)
    }

    /// Reads lines until EOF. A line starting with `?` prints completions for
    /// the rest of the line instead of executing it.
    pub fn run(&self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        write!(output, "{}", self.prompt)?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            if let Some(partial) = line.strip_prefix('?') {
                for suggestion in self.complete(partial) {
                    writeln!(output, "{}", suggestion)?;
                }
            } else {
                match self.run_line(&line) {
                    Ok(Some(reply)) => writeln!(output, "{}", reply)?,
                    Ok(None) => {}
                    Err(lines) => {
                        for message in lines {
                            writeln!(output, "{}", message)?;
                        }
                    }
                }
            }
            write!(output, "{}", self.prompt)?;
            output.flush()?;
        }
        writeln!(output)?;
        Ok(())
    }
}

use crate::{
    error::{CommandResult, DispatchError, RegistrationError},
    tree::CommandTree,
    value::Value,
};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Every registered command, looked up by name or alias, plus line-level
/// conveniences (tokenizing and custom alias expansion).
#[derive(Default, Clone)]
pub struct CommandRegistry {
    trees: Vec<CommandTree>,
    lookup: FxHashMap<String, usize>,
    custom_aliases: Vec<(String, String)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tree: CommandTree) -> Result<(), RegistrationError> {
        let names = std::iter::once(tree.name()).chain(tree.aliases().iter().map(String::as_str));
        for name in names.clone() {
            if self.lookup.contains_key(name) {
                return Err(RegistrationError::DuplicateName {
                    name: name.to_string(),
                    parent: "/".to_string(),
                });
            }
        }

        let index = self.trees.len();
        for name in names {
            self.lookup.insert(name.to_string(), index);
        }
        debug!("Registered command /{}", tree.name());
        self.trees.push(tree);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandTree> {
        self.lookup.get(name).map(|&index| &self.trees[index])
    }

    pub fn trees(&self) -> &[CommandTree] {
        &self.trees
    }

    /// Rewrites lines starting with `alias`. A `{}` in `replacement` receives
    /// the rest of the line; otherwise the rest is appended.
    pub fn add_custom_alias(&mut self, alias: impl Into<String>, replacement: impl Into<String>) {
        self.custom_aliases.push((alias.into(), replacement.into()));
    }

    pub fn custom_aliases(&self) -> &[(String, String)] {
        &self.custom_aliases
    }

    pub fn execute<S: AsRef<str>>(&self, name: &str, tokens: &[S]) -> CommandResult<Option<Value>> {
        let tree = self.get(name).ok_or_else(|| DispatchError::UnknownCommand {
            path: Vec::new(),
            token: name.to_string(),
        })?;
        tree.execute(tokens)
    }

    /// Splits `line` on whitespace and executes it. Blank lines do nothing.
    pub fn execute_line(&self, line: &str) -> CommandResult<Option<Value>> {
        let line = self.expand_custom_aliases(line);
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.split_first() {
            Some((name, rest)) => self.execute(name, rest),
            None => Ok(None),
        }
    }

    pub fn autocomplete<S: AsRef<str>>(&self, name: &str, tokens: &[S]) -> Vec<String> {
        match self.get(name) {
            Some(tree) => tree.autocomplete(tokens),
            None => Vec::new(),
        }
    }

    /// Completes the last word of `line`; a trailing space starts a new,
    /// empty word.
    pub fn autocomplete_line(&self, line: &str) -> Vec<String> {
        let new_word = line.is_empty() || line.ends_with(char::is_whitespace);
        // Aliases only expand once their word is complete
        let line = if line.trim().contains(char::is_whitespace) || new_word {
            self.expand_custom_aliases(line)
        } else {
            line.to_string()
        };

        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        if new_word {
            tokens.push("");
        }

        match tokens.split_first() {
            Some((partial, [])) => self.complete_command_name(partial),
            Some((name, rest)) => self.autocomplete(name, rest),
            None => Vec::new(),
        }
    }

    fn complete_command_name(&self, partial: &str) -> Vec<String> {
        self.lookup
            .keys()
            .map(String::as_str)
            .chain(self.custom_aliases.iter().map(|(alias, _)| alias.as_str()))
            .filter(|name| name.starts_with(partial))
            .sorted()
            .dedup()
            .map(str::to_string)
            .collect()
    }

    /// Usage lines of the command at `path` (command name first).
    pub fn usage_at<S: AsRef<str>>(&self, path: &[S]) -> Vec<String> {
        match path.first().and_then(|name| self.get(name.as_ref())) {
            Some(tree) => tree.usage_at(path),
            None => Vec::new(),
        }
    }

    pub fn usage(&self) -> Vec<String> {
        self.trees
            .iter()
            .sorted_by(|a, b| a.name().cmp(b.name()))
            .flat_map(CommandTree::usage)
            .collect()
    }

    fn expand_custom_aliases(&self, line: &str) -> String {
        let trimmed = line.trim_start();
        let split = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let (first, rest) = trimmed.split_at(split);

        for (alias, expansion) in &self.custom_aliases {
            if alias == first {
                return if expansion.contains("{}") {
                    expansion.replace("{}", rest.trim_start())
                } else {
                    format!("{}{}", expansion, rest)
                };
            }
        }
        line.to_string()
    }
}

use crate::{
    argument_parser::SlotInfo,
    argument_set::ArgumentSet,
    error::RegistrationError,
    parser_registry::SharedParser,
    value::Value,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub type Executor = Arc<dyn Fn(&ArgumentSet) -> anyhow::Result<Option<Value>> + Send + Sync>;

/// One argument position of a leaf, already bound to its parser.
#[derive(Clone)]
pub struct BoundSlot {
    pub(crate) parser: SharedParser,
    pub(crate) label: Option<String>,
    pub(crate) greedy: bool,
}

impl BoundSlot {
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .unwrap_or_else(|| self.parser.display_name())
    }

    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    pub(crate) fn info(&self, index: usize) -> SlotInfo {
        SlotInfo {
            index,
            label: self.label.clone(),
            greedy: self.greedy,
        }
    }
}

/// One executable signature at a node.
#[derive(Clone)]
pub struct Leaf {
    pub(crate) names: Vec<String>,
    pub(crate) slots: Vec<BoundSlot>,
    pub(crate) description: Option<String>,
    pub(crate) executor: Executor,
}

impl Leaf {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn slots(&self) -> &[BoundSlot] {
        &self.slots
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn is_greedy(&self) -> bool {
        self.slots.last().is_some_and(BoundSlot::is_greedy)
    }

    /// Whether `count` tokens could fill this leaf's slots.
    pub(crate) fn accepts_count(&self, count: usize) -> bool {
        if self.is_greedy() {
            count + 1 >= self.slots.len()
        } else {
            count == self.slots.len()
        }
    }

    pub(crate) fn answers_to(&self, token: &str) -> bool {
        self.names.iter().any(|name| name == token)
    }
}

#[derive(Clone)]
pub struct CommandNode {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) leaves: Vec<Leaf>,
    pub(crate) children: Vec<CommandNode>,
    lookup: FxHashMap<String, usize>,
}

impl CommandNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            leaves: Vec::new(),
            children: Vec::new(),
            lookup: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    pub fn child(&self, token: &str) -> Option<&CommandNode> {
        self.lookup.get(token).map(|&index| &self.children[index])
    }

    pub(crate) fn add_alias(&mut self, alias: impl Into<String>) {
        self.aliases.push(alias.into());
    }

    fn ensure_free(&self, name: &str) -> Result<(), RegistrationError> {
        let taken = self.lookup.contains_key(name)
            || self.leaves.iter().any(|leaf| leaf.answers_to(name));
        if taken {
            return Err(RegistrationError::DuplicateName {
                name: name.to_string(),
                parent: self.name.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn add_leaf(&mut self, leaf: Leaf) -> Result<(), RegistrationError> {
        // Leaves may share names with each other (overloads), never with children.
        if let Some(name) = leaf.names.iter().find(|name| self.lookup.contains_key(*name)) {
            return Err(RegistrationError::DuplicateName {
                name: name.clone(),
                parent: self.name.clone(),
            });
        }
        self.leaves.push(leaf);
        Ok(())
    }

    /// Returns the child called `name`, creating it if needed.
    pub(crate) fn child_entry(&mut self, name: &str) -> Result<&mut CommandNode, RegistrationError> {
        let index = match self.lookup.get(name) {
            Some(&index) if self.children[index].name == name => index,
            Some(_) => {
                // `name` is an alias of a different child
                return Err(RegistrationError::DuplicateName {
                    name: name.to_string(),
                    parent: self.name.clone(),
                });
            }
            None => {
                self.ensure_free(name)?;
                self.children.push(CommandNode::new(name));
                let index = self.children.len() - 1;
                self.lookup.insert(name.to_string(), index);
                index
            }
        };
        Ok(&mut self.children[index])
    }

    /// Re-indexes a child's aliases after they were added through the
    /// builder scoped to that child.
    pub(crate) fn index_aliases(&mut self, child_name: &str) -> Result<(), RegistrationError> {
        let Some(&index) = self.lookup.get(child_name) else {
            return Ok(());
        };
        let aliases = self.children[index].aliases.clone();
        for alias in aliases {
            match self.lookup.get(&alias) {
                Some(&existing) if existing == index => {}
                Some(_) => {
                    return Err(RegistrationError::DuplicateName {
                        name: alias,
                        parent: self.name.clone(),
                    });
                }
                None => {
                    self.ensure_free(&alias)?;
                    self.lookup.insert(alias, index);
                }
            }
        }
        Ok(())
    }
}

use crate::node::CommandNode;

/// A built command: the root node named after the command, with every leaf
/// already bound to its parsers.
#[derive(Clone)]
pub struct CommandTree {
    pub(crate) root: CommandNode,
}

/// Where a token walk stopped.
pub(crate) struct Descent<'a> {
    pub(crate) node: &'a CommandNode,
    pub(crate) path: Vec<String>,
    pub(crate) consumed: usize,
}

impl CommandTree {
    pub(crate) fn new(root: CommandNode) -> Self {
        Self { root }
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    pub fn aliases(&self) -> &[String] {
        self.root.aliases()
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    pub(crate) fn answers_to(&self, token: &str) -> bool {
        self.root.name() == token || self.root.aliases().iter().any(|alias| alias == token)
    }

    /// Follows child names and aliases for as long as the tokens match.
    pub(crate) fn descend(&self, tokens: &[String]) -> Descent<'_> {
        let mut node = &self.root;
        let mut path = vec![self.root.name.clone()];
        let mut consumed = 0;

        while let Some(child) = tokens.get(consumed).and_then(|token| node.child(token)) {
            path.push(child.name.clone());
            node = child;
            consumed += 1;
        }

        Descent {
            node,
            path,
            consumed,
        }
    }
}

pub(crate) fn to_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    tokens.iter().map(|token| token.as_ref().to_string()).collect()
}

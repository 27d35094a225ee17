use crate::{
    node::{BoundSlot, CommandNode, Leaf},
    tree::CommandTree,
};

impl CommandTree {
    /// One line per leaf, e.g. `/calc add <int> <int> - Adds two numbers`.
    pub fn usage(&self) -> Vec<String> {
        let mut lines = Vec::new();
        collect_usage(&self.root, &mut vec![self.root.name.as_str()], &mut lines);
        lines
    }

    /// Usage lines of the subtree at `path`. The path may start with the
    /// command name, as the paths in dispatch errors do.
    pub fn usage_at<S: AsRef<str>>(&self, path: &[S]) -> Vec<String> {
        let path = match path.split_first() {
            Some((first, rest)) if self.answers_to(first.as_ref()) => rest,
            _ => path,
        };

        let mut node = &self.root;
        let mut prefix = vec![self.root.name.as_str()];
        for segment in path {
            match node.child(segment.as_ref()) {
                Some(child) => {
                    prefix.push(child.name.as_str());
                    node = child;
                }
                None => break,
            }
        }

        let mut lines = Vec::new();
        collect_usage(node, &mut prefix, &mut lines);
        lines
    }
}

fn collect_usage<'a>(node: &'a CommandNode, prefix: &mut Vec<&'a str>, lines: &mut Vec<String>) {
    for leaf in &node.leaves {
        lines.push(leaf_usage(prefix, leaf));
    }
    for child in &node.children {
        prefix.push(&child.name);
        collect_usage(child, prefix, lines);
        prefix.pop();
    }
}

fn leaf_usage(prefix: &[&str], leaf: &Leaf) -> String {
    let mut parts: Vec<String> = prefix.iter().map(|part| part.to_string()).collect();
    if !leaf.names.is_empty() {
        parts.push(leaf.names.join("|"));
    }
    parts.extend(leaf.slots.iter().map(slot_usage));

    let mut line = format!("/{}", parts.join(" "));
    if let Some(description) = leaf.description() {
        line.push_str(" - ");
        line.push_str(description);
    }
    line
}

fn slot_usage(slot: &BoundSlot) -> String {
    if slot.greedy {
        format!("<{}...>", slot.display_name())
    } else {
        format!("<{}>", slot.display_name())
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::*;
    use crate::parser_registry::ParserRegistry;
    use expect_test::expect;

    #[test]
    fn usage_lines() {
        let parsers = ParserRegistry::with_defaults();
        let tree = CommandBuilder::command(&parsers, "mail")
            .then(runs_default().does(|_| Ok(None)))
            .and_then(|b| {
                b.then(
                    runs("send")
                        .or("s")
                        .with([string_arg().labeled("to"), greedy_string_arg().labeled("body")])
                        .describe("Sends a message")
                        .does(|_| Ok(None)),
                )
            })
            .and_then(|b| b.subcommand("box", |b| b.then(runs("clear").does(|_| Ok(None)))))
            .unwrap()
            .build();

        expect![[r#"
            /mail
            /mail send|s <to> <body...> - Sends a message
            /mail box clear"#]]
        .assert_eq(&tree.usage().join("\n"));

        assert_eq!(tree.usage_at(&["mail", "box"]), ["/mail box clear"]);
        assert_eq!(tree.usage_at(&["box"]), ["/mail box clear"]);
    }
}

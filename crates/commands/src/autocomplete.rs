use crate::{
    arguments::Arguments,
    executor::{candidate_tokens, parse_slots},
    tree::{to_tokens, CommandTree},
};
use indexmap::IndexSet;

impl CommandTree {
    /// Suggestions for the last token, which is treated as partial.
    ///
    /// Leaves whose earlier arguments do not parse are skipped, so this never
    /// fails; it also never touches the tree.
    pub fn autocomplete<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        let tokens = to_tokens(tokens);
        let (partial, completed) = match tokens.split_last() {
            Some((partial, completed)) => (partial.as_str(), completed),
            None => ("", &[][..]),
        };

        let descent = self.descend(completed);
        let node = descent.node;
        let rest = &completed[descent.consumed..];
        let mut suggestions = IndexSet::new();

        if rest.is_empty() {
            for child in &node.children {
                let names = std::iter::once(&child.name).chain(&child.aliases);
                suggestions.extend(names.filter(|name| name.starts_with(partial)).cloned());
            }
            for leaf in &node.leaves {
                suggestions.extend(
                    leaf.names
                        .iter()
                        .filter(|name| name.starts_with(partial))
                        .cloned(),
                );
            }
        }

        for leaf in &node.leaves {
            let Some(arg_tokens) = candidate_tokens(leaf, rest) else {
                continue;
            };

            let slot_index = if leaf.is_greedy() {
                arg_tokens.len().min(leaf.slots.len() - 1)
            } else {
                arg_tokens.len()
            };
            let Some(slot) = leaf.slots.get(slot_index) else {
                continue;
            };
            if parse_slots(&leaf.slots[..slot_index], &arg_tokens[..slot_index]).is_err() {
                continue;
            }

            let partial_token = [partial.to_string()];
            let mut cursor = Arguments::new(&partial_token);
            cursor.set_greedy(slot.greedy);
            suggestions.extend(slot.parser.suggest(&mut cursor, &slot.info(slot_index)));
        }

        suggestions.into_iter().collect()
    }
}

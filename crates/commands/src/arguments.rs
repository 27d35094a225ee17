use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No tokens left to read")]
pub struct OutOfTokens;

/// Forward-only cursor over the tokens handed to one argument slot list.
///
/// A cursor is created for a single trial or completion request and then
/// dropped, so no position ever leaks between calls.
#[derive(Debug, Clone)]
pub struct Arguments<'a> {
    tokens: &'a [String],
    position: usize,
    greedy: bool,
}

impl<'a> Arguments<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self {
            tokens,
            position: 0,
            greedy: false,
        }
    }

    pub fn poll(&mut self) -> Result<&'a str, OutOfTokens> {
        let token = self.tokens.get(self.position).ok_or(OutOfTokens)?;
        self.position += 1;
        Ok(token)
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    pub fn has_next(&self) -> bool {
        self.position < self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    /// Set only while the last slot of a leaf is being parsed, and only when
    /// that slot was declared greedy.
    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    pub(crate) fn set_greedy(&mut self, greedy: bool) {
        self.greedy = greedy;
    }

    /// Polls every remaining token and joins them with single spaces.
    pub fn take_rest(&mut self) -> String {
        let mut parts = Vec::with_capacity(self.remaining());
        while let Ok(token) = self.poll() {
            parts.push(token);
        }
        parts.join(" ")
    }
}

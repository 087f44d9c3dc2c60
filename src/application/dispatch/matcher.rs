//! Command matcher - routes user text to commands by pattern
//!
//! Patterns are tried in registration order and must match the whole input.
//! Registration order is the tie-break when patterns could overlap; in
//! practice each command is distinguishable by its prefix.

use std::collections::HashMap;

use regex_lite::Regex;

use crate::application::errors::CommandError;

/// A registered command pattern with named capture groups.
///
/// Each pattern carries example inputs that must match it; the contract is
/// checked once at registration so a drifting pattern fails loudly instead of
/// silently dropping its documented forms.
#[derive(Debug, Clone)]
pub struct CommandPattern {
    id: String,
    regex: Regex,
    examples: Vec<String>,
}

impl CommandPattern {
    pub fn new(
        id: impl Into<String>,
        pattern: &str,
        examples: &[&str],
    ) -> Result<Self, CommandError> {
        let id = id.into();
        let regex = Regex::new(pattern).map_err(|e| CommandError::Pattern {
            id: id.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            id,
            regex,
            examples: examples.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    /// Whole-string match; partial matches do not count.
    pub fn matches(&self, text: &str) -> Option<CommandMatch> {
        let caps = self.regex.captures(text)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 || whole.end() != text.len() {
            return None;
        }

        let mut captures = HashMap::new();
        for name in self.regex.capture_names().flatten() {
            captures.insert(
                name.to_string(),
                caps.name(name).map(|m| m.as_str().to_string()),
            );
        }
        Some(CommandMatch {
            id: self.id.clone(),
            captures,
        })
    }
}

/// Result of a successful match: the command id and its named captures.
/// Optional groups that did not participate map to `None`.
#[derive(Debug, Clone)]
pub struct CommandMatch {
    pub id: String,
    pub captures: HashMap<String, Option<String>>,
}

impl CommandMatch {
    pub fn group(&self, name: &str) -> Option<&str> {
        self.captures.get(name)?.as_deref()
    }
}

/// Ordered collection of command patterns.
#[derive(Default)]
pub struct CommandMatcher {
    patterns: Vec<CommandPattern>,
}

impl CommandMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern. Fails on a duplicate id or when one of the
    /// pattern's own examples does not match it.
    pub fn register(&mut self, pattern: CommandPattern) -> Result<(), CommandError> {
        if self.patterns.iter().any(|p| p.id == pattern.id) {
            return Err(CommandError::Duplicate(pattern.id));
        }
        for example in &pattern.examples {
            if pattern.matches(example).is_none() {
                return Err(CommandError::ExampleMismatch {
                    id: pattern.id.clone(),
                    example: example.clone(),
                });
            }
        }
        self.patterns.push(pattern);
        Ok(())
    }

    /// First whole-string match in registration order, or None.
    pub fn match_text(&self, text: &str) -> Option<CommandMatch> {
        self.patterns.iter().find_map(|p| p.matches(text))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

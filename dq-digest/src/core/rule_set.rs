//! Named, persisted collections of rules.

use super::Rule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, ordered collection of rules scoped to one dataset.
///
/// Rules are keyed by (column, kind); declaring the same pair again replaces
/// the stored parameters in place instead of appending a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    name: String,
    #[serde(default)]
    rules: Vec<Rule>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            rules: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Inserts or replaces a rule. Returns true if the rule was new.
    pub fn add_rule(&mut self, rule: Rule) -> bool {
        let existing = self
            .rules
            .iter_mut()
            .find(|r| r.column == rule.column && r.kind_id() == rule.kind_id());

        let inserted = match existing {
            Some(slot) => {
                *slot = rule;
                false
            }
            None => {
                self.rules.push(rule);
                true
            }
        };
        self.updated_at = Utc::now();
        inserted
    }

    /// Declares every rule in order.
    pub fn extend<I>(&mut self, rules: I)
    where
        I: IntoIterator<Item = Rule>,
    {
        for rule in rules {
            self.add_rule(rule);
        }
    }
}

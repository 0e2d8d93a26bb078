//! Rule identifiers and the per-file replacement tally.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One of the rewrite passes. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Short module names to fully-qualified collection names.
    Fqcn,
    /// `yes`/`no` to `true`/`false`.
    Truthy,
    /// Capitalize task, handler and notify names.
    Names,
}

impl Rule {
    pub const ALL: [Rule; 3] = [Rule::Fqcn, Rule::Truthy, Rule::Names];

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "fqcn" => Ok(Rule::Fqcn),
            "truthy" => Ok(Rule::Truthy),
            "names" => Ok(Rule::Names),
            _ => Err(Error::validation_invalid_argument(
                "rule",
                format!("Unknown rule '{}'. Use: fqcn, truthy, names", s),
                Some(s.to_string()),
                None,
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Fqcn => "fqcn",
            Rule::Truthy => "truthy",
            Rule::Names => "names",
        }
    }

    /// The ansible-lint rule this pass satisfies.
    pub fn lint_rule(&self) -> &'static str {
        match self {
            Rule::Fqcn => "fqcn[action-core]",
            Rule::Truthy => "yaml[truthy]",
            Rule::Names => "name[casing]",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rule::Fqcn => "Rewrite short module references to fully-qualified collection names",
            Rule::Truthy => "Rewrite yes/no values to true/false",
            Rule::Names => "Capitalize the first letter of task/handler names and notify references",
        }
    }
}

/// Normalize a rule selection: drop duplicates and sort into execution order.
pub fn normalize(rules: &[Rule]) -> Vec<Rule> {
    let mut rules = rules.to_vec();
    rules.sort();
    rules.dedup();
    rules
}

/// Replacement counts per rule for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Replacements {
    pub fqcn: usize,
    pub truthy: usize,
    pub names: usize,
}

impl Replacements {
    pub fn record(&mut self, rule: Rule, count: usize) {
        match rule {
            Rule::Fqcn => self.fqcn += count,
            Rule::Truthy => self.truthy += count,
            Rule::Names => self.names += count,
        }
    }

    pub fn merge(&mut self, other: &Replacements) {
        self.fqcn += other.fqcn;
        self.truthy += other.truthy;
        self.names += other.names;
    }

    pub fn total(&self) -> usize {
        self.fqcn + self.truthy + self.names
    }
}

//! `yes`/`no` → `true`/`false` rewrite for indented `key: value` lines.

use regex::{Captures, Regex};

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct TruthyRewriter {
    yes: Regex,
    no: Regex,
}

impl TruthyRewriter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            yes: compile(r"(?mR)^([ \t]+\w+):[ \t]+yes[ \t]*$")?,
            no: compile(r"(?mR)^([ \t]+\w+):[ \t]+no[ \t]*$")?,
        })
    }

    pub fn apply(&self, content: &str) -> (String, usize) {
        let mut count = 0;
        let content = replace_value(&self.yes, content, "true", &mut count);
        let content = replace_value(&self.no, &content, "false", &mut count);
        (content, count)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::internal_unexpected(format!("compile {}: {}", pattern, e)))
}

fn replace_value(re: &Regex, content: &str, value: &str, count: &mut usize) -> String {
    re.replace_all(content, |caps: &Captures| {
        *count += 1;
        format!("{}: {}", &caps[1], value)
    })
    .into_owned()
}

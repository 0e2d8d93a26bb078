//! Capitalize the first letter of task/handler names and `notify:` targets.
//!
//! Notify targets must be rewritten together with handler names, otherwise a
//! capitalized handler would no longer match the tasks that notify it. Handler
//! files list their entries at column zero, so `- name:` matches at any
//! indentation; `notify:` is always nested and requires some.

use regex::{Captures, Regex};

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct NamesRewriter {
    patterns: [Regex; 2],
}

impl NamesRewriter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: [
                compile(r"(?mR)^([ \t]*- name: )([a-z])")?,
                compile(r"(?mR)^([ \t]+notify: )([a-z])")?,
            ],
        })
    }

    pub fn apply(&self, content: &str) -> (String, usize) {
        let mut count = 0;
        let mut content = content.to_string();

        for re in &self.patterns {
            content = re
                .replace_all(&content, |caps: &Captures| {
                    count += 1;
                    format!("{}{}", &caps[1], caps[2].to_ascii_uppercase())
                })
                .into_owned();
        }

        (content, count)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::internal_unexpected(format!("compile {}: {}", pattern, e)))
}

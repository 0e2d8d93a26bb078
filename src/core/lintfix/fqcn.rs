//! Short module name → fully-qualified collection name rewrite.
//!
//! A module key is rewritten only when it stands alone on an indented line
//! (`    apt:`), which is how a task invokes a module with a nested argument map.
//! Inline forms such as `apt: name=nginx` are left alone.

use std::collections::BTreeMap;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::{Error, Result};

/// Built-in mapping table, applied in this order.
pub const BUILTIN_FQCN: &[(&str, &str)] = &[
    ("apt", "ansible.builtin.apt"),
    ("yum", "ansible.builtin.yum"),
    ("package", "ansible.builtin.package"),
    ("service", "ansible.builtin.service"),
    ("systemd", "ansible.builtin.systemd"),
    ("copy", "ansible.builtin.copy"),
    ("template", "ansible.builtin.template"),
    ("file", "ansible.builtin.file"),
    ("lineinfile", "ansible.builtin.lineinfile"),
    ("user", "ansible.builtin.user"),
    ("group", "ansible.builtin.group"),
    ("command", "ansible.builtin.command"),
    ("shell", "ansible.builtin.shell"),
    ("debug", "ansible.builtin.debug"),
    ("set_fact", "ansible.builtin.set_fact"),
    ("include_tasks", "ansible.builtin.include_tasks"),
    ("import_tasks", "ansible.builtin.import_tasks"),
    ("fail", "ansible.builtin.fail"),
    ("assert", "ansible.builtin.assert"),
    ("wait_for", "ansible.builtin.wait_for"),
    ("get_url", "ansible.builtin.get_url"),
    ("uri", "ansible.builtin.uri"),
    ("pip", "ansible.builtin.pip"),
    ("npm", "community.general.npm"),
    ("git", "ansible.builtin.git"),
    ("cron", "ansible.builtin.cron"),
    ("sysctl", "ansible.posix.sysctl"),
    ("synchronize", "ansible.posix.synchronize"),
    ("mysql_db", "community.mysql.mysql_db"),
    ("mysql_user", "community.mysql.mysql_user"),
    ("postgresql_db", "community.postgresql.postgresql_db"),
    ("postgresql_user", "community.postgresql.postgresql_user"),
];

/// One row of the effective mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FqcnEntry {
    pub short: String,
    pub fqcn: String,
    /// `builtin`, `override` or `custom`.
    pub source: &'static str,
}

/// Merge configured overrides into the built-in table.
///
/// Overrides of a built-in short name replace it in place; new names are
/// appended in key order.
pub fn effective_table(overrides: &BTreeMap<String, String>) -> Result<Vec<FqcnEntry>> {
    for (short, fqcn) in overrides {
        validate_entry(short, fqcn)?;
    }

    let mut table: Vec<FqcnEntry> = BUILTIN_FQCN
        .iter()
        .map(|(short, fqcn)| match overrides.get(*short) {
            Some(custom) => FqcnEntry {
                short: short.to_string(),
                fqcn: custom.clone(),
                source: "override",
            },
            None => FqcnEntry {
                short: short.to_string(),
                fqcn: fqcn.to_string(),
                source: "builtin",
            },
        })
        .collect();

    for (short, fqcn) in overrides {
        if !BUILTIN_FQCN.iter().any(|(builtin, _)| builtin == short) {
            table.push(FqcnEntry {
                short: short.clone(),
                fqcn: fqcn.clone(),
                source: "custom",
            });
        }
    }

    // A replacement that is itself a short name would be rewritten again by a
    // later entry or a later run.
    if let Some(chained) = table
        .iter()
        .find(|entry| table.iter().any(|other| other.short == entry.fqcn))
    {
        return Err(Error::config_invalid_value(
            format!("defaults.fqcn.{}", chained.short),
            Some(chained.fqcn.clone()),
            format!(
                "Replacement '{}' is itself a module name in the FQCN table",
                chained.fqcn
            ),
        )
        .with_hint("Use a fully-qualified name such as 'namespace.collection.module'"));
    }

    Ok(table)
}

fn validate_entry(short: &str, fqcn: &str) -> Result<()> {
    let mut chars = short.chars();
    let valid_short = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if !valid_short {
        return Err(Error::config_invalid_value(
            format!("defaults.fqcn.{}", short),
            Some(short.to_string()),
            "Module name must match [A-Za-z_][A-Za-z0-9_]*",
        ));
    }

    if fqcn.trim().is_empty() || fqcn.contains(char::is_whitespace) {
        return Err(Error::config_invalid_value(
            format!("defaults.fqcn.{}", short),
            Some(fqcn.to_string()),
            "Replacement must be a non-empty name without whitespace",
        ));
    }

    Ok(())
}

/// Compiled FQCN pass: one line-anchored pattern per table entry.
#[derive(Debug)]
pub struct FqcnRewriter {
    patterns: Vec<(Regex, String)>,
}

impl FqcnRewriter {
    pub fn new(table: &[FqcnEntry]) -> Result<Self> {
        let patterns = table
            .iter()
            .map(|entry| {
                let pattern = format!(r"(?mR)^([ \t]+){}:$", regex::escape(&entry.short));
                Regex::new(&pattern)
                    .map(|re| (re, entry.fqcn.clone()))
                    .map_err(|e| Error::internal_unexpected(format!("compile {}: {}", pattern, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Apply every mapping in table order. Returns the new text and the number
    /// of lines rewritten.
    pub fn apply(&self, content: &str) -> (String, usize) {
        let mut content = content.to_string();
        let mut count = 0;

        for (re, fqcn) in &self.patterns {
            if !re.is_match(&content) {
                continue;
            }
            let replaced = re.replace_all(&content, |caps: &Captures| {
                count += 1;
                format!("{}{}:", &caps[1], fqcn)
            });
            content = replaced.into_owned();
        }

        (content, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_rewriter() -> FqcnRewriter {
        let table = effective_table(&BTreeMap::new()).unwrap();
        FqcnRewriter::new(&table).unwrap()
    }

    #[test]
    fn builtin_table_has_expected_entries() {
        assert_eq!(BUILTIN_FQCN.len(), 32);
        assert_eq!(BUILTIN_FQCN[0], ("apt", "ansible.builtin.apt"));
        assert!(BUILTIN_FQCN.contains(&("npm", "community.general.npm")));
        assert!(BUILTIN_FQCN.contains(&("sysctl", "ansible.posix.sysctl")));
    }

    #[test]
    fn rewrites_indented_module_key() {
        let input = "- name: Install nginx\n  apt:\n    name: nginx\n";
        let (out, count) = builtin_rewriter().apply(input);
        assert_eq!(out, "- name: Install nginx\n  ansible.builtin.apt:\n    name: nginx\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn preserves_indentation_and_tabs() {
        let (out, _) = builtin_rewriter().apply("\t\tshell:\n");
        assert_eq!(out, "\t\tansible.builtin.shell:\n");
    }

    #[test]
    fn leaves_inline_and_unindented_forms() {
        let input = "apt:\n  apt: name=nginx\n  apt: \n  aptitude:\n  my_apt:\n";
        let (out, count) = builtin_rewriter().apply(input);
        assert_eq!(out, input);
        assert_eq!(count, 0);
    }

    #[test]
    fn does_not_join_lines() {
        // A blank line before the key must not be swallowed into the indentation.
        let input = "tasks:\n\n    copy:\n";
        let (out, _) = builtin_rewriter().apply(input);
        assert_eq!(out, "tasks:\n\n    ansible.builtin.copy:\n");
    }

    #[test]
    fn keeps_crlf_line_endings() {
        let (out, count) = builtin_rewriter().apply("  - name: X\r\n    file:\r\n      path: /tmp\r\n");
        assert_eq!(out, "  - name: X\r\n    ansible.builtin.file:\r\n      path: /tmp\r\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn already_qualified_is_untouched() {
        let input = "  ansible.builtin.apt:\n  community.general.npm:\n";
        let (out, count) = builtin_rewriter().apply(input);
        assert_eq!(out, input);
        assert_eq!(count, 0);
    }

    #[test]
    fn counts_every_rewritten_line() {
        let input = "  - name: A\n    debug:\n      msg: a\n  - name: B\n    debug:\n      msg: b\n  - name: C\n    set_fact:\n      x: 1\n";
        let (out, count) = builtin_rewriter().apply(input);
        assert_eq!(count, 3);
        assert_eq!(out.matches("ansible.builtin.debug:").count(), 2);
        assert!(out.contains("    ansible.builtin.set_fact:\n"));
    }

    #[test]
    fn list_item_form_is_not_a_bare_key() {
        let input = "  - debug:\n      msg: a\n";
        let (out, count) = builtin_rewriter().apply(input);
        assert_eq!(out, input);
        assert_eq!(count, 0);
    }

    #[test]
    fn overrides_replace_in_place_and_customs_append() {
        let mut overrides = BTreeMap::new();
        overrides.insert("npm".to_string(), "community.general.npm_custom".to_string());
        overrides.insert("docker_container".to_string(), "community.docker.docker_container".to_string());

        let table = effective_table(&overrides).unwrap();
        assert_eq!(table.len(), 33);

        let npm = table.iter().position(|e| e.short == "npm").unwrap();
        assert_eq!(npm, 23);
        assert_eq!(table[npm].fqcn, "community.general.npm_custom");
        assert_eq!(table[npm].source, "override");

        let last = table.last().unwrap();
        assert_eq!(last.short, "docker_container");
        assert_eq!(last.source, "custom");

        let rewriter = FqcnRewriter::new(&table).unwrap();
        let (out, _) = rewriter.apply("    docker_container:\n");
        assert_eq!(out, "    community.docker.docker_container:\n");
    }

    #[test]
    fn rejects_invalid_override_names() {
        let mut overrides = BTreeMap::new();
        overrides.insert("bad-name".to_string(), "x.y.z".to_string());
        let err = effective_table(&overrides).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");

        let mut overrides = BTreeMap::new();
        overrides.insert("apt".to_string(), "  ".to_string());
        assert!(effective_table(&overrides).is_err());
    }

    #[test]
    fn rejects_replacement_that_is_another_short_name() {
        let mut overrides = BTreeMap::new();
        overrides.insert("zzz".to_string(), "apt".to_string());
        let err = effective_table(&overrides).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
        assert_eq!(err.details["key"], "defaults.fqcn.zzz");

        let mut overrides = BTreeMap::new();
        overrides.insert("apt".to_string(), "yum".to_string());
        let err = effective_table(&overrides).unwrap_err();
        assert_eq!(err.details["value"], "yum");

        let mut overrides = BTreeMap::new();
        overrides.insert("apt".to_string(), "zzz".to_string());
        overrides.insert("zzz".to_string(), "acme.pkg.zzz".to_string());
        assert!(effective_table(&overrides).is_err());
    }

    #[test]
    fn accepted_overrides_keep_output_stable() {
        let mut overrides = BTreeMap::new();
        overrides.insert("zzz".to_string(), "acme.tools.zzz".to_string());
        overrides.insert("apt".to_string(), "acme.pkg.apt".to_string());
        let table = effective_table(&overrides).unwrap();
        let rewriter = FqcnRewriter::new(&table).unwrap();

        let (once, first) = rewriter.apply("    zzz:\n    apt:\n");
        let (twice, second) = rewriter.apply(&once);
        assert_eq!(once, "    acme.tools.zzz:\n    acme.pkg.apt:\n");
        assert_eq!(first, 2);
        assert_eq!(once, twice);
        assert_eq!(second, 0);
    }

    #[test]
    fn replacement_text_is_literal() {
        let table = vec![FqcnEntry {
            short: "odd".to_string(),
            fqcn: "ns.$1.odd".to_string(),
            source: "custom",
        }];
        let (out, _) = FqcnRewriter::new(&table).unwrap().apply("  odd:\n");
        assert_eq!(out, "  ns.$1.odd:\n");
    }
}

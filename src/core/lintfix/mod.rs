//! Ansible lint fixer: rewrite playbooks and roles in place.
//!
//! Given a root directory, this module:
//! 1. Enumerates playbook and role files from glob patterns
//! 2. Applies the fqcn, truthy and names passes to each file, in that order
//! 3. Writes a file back only when its content changed (or previews in dry-run)
//! 4. Reports per-file replacement counts and a batch summary

pub mod discovery;
pub mod fqcn;
pub mod names;
pub mod rules;
pub mod truthy;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::defaults::Defaults;
use crate::error::Result;
use crate::utils::io;

pub use discovery::discover_files;
pub use fqcn::{FqcnEntry, FqcnRewriter, BUILTIN_FQCN};
pub use names::NamesRewriter;
pub use rules::{Replacements, Rule};
pub use truthy::TruthyRewriter;

// ============================================================================
// Types
// ============================================================================

/// Outcome for one processed file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// File path relative to root.
    pub file: String,
    pub changed: bool,
    /// Whether the new content was written to disk.
    pub applied: bool,
    pub replacements: Replacements,
}

/// A file that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    /// File path relative to root.
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FixSummary {
    pub total: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub replacements: Replacements,
}

/// Result of a full run over a root directory.
#[derive(Debug, Clone, Serialize)]
pub struct FixResult {
    pub root: String,
    pub dry_run: bool,
    pub rules: Vec<Rule>,
    pub files: Vec<FileReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
    pub summary: FixSummary,
}

// ============================================================================
// Fixer
// ============================================================================

/// Compiled rewrite pipeline for a fixed rule selection.
#[derive(Debug)]
pub struct Fixer {
    rules: Vec<Rule>,
    fqcn: FqcnRewriter,
    truthy: TruthyRewriter,
    names: NamesRewriter,
}

impl Fixer {
    /// Build a pipeline from config defaults, optionally narrowed to `only`.
    pub fn new(defaults: &Defaults, only: Option<&[Rule]>) -> Result<Self> {
        let table = fqcn::effective_table(&defaults.fqcn)?;
        let selected = only.unwrap_or(defaults.rules.as_slice());

        Ok(Self {
            rules: rules::normalize(selected),
            fqcn: FqcnRewriter::new(&table)?,
            truthy: TruthyRewriter::new()?,
            names: NamesRewriter::new()?,
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Apply the enabled passes to `content`.
    pub fn fix_content(&self, content: &str) -> (String, Replacements) {
        let mut replacements = Replacements::default();
        let mut content = content.to_string();

        for rule in &self.rules {
            let (next, count) = match rule {
                Rule::Fqcn => self.fqcn.apply(&content),
                Rule::Truthy => self.truthy.apply(&content),
                Rule::Names => self.names.apply(&content),
            };
            replacements.record(*rule, count);
            content = next;
        }

        (content, replacements)
    }

    /// Rewrite a single file, writing it back only when the content changed
    /// and `dry_run` is off.
    pub fn process_file(&self, path: &Path, root: &Path, dry_run: bool) -> Result<FileReport> {
        let relative = discovery::relative_path(root, path);
        let original = io::read_file(path, &format!("read {}", relative))?;
        self.rewrite(path, relative, &original, dry_run)
    }

    fn rewrite(
        &self,
        path: &Path,
        relative: String,
        original: &str,
        dry_run: bool,
    ) -> Result<FileReport> {
        log_status!("fix", "Processing: {}", relative);
        let (content, replacements) = self.fix_content(original);

        if content == original {
            log_status!("fix", "  - No changes needed for {}", relative);
            return Ok(FileReport {
                file: relative,
                changed: false,
                applied: false,
                replacements,
            });
        }

        let applied = if dry_run {
            log_status!("fix", "  ~ Would fix {}", relative);
            false
        } else {
            io::write_file_atomic(path, &content, &format!("write {}", relative))?;
            log_status!("fix", "  ✓ Fixed {}", relative);
            true
        };

        Ok(FileReport {
            file: relative,
            changed: true,
            applied,
            replacements,
        })
    }

    /// Discover files under `root` and process each one.
    ///
    /// Unreadable files (missing, non-UTF-8) are reported as skipped; a failed
    /// write aborts the run.
    pub fn run(&self, root: &Path, defaults: &Defaults, dry_run: bool) -> Result<FixResult> {
        let files = discover_files(root, &defaults.patterns, &defaults.exclude)?;
        self.run_files(root, &files, dry_run)
    }

    pub fn run_files(&self, root: &Path, files: &[PathBuf], dry_run: bool) -> Result<FixResult> {
        let mut reports = Vec::new();
        let mut skipped = Vec::new();
        let mut summary = FixSummary {
            total: files.len(),
            ..FixSummary::default()
        };

        for path in files {
            let relative = discovery::relative_path(root, path);
            let original = match io::read_file(path, &format!("read {}", relative)) {
                Ok(content) => content,
                Err(err) => {
                    let reason = err.details["error"]
                        .as_str()
                        .unwrap_or(err.message.as_str())
                        .to_string();
                    log_status!("fix", "  ! Skipped {}: {}", relative, reason);
                    skipped.push(SkippedFile {
                        file: relative,
                        reason,
                    });
                    continue;
                }
            };

            let report = self.rewrite(path, relative, &original, dry_run)?;
            if report.changed {
                summary.changed += 1;
            } else {
                summary.unchanged += 1;
            }
            summary.replacements.merge(&report.replacements);
            reports.push(report);
        }

        summary.skipped = skipped.len();

        if dry_run {
            log_status!("fix", "{} files would be fixed", summary.changed);
        } else {
            log_status!("fix", "✓ Fixed {} files", summary.changed);
        }

        Ok(FixResult {
            root: root.display().to_string(),
            dry_run,
            rules: self.rules.clone(),
            files: reports,
            skipped,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixer() -> Fixer {
        Fixer::new(&Defaults::default(), None).unwrap()
    }

    #[test]
    fn passes_run_in_fixed_order() {
        let input = "  - name: install nginx\n    apt:\n      name: nginx\n      update_cache: yes\n";
        let (out, replacements) = fixer().fix_content(input);
        assert_eq!(
            out,
            "  - name: Install nginx\n    ansible.builtin.apt:\n      name: nginx\n      update_cache: true\n"
        );
        assert_eq!(
            replacements,
            Replacements {
                fqcn: 1,
                truthy: 1,
                names: 1
            }
        );
    }

    #[test]
    fn output_is_a_fixed_point() {
        let input = concat!(
            "- hosts: web\n",
            "  become: yes\n",
            "  tasks:\n",
            "    - name: copy config\n",
            "      template:\n",
            "        src: nginx.conf.j2\n",
            "      notify: restart nginx\n",
            "    - name: start service\n",
            "      service:\n",
            "        enabled: no\n",
        );
        let fixer = fixer();
        let (once, _) = fixer.fix_content(input);
        let (twice, replacements) = fixer.fix_content(&once);
        assert_eq!(once, twice);
        assert_eq!(replacements.total(), 0);
    }

    #[test]
    fn rule_selection_limits_passes() {
        let fixer = Fixer::new(&Defaults::default(), Some(&[Rule::Names, Rule::Truthy][..])).unwrap();
        assert_eq!(fixer.rules(), &[Rule::Truthy, Rule::Names]);

        let (out, replacements) = fixer.fix_content("  - name: x\n    shell:\n      warn: no\n");
        assert_eq!(out, "  - name: X\n    shell:\n      warn: false\n");
        assert_eq!(replacements.fqcn, 0);
    }

    #[test]
    fn config_rules_apply_when_no_selection_given() {
        let defaults = Defaults {
            rules: vec![Rule::Fqcn],
            ..Defaults::default()
        };
        let fixer = Fixer::new(&defaults, None).unwrap();
        let (out, _) = fixer.fix_content("  - name: x\n    copy:\n      force: yes\n");
        assert_eq!(out, "  - name: x\n    ansible.builtin.copy:\n      force: yes\n");
    }

    #[test]
    fn process_file_leaves_clean_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clean.yml");
        let content = "  - name: Already fine\n    ansible.builtin.debug:\n      msg: hi\n";
        fs::write(&path, content).unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        let report = fixer().process_file(&path, dir.path(), false).unwrap();
        assert!(!report.changed);
        assert!(!report.applied);
        assert_eq!(report.file, "clean.yml");
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn process_file_dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.yml");
        fs::write(&path, "  become: yes\n").unwrap();

        let report = fixer().process_file(&path, dir.path(), true).unwrap();
        assert!(report.changed);
        assert!(!report.applied);
        assert_eq!(fs::read_to_string(&path).unwrap(), "  become: yes\n");
    }

    #[test]
    fn run_files_skips_non_utf8_and_continues() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.yml");
        let good = dir.path().join("good.yml");
        fs::write(&bad, [0xff, 0xfe, 0x00]).unwrap();
        fs::write(&good, "  become: yes\n").unwrap();

        let result = fixer()
            .run_files(dir.path(), &[bad, good.clone()], false)
            .unwrap();

        assert_eq!(result.summary.total, 2);
        assert_eq!(result.summary.skipped, 1);
        assert_eq!(result.summary.changed, 1);
        assert_eq!(result.skipped[0].file, "bad.yml");
        assert_eq!(fs::read_to_string(&good).unwrap(), "  become: true\n");
    }

    #[cfg(unix)]
    #[test]
    fn run_files_aborts_when_write_fails() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("roles");
        fs::create_dir(&locked).unwrap();
        let path = locked.join("main.yml");
        fs::write(&path, "  become: yes\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits do not bind a privileged user.
        if fs::write(locked.join("writable"), "").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = fixer().run_files(dir.path(), &[path.clone()], false);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
        assert_eq!(fs::read_to_string(&path).unwrap(), "  become: yes\n");
    }
}

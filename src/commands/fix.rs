use std::path::Path;

use clap::Args;
use serde::Serialize;

use ansible_lintfix::defaults;
use ansible_lintfix::lintfix::{FixResult, Fixer, Rule};

use super::CmdResult;

#[derive(Args)]
pub struct FixArgs {
    /// Repository root containing playbooks/ and roles/ (default: current directory)
    #[arg(long)]
    pub path: Option<String>,

    /// Config file (default: <root>/.ansible-lintfix.json when present)
    #[arg(long)]
    pub config: Option<String>,

    /// Only run these rules: fqcn, truthy, names (repeatable)
    #[arg(long = "rule", value_name = "RULE")]
    pub rules: Vec<String>,

    /// Report what would change without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Like --dry-run, but exit 1 when any file needs fixing
    #[arg(long)]
    pub check: bool,
}

#[derive(Serialize)]
pub struct FixOutput {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(flatten)]
    pub result: FixResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

pub fn run(args: FixArgs, _global: &super::GlobalArgs) -> CmdResult<FixOutput> {
    let root = super::resolve_root(args.path.as_deref())?;
    let loaded = defaults::load_config(&root, args.config.as_deref().map(Path::new))?;

    let only = parse_rules(&args.rules)?;
    let fixer = Fixer::new(&loaded.config.defaults, only.as_deref())?;

    let dry_run = args.dry_run || args.check;
    let result = fixer.run(&root, &loaded.config.defaults, dry_run)?;

    let hints = build_hints(&result, args.check);
    let exit_code = if args.check && result.summary.changed > 0 {
        1
    } else {
        0
    };

    Ok((
        FixOutput {
            command: "fix",
            config: loaded.path,
            result,
            hints,
        },
        exit_code,
    ))
}

fn parse_rules(rules: &[String]) -> ansible_lintfix::Result<Option<Vec<Rule>>> {
    if rules.is_empty() {
        return Ok(None);
    }

    rules
        .iter()
        .flat_map(|r| r.split(','))
        .map(|r| Rule::from_str(r.trim()))
        .collect::<ansible_lintfix::Result<Vec<_>>>()
        .map(Some)
}

fn build_hints(result: &FixResult, check: bool) -> Vec<String> {
    let mut hints = Vec::new();

    if result.summary.total == 0 {
        hints.push(
            "No files matched. Run from the repository root or pass --path.".to_string(),
        );
    }

    if result.dry_run && result.summary.changed > 0 {
        let verb = if check { "need" } else { "would need" };
        hints.push(format!(
            "{} file(s) {} fixing. Run 'ansible-lintfix fix' to apply.",
            result.summary.changed, verb
        ));
    }

    if !result.skipped.is_empty() {
        hints.push(format!(
            "{} file(s) could not be read as UTF-8 text and were skipped.",
            result.skipped.len()
        ));
    }

    hints
}

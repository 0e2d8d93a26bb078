use std::path::Path;

use clap::Args;
use serde::Serialize;

use ansible_lintfix::defaults;
use ansible_lintfix::lintfix::{fqcn, FqcnEntry, Rule};

use super::CmdResult;

#[derive(Args)]
pub struct RulesArgs {
    /// Repository root used to locate .ansible-lintfix.json (default: current directory)
    #[arg(long)]
    pub path: Option<String>,

    /// Config file (default: <root>/.ansible-lintfix.json when present)
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub lint_rule: &'static str,
    pub description: &'static str,
    pub enabled: bool,
}

#[derive(Serialize)]
pub struct RulesOutput {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub rules: Vec<RuleInfo>,
    pub patterns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    pub fqcn: Vec<FqcnEntry>,
}

pub fn run(args: RulesArgs, _global: &super::GlobalArgs) -> CmdResult<RulesOutput> {
    let root = super::resolve_root(args.path.as_deref())?;
    let loaded = defaults::load_config(&root, args.config.as_deref().map(Path::new))?;
    let defaults = loaded.config.defaults;

    let rules = Rule::ALL
        .iter()
        .map(|rule| RuleInfo {
            id: rule.as_str(),
            lint_rule: rule.lint_rule(),
            description: rule.description(),
            enabled: defaults.rules.contains(rule),
        })
        .collect();

    let table = fqcn::effective_table(&defaults.fqcn)?;

    Ok((
        RulesOutput {
            command: "rules",
            config: loaded.path,
            rules,
            patterns: defaults.patterns,
            exclude: defaults.exclude,
            fqcn: table,
        },
        0,
    ))
}

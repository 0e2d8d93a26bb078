use std::path::PathBuf;

pub type CmdResult<T> = ansible_lintfix::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod fix;
pub mod rules;

/// Resolve `--path`, defaulting to the current directory.
pub(crate) fn resolve_root(path: Option<&str>) -> ansible_lintfix::Result<PathBuf> {
    let root = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().map_err(|e| {
            ansible_lintfix::Error::internal_io(e.to_string(), Some("read current dir".to_string()))
        })?,
    };

    if !root.is_dir() {
        return Err(ansible_lintfix::Error::validation_invalid_argument(
            "path",
            format!("Not a directory: {}", root.display()),
            Some(root.display().to_string()),
            None,
        ));
    }

    Ok(root)
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (ansible_lintfix::Result<serde_json::Value>, i32) {
    crate::tty::status("ansible-lintfix is working...");

    match command {
        crate::Commands::Fix(args) => dispatch!(args, global, fix),
        crate::Commands::Rules(args) => dispatch!(args, global, rules),
    }
}

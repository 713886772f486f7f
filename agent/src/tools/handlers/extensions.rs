//! Plugin and theme management.
//!
//! Plugins and themes share the same WP-CLI verbs, so one set of functions
//! serves both, parameterized by [`Extension`].

use crate::tools::context::ToolContext;
use crate::tools::error::ToolResult;
use crate::tools::schema::ToolArgs;
use serde_json::{json, Map, Value};

/// Plugin statuses `plugin list` can filter on.
pub(crate) const PLUGIN_STATUSES: &[&str] = &["active", "inactive", "must-use", "dropin"];

/// The kind of extension a command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extension {
    Plugin,
    Theme,
}

impl Extension {
    fn command(self) -> &'static str {
        match self {
            Self::Plugin => "plugin",
            Self::Theme => "theme",
        }
    }

    fn slug_arg(self) -> &'static str {
        match self {
            Self::Plugin => "plugin_slug",
            Self::Theme => "theme_slug",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Plugin => "Plugin",
            Self::Theme => "Theme",
        }
    }
}

/// Runs `<kind> <verb> <slug>` and reports WP-CLI's own confirmation.
pub(crate) async fn apply(
    kind: Extension,
    verb: &str,
    args: &ToolArgs,
    ctx: &ToolContext,
) -> ToolResult {
    let slug = args.str(kind.slug_arg())?;
    let stdout = ctx
        .wp
        .run(vec![kind.command().into(), verb.into(), slug.into()])
        .await?;
    Ok(message(kind, verb, slug, &stdout))
}

/// Runs `<kind> install <slug> [--version=<v>]`.
pub(crate) async fn install(kind: Extension, args: &ToolArgs, ctx: &ToolContext) -> ToolResult {
    let slug = args.str(kind.slug_arg())?;
    let mut command = vec![kind.command().to_string(), "install".into(), slug.into()];
    if let Some(version) = args.opt_str("version") {
        command.push(format!("--version={version}"));
    }
    let stdout = ctx.wp.run(command).await?;
    Ok(message(kind, "install", slug, &stdout))
}

pub(crate) async fn list_plugins(args: &ToolArgs, ctx: &ToolContext) -> ToolResult {
    let mut command = vec!["plugin".to_string(), "list".into(), "--format=json".into()];
    if let Some(status) = args.opt_str("status") {
        command.push(format!("--status={status}"));
    }
    let plugins = ctx.wp.run_json(command).await?;

    let mut data = Map::new();
    data.insert("plugins".into(), as_list(plugins));
    Ok(data)
}

pub(crate) async fn list_themes(ctx: &ToolContext) -> ToolResult {
    let themes = ctx
        .wp
        .run_json(vec!["theme".into(), "list".into(), "--format=json".into()])
        .await?;

    let mut data = Map::new();
    data.insert("themes".into(), as_list(themes));
    Ok(data)
}

pub(crate) async fn active_theme(ctx: &ToolContext) -> ToolResult {
    let themes = ctx
        .wp
        .run_json(vec![
            "theme".into(),
            "list".into(),
            "--status=active".into(),
            "--format=json".into(),
        ])
        .await?;
    let theme = match as_list(themes) {
        Value::Array(mut list) if !list.is_empty() => list.swap_remove(0),
        _ => Value::Null,
    };

    let mut data = Map::new();
    data.insert("theme".into(), theme);
    Ok(data)
}

fn as_list(value: Value) -> Value {
    match value {
        Value::Null => Value::Array(Vec::new()),
        other => other,
    }
}

fn message(kind: Extension, verb: &str, slug: &str, stdout: &str) -> Map<String, Value> {
    let text = if stdout.is_empty() {
        let past = match verb {
            "activate" => "activated",
            "deactivate" => "deactivated",
            "install" => "installed",
            "delete" => "deleted",
            other => other,
        };
        format!("{} '{slug}' {past}.", kind.label())
    } else {
        stdout.to_string()
    };
    let mut data = Map::new();
    data.insert("message".into(), json!(text));
    data
}

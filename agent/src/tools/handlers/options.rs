//! Reading and writing `wp_options` entries.

use crate::tools::context::ToolContext;
use crate::tools::error::{ToolError, ToolResult};
use crate::tools::schema::ToolArgs;
use serde_json::{json, Map};

pub(crate) async fn get_option(args: &ToolArgs, ctx: &ToolContext) -> ToolResult {
    let name = args.str("option_name")?;
    let value = ctx
        .wp
        .run_json(vec![
            "option".into(),
            "get".into(),
            name.into(),
            "--format=json".into(),
        ])
        .await?;

    let mut data = Map::new();
    data.insert("option_name".into(), json!(name));
    data.insert("value".into(), value);
    Ok(data)
}

/// The value is always sent JSON-encoded, so a string such as `--url=x`
/// reaches WP-CLI as `"--url=x"` and is never read as a flag.
pub(crate) async fn update_option(args: &ToolArgs, ctx: &ToolContext) -> ToolResult {
    let name = args.str("option_name")?;
    let value = args
        .get("option_value")
        .ok_or_else(|| ToolError::Internal("argument 'option_value' is missing".into()))?;
    let encoded = serde_json::to_string(value)
        .map_err(|e| ToolError::Internal(format!("failed to encode option value: {e}")))?;

    let stdout = ctx
        .wp
        .run(vec![
            "option".into(),
            "update".into(),
            name.into(),
            encoded,
            "--format=json".into(),
        ])
        .await?;

    let mut data = Map::new();
    data.insert("option_name".into(), json!(name));
    data.insert(
        "message".into(),
        json!(if stdout.is_empty() {
            format!("Option '{name}' updated.")
        } else {
            stdout
        }),
    );
    Ok(data)
}

//! Post creation.

use crate::tools::context::ToolContext;
use crate::tools::error::ToolResult;
use crate::tools::schema::ToolArgs;
use serde_json::{json, Map, Value};

/// Statuses WordPress accepts for a new post.
pub(crate) const POST_STATUSES: &[&str] = &["publish", "draft", "pending", "private", "future"];

pub(crate) async fn create_wordpress_post(args: &ToolArgs, ctx: &ToolContext) -> ToolResult {
    let post_type = args.str("post_type")?;
    let stdout = ctx
        .wp
        .run(vec![
            "post".into(),
            "create".into(),
            format!("--post_title={}", args.str("title")?),
            format!("--post_content={}", args.str("content")?),
            format!("--post_status={}", args.str("status")?),
            format!("--post_type={post_type}"),
            "--porcelain".into(),
        ])
        .await?;

    let post_id = stdout
        .parse::<u64>()
        .map_or_else(|_| Value::String(stdout.clone()), Value::from);

    let mut data = Map::new();
    data.insert("post_id".into(), post_id);
    data.insert("post_type".into(), json!(post_type));
    data.insert(
        "message".into(),
        json!(format!(
            "{} created successfully with ID: {stdout}",
            capitalize(post_type)
        )),
    );
    Ok(data)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

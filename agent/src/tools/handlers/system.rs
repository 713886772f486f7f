//! Host and WordPress version information.

use crate::tools::context::ToolContext;
use crate::tools::error::ToolResult;
use crate::tools::wp_cli::args;
use serde_json::{json, Map, Value};
use sysinfo::System;

const UNKNOWN: &str = "unknown";

pub(crate) async fn get_system_information(ctx: &ToolContext) -> ToolResult {
    let cli_info = ctx.wp.run_json(args(["cli", "info", "--format=json"])).await?;
    let php_version = cli_info
        .get("php_version")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_string();
    let wordpress_version = ctx.wp.run(args(["core", "version"])).await?;
    let wp_cli_version = ctx.wp.run(args(["cli", "version"])).await?;

    let mut data = Map::new();
    data.insert(
        "os_name".into(),
        json!(System::name().unwrap_or_else(|| UNKNOWN.into())),
    );
    data.insert(
        "os_version".into(),
        json!(System::long_os_version()
            .or_else(System::os_version)
            .unwrap_or_else(|| UNKNOWN.into())),
    );
    data.insert(
        "kernel_version".into(),
        json!(System::kernel_version().unwrap_or_else(|| UNKNOWN.into())),
    );
    data.insert("agent_version".into(), json!(env!("CARGO_PKG_VERSION")));
    data.insert("php_version".into(), json!(php_version));
    data.insert("wordpress_version".into(), json!(wordpress_version));
    data.insert("wp_cli_version".into(), json!(wp_cli_version));
    Ok(data)
}

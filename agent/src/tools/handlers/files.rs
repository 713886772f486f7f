//! File tools confined to the sandbox root.
//!
//! Every path goes through [`PathGuard::resolve`](crate::sandbox::PathGuard::resolve)
//! before any filesystem access. Resolution and the subsequent open are not
//! atomic; concurrent writers to the same path are not serialized.

use crate::infrastructure::audit::{log_audit, AuditEvent};
use crate::sandbox::{PathError, SandboxedPath};
use crate::tools::context::ToolContext;
use crate::tools::error::{ToolError, ToolResult};
use crate::tools::name::ToolName;
use crate::tools::schema::ToolArgs;
use serde_json::{json, Map};
use std::io::{self, Write};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const FILE_PATH: &str = "file_path";

pub(crate) async fn read_file(args: &ToolArgs, ctx: &ToolContext) -> ToolResult {
    let path = resolve(ToolName::ReadFile, args, ctx)?;

    let metadata = match fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ToolError::invalid(
                FILE_PATH,
                format!("file not found: {}", path.requested()),
            ));
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(ToolError::invalid(FILE_PATH, "path is not a regular file"));
    }
    if metadata.len() > ctx.max_read_bytes {
        return Err(ToolError::invalid(
            FILE_PATH,
            format!(
                "file is too large ({} bytes, limit {})",
                metadata.len(),
                ctx.max_read_bytes
            ),
        ));
    }

    let bytes = fs::read(&path).await?;
    let size = bytes.len();
    let content = String::from_utf8(bytes)
        .map_err(|_| ToolError::invalid(FILE_PATH, "file is not valid UTF-8 text"))?;

    let mut data = Map::new();
    data.insert("file_path".into(), json!(path.requested()));
    data.insert("content".into(), json!(content));
    data.insert("size".into(), json!(size));
    Ok(data)
}

/// Replaces the whole file. The new content is written to a temporary
/// sibling and renamed over the target, so readers never see a partial file.
pub(crate) async fn edit_file(args: &ToolArgs, ctx: &ToolContext) -> ToolResult {
    let path = resolve(ToolName::EditFile, args, ctx)?;
    let content = args.str("content")?.to_owned();
    reject_directory(&path).await?;

    let parent = parent_of(&path)?;
    if !fs::try_exists(parent).await? {
        if args.flag("create_directories") {
            fs::create_dir_all(parent).await?;
        } else {
            return Err(ToolError::invalid(
                FILE_PATH,
                "parent directory does not exist (set create_directories to create it)",
            ));
        }
    }

    let bytes = content.len();
    let target = path.as_path().to_path_buf();
    tokio::task::spawn_blocking(move || write_atomically(&target, content.as_bytes()))
        .await
        .map_err(|e| ToolError::Internal(format!("write task failed: {e}")))??;

    info!(path = %path.requested(), bytes, "File overwritten");
    log_audit(&AuditEvent::FileModified {
        tool: ToolName::EditFile.to_string(),
        path: path.requested().to_string(),
        bytes,
    });

    let mut data = Map::new();
    data.insert("file_path".into(), json!(path.requested()));
    data.insert("bytes_written".into(), json!(bytes));
    Ok(data)
}

pub(crate) async fn append_to_file(args: &ToolArgs, ctx: &ToolContext) -> ToolResult {
    let path = resolve(ToolName::AppendToFile, args, ctx)?;
    let content = args.str("content")?;
    reject_directory(&path).await?;

    if !fs::try_exists(parent_of(&path)?).await? {
        return Err(ToolError::invalid(
            FILE_PATH,
            "parent directory does not exist",
        ));
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;

    let bytes = content.len();
    info!(path = %path.requested(), bytes, "File appended");
    log_audit(&AuditEvent::FileModified {
        tool: ToolName::AppendToFile.to_string(),
        path: path.requested().to_string(),
        bytes,
    });

    let mut data = Map::new();
    data.insert("file_path".into(), json!(path.requested()));
    data.insert("bytes_appended".into(), json!(bytes));
    Ok(data)
}

fn resolve(tool: ToolName, args: &ToolArgs, ctx: &ToolContext) -> Result<SandboxedPath, ToolError> {
    let requested = args.str(FILE_PATH)?;
    ctx.guard.resolve(requested).map_err(|e| {
        if matches!(e, PathError::OutsideRoot { .. }) {
            warn!(%tool, path = %requested, "Blocked file access outside the sandbox");
            log_audit(&AuditEvent::SandboxViolation {
                tool: tool.to_string(),
                path: requested.to_string(),
            });
        }
        ToolError::path(FILE_PATH, e)
    })
}

async fn reject_directory(path: &SandboxedPath) -> Result<(), ToolError> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => {
            Err(ToolError::invalid(FILE_PATH, "path is a directory"))
        }
        _ => Ok(()),
    }
}

fn parent_of(path: &SandboxedPath) -> Result<&Path, ToolError> {
    path.as_path()
        .parent()
        .ok_or_else(|| ToolError::invalid(FILE_PATH, "path has no parent directory"))
}

fn write_atomically(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = target
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    if let Ok(existing) = std::fs::metadata(target) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

//! The immutable table from tool name to schema and handler.

use crate::tools::context::ToolContext;
use crate::tools::error::ToolResult;
use crate::tools::handlers::{Builtin, PLUGIN_STATUSES, POST_STATUSES};
use crate::tools::name::ToolName;
use crate::tools::schema::{Format, ParamKind, ParamSpec, ToolArgs, ToolSchema};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Implementation of one tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Runs the tool on arguments that already passed its schema.
    async fn call(&self, args: ToolArgs, ctx: &ToolContext) -> ToolResult;
}

/// Schema and handler registered for one tool.
#[derive(Clone)]
pub struct ToolEntry {
    /// Argument schema.
    pub schema: ToolSchema,
    /// Handler invoked after validation.
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Every known tool, built once at start-up and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    entries: BTreeMap<ToolName, ToolEntry>,
}

impl ToolRegistry {
    /// The production registry.
    #[must_use]
    pub fn builtin() -> Self {
        Self::with_handlers(|name| Arc::new(Builtin(name)))
    }

    /// The full tool set with the standard schemas but handlers supplied by
    /// `handler_for`. Intended for tests that need to observe or replace
    /// handler behaviour.
    pub fn with_handlers(mut handler_for: impl FnMut(ToolName) -> Arc<dyn ToolHandler>) -> Self {
        let entries = ToolName::ALL
            .into_iter()
            .map(|name| {
                let entry = ToolEntry {
                    schema: schema_for(name),
                    handler: handler_for(name),
                };
                (name, entry)
            })
            .collect();
        Self { entries }
    }

    /// Looks up a tool by its wire name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<(ToolName, &ToolEntry)> {
        let name = name.parse::<ToolName>().ok()?;
        self.entries.get(&name).map(|entry| (name, entry))
    }

    /// All registered tools in name order.
    pub fn iter(&self) -> impl Iterator<Item = (ToolName, &ToolEntry)> {
        self.entries.iter().map(|(name, entry)| (*name, entry))
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn slug(name: &'static str) -> ParamSpec {
    ParamSpec::required(name, ParamKind::String).matching(Format::Slug)
}

fn version() -> ParamSpec {
    ParamSpec::optional("version", ParamKind::String).matching(Format::Version)
}

fn file_path() -> ParamSpec {
    ParamSpec::required("file_path", ParamKind::String)
}

fn content() -> ParamSpec {
    ParamSpec::required("content", ParamKind::String)
}

/// The argument schema of each tool.
#[must_use]
pub fn schema_for(name: ToolName) -> ToolSchema {
    let schema = ToolSchema::new();
    match name {
        ToolName::GetSystemInformation
        | ToolName::ListWordpressThemes
        | ToolName::GetActiveWordpressTheme => schema,
        ToolName::CreateWordpressPost => schema
            .param(ParamSpec::required("title", ParamKind::String))
            .param(content())
            .param(
                ParamSpec::optional("status", ParamKind::String)
                    .with_default("publish")
                    .one_of(POST_STATUSES),
            )
            .param(
                ParamSpec::optional("post_type", ParamKind::String)
                    .with_default("post")
                    .matching(Format::Slug),
            ),
        ToolName::ActivateWordpressPlugin
        | ToolName::DeactivateWordpressPlugin
        | ToolName::DeleteWordpressPlugin => schema.param(slug("plugin_slug")),
        ToolName::InstallWordpressPlugin => schema.param(slug("plugin_slug")).param(version()),
        ToolName::ListWordpressPlugins => schema.param(
            ParamSpec::optional("status", ParamKind::String).one_of(PLUGIN_STATUSES),
        ),
        ToolName::InstallWordpressTheme => schema.param(slug("theme_slug")).param(version()),
        ToolName::ActivateWordpressTheme | ToolName::DeleteWordpressTheme => {
            schema.param(slug("theme_slug"))
        }
        ToolName::GetWordpressOption => schema.param(
            ParamSpec::required("option_name", ParamKind::String).matching(Format::OptionName),
        ),
        ToolName::UpdateWordpressOption => schema
            .param(
                ParamSpec::required("option_name", ParamKind::String)
                    .matching(Format::OptionName),
            )
            .param(ParamSpec::required("option_value", ParamKind::Scalar)),
        ToolName::ReadFile => schema.param(file_path()),
        ToolName::EditFile => schema.param(file_path()).param(content()).param(
            ParamSpec::optional("create_directories", ParamKind::Boolean).with_default(false),
        ),
        ToolName::AppendToFile => schema.param(file_path()).param(content()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_tool() {
        let registry = ToolRegistry::builtin();
        assert_eq!(registry.len(), ToolName::ALL.len());
        for name in ToolName::ALL {
            assert!(registry.lookup(name.as_str()).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = ToolRegistry::builtin();
        assert!(registry.lookup("invalid_tool").is_none());
        assert!(registry.lookup("").is_none());
        assert!(registry.lookup("READ_FILE").is_none());
    }

    #[test]
    fn test_create_post_schema() {
        let schema = schema_for(ToolName::CreateWordpressPost);
        let names: Vec<_> = schema.params().iter().map(|p| p.name).collect();
        assert_eq!(names, ["title", "content", "status", "post_type"]);
        assert!(schema.params()[0].required);
        assert!(!schema.params()[2].required);
    }
}

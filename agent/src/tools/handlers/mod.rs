//! Built-in tool implementations.

mod extensions;
mod files;
mod options;
mod posts;
mod system;

pub(crate) use extensions::PLUGIN_STATUSES;
pub(crate) use posts::POST_STATUSES;

use crate::tools::context::ToolContext;
use crate::tools::error::ToolResult;
use crate::tools::name::ToolName;
use crate::tools::registry::ToolHandler;
use crate::tools::schema::ToolArgs;
use async_trait::async_trait;
use extensions::Extension;

/// The production handler for one tool.
#[derive(Debug, Clone, Copy)]
pub struct Builtin(pub ToolName);

#[async_trait]
impl ToolHandler for Builtin {
    async fn call(&self, args: ToolArgs, ctx: &ToolContext) -> ToolResult {
        let args = &args;
        match self.0 {
            ToolName::GetSystemInformation => system::get_system_information(ctx).await,
            ToolName::CreateWordpressPost => posts::create_wordpress_post(args, ctx).await,
            ToolName::ActivateWordpressPlugin => {
                extensions::apply(Extension::Plugin, "activate", args, ctx).await
            }
            ToolName::DeactivateWordpressPlugin => {
                extensions::apply(Extension::Plugin, "deactivate", args, ctx).await
            }
            ToolName::InstallWordpressPlugin => {
                extensions::install(Extension::Plugin, args, ctx).await
            }
            ToolName::DeleteWordpressPlugin => {
                extensions::apply(Extension::Plugin, "delete", args, ctx).await
            }
            ToolName::ListWordpressPlugins => extensions::list_plugins(args, ctx).await,
            ToolName::InstallWordpressTheme => {
                extensions::install(Extension::Theme, args, ctx).await
            }
            ToolName::ActivateWordpressTheme => {
                extensions::apply(Extension::Theme, "activate", args, ctx).await
            }
            ToolName::DeleteWordpressTheme => {
                extensions::apply(Extension::Theme, "delete", args, ctx).await
            }
            ToolName::ListWordpressThemes => extensions::list_themes(ctx).await,
            ToolName::GetActiveWordpressTheme => extensions::active_theme(ctx).await,
            ToolName::GetWordpressOption => options::get_option(args, ctx).await,
            ToolName::UpdateWordpressOption => options::update_option(args, ctx).await,
            ToolName::ReadFile => files::read_file(args, ctx).await,
            ToolName::EditFile => files::edit_file(args, ctx).await,
            ToolName::AppendToFile => files::append_to_file(args, ctx).await,
        }
    }
}

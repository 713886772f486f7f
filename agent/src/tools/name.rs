//! The closed set of tool names the agent understands.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a string does not name a known tool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown tool: {0}")]
pub struct UnknownToolName(pub String);

/// Every tool the agent can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// Versions of the OS, agent, PHP, WordPress and WP-CLI.
    GetSystemInformation,
    /// Create a post or page.
    CreateWordpressPost,
    /// Activate an installed plugin.
    ActivateWordpressPlugin,
    /// Deactivate an active plugin.
    DeactivateWordpressPlugin,
    /// Install a plugin from the directory.
    InstallWordpressPlugin,
    /// Delete an installed plugin.
    DeleteWordpressPlugin,
    /// List installed plugins.
    ListWordpressPlugins,
    /// Install a theme from the directory.
    InstallWordpressTheme,
    /// Switch the active theme.
    ActivateWordpressTheme,
    /// Delete an installed theme.
    DeleteWordpressTheme,
    /// List installed themes.
    ListWordpressThemes,
    /// Describe the active theme.
    GetActiveWordpressTheme,
    /// Read an option value.
    GetWordpressOption,
    /// Write an option value.
    UpdateWordpressOption,
    /// Read a file inside the sandbox.
    ReadFile,
    /// Overwrite a file inside the sandbox.
    EditFile,
    /// Append to a file inside the sandbox.
    AppendToFile,
}

impl ToolName {
    /// All tools, in catalogue order.
    pub const ALL: [ToolName; 17] = [
        ToolName::GetSystemInformation,
        ToolName::CreateWordpressPost,
        ToolName::ActivateWordpressPlugin,
        ToolName::DeactivateWordpressPlugin,
        ToolName::InstallWordpressPlugin,
        ToolName::DeleteWordpressPlugin,
        ToolName::ListWordpressPlugins,
        ToolName::InstallWordpressTheme,
        ToolName::ActivateWordpressTheme,
        ToolName::DeleteWordpressTheme,
        ToolName::ListWordpressThemes,
        ToolName::GetActiveWordpressTheme,
        ToolName::GetWordpressOption,
        ToolName::UpdateWordpressOption,
        ToolName::ReadFile,
        ToolName::EditFile,
        ToolName::AppendToFile,
    ];

    /// The wire name of the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetSystemInformation => "get_system_information",
            Self::CreateWordpressPost => "create_wordpress_post",
            Self::ActivateWordpressPlugin => "activate_wordpress_plugin",
            Self::DeactivateWordpressPlugin => "deactivate_wordpress_plugin",
            Self::InstallWordpressPlugin => "install_wordpress_plugin",
            Self::DeleteWordpressPlugin => "delete_wordpress_plugin",
            Self::ListWordpressPlugins => "list_wordpress_plugins",
            Self::InstallWordpressTheme => "install_wordpress_theme",
            Self::ActivateWordpressTheme => "activate_wordpress_theme",
            Self::DeleteWordpressTheme => "delete_wordpress_theme",
            Self::ListWordpressThemes => "list_wordpress_themes",
            Self::GetActiveWordpressTheme => "get_active_wordpress_theme",
            Self::GetWordpressOption => "get_wordpress_option",
            Self::UpdateWordpressOption => "update_wordpress_option",
            Self::ReadFile => "read_file",
            Self::EditFile => "edit_file",
            Self::AppendToFile => "append_to_file",
        }
    }

    /// One-line description shown in the tool listing.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::GetSystemInformation => {
                "Retrieves version information for the OS, agent, PHP, WordPress and WP-CLI."
            }
            Self::CreateWordpressPost => "Creates a new post or page.",
            Self::ActivateWordpressPlugin => "Activates an installed plugin.",
            Self::DeactivateWordpressPlugin => "Deactivates an installed plugin.",
            Self::InstallWordpressPlugin => "Installs a plugin, optionally at a given version.",
            Self::DeleteWordpressPlugin => "Deletes a plugin.",
            Self::ListWordpressPlugins => "Lists installed plugins.",
            Self::InstallWordpressTheme => "Installs a theme, optionally at a given version.",
            Self::ActivateWordpressTheme => "Activates a theme.",
            Self::DeleteWordpressTheme => "Deletes a theme.",
            Self::ListWordpressThemes => "Lists installed themes.",
            Self::GetActiveWordpressTheme => "Gets the active theme.",
            Self::GetWordpressOption => "Retrieves an option value.",
            Self::UpdateWordpressOption => "Updates an option value.",
            Self::ReadFile => "Reads a file within the WordPress installation.",
            Self::EditFile => "Overwrites a file within the WordPress installation.",
            Self::AppendToFile => "Appends content to a file within the WordPress installation.",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = UnknownToolName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownToolName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for name in ToolName::ALL {
            assert_eq!(name.as_str().parse::<ToolName>(), Ok(name));
        }
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<&str> = ToolName::ALL.iter().map(|n| n.as_str()).collect();
        assert_eq!(names.len(), ToolName::ALL.len());
    }

    #[test]
    fn test_unknown_name() {
        let err = "invalid_tool".parse::<ToolName>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: invalid_tool");
    }

    #[test]
    fn test_serialized_name_matches_wire_name() {
        let json = serde_json::to_value(ToolName::GetActiveWordpressTheme).unwrap();
        assert_eq!(json, "get_active_wordpress_theme");
    }
}

//! Pack definition model and validation.
//!
//! A pack is a markdown file whose JSON frontmatter declares a set of command
//! files to install into an agent tool's command directory. Validation is
//! strict: a pack that fails any rule installs nothing.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Component, Path};

use crate::core::error::NwsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackTarget {
    Opencode,
    Claude,
}

impl PackTarget {
    pub fn parse(value: &str) -> Result<Self, NwsError> {
        match value {
            "opencode" => Ok(PackTarget::Opencode),
            "claude" => Ok(PackTarget::Claude),
            _ => Err(NwsError::ValidationError(
                "Invalid --target. Use opencode or claude.".to_string(),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PackTarget::Opencode => "opencode",
            PackTarget::Claude => "claude",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackScope {
    Local,
    Global,
}

impl PackScope {
    pub fn parse(value: &str) -> Result<Self, NwsError> {
        match value {
            "local" => Ok(PackScope::Local),
            "global" => Ok(PackScope::Global),
            _ => Err(NwsError::ValidationError(
                "Invalid --scope. Use local or global.".to_string(),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PackScope::Local => "local",
            PackScope::Global => "global",
        }
    }
}

/// Frontmatter rendered onto Claude command files. Unknown keys are
/// rejected so a typo cannot silently drop a directive.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaudeFrontmatter {
    pub name: String,
    pub description: String,
    #[serde(rename = "argument-hint", default)]
    pub argument_hint: Option<String>,
    #[serde(rename = "disable-model-invocation", default)]
    pub disable_model_invocation: Option<bool>,
    #[serde(rename = "user-invocable")]
    pub user_invocable: bool,
    #[serde(rename = "allowed-tools", default)]
    pub allowed_tools: Option<Vec<String>>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub hooks: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackCommand {
    pub id: String,
    pub description: String,
    /// Install path relative to the scope base directory.
    pub destination: String,
    pub body: String,
    #[serde(default)]
    pub frontmatter: Option<ClaudeFrontmatter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackDefinition {
    pub target: PackTarget,
    pub name: String,
    pub description: String,
    pub commands: Vec<PackCommand>,
}

fn destination_is_safe(destination: &str) -> bool {
    if destination.is_empty() {
        return false;
    }

    let path = Path::new(destination);
    if path.is_absolute() {
        return false;
    }

    path.components()
        .all(|component| matches!(component, Component::Normal(_)))
}

impl PackDefinition {
    /// Checks every structural rule the installer depends on.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as a validation error.
    pub fn validate(&self) -> Result<(), NwsError> {
        if self.name.trim().is_empty() || self.description.trim().is_empty() {
            return Err(NwsError::ValidationError(
                "Pack name and description are required.".to_string(),
            ));
        }
        if self.commands.is_empty() {
            return Err(NwsError::ValidationError(
                "Pack must define at least one command.".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        for command in &self.commands {
            if command.id.trim().is_empty()
                || command.description.trim().is_empty()
                || command.body.trim().is_empty()
            {
                return Err(NwsError::ValidationError(format!(
                    "Command is missing required fields: {}",
                    command.id
                )));
            }

            if !ids.insert(command.id.as_str()) {
                return Err(NwsError::ValidationError(format!(
                    "Duplicate command id: {}",
                    command.id
                )));
            }

            if !destination_is_safe(&command.destination) {
                return Err(NwsError::ValidationError(
                    "Destination must be a relative path without traversal.".to_string(),
                ));
            }

            match self.target {
                PackTarget::Claude => match &command.frontmatter {
                    None => {
                        return Err(NwsError::ValidationError(format!(
                            "Claude command missing frontmatter: {}",
                            command.id
                        )));
                    }
                    Some(frontmatter) if frontmatter.name != command.id => {
                        return Err(NwsError::ValidationError(format!(
                            "Claude frontmatter name must match id for {}",
                            command.id
                        )));
                    }
                    Some(_) => {}
                },
                PackTarget::Opencode => {
                    if command.frontmatter.is_some() {
                        return Err(NwsError::ValidationError(format!(
                            "OpenCode commands must not include frontmatter: {}",
                            command.id
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

//! Pack installation.
//!
//! Pack payloads ship inside the binary; installing renders each command and
//! writes it under the requested scope's base directory. Existing files are
//! only replaced when their content already matches or `--force` is given.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::core::error::NwsError;
use crate::packs::schema::{
    ClaudeFrontmatter, PackCommand, PackDefinition, PackScope, PackTarget,
};

const OPENCODE_PACK: &str = include_str!("../../packs/opencode/pack.md");
const CLAUDE_PACK: &str = include_str!("../../packs/claude-code/pack.md");

pub struct PackInstallResult {
    pub pack: PackDefinition,
    pub scope: PackScope,
    pub installed_paths: Vec<PathBuf>,
}

fn embedded_pack_source(target: PackTarget) -> &'static str {
    match target {
        PackTarget::Opencode => OPENCODE_PACK,
        PackTarget::Claude => CLAUDE_PACK,
    }
}

fn frontmatter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)\A---\s*\r?\n(.*?)\r?\n---").expect("valid frontmatter regex")
    })
}

fn extract_frontmatter_json(contents: &str) -> Result<&str, NwsError> {
    let captures = frontmatter_pattern().captures(contents).ok_or_else(|| {
        NwsError::ValidationError("Pack definition missing frontmatter.".to_string())
    })?;

    let raw = captures
        .get(1)
        .map(|capture| capture.as_str().trim())
        .unwrap_or_default();
    if raw.is_empty() {
        return Err(NwsError::ValidationError(
            "Pack frontmatter is empty.".to_string(),
        ));
    }

    Ok(raw)
}

/// Parses and validates a pack payload.
///
/// # Errors
///
/// Returns an error for missing/empty frontmatter, malformed JSON, or any
/// schema violation.
pub fn load_pack_definition(contents: &str) -> Result<PackDefinition, NwsError> {
    let raw = extract_frontmatter_json(contents)?;
    let pack: PackDefinition = serde_json::from_str(raw).map_err(|error| {
        NwsError::ValidationError(format!("Invalid JSON frontmatter: {}", error))
    })?;
    pack.validate()?;
    Ok(pack)
}

fn resolve_install_base(target: PackTarget, scope: PackScope) -> Result<PathBuf, NwsError> {
    let cwd = std::env::current_dir()?;

    match (target, scope) {
        (PackTarget::Opencode, PackScope::Local) => Ok(cwd.join(".opencode").join("commands")),
        (PackTarget::Opencode, PackScope::Global) => {
            // A pre-XDG ~/.opencode wins over the platform config dir when it
            // already exists.
            let legacy = dirs::home_dir().map(|home| home.join(".opencode"));
            let base = match legacy {
                Some(legacy) if legacy.exists() => legacy,
                _ => dirs::config_dir()
                    .ok_or_else(|| {
                        NwsError::NotFound(
                            "No configuration directory available on this platform.".to_string(),
                        )
                    })?
                    .join("opencode"),
            };
            Ok(base.join("commands"))
        }
        (PackTarget::Claude, PackScope::Local) => Ok(cwd.join(".claude").join("skills")),
        (PackTarget::Claude, PackScope::Global) => {
            let home = dirs::home_dir().ok_or_else(|| {
                NwsError::NotFound("No home directory available on this platform.".to_string())
            })?;
            Ok(home.join(".claude").join("skills"))
        }
    }
}

fn normalize_body(body: &str) -> String {
    format!("{}\n", body.trim())
}

fn format_yaml_value(value: &serde_json::Value) -> String {
    // JSON is a subset of YAML; rendering values as JSON keeps strings
    // quoted and arrays inline.
    value.to_string()
}

fn render_claude_frontmatter(frontmatter: &ClaudeFrontmatter) -> String {
    let mut lines = vec!["---".to_string()];

    let entries: Vec<(&str, Option<serde_json::Value>)> = vec![
        ("name", Some(serde_json::json!(frontmatter.name))),
        ("description", Some(serde_json::json!(frontmatter.description))),
        (
            "argument-hint",
            frontmatter
                .argument_hint
                .as_ref()
                .map(|value| serde_json::json!(value)),
        ),
        (
            "disable-model-invocation",
            frontmatter
                .disable_model_invocation
                .map(|value| serde_json::json!(value)),
        ),
        (
            "user-invocable",
            Some(serde_json::json!(frontmatter.user_invocable)),
        ),
        (
            "allowed-tools",
            frontmatter
                .allowed_tools
                .as_ref()
                .map(|value| serde_json::json!(value)),
        ),
        (
            "model",
            frontmatter.model.as_ref().map(|value| serde_json::json!(value)),
        ),
        (
            "context",
            frontmatter
                .context
                .as_ref()
                .map(|value| serde_json::json!(value)),
        ),
        (
            "agent",
            frontmatter.agent.as_ref().map(|value| serde_json::json!(value)),
        ),
        ("hooks", frontmatter.hooks.clone()),
    ];

    for (key, value) in entries {
        if let Some(value) = value {
            lines.push(format!("{}: {}", key, format_yaml_value(&value)));
        }
    }

    lines.push("---".to_string());
    lines.join("\n")
}

fn render_command_content(target: PackTarget, command: &PackCommand) -> String {
    let body = normalize_body(&command.body);
    match (target, &command.frontmatter) {
        (PackTarget::Claude, Some(frontmatter)) => {
            format!("{}\n\n{}", render_claude_frontmatter(frontmatter), body)
        }
        _ => body,
    }
}

fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Writes every rendered command of `pack` under `base`.
///
/// # Errors
///
/// Returns an error when a destination exists with different content and
/// `force` is not set, or when a write fails. Identical files are rewritten
/// freely.
pub fn install_rendered(
    pack: &PackDefinition,
    base: &Path,
    force: bool,
) -> Result<Vec<PathBuf>, NwsError> {
    let mut installed_paths = Vec::new();

    for command in &pack.commands {
        let destination = base.join(&command.destination);
        let content = render_command_content(pack.target, command);

        if destination.exists() && !force {
            let existing = fs::read_to_string(&destination).unwrap_or_default();
            if checksum(&existing) != checksum(&content) {
                return Err(NwsError::ValidationError(format!(
                    "File exists with different content: {}. Use --force to overwrite.",
                    destination.display()
                )));
            }
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&destination, content)?;
        installed_paths.push(destination);
    }

    Ok(installed_paths)
}

/// Installs the embedded pack for `target` into the `scope` base directory.
///
/// # Errors
///
/// Returns an error when the embedded pack fails validation, the scope base
/// cannot be resolved, or a destination conflicts without `--force`.
pub fn install_pack(
    target: PackTarget,
    scope: PackScope,
    force: bool,
) -> Result<PackInstallResult, NwsError> {
    let pack = load_pack_definition(embedded_pack_source(target))?;
    let base = resolve_install_base(target, scope)?;
    let installed_paths = install_rendered(&pack, &base, force)?;

    Ok(PackInstallResult {
        pack,
        scope,
        installed_paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PACK: &str = r#"---
{
  "target": "opencode",
  "name": "demo",
  "description": "Demo pack",
  "commands": [
    {
      "id": "plan",
      "description": "Plan",
      "destination": "nws-plan.md",
      "body": "Run `nws plan`."
    }
  ]
}
---

Reference notes below the frontmatter are ignored.
"#;

    #[test]
    fn test_load_pack_definition_parses_frontmatter() {
        let pack = load_pack_definition(PACK).unwrap();
        assert_eq!(pack.name, "demo");
        assert_eq!(pack.commands.len(), 1);
        assert_eq!(pack.commands[0].destination, "nws-plan.md");
    }

    #[test]
    fn test_missing_frontmatter_is_rejected() {
        let err = load_pack_definition("# no frontmatter here").unwrap_err();
        assert!(err.to_string().contains("missing frontmatter"));
    }

    #[test]
    fn test_invalid_json_frontmatter_is_rejected() {
        let err = load_pack_definition("---\n{ not json\n---\n").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON frontmatter"));
    }

    #[test]
    fn test_embedded_packs_are_valid() {
        let opencode = load_pack_definition(embedded_pack_source(PackTarget::Opencode)).unwrap();
        assert_eq!(opencode.target, PackTarget::Opencode);

        let claude = load_pack_definition(embedded_pack_source(PackTarget::Claude)).unwrap();
        assert_eq!(claude.target, PackTarget::Claude);
        for command in &claude.commands {
            assert!(command.frontmatter.is_some());
        }
    }

    #[test]
    fn test_install_rendered_writes_commands() {
        let tmp = tempdir().unwrap();
        let pack = load_pack_definition(PACK).unwrap();

        let installed = install_rendered(&pack, tmp.path(), false).unwrap();
        assert_eq!(installed.len(), 1);
        let content = fs::read_to_string(&installed[0]).unwrap();
        assert_eq!(content, "Run `nws plan`.\n");
    }

    #[test]
    fn test_install_refuses_differing_file_without_force() {
        let tmp = tempdir().unwrap();
        let pack = load_pack_definition(PACK).unwrap();
        let destination = tmp.path().join("nws-plan.md");
        fs::write(&destination, "operator edits").unwrap();

        let err = install_rendered(&pack, tmp.path(), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        // The operator's file is untouched.
        assert_eq!(fs::read_to_string(&destination).unwrap(), "operator edits");

        install_rendered(&pack, tmp.path(), true).unwrap();
        assert_eq!(
            fs::read_to_string(&destination).unwrap(),
            "Run `nws plan`.\n"
        );
    }

    #[test]
    fn test_install_rewrites_identical_file_without_force() {
        let tmp = tempdir().unwrap();
        let pack = load_pack_definition(PACK).unwrap();

        install_rendered(&pack, tmp.path(), false).unwrap();
        // Re-running is a no-op, not a conflict.
        install_rendered(&pack, tmp.path(), false).unwrap();
    }

    #[test]
    fn test_render_claude_frontmatter_skips_absent_keys() {
        let frontmatter = ClaudeFrontmatter {
            name: "plan".to_string(),
            description: "Plan the workspace".to_string(),
            argument_hint: Some("[scope]".to_string()),
            disable_model_invocation: None,
            user_invocable: true,
            allowed_tools: Some(vec!["Bash".to_string()]),
            model: None,
            context: None,
            agent: None,
            hooks: None,
        };

        let rendered = render_claude_frontmatter(&frontmatter);
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.ends_with("\n---"));
        assert!(rendered.contains("name: \"plan\""));
        assert!(rendered.contains("argument-hint: \"[scope]\""));
        assert!(rendered.contains("user-invocable: true"));
        assert!(rendered.contains("allowed-tools: [\"Bash\"]"));
        assert!(!rendered.contains("model:"));
        assert!(!rendered.contains("hooks:"));
    }
}

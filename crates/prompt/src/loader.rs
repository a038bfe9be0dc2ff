//! Prompt loader for YAML prompt definitions.
//!
//! Definitions live in `<workspace>/.jobs/prompts/<id>.yml`. The default
//! answer prompt is compiled into the binary so a fresh deployment works
//! without any prompt files; a workspace file with the same id overrides it.

use crate::types::PromptDefinition;
use jobs_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the built-in answer prompt.
pub const DEFAULT_PROMPT_ID: &str = "jobs.answer.default";

const DEFAULT_PROMPT_YAML: &str = include_str!("../prompts/jobs.answer.default.yml");

/// Parse the built-in answer prompt.
pub fn default_prompt() -> AppResult<PromptDefinition> {
    parse_prompt(DEFAULT_PROMPT_YAML, "built-in prompt")
}

/// Load a prompt definition by ID from the workspace.
///
/// Falls back to the built-in definition when `prompt_id` is
/// [`DEFAULT_PROMPT_ID`] and the workspace has no override.
///
/// # Example
/// ```no_run
/// use jobs_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "jobs.answer.default")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".jobs/prompts")
        .join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        if prompt_id == DEFAULT_PROMPT_ID {
            tracing::debug!("No workspace override, using built-in prompt");
            return default_prompt();
        }
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition = parse_prompt(&contents, &format!("{:?}", prompt_file))?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List all prompt IDs available in the workspace.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let prompts_dir = workspace_path.join(".jobs/prompts");

    let mut prompt_ids = vec![DEFAULT_PROMPT_ID.to_string()];

    if !prompts_dir.exists() {
        return Ok(prompt_ids);
    }

    for entry in walkdir::WalkDir::new(&prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem != DEFAULT_PROMPT_ID {
                    prompt_ids.push(stem.to_string());
                }
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    // The answer must always see the retrieved context and the question
    for required in ["{{context}}", "{{question}}"] {
        if !def.template.contains(required) {
            return Err(AppError::Prompt(format!(
                "Prompt template '{}' must contain {}",
                def.id, required
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_prompt(dir: &Path, id: &str, template: &str) -> PathBuf {
        let prompts_dir = dir.join(".jobs/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();

        let content = format!(
            r#"
id: {}
title: "Test Prompt"
apiVersion: "1.0"
createdBy: test
persona: "persona"
rules: "rules"
template: "{}"
output:
  format: text
"#,
            id, template
        );

        let file_path = prompts_dir.join(format!("{}.yml", id));
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_default_prompt_parses() {
        let prompt = default_prompt().unwrap();
        assert_eq!(prompt.id, DEFAULT_PROMPT_ID);
        assert!(prompt.persona.contains("Jobs"));
        assert!(prompt.rules.contains("마크다운"));
    }

    #[test]
    fn test_default_prompt_without_workspace_file() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(temp_dir.path(), DEFAULT_PROMPT_ID).unwrap();
        assert_eq!(prompt.id, DEFAULT_PROMPT_ID);
    }

    #[test]
    fn test_workspace_overrides_default() {
        let temp_dir = TempDir::new().unwrap();
        create_test_prompt(
            temp_dir.path(),
            DEFAULT_PROMPT_ID,
            "custom {{context}} {{question}}",
        );

        let prompt = load_prompt(temp_dir.path(), DEFAULT_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Test Prompt");
        assert!(prompt.template.starts_with("custom"));
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_prompt(temp_dir.path(), "nonexistent");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let prompts_dir = temp_dir.path().join(".jobs/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join("invalid.yml"), "invalid: yaml: content:").unwrap();

        let result = load_prompt(temp_dir.path(), "invalid");
        assert!(result.is_err());
    }

    #[test]
    fn test_template_without_context_rejected() {
        let temp_dir = TempDir::new().unwrap();
        create_test_prompt(temp_dir.path(), "no.context", "only {{question}}");

        let err = load_prompt(temp_dir.path(), "no.context").unwrap_err();
        assert!(err.to_string().contains("{{context}}"));
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        create_test_prompt(temp_dir.path(), "prompt1", "{{context}} {{question}}");
        create_test_prompt(temp_dir.path(), "prompt2", "{{context}} {{question}}");

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.contains(&DEFAULT_PROMPT_ID.to_string()));
        assert!(prompts.contains(&"prompt1".to_string()));
        assert!(prompts.contains(&"prompt2".to_string()));
    }
}

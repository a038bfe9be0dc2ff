//! Check command handler.
//!
//! Validates the effective configuration and prints a summary of what the
//! service would load, without contacting any remote service.

use clap::Args;
use jobs_core::{config::AppConfig, AppResult};
use serde::Serialize;

/// Validate configuration and show what would be loaded
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigSummary {
    workspace: String,
    provider: String,
    model: String,
    temperature: f32,
    embedding: String,
    corpora: Vec<CorpusSummary>,
    prompt_id: String,
    available_prompts: Vec<String>,
    listen: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CorpusSummary {
    name: String,
    provider: String,
    k: usize,
    weight: f64,
}

impl CheckCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        config.validate()?;
        let summary = summarize(config)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }
        Ok(())
    }
}

fn summarize(config: &AppConfig) -> AppResult<ConfigSummary> {
    Ok(ConfigSummary {
        workspace: config.workspace.display().to_string(),
        provider: config.provider.clone(),
        model: config.model.clone(),
        temperature: config.temperature,
        embedding: format!(
            "{}/{} ({} dims)",
            config.embedding.provider, config.embedding.model, config.embedding.dimensions
        ),
        corpora: config
            .corpora
            .iter()
            .map(|c| CorpusSummary {
                name: c.name.clone(),
                provider: c.provider.clone(),
                k: c.k,
                weight: c.weight,
            })
            .collect(),
        prompt_id: config.prompt_id.clone(),
        available_prompts: jobs_prompt::list_prompts(&config.workspace)?,
        listen: format!("{}:{}", config.server.host, config.server.port),
    })
}

fn print_summary(summary: &ConfigSummary) {
    println!("Configuration OK");
    println!("  Workspace:   {}", summary.workspace);
    println!(
        "  Model:       {} / {} (temperature {})",
        summary.provider, summary.model, summary.temperature
    );
    println!("  Embedding:   {}", summary.embedding);
    println!("  Corpora:");
    for corpus in &summary.corpora {
        println!(
            "    - {} [{}] k={} weight={}",
            corpus.name, corpus.provider, corpus.k, corpus.weight
        );
    }
    println!(
        "  Prompt:      {} (available: {})",
        summary.prompt_id,
        summary.available_prompts.join(", ")
    );
    println!("  Listen:      {}", summary.listen);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_summary_lists_corpora_and_prompts() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig {
            workspace: temp_dir.path().to_path_buf(),
            ..AppConfig::default()
        };

        let summary = summarize(&config).unwrap();
        assert_eq!(summary.corpora.len(), config.corpora.len());
        assert!(summary.available_prompts.contains(&config.prompt_id));
        assert_eq!(
            summary.listen,
            format!("{}:{}", config.server.host, config.server.port)
        );
    }

    #[test]
    fn test_summary_json_uses_camel_case() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig {
            workspace: temp_dir.path().to_path_buf(),
            ..AppConfig::default()
        };

        let json = serde_json::to_value(summarize(&config).unwrap()).unwrap();
        assert!(json.get("promptId").is_some());
        assert!(json.get("availablePrompts").is_some());
    }
}

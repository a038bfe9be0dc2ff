//! Ask command handler.
//!
//! Runs one question through the same pipeline the HTTP service uses.

use clap::Args;
use jobs_core::{config::AppConfig, AppError, AppResult};
use jobs_knowledge::{pipeline_from_config, Answer};
use jobs_prompt::{ChatTurn, UserProfile};
use std::path::{Path, PathBuf};

/// Ask a single question from the terminal
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// User age used for personalization
    #[arg(long)]
    pub age: Option<String>,

    /// User region used for personalization
    #[arg(long)]
    pub region: Option<String>,

    /// JSON file with prior chat turns ([{"sender": "user", "text": "..."}])
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Ask command options: {:?}", self);

        let history = match &self.history {
            Some(path) => read_history(path)?,
            None => Vec::new(),
        };
        let profile = self.profile();

        let pipeline = pipeline_from_config(config)?;
        let answer = pipeline.ask(&self.question, &history, &profile).await;

        println!("{}", render(&answer, self.json)?);
        Ok(())
    }

    fn profile(&self) -> UserProfile {
        UserProfile::new(self.age.as_deref(), self.region.as_deref())
    }
}

fn read_history(path: &Path) -> AppResult<Vec<ChatTurn>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read history file {:?}: {}", path, e))
    })?;
    Ok(serde_json::from_str(&contents)?)
}

fn render(answer: &Answer, json: bool) -> AppResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(answer)?);
    }

    let mut out = answer.answer.clone();
    if let Some(source) = &answer.source {
        out.push_str("\n\n출처: ");
        out.push_str(source);
    }
    Ok(out)
}

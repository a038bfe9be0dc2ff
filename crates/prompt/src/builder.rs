//! Prompt builder for rendering the answer template.

use crate::history::{render_history, ConversationPair};
use crate::profile::UserProfile;
use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use handlebars::Handlebars;
use jobs_core::{AppError, AppResult};
use serde::Serialize;

/// Placed in the context section when retrieval found nothing.
pub const NO_RESULTS: &str = "검색 결과 없음";

/// Variables exposed to the template.
#[derive(Debug, Serialize)]
struct TemplateVars<'a> {
    persona: &'a str,
    rules: &'a str,
    profile: String,
    history: String,
    context: &'a str,
    question: &'a str,
}

/// Build the single prompt sent to the model.
///
/// The template sees six variables in this order: `persona`, `rules`,
/// `profile`, `history`, `context` and `question`. `history` is empty when
/// there are no pairs so the template can pick its own placeholder.
/// `question` is always the raw user question, never the augmented query.
///
/// # Example
/// ```no_run
/// use jobs_prompt::{build_prompt, default_prompt, UserProfile};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = default_prompt()?;
/// let profile = UserProfile::new(Some("24"), Some("광주"));
/// let built = build_prompt(&def, "청년 월세 지원 알려줘", &profile, &[], "")?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    question: &str,
    profile: &UserProfile,
    history: &[ConversationPair],
    context: &str,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let context_included = !context.trim().is_empty();
    let vars = TemplateVars {
        persona: definition.persona.trim_end(),
        rules: definition.rules.trim_end(),
        profile: profile.render_block(),
        history: render_history(history),
        context: if context_included { context } else { NO_RESULTS },
        question,
    };

    let user = render_template(&definition.template, &vars)?;

    Ok(BuiltPrompt {
        user,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            profile_included: !profile.known_values().is_empty(),
            history_pairs: history.len(),
            context_included,
        },
    })
}

/// Render a Handlebars template with variables.
fn render_template<T: Serialize>(template: &str, variables: &T) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text prompt, nothing to escape
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

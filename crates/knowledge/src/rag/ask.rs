//! RAG answering orchestration.
//!
//! Reconstructs history, augments the search query, retrieves and fuses
//! documents, renders the prompt, calls the model and extracts the answer.
//! Every failure is contained here and turned into the fixed apology.

use crate::rag::answer::{Answer, AnswerExtractor};
use crate::rag::augment::QueryAugmenter;
use crate::rag::format::ContextFormatter;
use crate::retriever::Retriever;
use jobs_core::AppResult;
use jobs_llm::{LlmClient, LlmRequest};
use jobs_prompt::{build_prompt, reconstruct_history, ChatTurn, PromptDefinition, UserProfile};
use std::sync::Arc;
use tracing::Instrument;

/// Answer returned for any internal failure.
pub const APOLOGY: &str = "죄송합니다, 답변 생성 중 오류가 발생했습니다.";

/// Per-request answering pipeline.
///
/// Holds long-lived handles built once at startup; serving a request never
/// mutates it, so one instance is shared across concurrent requests.
pub struct RagPipeline {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LlmClient>,
    prompt: PromptDefinition,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    augmenter: QueryAugmenter,
    formatter: ContextFormatter,
    extractor: AnswerExtractor,
}

impl RagPipeline {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        llm: Arc<dyn LlmClient>,
        prompt: PromptDefinition,
        model: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            llm,
            prompt,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            augmenter: QueryAugmenter::default(),
            formatter: ContextFormatter::default(),
            extractor: AnswerExtractor::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the length of generated answers.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_augmenter(mut self, augmenter: QueryAugmenter) -> Self {
        self.augmenter = augmenter;
        self
    }

    pub fn with_formatter(mut self, formatter: ContextFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_extractor(mut self, extractor: AnswerExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.llm.provider_name()
    }

    pub fn retriever_name(&self) -> &str {
        self.retriever.name()
    }

    /// Answer a question, propagating retrieval and model failures.
    pub async fn answer(
        &self,
        question: &str,
        history: &[ChatTurn],
        profile: &UserProfile,
    ) -> AppResult<Answer> {
        tracing::info!("Received question: {}", question);

        let pairs = reconstruct_history(history);
        let search_query = self.augmenter.augment(question, profile);
        if search_query != question {
            tracing::info!("Augmented search query: {}", search_query);
        }

        let documents = self.retriever.retrieve(&search_query).await?;
        tracing::info!("Retrieved {} documents after fusion", documents.len());

        let context = self.formatter.format(&documents);
        let built = build_prompt(&self.prompt, question, profile, &pairs, &context)?;

        tracing::debug!(
            history_pairs = built.metadata.history_pairs,
            profile_included = built.metadata.profile_included,
            context_included = built.metadata.context_included,
            "Built prompt ({} chars)",
            built.user.chars().count()
        );

        let mut request =
            LlmRequest::new(built.user, self.model.as_str()).with_temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self.llm.complete(&request).await?;
        tracing::debug!("Model answer: {}", response.content);

        self.extractor.extract(&response.content, &documents)
    }

    /// Answer a question, converting any failure into the apology.
    ///
    /// Never fails: the caller always gets an `(answer, source)` pair.
    pub async fn ask(&self, question: &str, history: &[ChatTurn], profile: &UserProfile) -> Answer {
        let span = tracing::info_span!("ask", provider = %self.llm.provider_name());

        match self.answer(question, history, profile).instrument(span).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(
                    kind = e.kind(),
                    error = %e,
                    question = %question,
                    "Failed to answer question"
                );
                Answer::new(APOLOGY, None)
            }
        }
    }
}

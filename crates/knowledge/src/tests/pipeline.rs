//! End-to-end scenarios for the answering pipeline.

use crate::rag::{
    RagPipeline, WeightedEnsembleRetriever, WeightedSource, APOLOGY, NO_SOURCE,
};
use crate::retriever::Retriever;
use crate::types::RetrievedDocument;
use jobs_core::{AppError, AppResult};
use jobs_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use jobs_prompt::{default_prompt, ChatTurn, UserProfile, NO_RESULTS};
use std::sync::{Arc, Mutex};

/// Model double recording every request.
struct MockLlm {
    reply: Option<String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlm {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Some(reply) => Ok(LlmResponse {
                content: reply.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(0, 0),
            }),
            None => Err(AppError::Llm("model unavailable".to_string())),
        }
    }
}

/// Retriever double recording the queries it receives.
struct StubRetriever {
    name: String,
    docs: Option<Vec<RetrievedDocument>>,
    queries: Mutex<Vec<String>>,
}

impl StubRetriever {
    fn returning(name: &str, docs: Vec<RetrievedDocument>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            docs: Some(docs),
            queries: Mutex::new(Vec::new()),
        })
    }

    fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            docs: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Retriever for StubRetriever {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(&self, query: &str) -> AppResult<Vec<RetrievedDocument>> {
        self.queries.lock().unwrap().push(query.to_string());
        self.docs
            .clone()
            .ok_or_else(|| AppError::Retrieval(format!("{} unreachable", self.name)))
    }
}

fn policy_doc() -> RetrievedDocument {
    RetrievedDocument::new("광주광역시 거주 만 19~34세 청년에게 월 20만원 월세 지원")
        .with_meta("policy_name", "광주 청년 월세 지원")
        .with_meta("target_audience", "만 19~34세 청년")
        .with_meta("apply_method", "온라인 신청")
}

fn job_doc() -> RetrievedDocument {
    RetrievedDocument::new("광주 소재 기업 데이터 분석 인턴 모집")
        .with_meta("title", "데이터 분석 인턴")
        .with_meta("job_category", "IT")
        .with_meta("apply_end_date", "2025-12-31")
        .with_meta("apply_link", "https://example.com/jobs/42")
}

fn ensemble(policy: Arc<StubRetriever>, job: Arc<StubRetriever>) -> Arc<WeightedEnsembleRetriever> {
    Arc::new(WeightedEnsembleRetriever::new(vec![
        WeightedSource::new(policy, 0.5),
        WeightedSource::new(job, 0.5),
    ]))
}

fn pipeline(retriever: Arc<dyn Retriever>, llm: Arc<MockLlm>) -> RagPipeline {
    RagPipeline::new(retriever, llm, default_prompt().unwrap(), "test-model")
}

#[tokio::test]
async fn test_profile_question_end_to_end() {
    let policy = StubRetriever::returning("policy", vec![policy_doc()]);
    let job = StubRetriever::returning("job", vec![job_doc()]);
    let llm = MockLlm::replying("광주에 사는 24세 청년이 받을 수 있는 월세 지원이 있습니다.");
    let pipeline = pipeline(ensemble(policy.clone(), job.clone()), llm.clone());

    let profile = UserProfile::new(Some("24"), Some("광주"));
    let answer = pipeline.ask("나한테 맞는 정책 알려줘", &[], &profile).await;

    // Both corpora see the augmented query
    for queries in [policy.queries(), job.queries()] {
        assert_eq!(queries, vec!["나한테 맞는 정책 알려줘 24 광주".to_string()]);
    }

    assert!(!answer.answer.is_empty());
    assert_ne!(answer.answer, APOLOGY);
    assert_eq!(answer.source.as_deref(), Some("광주 청년 월세 지원"));

    // The prompt carries the raw question, not the augmented query
    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("[질문]\n나한테 맞는 정책 알려줘\n"));
    assert!(!prompts[0].contains("나한테 맞는 정책 알려줘 24 광주"));
    assert!(prompts[0].contains("- 나이: 24\n- 거주지: 광주"));
    assert!(prompts[0].contains("--- [문서 1: 광주 청년 월세 지원] ---"));
    assert!(prompts[0].contains("--- [문서 2: 데이터 분석 인턴] ---"));
    assert!(prompts[0].contains("링크: https://example.com/jobs/42"));
}

#[tokio::test]
async fn test_both_retrievals_fail_returns_apology() {
    let llm = MockLlm::replying("unused");
    let pipeline = pipeline(
        ensemble(StubRetriever::failing("policy"), StubRetriever::failing("job")),
        llm.clone(),
    );

    let profile = UserProfile::new(Some("24"), Some("광주"));
    let answer = pipeline.ask("나한테 맞는 정책 알려줘", &[], &profile).await;

    assert_eq!(answer.answer, APOLOGY);
    assert_eq!(answer.source, None);
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn test_one_retrieval_failure_fails_request() {
    let llm = MockLlm::replying("unused");
    let pipeline = pipeline(
        ensemble(
            StubRetriever::returning("policy", vec![policy_doc()]),
            StubRetriever::failing("job"),
        ),
        llm.clone(),
    );

    let result = pipeline.answer("청년 정책", &[], &UserProfile::default()).await;
    assert!(matches!(result, Err(AppError::Retrieval(_))));
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn test_model_failure_returns_apology() {
    let pipeline = pipeline(
        ensemble(
            StubRetriever::returning("policy", vec![policy_doc()]),
            StubRetriever::returning("job", vec![]),
        ),
        MockLlm::failing(),
    );

    let answer = pipeline.ask("청년 정책", &[], &UserProfile::default()).await;
    assert_eq!(answer.answer, APOLOGY);
    assert_eq!(answer.source, None);
}

#[tokio::test]
async fn test_blank_model_output_returns_apology() {
    let pipeline = pipeline(
        ensemble(
            StubRetriever::returning("policy", vec![policy_doc()]),
            StubRetriever::returning("job", vec![]),
        ),
        MockLlm::replying("   "),
    );

    let answer = pipeline.ask("청년 정책", &[], &UserProfile::default()).await;
    assert_eq!(answer.answer, APOLOGY);
}

#[tokio::test]
async fn test_empty_retrieval_still_answers() {
    let llm = MockLlm::replying("안녕하세요! 저는 Jobs입니다.");
    let pipeline = pipeline(
        ensemble(
            StubRetriever::returning("policy", vec![]),
            StubRetriever::returning("job", vec![]),
        ),
        llm.clone(),
    );

    let answer = pipeline.ask("안녕", &[], &UserProfile::default()).await;
    assert_eq!(answer.answer, "안녕하세요! 저는 Jobs입니다.");
    assert_eq!(answer.source.as_deref(), Some(NO_SOURCE));

    let prompt = &llm.prompts()[0];
    assert!(prompt.contains(NO_RESULTS));
    assert!(prompt.contains("(로그인하지 않은 사용자 또는 정보 없음)"));
}

#[tokio::test]
async fn test_history_and_untriggered_query() {
    let policy = StubRetriever::returning("policy", vec![policy_doc()]);
    let llm = MockLlm::replying("네, 월 20만원입니다.");
    let pipeline = pipeline(policy.clone(), llm.clone());

    let history = vec![
        ChatTurn::bot("안녕하세요! 저는 Jobs입니다."),
        ChatTurn::user("광주 월세 지원 있어?"),
        ChatTurn::bot("광주 청년 월세 지원이 있습니다."),
        ChatTurn::user("얼마야?"),
    ];
    let profile = UserProfile::new(Some("24"), Some("광주"));

    let answer = pipeline.ask("구체적으로?", &history, &profile).await;
    assert_eq!(answer.answer, "네, 월 20만원입니다.");

    // No trigger token: the search query is the question itself
    assert_eq!(policy.queries(), vec!["구체적으로?".to_string()]);

    let prompt = &llm.prompts()[0];
    assert!(prompt.contains("User: 광주 월세 지원 있어?\nBot: 광주 청년 월세 지원이 있습니다.\n"));
    assert!(!prompt.contains("얼마야?"));
    assert!(!prompt.contains("(이전 대화 없음)"));
}

#[tokio::test]
async fn test_shared_document_is_top_source() {
    let shared = job_doc();
    let policy = StubRetriever::returning("policy", vec![policy_doc(), shared.clone()]);
    let job = StubRetriever::returning("job", vec![shared]);
    let pipeline = pipeline(ensemble(policy, job), MockLlm::replying("답변"));

    let answer = pipeline.ask("인턴 공고", &[], &UserProfile::default()).await;
    assert_eq!(answer.source.as_deref(), Some("데이터 분석 인턴"));
}

#[tokio::test]
async fn test_request_uses_configured_model_and_temperature() {
    let llm = MockLlm::replying("답변");
    let pipeline = pipeline(StubRetriever::returning("policy", vec![]), llm.clone())
        .with_temperature(0.0);

    pipeline.ask("질문", &[], &UserProfile::default()).await;

    let requests = llm.requests.lock().unwrap();
    assert_eq!(requests[0].model, "test-model");
    assert_eq!(requests[0].temperature, Some(0.0));
    assert_eq!(requests[0].max_tokens, None);
}

#[tokio::test]
async fn test_request_carries_answer_length_cap() {
    let llm = MockLlm::replying("답변");
    let pipeline = pipeline(StubRetriever::returning("policy", vec![]), llm.clone())
        .with_max_tokens(800);

    pipeline.ask("질문", &[], &UserProfile::default()).await;

    let requests = llm.requests.lock().unwrap();
    assert_eq!(requests[0].max_tokens, Some(800));
}

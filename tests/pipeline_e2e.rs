//! End-to-end pipeline tests.
//!
//! The first group drives the orchestrator with in-process test doubles for
//! the LLM and the providers. The last test runs the whole stack over HTTP
//! against a mock server standing in for both the LLM API and the search
//! backends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use research_search::{
    EvidenceCollector, NewsSearchProvider, PostCollectionDelay, RawRecord, SearchConfig,
    SearchError, SourceKind, SourceProvider, WebSearchProvider,
};
use researchbot::llm::{
    CompletionClient, CompletionRequest, LlmError, OpenAiCompatClient, OpenAiCompatConfig,
};
use researchbot::{Orchestrator, QueryGenerator, ResearchError, Stage, SynthesisEngine};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROMPT: &str = "Latest trends in AI-generated art";
const QUERY: &str = "AI generated art trends 2024";
const ANSWER: &str = "AI art is moving toward video and 3D generation.";

/// Replies to query requests (temperature 0) and synthesis requests with
/// fixed strings, recording every request.
struct StageClient {
    query_reply: Result<String, String>,
    answer_reply: Result<String, String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StageClient {
    fn new(query_reply: Result<&str, &str>, answer_reply: Result<&str, &str>) -> Arc<Self> {
        Arc::new(Self {
            query_reply: query_reply.map(str::to_owned).map_err(str::to_owned),
            answer_reply: answer_reply.map(str::to_owned).map_err(str::to_owned),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl CompletionClient for StageClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().expect("lock").push(request.clone());
        let reply = if request.temperature == Some(0.0) {
            &self.query_reply
        } else {
            &self.answer_reply
        };
        reply.clone().map_err(LlmError::ProviderError)
    }

    fn name(&self) -> &str {
        "stage"
    }
}

/// Returns fixed records and remembers the query it was asked.
struct FixedProvider {
    kind: SourceKind,
    records: Vec<RawRecord>,
    seen_query: Arc<Mutex<Option<String>>>,
}

#[async_trait]
impl SourceProvider for FixedProvider {
    async fn fetch(&self, query: &str, _limit: usize) -> Result<Vec<RawRecord>, SearchError> {
        *self.seen_query.lock().expect("lock") = Some(query.to_owned());
        Ok(self.records.clone())
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }
}

fn two_web_items() -> Vec<RawRecord> {
    vec![
        RawRecord::new()
            .with_url("https://example.com/ai-art-2024")
            .with_title("AI art in 2024")
            .with_body("Diffusion models dominate."),
        RawRecord::new()
            .with_href("https://example.org/generative-video")
            .with_text("Generative video is the next frontier for AI artists."),
    ]
}

fn orchestrator(client: Arc<StageClient>, providers: Vec<Box<dyn SourceProvider>>) -> Orchestrator {
    Orchestrator::new(
        QueryGenerator::new(client.clone(), "query-model"),
        EvidenceCollector::new(providers).with_delay(PostCollectionDelay::none()),
        SynthesisEngine::new(client, "research-model"),
    )
}

#[tokio::test]
async fn ai_art_scenario_returns_prompt_query_and_answer() {
    let client = StageClient::new(Ok(QUERY), Ok(ANSWER));
    let seen_query = Arc::new(Mutex::new(None));
    let web: Box<dyn SourceProvider> = Box::new(FixedProvider {
        kind: SourceKind::Web,
        records: two_web_items(),
        seen_query: Arc::clone(&seen_query),
    });

    let request = orchestrator(client.clone(), vec![web])
        .run_one(PROMPT)
        .await
        .expect("pipeline should succeed");

    assert_eq!(request.prompt, PROMPT);
    assert_eq!(request.generated_query, QUERY);
    assert_eq!(request.answer, ANSWER);
    assert_eq!(request.evidence.len(), 2);
    assert_eq!(seen_query.lock().expect("lock").as_deref(), Some(QUERY));

    let report = request.report();
    assert_eq!(
        serde_json::to_value(&report).expect("serializable"),
        json!({"prompt": PROMPT, "query": QUERY, "answer": ANSWER})
    );

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].model, "query-model");
    assert_eq!(requests[1].model, "research-model");
    let synthesis_text = requests[1].last_user_text().expect("user message");
    assert!(synthesis_text.contains(PROMPT));
    assert!(synthesis_text.contains("AI art in 2024: Diffusion models dominate."));
    assert!(synthesis_text.contains("Generative video is the next frontier for AI artists."));
}

#[tokio::test]
async fn synthesis_failure_fails_request_without_fallback() {
    let client = StageClient::new(Ok(QUERY), Err("model overloaded"));
    let err = orchestrator(client, vec![])
        .run_one(PROMPT)
        .await
        .expect_err("synthesis failure should surface");
    assert!(matches!(
        err,
        ResearchError::Llm {
            stage: Stage::Synthesis,
            ..
        }
    ));
}

#[tokio::test]
async fn empty_query_is_llm_failure() {
    let client = StageClient::new(Ok("  \n"), Ok(ANSWER));
    let err = orchestrator(client.clone(), vec![])
        .run_one(PROMPT)
        .await
        .expect_err("blank query should fail");
    assert_eq!(err.stage(), Some(Stage::Query));
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn collection_delay_runs_once_per_request() {
    let client = StageClient::new(Ok(QUERY), Ok(ANSWER));
    let orch = Orchestrator::new(
        QueryGenerator::new(client.clone(), "m"),
        EvidenceCollector::new(vec![]).with_delay(PostCollectionDelay::new(
            std::time::Duration::from_secs(1),
        )),
        SynthesisEngine::new(client, "m"),
    );
    let prompts = vec!["one".to_owned(), "two".to_owned()];

    let start = tokio::time::Instant::now();
    let requests = orch.run_batch(&prompts).await.expect("batch should succeed");
    assert_eq!(requests.len(), 2);
    assert!(start.elapsed() >= std::time::Duration::from_secs(2));
}

// ────────────────────────────────────────────────────────────────────────────
// Full stack over HTTP
// ────────────────────────────────────────────────────────────────────────────

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
}

#[tokio::test]
async fn full_stack_against_mock_services() {
    let server = MockServer::start().await;

    // Query generation is the only temperature-0 call.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"temperature": 0.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(QUERY)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(ANSWER)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <div class="result results_links web-result">
              <a class="result__a" href="https://example.com/ai-art">AI art trends</a>
              <div class="result__snippet">Generative art keeps growing.</div>
            </div>
            <div class="result results_links web-result">
              <a class="result__a" href="https://example.com/ai-art#comments">AI art trends (comments)</a>
              <div class="result__snippet">Duplicate link with a fragment.</div>
            </div>
            </body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <div class="news-card" url="https://news.example.com/museum-ai">
              <a class="title" href="https://news.example.com/museum-ai">Museum opens AI wing</a>
              <div class="snippet">A new exhibit of machine-made art.</div>
            </div></body></html>"#,
        ))
        .mount(&server)
        .await;

    let search_config = SearchConfig {
        timeout_seconds: 2,
        post_collection_delay_ms: 0,
        ..Default::default()
    };
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(
            WebSearchProvider::new(search_config.clone())
                .with_endpoint(format!("{}/html/", server.uri())),
        ),
        Box::new(
            NewsSearchProvider::new(search_config.clone())
                .with_endpoint(format!("{}/news/search", server.uri())),
        ),
    ];

    let client: Arc<dyn CompletionClient> = Arc::new(
        OpenAiCompatClient::new(OpenAiCompatConfig::new("test-key").with_base_url(server.uri()))
            .expect("valid config"),
    );
    let orch = Orchestrator::new(
        QueryGenerator::new(Arc::clone(&client), "query-model"),
        EvidenceCollector::new(providers).with_delay(PostCollectionDelay::none()),
        SynthesisEngine::new(client, "research-model"),
    );

    let request = orch.run_one(PROMPT).await.expect("pipeline should succeed");

    assert_eq!(request.generated_query, QUERY);
    assert_eq!(request.answer, ANSWER);
    let links: Vec<_> = request.evidence.iter().map(|e| e.link.as_str()).collect();
    assert_eq!(
        links,
        ["https://example.com/ai-art", "https://news.example.com/museum-ai"]
    );
    assert_eq!(request.evidence[0].source_kind, SourceKind::Web);
    assert_eq!(request.evidence[1].source_kind, SourceKind::News);
    assert!(request.failed_sources.is_empty());
}

//! End-to-end query pipeline.
//!
//! One call runs, strictly in order:
//! guardrail → retrieve → relevance filter → context + prompt → generate →
//! validate → source dedup. Two paths exit early with a refusal (out of
//! scope, no relevant context). Service failures from the store or the
//! generator propagate unchanged and are never retried.

use crate::guardrail::{DomainGuardrail, KeywordGuardrail};
use crate::rag::sources::unique_sources;
use crate::rag::types::{QueryOutcome, QueryResult};
use crate::rag::validator::{ResponseValidator, Verdict};
use crate::refusal;
use crate::types::RetrievedChunk;
use crate::vector_index::VectorStore;
use office_rag_core::{AppResult, RetrievalSettings};
use office_rag_llm::Generator;
use office_rag_prompt::{assemble_context, PromptBuilder};
use std::sync::Arc;
use tracing::Instrument;

/// Prepended to every question before the similarity search.
pub const QUERY_PREFIX: &str = "office information: ";

/// Answers office questions from the indexed documents.
///
/// Holds no per-query state; one instance is shared across concurrent
/// callers.
pub struct QueryOrchestrator {
    store: Arc<dyn VectorStore>,
    generator: Generator,
    guardrail: Arc<dyn DomainGuardrail>,
    validator: ResponseValidator,
    prompts: PromptBuilder,
    settings: RetrievalSettings,
}

impl QueryOrchestrator {
    /// Create an orchestrator with the office guardrail.
    pub fn new(
        store: Arc<dyn VectorStore>,
        generator: Generator,
        settings: RetrievalSettings,
    ) -> AppResult<Self> {
        Ok(Self {
            store,
            generator,
            guardrail: Arc::new(KeywordGuardrail::office()?),
            validator: ResponseValidator::new(),
            prompts: PromptBuilder::new()?,
            settings,
        })
    }

    /// Replace the guardrail.
    pub fn with_guardrail(mut self, guardrail: Arc<dyn DomainGuardrail>) -> Self {
        self.guardrail = guardrail;
        self
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    /// Answer `question`. `company_terms` widen the guardrail's allowlist.
    pub async fn query(
        &self,
        question: &str,
        company_terms: Option<&[String]>,
    ) -> AppResult<QueryResult> {
        let span = tracing::info_span!("query", model = %self.generator.model());
        self.run(question, company_terms).instrument(span).await
    }

    async fn run(&self, question: &str, company_terms: Option<&[String]>) -> AppResult<QueryResult> {
        tracing::info!("Received question: {}", question);

        if !self.guardrail.classify(question, company_terms) {
            tracing::info!("Question rejected as out of scope");
            return Ok(QueryResult::out_of_scope());
        }

        let search_query = format!("{}{}", QUERY_PREFIX, question);
        let retrieved = self.store.search(&search_query, self.settings.top_k).await?;

        let cutoff = self.settings.distance_cutoff();
        let relevant = filter_relevant(retrieved, cutoff);

        if relevant.is_empty() {
            tracing::info!("No chunks within distance cutoff {:.3}", cutoff);
            return Ok(QueryResult::no_context());
        }

        let context = assemble_context(&relevant, self.settings.context_char_budget);
        tracing::debug!(
            "Assembled context: {} chars, {} entries used, {} dropped",
            context.char_len(),
            context.entries_used,
            context.entries_dropped
        );

        let messages = self.prompts.build(&context.text, question)?;
        let raw = self.generator.complete(&messages).await?;

        let verdict = self.validator.check(&raw, &relevant);
        let (answer, outcome) = settle(raw, verdict);

        let sources = unique_sources(&relevant);
        tracing::info!(
            "Answered from {} chunks ({} sources, outcome {:?})",
            relevant.len(),
            sources.len(),
            outcome
        );

        Ok(QueryResult::answered(answer, sources).with_outcome(outcome))
    }
}

impl std::fmt::Debug for QueryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOrchestrator")
            .field("collection", &self.store.collection_name())
            .field("generator", &self.generator)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Final answer text and outcome for a generated response.
fn settle(raw: String, verdict: Verdict) -> (String, QueryOutcome) {
    match verdict {
        Verdict::Grounded => (raw, QueryOutcome::Answered),
        Verdict::Ungrounded { marker } => {
            tracing::warn!("Response contains hallucination marker '{}'", marker);
            (refusal::NO_CONTEXT.to_string(), QueryOutcome::Ungrounded)
        }
        Verdict::NoContext => (
            refusal::NO_CONTEXT.to_string(),
            QueryOutcome::NoRelevantContext,
        ),
    }
}

/// Keep chunks whose distance is at most `cutoff`, preserving order.
pub fn filter_relevant(chunks: Vec<RetrievedChunk>, cutoff: f32) -> Vec<RetrievedChunk> {
    let before = chunks.len();
    let kept: Vec<RetrievedChunk> = chunks
        .into_iter()
        .filter(|chunk| chunk.distance <= cutoff)
        .collect();

    tracing::debug!(
        "Relevance filter kept {} of {} chunks (cutoff {:.3})",
        kept.len(),
        before,
        cutoff
    );

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refusal;
    use crate::types::ChunkMetadata;
    use async_trait::async_trait;
    use office_rag_core::AppError;
    use office_rag_llm::{ChatRequest, ChatResponse, LlmClient, LlmUsage};
    use std::sync::Mutex;

    struct FakeStore {
        chunks: Vec<RetrievedChunk>,
        queries: Mutex<Vec<(String, usize)>>,
    }

    impl FakeStore {
        fn new(chunks: Vec<RetrievedChunk>) -> Arc<Self> {
            Arc::new(Self {
                chunks,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VectorStore for FakeStore {
        fn collection_name(&self) -> &str {
            "office_documents"
        }

        async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<RetrievedChunk>> {
            self.queries.lock().unwrap().push((query.to_string(), top_k));
            Ok(self.chunks.iter().take(top_k).cloned().collect())
        }

        async fn count(&self) -> AppResult<u64> {
            Ok(self.chunks.len() as u64)
        }
    }

    struct FakeLlm {
        reply: AppResult<String>,
        calls: Mutex<usize>,
    }

    impl FakeLlm {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(0),
            })
        }

        fn failing(err: AppError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmClient for FakeLlm {
        fn provider_name(&self) -> &str {
            "fake"
        }

        fn endpoint(&self) -> &str {
            "http://fake"
        }

        async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
            *self.calls.lock().unwrap() += 1;
            assert_eq!(request.messages.len(), 2);
            match &self.reply {
                Ok(text) => Ok(ChatResponse {
                    content: text.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::new(0, 0),
                }),
                Err(AppError::ServiceUnreachable { endpoint, message }) => {
                    Err(AppError::unreachable(endpoint, message.clone()))
                }
                Err(AppError::Generation { status, body }) => Err(AppError::Generation {
                    status: *status,
                    body: body.clone(),
                }),
                Err(other) => Err(AppError::Other(other.to_string())),
            }
        }
    }

    fn chunk(file: &str, distance: f32) -> RetrievedChunk {
        RetrievedChunk::new(
            format!("Contents of {}", file),
            ChunkMetadata::for_path(file),
            distance,
        )
    }

    fn orchestrator(store: Arc<FakeStore>, llm: Arc<FakeLlm>) -> QueryOrchestrator {
        let settings = RetrievalSettings {
            relevance_threshold: 0.3,
            top_k: 5,
            context_char_budget: 6000,
        };
        QueryOrchestrator::new(store, Generator::new(llm, "mistral", 0.1), settings).unwrap()
    }

    #[test]
    fn test_filter_is_inclusive_at_cutoff() {
        let chunks = vec![chunk("a", 0.69), chunk("b", 0.7), chunk("c", 0.71)];
        let kept = filter_relevant(chunks, 0.7);
        let names: Vec<_> = kept.iter().map(|c| c.filename()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_search_uses_prefix_and_top_k() {
        let store = FakeStore::new(vec![chunk("policy.pdf", 0.2)]);
        let llm = FakeLlm::replying("Yes.");
        let orch = orchestrator(store.clone(), llm);

        orch.query("What is the leave policy?", None).await.unwrap();

        let queries = store.queries.lock().unwrap();
        assert_eq!(
            queries.as_slice(),
            &[("office information: What is the leave policy?".to_string(), 5)]
        );
    }

    #[tokio::test]
    async fn test_out_of_scope_skips_retrieval() {
        let store = FakeStore::new(vec![chunk("a.pdf", 0.1)]);
        let llm = FakeLlm::replying("unused");
        let orch = orchestrator(store.clone(), llm.clone());

        let result = orch.query("Best pasta recipe?", None).await.unwrap();
        assert_eq!(result.outcome, QueryOutcome::OutOfScope);
        assert!(result.was_filtered);
        assert!(store.queries.lock().unwrap().is_empty());
        assert_eq!(*llm.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_company_terms_reach_guardrail() {
        let store = FakeStore::new(vec![chunk("acme.pdf", 0.1)]);
        let orch = orchestrator(store, FakeLlm::replying("Founded in 1990."));
        let terms = vec!["acme".to_string()];

        let rejected = orch.query("When was Acme founded?", None).await.unwrap();
        assert!(rejected.was_filtered);

        let accepted = orch.query("When was Acme founded?", Some(&terms)).await.unwrap();
        assert!(!accepted.was_filtered);
        assert_eq!(accepted.answer, "Founded in 1990.");
    }

    #[tokio::test]
    async fn test_no_relevant_context_skips_generation() {
        let store = FakeStore::new(vec![chunk("a.pdf", 0.9)]);
        let llm = FakeLlm::replying("unused");
        let orch = orchestrator(store, llm.clone());

        let result = orch.query("Where is the printer?", None).await.unwrap();
        assert_eq!(result.answer, refusal::NO_CONTEXT);
        assert_eq!(result.outcome, QueryOutcome::NoRelevantContext);
        assert_eq!(*llm.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ungrounded_answer_is_replaced_but_keeps_sources() {
        let store = FakeStore::new(vec![chunk("a.pdf", 0.1)]);
        let orch = orchestrator(store, FakeLlm::replying("My training data says Tuesday."));

        let result = orch.query("When is the fire drill?", None).await.unwrap();
        assert_eq!(result.answer, refusal::NO_CONTEXT);
        assert_eq!(result.outcome, QueryOutcome::Ungrounded);
        assert_eq!(result.sources, vec!["a.pdf"]);
    }

    #[tokio::test]
    async fn test_generation_errors_propagate() {
        let store = FakeStore::new(vec![chunk("a.pdf", 0.1)]);
        let orch = orchestrator(
            store,
            FakeLlm::failing(AppError::unreachable("http://localhost:11434", "refused")),
        );

        let err = orch.query("Where is the printer?", None).await.unwrap_err();
        assert!(err.is_service_unavailable());
    }

    #[test]
    fn test_settle_maps_each_verdict() {
        assert_eq!(
            settle("Floor 2.".to_string(), Verdict::Grounded),
            ("Floor 2.".to_string(), QueryOutcome::Answered)
        );
        assert_eq!(
            settle("As an AI...".to_string(), Verdict::Ungrounded { marker: "as an ai" }),
            (refusal::NO_CONTEXT.to_string(), QueryOutcome::Ungrounded)
        );
        assert_eq!(
            settle("Anything".to_string(), Verdict::NoContext),
            (refusal::NO_CONTEXT.to_string(), QueryOutcome::NoRelevantContext)
        );
    }

    #[tokio::test]
    async fn test_curly_apostrophe_marker_is_ungrounded() {
        let store = FakeStore::new(vec![chunk("a.pdf", 0.1)]);
        let orch = orchestrator(store, FakeLlm::replying("I\u{2019}m not able to check the rota."));

        let result = orch.query("Who is on the reception rota?", None).await.unwrap();
        assert_eq!(result.answer, refusal::NO_CONTEXT);
        assert_eq!(result.outcome, QueryOutcome::Ungrounded);
    }
}

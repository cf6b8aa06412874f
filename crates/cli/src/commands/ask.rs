//! Ask command handler.
//!
//! Answers one question given on the command line, or runs an interactive
//! loop reading questions from stdin.

use clap::Args;
use office_rag_core::{config::AppConfig, AppResult};
use office_rag_knowledge::{build_orchestrator, open_store, QueryOrchestrator, QueryResult};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

const QUIT_WORDS: &[&str] = &["quit", "exit", "q"];

/// Ask the office assistant a question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask; omit to start an interactive session
    pub question: Vec<String>,

    /// Extra term that marks a question as in scope (repeatable)
    #[arg(long = "company-term", value_name = "TERM")]
    pub company_terms: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let store = open_store(config)?;
        let chunk_count = store.count().await?;
        let orchestrator = build_orchestrator(config, store)?;

        let stdin = BufReader::new(tokio::io::stdin());
        self.run(&orchestrator, chunk_count, stdin, &mut std::io::stdout())
            .await
    }

    /// Answer the command-line question, or fall back to the interactive loop.
    ///
    /// Under `--json` stdout carries only the result document.
    async fn run<R, W>(
        &self,
        orchestrator: &QueryOrchestrator,
        chunk_count: u64,
        reader: R,
        out: &mut W,
    ) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        if self.json {
            tracing::info!("Vector store contains {} document chunks", chunk_count);
        } else {
            writeln!(out, "Vector store contains {} document chunks.\n", chunk_count)?;
        }

        match self.question_text() {
            Some(question) => {
                let result = orchestrator.query(&question, self.terms()).await?;
                self.print_result(out, &result)
            }
            None => self.interactive(orchestrator, reader, out).await,
        }
    }

    fn question_text(&self) -> Option<String> {
        let joined = self.question.join(" ");
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    fn terms(&self) -> Option<&[String]> {
        (!self.company_terms.is_empty()).then_some(self.company_terms.as_slice())
    }

    /// Question/answer loop until a quit word or end of input.
    async fn interactive<R, W>(
        &self,
        orchestrator: &QueryOrchestrator,
        reader: R,
        out: &mut W,
    ) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "Office Information Assistant")?;
        writeln!(out, "Type 'quit' or 'exit' to stop.\n")?;

        let mut lines = reader.lines();
        loop {
            write!(out, "You: ")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out, "\nGoodbye!")?;
                break;
            };

            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if QUIT_WORDS.contains(&question.to_lowercase().as_str()) {
                writeln!(out, "Goodbye!")?;
                break;
            }

            match orchestrator.query(question, self.terms()).await {
                Ok(result) => self.print_result(out, &result)?,
                Err(e) => {
                    tracing::warn!("Query failed: {}", e);
                    writeln!(out, "\nError: {}\n", e)?;
                }
            }
        }

        Ok(())
    }

    fn print_result<W: Write>(&self, out: &mut W, result: &QueryResult) -> AppResult<()> {
        if self.json {
            writeln!(out, "{}", serde_json::to_string_pretty(result)?)?;
        } else {
            write!(out, "{}", render_result(result))?;
        }
        Ok(())
    }
}

/// Human-readable rendering: answer, sources, out-of-scope note.
pub fn render_result(result: &QueryResult) -> String {
    let mut text = format!("\n{}\n", result.answer);

    if !result.sources.is_empty() {
        text.push_str(&format!("\nSources: {}\n", result.sources.join(", ")));
    }

    if result.was_filtered {
        text.push_str("(Question was outside office scope)\n");
    }

    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use office_rag_core::{AppError, RetrievalSettings};
    use office_rag_knowledge::{ChunkMetadata, RetrievedChunk, VectorStore};
    use office_rag_llm::{ChatRequest, ChatResponse, Generator, LlmClient, LlmUsage};
    use std::sync::Arc;

    struct OneChunkStore;

    #[async_trait]
    impl VectorStore for OneChunkStore {
        fn collection_name(&self) -> &str {
            "office_documents"
        }

        async fn search(&self, _query: &str, _top_k: usize) -> AppResult<Vec<RetrievedChunk>> {
            Ok(vec![RetrievedChunk::new(
                "The printer is on floor 2.",
                ChunkMetadata::for_path("facilities.pdf"),
                0.1,
            )])
        }

        async fn count(&self) -> AppResult<u64> {
            Ok(1)
        }
    }

    struct EchoLlm {
        down: bool,
    }

    #[async_trait]
    impl LlmClient for EchoLlm {
        fn provider_name(&self) -> &str {
            "echo"
        }

        fn endpoint(&self) -> &str {
            "http://localhost:11434"
        }

        async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
            if self.down {
                return Err(AppError::unreachable(self.endpoint(), "connection refused"));
            }
            Ok(ChatResponse {
                content: "Floor 2.".to_string(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    fn orchestrator(down: bool) -> QueryOrchestrator {
        QueryOrchestrator::new(
            Arc::new(OneChunkStore),
            Generator::new(Arc::new(EchoLlm { down }), "mistral", 0.1),
            RetrievalSettings::default(),
        )
        .unwrap()
    }

    fn command(json: bool) -> AskCommand {
        AskCommand {
            question: Vec::new(),
            company_terms: Vec::new(),
            json,
        }
    }

    async fn session(down: bool, input: &str) -> String {
        let mut out = Vec::new();
        command(false)
            .interactive(&orchestrator(down), input.as_bytes(), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_answer_with_sources() {
        let result = QueryResult::answered("Floor 2.", vec!["a.pdf".into(), "b.pdf".into()]);
        assert_eq!(render_result(&result), "\nFloor 2.\n\nSources: a.pdf, b.pdf\n\n");
    }

    #[test]
    fn test_render_out_of_scope() {
        let rendered = render_result(&QueryResult::out_of_scope());
        assert!(rendered.ends_with("(Question was outside office scope)\n\n"));
        assert!(!rendered.contains("Sources:"));
    }

    #[test]
    fn test_question_text_joins_words() {
        let cmd = AskCommand {
            question: vec!["Where".into(), "is".into(), "the".into(), "printer?".into()],
            ..command(false)
        };
        assert_eq!(cmd.question_text().as_deref(), Some("Where is the printer?"));
        assert_eq!(command(false).question_text(), None);
        assert!(command(false).terms().is_none());
    }

    #[tokio::test]
    async fn test_interactive_answers_until_quit() {
        let output = session(false, "\nWhere is the printer?\nQUIT\nnever asked\n").await;

        assert!(output.starts_with("Office Information Assistant\n"));
        assert!(output.contains("Floor 2.\n\nSources: facilities.pdf"));
        assert!(output.ends_with("You: Goodbye!\n"));
        assert!(!output.contains("never asked"));
    }

    #[tokio::test]
    async fn test_interactive_eof_says_goodbye() {
        let output = session(false, "").await;
        assert!(output.ends_with("You: \nGoodbye!\n"));
    }

    #[tokio::test]
    async fn test_interactive_reports_errors_and_continues() {
        let output = session(true, "Where is the printer?\nexit\n").await;
        assert!(output.contains("Error: Cannot connect to http://localhost:11434"));
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_one_shot_json_stdout_is_pure_json() {
        let cmd = AskCommand {
            question: vec!["Where".into(), "is".into(), "the".into(), "printer?".into()],
            ..command(true)
        };
        let mut out = Vec::new();
        cmd.run(&orchestrator(false), 1, "".as_bytes(), &mut out)
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["answer"], "Floor 2.");
        assert_eq!(value["sources"], serde_json::json!(["facilities.pdf"]));
    }

    #[tokio::test]
    async fn test_one_shot_text_starts_with_chunk_count() {
        let cmd = AskCommand {
            question: vec!["Where is the printer?".into()],
            ..command(false)
        };
        let mut out = Vec::new();
        cmd.run(&orchestrator(false), 1, "".as_bytes(), &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Vector store contains 1 document chunks.\n\n"));
        assert!(text.contains("Sources: facilities.pdf"));
    }

    #[test]
    fn test_json_output() {
        let mut out = Vec::new();
        command(true)
            .print_result(&mut out, &QueryResult::no_context())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["was_filtered"], false);
        assert_eq!(value["sources"], serde_json::json!([]));
    }
}

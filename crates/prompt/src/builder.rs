//! Prompt builder: fixed system instruction plus a rendered user message.

use handlebars::Handlebars;
use office_rag_core::{AppError, AppResult};
use office_rag_llm::Message;
use serde_json::json;

/// System instruction declaring the domain boundary and the refusal wording.
pub const SYSTEM_PROMPT: &str = "\
You are an Office Information Assistant. You answer questions ONLY about company office \
operations, policies, facilities and documentation, and only from the office documents \
supplied as context.

# SCOPE
1. Answer questions about:
   - Office policies, procedures and guidelines
   - Facilities (meeting rooms, equipment, amenities)
   - Employee resources and office services
   - Documented office protocols and standards
2. Refuse questions about:
   - Personal matters unrelated to the office
   - IT support beyond basic office equipment
   - Financial, legal or HR matters outside an office context
   - News, external topics or speculation

# HOW TO RESPOND
- Use ONLY information from the provided context.
- If the context does not contain the answer, say: \"I don't have information about this in the office documentation.\"
- If the question is outside office scope, say: \"I can only answer questions related to office operations and policies.\"
- Never speculate or draw on outside knowledge.
- Be concise and mention the relevant office document when possible.
";

const USER_TEMPLATE_NAME: &str = "user";

const USER_TEMPLATE: &str = "\
# CONTEXT FROM OFFICE DOCUMENTS:
{{context}}

# QUESTION:
{{question}}

Answer the question using ONLY the context above. If the answer is not in the context, \
say you don't have that information.";

/// Builds the two-message generation request.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    /// Create a builder with the user template registered.
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Context and questions are plain text, never HTML
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(USER_TEMPLATE_NAME, USER_TEMPLATE)
            .map_err(|e| AppError::Other(format!("Failed to register prompt template: {}", e)))?;

        Ok(Self { registry })
    }

    /// Build `[system, user]` for the given context block and question.
    pub fn build(&self, context: &str, question: &str) -> AppResult<Vec<Message>> {
        let user = self
            .registry
            .render(
                USER_TEMPLATE_NAME,
                &json!({ "context": context, "question": question }),
            )
            .map_err(|e| AppError::Other(format!("Failed to render prompt: {}", e)))?;

        tracing::debug!("Built prompt ({} chars in user message)", user.len());

        Ok(vec![Message::system(SYSTEM_PROMPT), Message::user(user)])
    }
}

impl std::fmt::Debug for PromptBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptBuilder").finish_non_exhaustive()
    }
}

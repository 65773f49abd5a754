//! Advisory answer generation.

use std::sync::Arc;

use uian_core::{defaults, GenerationBackend, Result};

/// Role and style instruction for the advisory assistant.
const ADVISOR_ROLE: &str = "당신은 한의학 임상 연구를 돕는 AI 조언자입니다.
사용자는 한의사로, 자신의 임상 사례를 익명화하여 연구 목적으로 기록하고 있습니다.

귀하의 역할:
1. 과거 임상 사례를 분석하여 패턴 발견
2. 처방의 적합성 검토
3. 유사 사례 기반 조언
4. 임상적 통찰 제공

학술적, 객관적으로 답변해주세요. 한자(漢字)를 적절히 활용하세요.";

/// Header introducing the retrieved-cases section of the instruction.
const CONTEXT_HEADER: &str = "=== 참고할 과거 임상 사례 ===";

/// Fixed sentence used when no past cases were retrieved, so the
/// instruction never carries an empty interpolation.
const NO_CASES_PLACEHOLDER: &str = "(아직 등록된 과거 사례가 없습니다.)";

/// Build the system instruction, embedding the context block verbatim when
/// non-empty.
pub fn build_system_instruction(context: &str) -> String {
    if context.is_empty() {
        format!("{}\n\n{}", ADVISOR_ROLE, NO_CASES_PLACEHOLDER)
    } else {
        format!("{}\n\n{}\n{}", ADVISOR_ROLE, CONTEXT_HEADER, context)
    }
}

/// Turns a question plus retrieved context into a single-turn request to
/// the language-model provider and extracts the answer text.
pub struct AnswerGenerator {
    backend: Arc<dyn GenerationBackend>,
    max_tokens: u32,
}

impl AnswerGenerator {
    /// Create a new generator with the default answer length bound.
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            max_tokens: defaults::ANSWER_MAX_TOKENS,
        }
    }

    /// Override the answer length bound.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Generate an answer. Provider errors propagate unchanged; there is
    /// no retry and no streaming.
    pub async fn generate(&self, question: &str, context: &str) -> Result<String> {
        let system = build_system_instruction(context);
        self.backend
            .complete(&system, question, self.max_tokens)
            .await
    }
}

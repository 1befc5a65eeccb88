//! Prompt composition
//!
//! Assembles the single text prompt sent to the backend from the persona,
//! the conversation transcript, optional search context and the question.

use crate::utils::config::PersonaConfig;

pub struct PromptComposer {
    persona: PersonaConfig,
}

impl PromptComposer {
    pub fn new(persona: PersonaConfig) -> Self {
        Self { persona }
    }

    /// Builds the full prompt.
    ///
    /// `history` is the formatted transcript from the history store and may
    /// be empty; `search_context` is omitted from the prompt when `None` or
    /// blank.
    pub fn compose(&self, history: &str, search_context: Option<&str>, question: &str) -> String {
        let mut prompt = String::new();
        prompt.push_str(self.persona.system_prompt.trim());
        prompt.push_str("\n\n以下の会話履歴を参考に、質問に答えてください。\n\n");
        prompt.push_str("会話履歴:\n");
        prompt.push_str(history);
        prompt.push_str("\n\n");

        if let Some(context) = search_context.filter(|c| !c.trim().is_empty()) {
            prompt.push_str("以下のWeb検索結果も参考にしてください。\n\n検索結果:\n");
            prompt.push_str(context);
            prompt.push_str("\n\n");
        }

        prompt.push_str("質問: ");
        prompt.push_str(question);
        prompt.push_str("\n\n回答:");
        prompt
    }
}

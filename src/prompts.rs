//! Prompt Builder: the static regulatory instruction block plus the
//! two-message sequence sent for every analysis.
//!
//! The instruction text is externally authored (the MP-PA travel-expense
//! portarias digest) and must be reproduced verbatim for behavioural
//! parity with prior analyses, so it lives in `assets/compliance_rules.md`
//! and is embedded at compile time rather than written inline here.
//! Updating the rules is a prompt-asset edit, not a code change.
//!
//! The document text is injected as-is: no escaping, no truncation.
//! Whatever the PDF contained is what the model sees.

use crate::llm::ChatMessage;

/// Regulatory instruction block, verbatim.
pub const COMPLIANCE_RULES: &str = include_str!("../assets/compliance_rules.md");

/// Build the message sequence for one analysis: a system message carrying
/// the rules and the document text, then a user message restating the
/// document between explicit delimiters with the analysis instruction.
///
/// Always exactly two messages, system first.
pub fn build_messages(document_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_message(document_text)),
        ChatMessage::user(user_message(document_text)),
    ]
}

fn system_message(document_text: &str) -> String {
    format!(
        "{COMPLIANCE_RULES}\n\nConteúdo do Pedido de Diária:\n{document_text}\n\nAnálise detalhada:\n"
    )
}

fn user_message(document_text: &str) -> String {
    format!(
        "Analise o seguinte pedido de diária:\n\n\
         --- Início do Pedido ---\n\
         {document_text}\n\
         --- Fim do Pedido ---\n\n\
         Forneça uma análise detalhada, destacando claramente se o pedido está em conformidade \
         ou não, e justifique cada ponto com base nas regras e portarias fornecidas."
    )
}

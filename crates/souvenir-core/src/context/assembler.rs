//! Reflective context builder.
//!
//! Renders recent session history and semantically similar exchanges into
//! a deterministic text block, with section headers the downstream prompts
//! were written against (hence the French).

use souvenir_types::exchange::{Exchange, ScoredExchange};

const HISTORY_HEADER: &str = "=== Historique de la conversation ===";
const SIMILAR_HEADER: &str = "=== Conversations similaires ===";
const CURRENT_HEADER: &str = "=== Contexte actuel ===";

/// Builds the reflective context block from retrieved exchanges.
///
/// Layout, in this order, each section omitted entirely when empty:
/// ```text
/// === Historique de la conversation ===
/// User: {user_message}
/// AI: {ai_response}
///
/// === Conversations similaires ===
/// User: {user_message}
/// AI: {ai_response}
///
/// === Contexte actuel ===
/// User: {current_query}
/// ```
///
/// Rendering is infallible. When nothing was retrieved the block collapses
/// to the single minimal line `User: {current_query}`, with no header.
pub struct ContextAssembler;

impl ContextAssembler {
    /// Render the context block.
    ///
    /// `history` is expected in chronological order and `similar` in
    /// descending score order; both are rendered as given. Scores are
    /// not rendered, only content.
    pub fn build(current_query: &str, history: &[Exchange], similar: &[ScoredExchange]) -> String {
        let mut sections = Vec::with_capacity(3);

        // History section -- the session's most recent exchanges
        if !history.is_empty() {
            let mut lines = Vec::with_capacity(1 + history.len() * 2);
            lines.push(HISTORY_HEADER.to_string());
            for exchange in history {
                lines.push(format!("User: {}", exchange.user_message));
                lines.push(format!("AI: {}", exchange.ai_response));
            }
            sections.push(lines.join("\n"));
        }

        // Similar section -- cross-session semantic matches, best first
        if !similar.is_empty() {
            let mut lines = Vec::with_capacity(1 + similar.len() * 2);
            lines.push(SIMILAR_HEADER.to_string());
            for hit in similar {
                lines.push(format!("User: {}", hit.exchange.user_message));
                lines.push(format!("AI: {}", hit.exchange.ai_response));
            }
            sections.push(lines.join("\n"));
        }

        // With nothing retrieved, the block is the minimal current-query line.
        if sections.is_empty() {
            return format!("User: {current_query}");
        }

        sections.push(format!("{CURRENT_HEADER}\nUser: {current_query}"));
        sections.join("\n\n")
    }
}

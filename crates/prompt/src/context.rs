//! Budget-bounded context assembly.
//!
//! Passages are taken in the order given (the store's ranking). Each becomes a
//! labeled entry; an entry is either included whole or not at all, and the
//! first entry that does not fit ends assembly. Lengths are counted in
//! characters, separators included, so the joined block never exceeds the
//! budget.

use crate::types::{AssembledContext, ContextPassage};

/// Separator placed between context entries.
pub const ENTRY_SEPARATOR: &str = "\n\n---\n\n";

/// Format one passage as a labeled context entry.
pub fn format_entry<P: ContextPassage>(passage: &P) -> String {
    format!("[Source: {}]\n{}", passage.source_label(), passage.text())
}

/// Assemble passages into a context block of at most `char_budget` characters.
pub fn assemble_context<P: ContextPassage>(passages: &[P], char_budget: usize) -> AssembledContext {
    let separator_len = ENTRY_SEPARATOR.chars().count();
    let mut entries: Vec<String> = Vec::new();
    let mut total_len = 0usize;

    for passage in passages {
        let entry = format_entry(passage);
        let entry_len = entry.chars().count();
        let needed = if entries.is_empty() {
            entry_len
        } else {
            separator_len + entry_len
        };

        if total_len + needed > char_budget {
            break;
        }

        total_len += needed;
        entries.push(entry);
    }

    let entries_used = entries.len();
    let entries_dropped = passages.len() - entries_used;

    if entries_dropped > 0 {
        tracing::debug!(
            "Context budget of {} chars reached: kept {} entries, dropped {}",
            char_budget,
            entries_used,
            entries_dropped
        );
    }

    AssembledContext {
        text: entries.join(ENTRY_SEPARATOR),
        entries_used,
        entries_dropped,
    }
}

/// Assemble passages and return only the context text.
pub fn build_context<P: ContextPassage>(passages: &[P], char_budget: usize) -> String {
    assemble_context(passages, char_budget).text
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Passage {
        label: String,
        text: String,
    }

    impl ContextPassage for Passage {
        fn source_label(&self) -> &str {
            &self.label
        }

        fn text(&self) -> &str {
            &self.text
        }
    }

    fn passage(label: &str, text: &str) -> Passage {
        Passage {
            label: label.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_entries_are_labeled_and_separated() {
        let passages = vec![
            passage("handbook.pdf", "Badges are issued at reception."),
            passage("parking.txt", "Level B2 is reserved for visitors."),
        ];

        let context = build_context(&passages, 10_000);
        assert_eq!(
            context,
            "[Source: handbook.pdf]\nBadges are issued at reception.\n\n---\n\n\
             [Source: parking.txt]\nLevel B2 is reserved for visitors."
        );
    }

    #[test]
    fn test_stops_at_first_entry_that_does_not_fit() {
        let passages = vec![
            passage("a.txt", "short"),
            passage("b.txt", &"x".repeat(500)),
            passage("c.txt", "short again"),
        ];

        let assembled = assemble_context(&passages, 100);
        assert_eq!(assembled.entries_used, 1);
        assert_eq!(assembled.entries_dropped, 2);
        assert!(assembled.text.contains("[Source: a.txt]"));
        assert!(!assembled.text.contains("c.txt"));
    }

    #[test]
    fn test_empty_when_first_entry_overflows() {
        let passages = vec![passage("big.pdf", &"y".repeat(50))];
        assert_eq!(build_context(&passages, 10), "");
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let p = passage("a", "bc");
        let entry_len = format_entry(&p).chars().count();
        assert_eq!(build_context(&[p], entry_len), "[Source: a]\nbc");
    }

    #[test]
    fn test_budget_counts_characters_not_bytes() {
        let p = passage("café.txt", "Überstunden müssen genehmigt werden.");
        let entry_len = format_entry(&p).chars().count();
        assert!(format_entry(&p).len() > entry_len);
        assert_eq!(build_context(&[p], entry_len).chars().count(), entry_len);
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_budget_and_keeps_whole_entries(
            texts in proptest::collection::vec("[a-z ]{0,80}", 0..12),
            budget in 0usize..600,
        ) {
            let passages: Vec<Passage> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| passage(&format!("doc{}.txt", i), t))
                .collect();

            let assembled = assemble_context(&passages, budget);
            prop_assert!(assembled.char_len() <= budget);

            // Accepted entries are a prefix of the input, each present in full.
            let expected: Vec<String> = passages
                .iter()
                .take(assembled.entries_used)
                .map(format_entry)
                .collect();
            prop_assert_eq!(assembled.text, expected.join(ENTRY_SEPARATOR));
        }
    }
}

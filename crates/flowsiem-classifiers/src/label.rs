//! Label extraction from generated text

use aho_corasick::AhoCorasick;
use flowsiem_core::Label;
use std::sync::OnceLock;

/// Keywords searched for in a model response, in precedence order
const KEYWORDS: [(&str, Label); 3] = [
    ("normal", Label::Normal),
    ("attacker", Label::Attacker),
    ("victim", Label::Victim),
];

fn matcher() -> &'static AhoCorasick {
    static MATCHER: OnceLock<AhoCorasick> = OnceLock::new();
    MATCHER.get_or_init(|| {
        AhoCorasick::new(KEYWORDS.iter().map(|(keyword, _)| keyword))
            .expect("label keywords form a valid automaton")
    })
}

/// Map a generated response to a [`Label`]
///
/// The response is lowercased with full Unicode case mapping, then searched
/// for keyword substrings. When several keywords occur, the earliest entry of
/// [`KEYWORDS`] wins regardless of where it appears in the text: any mention
/// of "normal" yields [`Label::Normal`].
pub fn extract_label(response: &str) -> Label {
    let lowered = response.to_lowercase();
    matcher()
        .find_overlapping_iter(&lowered)
        .map(|m| m.pattern().as_usize())
        .min()
        .map(|index| KEYWORDS[index].1)
        .unwrap_or(Label::Unknown)
}

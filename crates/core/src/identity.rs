//! Derivation of filesystem-safe ids from display names.

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("invalid separator regex"));

/// Turn a human-entered name into a stable slug.
///
/// Letters and digits are kept (lowercased), every other run of characters
/// collapses into a single `-`. Names without any letter or digit produce an
/// empty id, which callers reject.
pub fn name_to_id(name: &str) -> String {
    let lowered = name.to_lowercase();
    SEPARATOR_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_display_names() {
        assert_eq!(name_to_id("My Game"), "my-game");
        assert_eq!(name_to_id("Heroes"), "heroes");
        assert_eq!(name_to_id("  Box #1 -- Core  "), "box-1-core");
        assert_eq!(name_to_id("Ärger_Spiel"), "ärger-spiel");
    }

    #[test]
    fn degenerate_names_give_empty_id() {
        assert_eq!(name_to_id(""), "");
        assert_eq!(name_to_id("  !! ?? "), "");
    }

    #[test]
    fn derivation_is_stable() {
        let name = "Dragons & Dungeons: 2nd Ed.";
        assert_eq!(name_to_id(name), name_to_id(name));
        assert_eq!(name_to_id(name), "dragons-dungeons-2nd-ed");
    }
}

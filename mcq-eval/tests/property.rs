//! Property-based tests for letter extraction and scoring using proptest

use proptest::prelude::*;

use mcq_eval::analysis::{Aggregate, Verdict};
use mcq_eval::config::{ExtractionConfig, LetterSet};
use mcq_eval::extraction::{norm, preview, LetterExtractor};

fn extractor() -> LetterExtractor {
    LetterExtractor::new(&ExtractionConfig::default()).unwrap()
}

// =========================================================================
// Strategies
// =========================================================================

fn arb_choice() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['A', 'B', 'C', 'D'])
}

fn arb_outside_choice() -> impl Strategy<Value = char> {
    prop::sample::select(('E'..='Z').collect::<Vec<_>>())
}

/// Lowercase prose; never contains a capital option letter
fn arb_prose() -> impl Strategy<Value = String> {
    "[a-z ,.]{0,40}"
}

fn arb_letter() -> impl Strategy<Value = Option<char>> {
    prop_oneof![Just(None), arb_choice().prop_map(Some)]
}

// =========================================================================
// Property: extraction
// =========================================================================

proptest! {
    #[test]
    fn parenthesized_letter_is_recovered(letter in arb_choice(), before in arb_prose(), after in arb_prose()) {
        let text = format!("{} ({}) {}", before, letter, after);
        prop_assert_eq!(extractor().extract_letter_from_text(&text), Some(letter));
        prop_assert_eq!(extractor().gold_letter(&text), Some(letter));
    }

    #[test]
    fn answer_span_wins_over_surrounding_text(
        inside in arb_choice(),
        outside in arb_choice(),
        prose in arb_prose(),
    ) {
        let text = format!("({}) {} <answer>{}</answer> ({})", outside, prose, inside, outside);
        prop_assert_eq!(extractor().extract_letter_from_text(&text), Some(inside));
    }

    #[test]
    fn letters_outside_the_set_are_ignored(letter in arb_outside_choice(), prose in arb_prose()) {
        let text = format!("{} ({}) <answer>{}</answer>", prose, letter, letter);
        prop_assert_eq!(extractor().extract_letter_from_text(&text), None);
        prop_assert_eq!(extractor().gold_letter(&text), None);
    }

    #[test]
    fn prose_without_capitals_yields_nothing(prose in arb_prose()) {
        prop_assert_eq!(extractor().extract_letter_from_text(&prose), None);
    }

    #[test]
    fn extracted_letter_is_always_in_the_set(text in "[A-Za-z()<>/ ]{0,60}") {
        if let Some(letter) = extractor().extract_letter_from_text(&text) {
            prop_assert!(LetterSet::four_choice().contains(letter));
        }
    }
}

// =========================================================================
// Property: normalization and previews
// =========================================================================

proptest! {
    #[test]
    fn norm_ignores_case_and_whitespace(text in "[a-zA-Z() \t\n]{0,40}") {
        let shouted: String = text.to_uppercase().split_whitespace().collect::<Vec<_>>().join("  ");
        prop_assert_eq!(norm(&text), norm(&shouted));
        prop_assert!(!norm(&text).chars().any(char::is_whitespace));
    }

    #[test]
    fn preview_respects_width(text in "\\PC{0,80}", width in 0usize..50) {
        let shown = preview(&text, width);
        prop_assert!(shown.chars().count() <= width);
        prop_assert!(!shown.contains('\n'));
    }
}

// =========================================================================
// Property: verdicts and aggregates
// =========================================================================

proptest! {
    #[test]
    fn correct_requires_two_equal_letters(gold in arb_letter(), pred in arb_letter()) {
        let verdict = Verdict::new(gold, pred);
        prop_assert_eq!(verdict.is_correct(), gold.is_some() && gold == pred);
    }

    #[test]
    fn aggregate_counts_are_consistent(pairs in prop::collection::vec((arb_letter(), arb_letter()), 0..40)) {
        let verdicts: Vec<Verdict> = pairs.iter().map(|(g, p)| Verdict::new(*g, *p)).collect();
        let aggregate = Aggregate::from_verdicts(&verdicts);

        prop_assert_eq!(aggregate.total, verdicts.len());
        prop_assert!(aggregate.correct <= aggregate.total);
        prop_assert!(aggregate.unparsable_gold <= aggregate.total);
        prop_assert!((0.0..=1.0).contains(&aggregate.accuracy()));
        if aggregate.total == 0 {
            prop_assert_eq!(aggregate.accuracy(), 0.0);
        }
    }

    #[test]
    fn letter_set_parse_is_sorted_and_deduplicated(raw in "[A-Za-z]{1,20}") {
        let set: LetterSet = raw.parse().unwrap();
        let letters = set.letters();
        prop_assert!(letters.windows(2).all(|w| w[0] < w[1]));
        for c in raw.chars() {
            prop_assert!(set.contains(c.to_ascii_uppercase()));
        }
    }
}

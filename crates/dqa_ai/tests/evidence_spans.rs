use dqa_ai::context::estimate_tokens;
use dqa_ai::evidence::{extract_keywords, map_evidence};
use dqa_ai::index::ChunkMetadata;
use dqa_ai::retrieve::{RetrievedSet, ScoredCandidate};
use pretty_assertions::assert_eq;

fn retrieved(text: &str, char_start: Option<usize>) -> RetrievedSet {
    let char_end = char_start.map(|s| s + text.len());
    RetrievedSet {
        total_token_estimate: estimate_tokens(text),
        candidates: vec![ScoredCandidate {
            text: text.to_string(),
            metadata: ChunkMetadata {
                doc_id: "doc-1".to_string(),
                filename: "manual.pdf".to_string(),
                page_number: 4,
                char_start,
                char_end,
            },
            similarity: 0.9,
        }],
    }
}

#[test]
fn keywords_are_lowercased_stripped_and_length_filtered() {
    let kws = extract_keywords("What is the Refund POLICY, exactly?!");
    assert_eq!(kws, vec!["what", "refund", "policy", "exactly"]);
}

#[test]
fn highlights_land_at_absolute_offsets_within_the_chunk() {
    let text = "Our refund policy allows returns within thirty days.";
    let set = retrieved(text, Some(120));

    let spans = map_evidence(&set, "What is the refund policy?");
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.filename, "manual.pdf");
    assert_eq!(span.page_number, 4);

    let refund = span
        .highlights
        .iter()
        .find(|h| h.keyword == "refund")
        .expect("refund highlight");
    assert_eq!(refund.start, 120 + 4);
    assert_eq!(refund.end, 120 + 10);

    for h in &span.highlights {
        assert!(span.char_start.unwrap() <= h.start);
        assert!(h.start < h.end);
        assert!(h.end <= span.char_end.unwrap());
    }
}

#[test]
fn matching_is_case_insensitive_and_first_occurrence_only() {
    let text = "REFUND first, then refund again.";
    let set = retrieved(text, Some(0));

    let spans = map_evidence(&set, "refund?");
    let hits: Vec<_> = spans[0]
        .highlights
        .iter()
        .filter(|h| h.keyword == "refund")
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].start, 0);
}

#[test]
fn chunks_without_offsets_are_returned_with_no_highlights() {
    let set = retrieved("refund text without a resolvable start", None);
    let spans = map_evidence(&set, "refund?");
    assert_eq!(spans.len(), 1);
    assert!(spans[0].highlights.is_empty());
    assert_eq!(spans[0].char_start, None);
}

#[test]
fn short_question_tokens_produce_no_highlights() {
    let set = retrieved("the cat sat on the mat", Some(0));
    let spans = map_evidence(&set, "is it a cat");
    assert!(spans[0].highlights.is_empty());
}

#[test]
fn overlapping_highlights_are_tolerated_not_merged() {
    let text = "the databases are replicated";
    let set = retrieved(text, Some(0));
    // "database" and "databases" overlap at the same position.
    let spans = map_evidence(&set, "database databases");
    assert_eq!(spans[0].highlights.len(), 2);
    assert_eq!(spans[0].highlights[0].start, spans[0].highlights[1].start);
}

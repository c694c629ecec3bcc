use dqa_ai::context::{assemble_context, estimate_tokens};
use dqa_ai::index::ChunkMetadata;
use dqa_ai::retrieve::{ScoredCandidate, RetrievedSet};
use pretty_assertions::assert_eq;

fn cand(filename: &str, page: u32, text: &str, similarity: f64) -> ScoredCandidate {
    ScoredCandidate {
        text: text.to_string(),
        metadata: ChunkMetadata {
            doc_id: filename.trim_end_matches(".pdf").to_string(),
            filename: filename.to_string(),
            page_number: page,
            char_start: Some(0),
            char_end: Some(text.len()),
        },
        similarity,
    }
}

fn set(candidates: Vec<ScoredCandidate>) -> RetrievedSet {
    let total_token_estimate = candidates.iter().map(|c| estimate_tokens(&c.text)).sum();
    RetrievedSet {
        candidates,
        total_token_estimate,
    }
}

#[test]
fn renders_source_headers_and_separators_in_order() {
    let retrieved = set(vec![
        cand("policy.pdf", 3, "Refunds are issued within 30 days.", 0.9),
        cand("faq.pdf", 1, "Contact support for escalations.", 0.8),
    ]);

    let block = assemble_context(&retrieved, 4000);
    assert!(block.starts_with("[Source: policy.pdf, Page: 3]\nRefunds are issued within 30 days."));
    assert!(block.contains("\n\n---\n\n[Source: faq.pdf, Page: 1]\n"));
    let first = block.find("policy.pdf").unwrap();
    let second = block.find("faq.pdf").unwrap();
    assert!(first < second);
}

#[test]
fn empty_retrieved_set_yields_an_empty_block() {
    let block = assemble_context(&RetrievedSet::default(), 4000);
    assert_eq!(block, "");
}

#[test]
fn rendering_truncates_at_its_own_budget_including_header_overhead() {
    // Each unit costs its text plus the header; pick a budget that admits
    // exactly one rendered unit even though the raw text of both would fit.
    let text = "x".repeat(360); // ~90 tokens of text, >100 with header
    let retrieved = set(vec![
        cand("a.pdf", 1, &text, 0.9),
        cand("b.pdf", 1, &text, 0.8),
    ]);
    assert!(retrieved.total_token_estimate <= 180);

    let block = assemble_context(&retrieved, 180);
    assert!(block.contains("a.pdf"));
    assert!(!block.contains("b.pdf"), "header overhead must count against the budget");
}

#[test]
fn token_estimate_is_a_ceiling_of_quarter_length() {
    assert_eq!(estimate_tokens(""), 0);
    assert_eq!(estimate_tokens("abcd"), 1);
    assert_eq!(estimate_tokens("abcde"), 2);
    assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
}

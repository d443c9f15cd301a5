//! Property tests for recursive chunking.

mod common;

use docchat_core::{Chunk, Chunker, Document, RecursiveChunker};
use proptest::prelude::*;

/// Drop each chunk's overlap with its predecessor and concatenate the rest.
fn reconstruct(chunks: &[Chunk]) -> String {
    let mut text = String::new();
    let mut covered = 0;
    for chunk in chunks {
        let fresh = covered - chunk.start;
        text.push_str(&chunk.text[fresh..]);
        covered = chunk.end;
    }
    text
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zé .\n]{0,300}",
        proptest::collection::vec("[A-Z][a-z ]{0,40}\\.", 0..8).prop_map(|s| s.join("\n\n")),
    ]
}

/// **Property: chunking loses no content**
/// *For any* text and valid parameters, concatenating the chunks with
/// overlaps removed reproduces the text, every chunk is the exact slice it
/// claims to be, and no chunk is longer than `chunk_size` characters.
mod prop_chunk_reconstruction {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunks_reconstruct_document(
            text in arb_text(),
            chunk_size in 5usize..80,
            overlap_ratio in 0.0f64..0.9,
        ) {
            let overlap = ((chunk_size as f64) * overlap_ratio) as usize;
            let chunker = RecursiveChunker::new(chunk_size, overlap);
            let chunks = chunker.chunk(&Document::new("doc", text.clone())).unwrap();

            prop_assert_eq!(reconstruct(&chunks), text.clone());
            prop_assert_eq!(chunks.is_empty(), text.is_empty());

            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(&text[chunk.start..chunk.end], chunk.text.as_str());
                prop_assert!(chunk.text.chars().count() <= chunk_size);
                prop_assert_eq!(chunk.index, i);
            }
            for pair in chunks.windows(2) {
                prop_assert!(pair[1].start <= pair[0].end);
                prop_assert!(pair[1].start >= pair[0].start);
                prop_assert!(pair[1].end > pair[0].end);
                let shared = text[pair[1].start..pair[0].end].chars().count();
                prop_assert!(shared <= overlap);
            }
        }

        #[test]
        fn chunking_is_deterministic(text in arb_text(), chunk_size in 5usize..80) {
            let chunker = RecursiveChunker::new(chunk_size, chunk_size / 4);
            let doc = Document::new("doc", text);
            prop_assert_eq!(chunker.chunk(&doc).unwrap(), chunker.chunk(&doc).unwrap());
        }
    }
}

#[test]
fn baguio_scenario_yields_two_overlapping_chunks() {
    let chunks = RecursiveChunker::new(40, 10).chunk(&Document::new("baguio", common::BAGUIO)).unwrap();

    assert_eq!(chunks.len(), 2);
    let first = &chunks[0];
    let second = &chunks[1];
    assert_eq!(first.end - second.start, 10);
    assert!(second.text.starts_with(&first.text[second.start..]));
    assert!(second.text.ends_with("strawberry farms."));
    assert_eq!(reconstruct(&chunks), common::BAGUIO);
}

#[test]
fn paragraphs_merge_until_full() {
    let text = "One.\n\nTwo.\n\nThree.\n\nFour.";
    let chunks = RecursiveChunker::new(13, 0).chunk(&Document::new("d", text)).unwrap();
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["One.\n\nTwo.\n\n", "Three.\n\nFour."]);
}

#[test]
fn sentence_separator_used_for_long_paragraphs() {
    let text = "Sessions ends at noon. Sunflowers bloom in May. Rain falls often.";
    let chunks = RecursiveChunker::new(30, 0).chunk(&Document::new("d", text)).unwrap();
    assert!(chunks.len() >= 2);
    assert!(chunks[0].text.ends_with('.'));
    assert_eq!(reconstruct(&chunks), text);
}

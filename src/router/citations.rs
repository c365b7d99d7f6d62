//! Citation splicing for grounded web-search answers
//!
//! Grounding metadata ties byte ranges of the answer to web sources. This
//! module splices inline citation links into the answer text and appends a
//! numbered source list.

use crate::capabilities::{GroundingChunk, GroundingMetadata};

/// Shown when the search capability returns neither text nor sources
pub const NO_ANSWER_FALLBACK: &str =
    "I couldn't find a definitive answer to your question using web search.";

/// Splice inline citations into a search answer and append a source list
///
/// Supports are applied at their segment end index, processed in descending
/// order so earlier indices stay valid as text is inserted. Source numbers
/// are positional within the chunk list: chunks without a usable web URI
/// are skipped but still advance the numbering, matching the inline `[n]`
/// labels. A support whose end index is out of range or does not fall on a
/// character boundary is skipped.
///
/// # Arguments
///
/// * `answer` - The raw answer text from the search capability
/// * `metadata` - Optional grounding metadata with chunks and supports
///
/// # Examples
///
/// ```
/// use codeex::capabilities::GroundingMetadata;
/// use codeex::router::splice_citations;
///
/// let result = splice_citations("An answer.", None);
/// assert_eq!(result, "An answer.");
/// ```
pub fn splice_citations(answer: &str, metadata: Option<&GroundingMetadata>) -> String {
    let metadata = match metadata {
        Some(m) => m,
        None => {
            if answer.is_empty() {
                return NO_ANSWER_FALLBACK.to_string();
            }
            return answer.to_string();
        }
    };

    let mut text = answer.to_string();

    let mut supports: Vec<_> = metadata.grounding_supports.iter().collect();
    supports.sort_by(|a, b| b.segment.end_index.cmp(&a.segment.end_index));

    for support in supports {
        let end = support.segment.end_index;
        if end > text.len() || !text.is_char_boundary(end) {
            tracing::debug!("Skipping grounding support with invalid end index {}", end);
            continue;
        }

        let mut links: Vec<String> = Vec::new();
        for &chunk_index in &support.grounding_chunk_indices {
            let uri = metadata
                .grounding_chunks
                .get(chunk_index)
                .and_then(|chunk| chunk.web.as_ref())
                .and_then(|web| web.uri.as_deref());
            if let Some(uri) = uri {
                let link = format!("[{}]({})", chunk_index + 1, uri);
                if !links.contains(&link) {
                    links.push(link);
                }
            }
        }

        if links.is_empty() {
            continue;
        }

        text = format!("{} {}{}", &text[..end], links.join(" "), &text[end..]);
    }

    let sources = source_list(&metadata.grounding_chunks);
    if !sources.is_empty() {
        text.push_str("\n\n**Sources:**\n");
        text.push_str(&sources);
    }

    if text.is_empty() {
        return NO_ANSWER_FALLBACK.to_string();
    }

    text
}

/// Build the numbered source list, one line per chunk with both uri and title
///
/// Numbering is positional: chunk i is always source i + 1, so skipped
/// chunks leave gaps rather than renumbering later ones.
fn source_list(chunks: &[GroundingChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .filter_map(|(i, chunk)| {
            let web = chunk.web.as_ref()?;
            let uri = web.uri.as_deref()?;
            let title = web.title.as_deref()?;
            Some(format!("{}. [{}]({})", i + 1, title, uri))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{GroundingSupport, Segment, WebSource};

    fn chunk(uri: &str, title: &str) -> GroundingChunk {
        GroundingChunk {
            web: Some(WebSource {
                uri: Some(uri.to_string()),
                title: Some(title.to_string()),
            }),
        }
    }

    fn support(end_index: usize, indices: Vec<usize>) -> GroundingSupport {
        GroundingSupport {
            segment: Segment { end_index },
            grounding_chunk_indices: indices,
        }
    }

    #[test]
    fn test_no_metadata_passthrough() {
        assert_eq!(splice_citations("An answer.", None), "An answer.");
    }

    #[test]
    fn test_no_metadata_empty_answer_fallback() {
        assert_eq!(splice_citations("", None), NO_ANSWER_FALLBACK);
    }

    #[test]
    fn test_single_citation() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![chunk("http://x", "X")],
            grounding_supports: vec![support(9, vec![0])],
        };

        let result = splice_citations("Team A won.", Some(&metadata));
        assert_eq!(
            result,
            "Team A wo [1](http://x)n.\n\n**Sources:**\n1. [X](http://x)"
        );
    }

    #[test]
    fn test_multiple_supports_descending_order() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![chunk("http://a", "A"), chunk("http://b", "B")],
            grounding_supports: vec![support(5, vec![0]), support(11, vec![1])],
        };

        // Both splice points must land on the original text, regardless of
        // the order supports arrive in.
        let result = splice_citations("First. Rest.", Some(&metadata));
        assert_eq!(
            result,
            "First [1](http://a). Rest [2](http://b).\n\n**Sources:**\n1. [A](http://a)\n2. [B](http://b)"
        );

        let metadata_reversed = GroundingMetadata {
            grounding_chunks: vec![chunk("http://a", "A"), chunk("http://b", "B")],
            grounding_supports: vec![support(11, vec![1]), support(5, vec![0])],
        };
        let reversed = splice_citations("First. Rest.", Some(&metadata_reversed));
        assert_eq!(result, reversed);
    }

    #[test]
    fn test_duplicate_links_within_support_deduped() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![chunk("http://x", "X")],
            grounding_supports: vec![support(5, vec![0, 0])],
        };

        let result = splice_citations("Hello world", Some(&metadata));
        assert_eq!(
            result,
            "Hello [1](http://x) world\n\n**Sources:**\n1. [X](http://x)"
        );
    }

    #[test]
    fn test_positional_numbering_skips_unusable_chunks() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![
                GroundingChunk { web: None },
                chunk("http://b", "B"),
            ],
            grounding_supports: vec![support(5, vec![1])],
        };

        // Chunk 0 has no web source; chunk 1 keeps its positional number 2.
        let result = splice_citations("Hello world", Some(&metadata));
        assert_eq!(
            result,
            "Hello [2](http://b) world\n\n**Sources:**\n2. [B](http://b)"
        );
    }

    #[test]
    fn test_support_with_out_of_range_index_skipped() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![chunk("http://x", "X")],
            grounding_supports: vec![support(999, vec![0])],
        };

        let result = splice_citations("Short.", Some(&metadata));
        assert_eq!(result, "Short.\n\n**Sources:**\n1. [X](http://x)");
    }

    #[test]
    fn test_support_on_invalid_char_boundary_skipped() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![chunk("http://x", "X")],
            // "é" is two bytes; index 1 is inside it
            grounding_supports: vec![support(1, vec![0])],
        };

        let result = splice_citations("é ok", Some(&metadata));
        assert_eq!(result, "é ok\n\n**Sources:**\n1. [X](http://x)");
    }

    #[test]
    fn test_support_referencing_missing_chunk_skipped() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![chunk("http://x", "X")],
            grounding_supports: vec![support(5, vec![7])],
        };

        let result = splice_citations("Hello world", Some(&metadata));
        assert_eq!(result, "Hello world\n\n**Sources:**\n1. [X](http://x)");
    }

    #[test]
    fn test_chunk_without_title_skipped_but_counted() {
        // A title-less chunk can still be cited inline, but it is omitted
        // from the source list while keeping its positional number.
        let metadata = GroundingMetadata {
            grounding_chunks: vec![
                GroundingChunk {
                    web: Some(WebSource {
                        uri: Some("http://untitled".to_string()),
                        title: None,
                    }),
                },
                chunk("http://b", "B"),
            ],
            grounding_supports: vec![support(6, vec![0])],
        };

        let result = splice_citations("Hello.", Some(&metadata));
        assert_eq!(
            result,
            "Hello. [1](http://untitled)\n\n**Sources:**\n2. [B](http://b)"
        );
    }

    #[test]
    fn test_empty_metadata_lists() {
        let metadata = GroundingMetadata::default();
        assert_eq!(splice_citations("Answer.", Some(&metadata)), "Answer.");
        assert_eq!(splice_citations("", Some(&metadata)), NO_ANSWER_FALLBACK);
    }

    #[test]
    fn test_splice_at_end_of_text() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![chunk("http://x", "X")],
            grounding_supports: vec![support(7, vec![0])],
        };

        let result = splice_citations("Answer.", Some(&metadata));
        assert_eq!(
            result,
            "Answer. [1](http://x)\n\n**Sources:**\n1. [X](http://x)"
        );
    }
}

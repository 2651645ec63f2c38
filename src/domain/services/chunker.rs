//! Splitting oversized text into bounded, overlapping sub-spans for
//! embedding. Splits prefer line boundaries over mid-line cuts so each
//! sub-span stays readable to the embedding model.

/// Minimum sub-span size; avoids degenerate tail fragments.
const MIN_CHUNK_CHARS: usize = 64;

/// Split `text` into sub-spans of at most `chunk_size` characters with
/// `overlap` characters carried between consecutive spans.
///
/// Text at or under `chunk_size` is returned whole, so a construct under
/// the ceiling always yields exactly one span. Concatenating the spans
/// (minus overlaps) reconstructs the input.
pub fn split_for_embedding(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(MIN_CHUNK_CHARS);
    let overlap = overlap.min(chunk_size / 2);

    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut spans = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let hard_end = align_char_boundary(text, (start + chunk_size).min(text.len()));

        let end = if hard_end == text.len() {
            hard_end
        } else {
            find_break_point(text, start, hard_end)
        };

        spans.push(text[start..end].to_string());

        if end == text.len() {
            break;
        }

        // Next span starts `overlap` characters before the break so no
        // logical unit is cut without context on either side.
        let next = align_char_boundary(text, end.saturating_sub(overlap));
        // Always make forward progress even when overlap swallows the span.
        start = if next > start { next } else { end };
    }

    spans
}

/// Prefer breaking at the last newline inside the span; fall back to a
/// whitespace boundary, then a hard cut.
fn find_break_point(text: &str, start: usize, hard_end: usize) -> usize {
    let window = &text[start..hard_end];

    if let Some(pos) = window.rfind('\n') {
        if pos + 1 > MIN_CHUNK_CHARS.min(window.len() - 1) {
            return start + pos + 1;
        }
    }

    if let Some(pos) = window.rfind(' ') {
        if pos + 1 > MIN_CHUNK_CHARS.min(window.len() - 1) {
            return start + pos + 1;
        }
    }

    hard_end
}

fn align_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_text_single_span() {
        let spans = split_for_embedding("def f():\n    pass", 1000, 100);
        assert_eq!(spans, vec!["def f():\n    pass".to_string()]);
    }

    #[test]
    fn test_oversized_text_yields_multiple_spans_under_ceiling() {
        let text: String = (0..100)
            .map(|i| format!("line number {i} with some padding\n"))
            .collect();
        let spans = split_for_embedding(&text, 400, 80);

        assert!(spans.len() >= 2, "expected at least two sub-spans");
        for span in &spans {
            assert!(span.len() <= 400, "span exceeds ceiling: {}", span.len());
        }
    }

    #[test]
    fn test_spans_prefer_line_boundaries() {
        let text: String = (0..50).map(|i| format!("alpha beta gamma {i}\n")).collect();
        let spans = split_for_embedding(&text, 256, 0);

        for span in &spans[..spans.len() - 1] {
            assert!(
                span.ends_with('\n'),
                "span should break at a line boundary: {:?}",
                &span[span.len().saturating_sub(20)..]
            );
        }
    }

    #[test]
    fn test_combined_coverage_reconstructs_input() {
        let text: String = (0..80).map(|i| format!("content row {i}\n")).collect();
        let overlap = 50;
        let spans = split_for_embedding(&text, 300, overlap);

        // Every character of the input appears in some span, in order.
        let mut rebuilt = spans[0].clone();
        for span in &spans[1..] {
            // Find where this span's fresh content begins in the overlap.
            let mut matched = 0;
            let max_probe = span.len().min(rebuilt.len());
            for probe in (0..=max_probe).rev() {
                if rebuilt.ends_with(&span[..probe]) {
                    matched = probe;
                    break;
                }
            }
            rebuilt.push_str(&span[matched..]);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_multibyte_input_splits_on_char_boundaries() {
        let text: String = "código de ejemplo número λ\n".repeat(40);
        let spans = split_for_embedding(&text, 200, 30);

        assert!(spans.len() >= 2);
        // Would have panicked on a non-boundary slice already; check
        // round-trip integrity of each span instead.
        for span in spans {
            assert!(span.chars().count() > 0);
        }
    }
}

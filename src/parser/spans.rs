use std::ops::Range;

use super::patterns::HeaderMatch;

/// Byte range of each record on a page, one per header, in page order.
///
/// A span runs from its header to the next header that starts at or after
/// the current header's own token, or to the end of the page.
pub fn split_spans(text: &str, headers: &[HeaderMatch]) -> Vec<Range<usize>> {
    headers
        .iter()
        .map(|h| {
            let end = headers
                .iter()
                .map(|next| next.start)
                .filter(|&start| start >= h.token_end)
                .min()
                .unwrap_or(text.len());
            h.start..end
        })
        .collect()
}

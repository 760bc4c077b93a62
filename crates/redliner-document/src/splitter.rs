use super::types::Chunk;

/// Separator between paragraphs, used both to split and to reassemble.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Split `text` on paragraph breaks into trimmed, non-empty chunks.
///
/// Falls back to a single chunk holding the whole text when no paragraph
/// survives trimming.
#[must_use]
pub fn split_paragraphs(text: &str) -> Vec<Chunk> {
    let pieces: Vec<&str> = text
        .split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if pieces.is_empty() {
        return vec![Chunk {
            content: text.to_owned(),
            chunk_index: 0,
            total_chunks: 1,
        }];
    }

    let total = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, content)| Chunk {
            content: content.to_owned(),
            chunk_index: i,
            total_chunks: total,
        })
        .collect()
}

/// Join chunk texts back together in the given order.
#[must_use]
pub fn join_paragraphs<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

//! Text chunking for the Google Translate speech endpoint, which rejects
//! inputs longer than 100 characters.

/// Longest chunk, in characters, sent in one speech request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Split text into speakable chunks of at most [`MAX_CHUNK_CHARS`] characters.
///
/// Breaks first after sentence punctuation (`. , ; :` only when followed by
/// whitespace, so "3.14" stays whole), then at the last whitespace that fits,
/// then hard at the limit. Chunks with nothing to pronounce are dropped.
pub fn split_for_speech(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    for piece in punctuation_pieces(text) {
        let piece = piece.trim();
        if !piece.chars().any(char::is_alphanumeric) {
            continue;
        }
        push_bounded(piece, &mut chunks);
    }
    chunks
}

fn punctuation_pieces(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut iter = text.char_indices().peekable();
    while let Some((idx, c)) = iter.next() {
        let next = iter.peek().map(|&(_, n)| n);
        let is_break = match c {
            '\n' | '!' | '?' | '\u{3002}' | '\u{FF01}' | '\u{FF1F}' => true,
            '.' | ',' | ';' | ':' => next.is_none_or(char::is_whitespace),
            _ => false,
        };
        if is_break {
            let end = idx + c.len_utf8();
            pieces.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn push_bounded(mut piece: &str, out: &mut Vec<String>) {
    while piece.chars().count() > MAX_CHUNK_CHARS {
        let limit = piece
            .char_indices()
            .nth(MAX_CHUNK_CHARS)
            .map(|(i, _)| i)
            .unwrap_or(piece.len());
        // Include the first character past the limit: a space there is a clean break.
        let window = piece[limit..]
            .chars()
            .next()
            .map_or(limit, |c| limit + c.len_utf8());
        let split = match piece[..window].rfind(char::is_whitespace) {
            Some(i) if i > 0 => i,
            _ => limit,
        };
        out.push(piece[..split].trim_end().to_string());
        piece = piece[split..].trim_start();
    }
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}

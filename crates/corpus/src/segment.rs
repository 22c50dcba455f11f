use dp_domain::error::{Error, Result};

/// Transport message-size ceiling, in bytes.
pub const MAX_LEN: usize = 4000;

/// Separates entries: three blank lines.
pub const ENTRY_DELIMITER: &str = "\n\n\n\n";

/// Separates paragraphs inside an entry.
pub const PARAGRAPH_DELIMITER: &str = "\n\n";

/// Appended to the title in front of every chunk after the first.
pub const CONTINUED_SUFFIX: &str = " (continued)\n\n";

/// One logical unit of a corpus, borrowed from the corpus text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    /// Position in document order, starting at 0.
    pub index: usize,
    /// First line of the body, verbatim.
    pub title: &'a str,
    /// Full entry text including the title line.
    pub body: &'a str,
}

impl<'a> Entry<'a> {
    /// Whether the body reaches the ceiling and will be sent in chunks.
    pub fn needs_chunking(&self, max_len: usize) -> bool {
        self.body.len() >= max_len
    }

    /// The body split into chunks of at most `max_len` bytes.
    pub fn chunks(&self, max_len: usize) -> Vec<&'a str> {
        chunk(self.body, max_len)
    }

    /// Message texts in send order: chunk 0 verbatim, later chunks prefixed
    /// with `"<title> (continued)\n\n"`.
    pub fn messages(&self, max_len: usize) -> Vec<String> {
        self.chunks(max_len)
            .into_iter()
            .enumerate()
            .map(|(i, part)| {
                if i == 0 {
                    part.to_owned()
                } else {
                    format!("{}{CONTINUED_SUFFIX}{part}", self.title)
                }
            })
            .collect()
    }
}

/// First line of `body`.
pub fn title_of(body: &str) -> &str {
    body.split('\n').next().unwrap_or_default()
}

/// Split a corpus into entries in document order.
///
/// Entries are neither trimmed nor normalized.  An empty corpus is an
/// error: it almost always means the source is misconfigured.
pub fn segment(corpus: &str) -> Result<Vec<Entry<'_>>> {
    if corpus.is_empty() {
        return Err(Error::EmptyCorpus("corpus holds no text".into()));
    }

    let entries: Vec<Entry<'_>> = corpus
        .split(ENTRY_DELIMITER)
        .enumerate()
        .map(|(index, body)| Entry {
            index,
            title: title_of(body),
            body,
        })
        .collect();

    tracing::debug!(entries = entries.len(), bytes = corpus.len(), "corpus segmented");
    Ok(entries)
}

/// Split an entry body into chunks on paragraph boundaries.
///
/// Bodies shorter than `max_len` come back whole.  Otherwise whole
/// paragraphs are accumulated until the next one would bring the chunk to
/// `max_len` or beyond, then the chunk is flushed; the final chunk always
/// flushes.  A single paragraph that is itself too long becomes one
/// oversized chunk.  Chunks are slices of `body` and concatenate back to it.
pub fn chunk(body: &str, max_len: usize) -> Vec<&str> {
    if body.len() < max_len {
        return vec![body];
    }

    let paragraphs: Vec<&str> = body.split(PARAGRAPH_DELIMITER).collect();
    let last = paragraphs.len() - 1;
    // Length of paragraph `i` as it appears in the body, delimiter included.
    let span = |i: usize| {
        if i < last {
            paragraphs[i].len() + PARAGRAPH_DELIMITER.len()
        } else {
            paragraphs[i].len()
        }
    };

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut end = 0;
    for i in 0..=last {
        end += span(i);
        if i == last || (end - start) + span(i + 1) >= max_len {
            chunks.push(&body[start..end]);
            start = end;
        }
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(tag: char, len: usize) -> String {
        std::iter::repeat(tag).take(len).collect()
    }

    #[test]
    fn splits_on_four_newlines() {
        let entries = segment("A\n\n\n\nB\n\n\n\nC").unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].title, "B");
        assert_eq!(entries[1].body, "B");
        assert_eq!(entries[2].index, 2);
    }

    #[test]
    fn title_is_first_line_and_body_keeps_it() {
        let entries = segment("* LESSON 1 *\nNothing I see means anything.\n\n\n\n* LESSON 2 *\nx").unwrap();
        assert_eq!(entries[0].title, "* LESSON 1 *");
        assert_eq!(entries[0].body, "* LESSON 1 *\nNothing I see means anything.");
    }

    #[test]
    fn three_newlines_do_not_split() {
        let entries = segment("A\n\n\nB").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body, "A\n\n\nB");
    }

    #[test]
    fn five_newlines_leave_leading_newline_untrimmed() {
        let entries = segment("A\n\n\n\n\nB").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].body, "\nB");
        assert_eq!(entries[1].title, "");
    }

    #[test]
    fn empty_corpus_is_an_error() {
        assert!(matches!(segment(""), Err(Error::EmptyCorpus(_))));
    }

    #[test]
    fn short_body_is_one_chunk() {
        assert_eq!(chunk("short\n\nbody", 4000), vec!["short\n\nbody"]);
    }

    #[test]
    fn body_at_exactly_max_len_is_chunked() {
        let body = format!("{}\n\n{}", paragraph('a', 6), paragraph('b', 2));
        assert_eq!(body.len(), 10);
        let chunks = chunk(&body, 10);
        assert_eq!(chunks, vec!["aaaaaa\n\n", "bb"]);
    }

    #[test]
    fn chunks_concatenate_to_body() {
        for max_len in [10, 25, 64, 200] {
            for count in 1..12 {
                let body: Vec<String> = (0..count)
                    .map(|i| paragraph(char::from(b'a' + i as u8), 3 + (i * 7) % 19))
                    .collect();
                let body = body.join("\n\n");
                let chunks = chunk(&body, max_len);
                assert_eq!(chunks.concat(), body, "max_len={max_len} count={count}");
            }
        }
    }

    #[test]
    fn multi_paragraph_chunks_stay_under_max_len() {
        let body: Vec<String> = (0..40)
            .map(|i| paragraph('x', 5 + (i * 13) % 31))
            .collect();
        let body = body.join("\n\n");
        for max_len in [40, 64, 100] {
            for part in chunk(&body, max_len) {
                let single_paragraph = !part.trim_end_matches('\n').contains(PARAGRAPH_DELIMITER);
                assert!(
                    part.len() < max_len || single_paragraph,
                    "chunk of {} bytes exceeds {max_len}",
                    part.len()
                );
            }
        }
    }

    #[test]
    fn oversized_paragraph_is_kept_whole() {
        let big = paragraph('z', 50);
        let body = format!("intro\n\n{big}\n\nouter");
        let chunks = chunk(&body, 20);
        assert!(chunks.iter().any(|c| c.starts_with(&big)));
        assert_eq!(chunks.concat(), body);
    }

    #[test]
    fn body_without_paragraphs_stays_whole() {
        let body = paragraph('q', 30);
        assert_eq!(chunk(&body, 10), vec![body.as_str()]);
    }

    #[test]
    fn continuation_messages_carry_the_title() {
        let body = format!("Title\n{}\n\n{}", paragraph('a', 10), paragraph('b', 10));
        let entry = Entry {
            index: 0,
            title: "Title",
            body: &body,
        };
        let messages = entry.messages(20);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], format!("Title\n{}\n\n", paragraph('a', 10)));
        assert_eq!(messages[1], format!("Title (continued)\n\n{}", paragraph('b', 10)));

        let rebuilt: String = messages
            .iter()
            .enumerate()
            .map(|(i, m)| {
                if i == 0 {
                    m.as_str()
                } else {
                    m.strip_prefix("Title (continued)\n\n").unwrap()
                }
            })
            .collect();
        assert_eq!(rebuilt, body);
    }

    #[test]
    fn needs_chunking_matches_threshold() {
        let entry = Entry {
            index: 0,
            title: "t",
            body: "0123456789",
        };
        assert!(entry.needs_chunking(10));
        assert!(!entry.needs_chunking(11));
    }
}

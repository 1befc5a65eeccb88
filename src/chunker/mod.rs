//! Reply chunking for size-limited transports.
//!
//! Discord rejects messages longer than 2000 characters, so long generated
//! answers are split before sending. Splits prefer line boundaries and only
//! cut inside a line when that line alone exceeds the limit.
//!
//! Lengths are counted in `char`s, so a cut never lands inside a multi-byte
//! character.

/// Discord's per-message character limit.
pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 2000;

/// How a fragment connects to the one after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The split consumed a `\n` separator.
    Line,
    /// The split cut through an over-long line; nothing was consumed.
    Hard,
    /// Last fragment.
    End,
}

/// One size-bounded piece of a split text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub boundary: Boundary,
}

impl Fragment {
    /// Reassembles the original text from an ordered fragment list.
    pub fn rejoin(fragments: &[Fragment]) -> String {
        let mut out = String::new();
        for fragment in fragments {
            out.push_str(&fragment.text);
            if fragment.boundary == Boundary::Line {
                out.push('\n');
            }
        }
        out
    }
}

pub struct MessageChunker {
    max_length: usize,
}

impl Default for MessageChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHUNK_LENGTH)
    }
}

impl MessageChunker {
    /// Creates a chunker. A zero limit is raised to one character.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Splits `text` into transport-safe strings.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.split(text).into_iter().map(|f| f.text).collect()
    }

    /// Splits `text`, recording how each fragment joins the next.
    pub fn split(&self, text: &str) -> Vec<Fragment> {
        if text.chars().count() <= self.max_length {
            return vec![Fragment {
                text: text.to_string(),
                boundary: Boundary::End,
            }];
        }

        let mut fragments = Vec::new();
        // `None` means no line has been committed yet; an empty line still
        // counts as content so its separator is preserved.
        let mut current: Option<(String, usize)> = None;

        for line in text.split('\n') {
            let line_len = line.chars().count();

            if let Some((buf, len)) = current.as_mut() {
                if *len + 1 + line_len <= self.max_length {
                    buf.push('\n');
                    buf.push_str(line);
                    *len += 1 + line_len;
                    continue;
                }
            }

            if let Some((buf, _)) = current.take() {
                fragments.push(Fragment {
                    text: buf,
                    boundary: Boundary::Line,
                });
            }

            if line_len <= self.max_length {
                current = Some((line.to_string(), line_len));
                continue;
            }

            let mut slices = hard_split(line, self.max_length);
            let last = slices.pop().unwrap_or_default();
            fragments.extend(slices.into_iter().map(|text| Fragment {
                text,
                boundary: Boundary::Hard,
            }));
            let last_len = last.chars().count();
            current = Some((last, last_len));
        }

        if let Some((buf, _)) = current {
            fragments.push(Fragment {
                text: buf,
                boundary: Boundary::End,
            });
        }

        fragments
    }
}

/// Cuts `line` into consecutive slices of at most `max_length` chars.
fn hard_split(line: &str, max_length: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(max_length)
        .map(|slice| slice.iter().collect())
        .collect()
}

/// Convenience wrapper using [`DEFAULT_MAX_CHUNK_LENGTH`].
pub fn split_message(text: &str) -> Vec<String> {
    MessageChunker::default().chunk(text)
}

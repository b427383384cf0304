//! Recognize zsh extended-history lines.

use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::store::Timestamp;

/// `: <epoch>:<elapsed>;<command>`, as written by zsh with `EXTENDED_HISTORY`.
///
/// Anchored to the start of the logical line: a prefix on a continuation
/// line is part of the command, not a new stamp.
static EXTENDED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^: ([0-9]{10,}):([0-9]+);").expect("extended history pattern is valid")
});

/// Split a logical history line into its command and recorded timestamp.
///
/// Lines in zsh extended format yield the trimmed command text and the
/// recorded stamp. Anything else is returned verbatim with `None`; the caller
/// is expected to assign a synthetic stamp.
pub fn classify(line: &[u8]) -> (&[u8], Option<Timestamp>) {
    let Some(caps) = EXTENDED_LINE.captures(line) else {
        return (line, None);
    };

    let prefix_end = caps.get(0).map_or(0, |m| m.end());
    let digits = |i: usize| {
        caps.get(i)
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .unwrap_or_default()
    };

    let timestamp = Timestamp::Recorded {
        epoch: digits(1),
        elapsed: digits(2),
    };
    (trim(&line[prefix_end..]), Some(timestamp))
}

/// Strip leading and trailing spaces and tabs.
pub(crate) fn trim(bytes: &[u8]) -> &[u8] {
    let is_blank = |b: &u8| *b == b' ' || *b == b'\t';
    let start = bytes.iter().position(|b| !is_blank(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_blank(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

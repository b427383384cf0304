//! Read history files into a shared [`DedupStore`].

use std::io::{self, BufRead};

use crate::classify::{classify, trim};
use crate::store::{DedupStore, Timestamp};

/// State accumulated over one merge run.
///
/// Every source is parsed into the same context, so the synthetic stamp
/// counter keeps increasing from one file to the next.
#[derive(Debug)]
pub struct MergeContext {
    store: DedupStore,
    next_synthetic: u64,
    files_processed: usize,
    commands_processed: usize,
}

impl Default for MergeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeContext {
    pub fn new() -> Self {
        Self {
            store: DedupStore::new(),
            next_synthetic: 1,
            files_processed: 0,
            commands_processed: 0,
        }
    }

    /// Parse one history source to its end.
    ///
    /// Blank lines and `#` comments are ignored. A line ending in `\` is
    /// joined with the physical lines that follow it. I/O errors from the
    /// reader are returned as-is; entries read before the error stay merged.
    pub fn parse<R: BufRead>(&mut self, reader: R) -> io::Result<()> {
        let mut lines = PhysicalLines::new(reader);

        while let Some(raw) = lines.next_line()? {
            let first = trim(&raw);
            if first.is_empty() || first[0] == b'#' {
                continue;
            }

            let mut logical = first.to_vec();
            while logical.last() == Some(&b'\\') {
                let Some(next) = lines.next_line()? else {
                    break;
                };
                logical.push(b'\n');
                logical.extend_from_slice(&next);
            }

            let (command, timestamp) = classify(&logical);
            let timestamp = timestamp.unwrap_or_else(|| {
                let ts = Timestamp::Synthetic(self.next_synthetic);
                self.next_synthetic += 1;
                ts
            });

            self.commands_processed += 1;
            if command.is_empty() || command[0] == b'#' {
                tracing::trace!(
                    command = %String::from_utf8_lossy(command),
                    "skipping empty or commented entry"
                );
                continue;
            }

            tracing::trace!(
                command = %String::from_utf8_lossy(command),
                ?timestamp,
                "history entry"
            );
            self.store.upsert(command, timestamp);
        }

        self.files_processed += 1;
        tracing::debug!(
            files = self.files_processed,
            commands = self.commands_processed,
            distinct = self.store.len(),
            "finished history source"
        );
        Ok(())
    }

    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    pub fn files_processed(&self) -> usize {
        self.files_processed
    }

    /// Logical lines seen across all sources, duplicates included.
    pub fn commands_processed(&self) -> usize {
        self.commands_processed
    }
}

/// Byte-oriented line reader.
///
/// History files are not guaranteed to be UTF-8, so lines are read as raw
/// bytes with the `\n` or `\r\n` terminator removed.
struct PhysicalLines<R> {
    reader: R,
}

impl<R: BufRead> PhysicalLines<R> {
    fn new(reader: R) -> Self {
        Self { reader }
    }

    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(sources: &[&[u8]]) -> MergeContext {
        let mut cx = MergeContext::new();
        for source in sources {
            cx.parse(*source).unwrap();
        }
        cx
    }

    fn commands(cx: &MergeContext) -> Vec<String> {
        cx.store()
            .sorted()
            .into_iter()
            .map(|(cmd, _)| String::from_utf8_lossy(cmd).into_owned())
            .collect()
    }

    #[test]
    fn later_recorded_stamp_wins() {
        let cx = parse_all(&[b": 1000000000:0;echo a\n: 1000000001:0;echo a\n"]);
        assert_eq!(cx.store().len(), 1);
        assert_eq!(
            cx.store().get(b"echo a"),
            Some(&Timestamp::Recorded {
                epoch: "1000000001".to_string(),
                elapsed: "0".to_string(),
            })
        );
        assert_eq!(cx.commands_processed(), 2);
    }

    #[test]
    fn synthetic_counter_continues_across_sources() {
        let cx = parse_all(&[b"echo b\n", b"echo c\n"]);
        assert_eq!(cx.store().get(b"echo b"), Some(&Timestamp::Synthetic(1)));
        assert_eq!(cx.store().get(b"echo c"), Some(&Timestamp::Synthetic(2)));
        assert_eq!(commands(&cx), vec!["echo b", "echo c"]);
        assert_eq!(cx.files_processed(), 2);
    }

    #[test]
    fn continuation_lines_are_joined() {
        let cx = parse_all(&[b"echo \"foo\\\nbar\"\n"]);
        assert_eq!(commands(&cx), vec!["echo \"foo\\\nbar\""]);
        assert_eq!(cx.commands_processed(), 1);
    }

    #[test]
    fn continuation_chains_through_several_lines() {
        let cx = parse_all(&[b": 1700000000:0;a \\\n  b \\\nc\nd\n"]);
        assert_eq!(commands(&cx), vec!["d", "a \\\n  b \\\nc"]);
    }

    #[test]
    fn trailing_backslash_at_end_of_input_is_kept() {
        let cx = parse_all(&[b"echo \\"]);
        assert_eq!(commands(&cx), vec!["echo \\"]);
    }

    #[test]
    fn comments_and_blank_lines_are_not_counted() {
        let cx = parse_all(&[b"#comment\n\n   \n\t# indented\nls\n"]);
        assert_eq!(cx.commands_processed(), 1);
        assert_eq!(commands(&cx), vec!["ls"]);
    }

    #[test]
    fn empty_extended_command_is_counted_but_not_stored() {
        let cx = parse_all(&[b": 1700000000:0;\n: 1700000001:0;# note\n"]);
        assert_eq!(cx.commands_processed(), 2);
        assert!(cx.store().is_empty());
    }

    #[tracing_test::traced_test]
    #[test]
    fn skipped_entries_are_traced() {
        let cx = parse_all(&[b": 1700000000:0;# note\nls\n"]);
        assert_eq!(commands(&cx), vec!["ls"]);
        assert!(logs_contain("skipping empty or commented entry"));
        assert!(logs_contain("# note"));
    }

    #[test]
    fn crlf_line_endings_are_stripped() {
        let cx = parse_all(&[b"ls\r\n: 1700000000:0;pwd\r\n"]);
        assert_eq!(commands(&cx), vec!["ls", "pwd"]);
    }

    #[test]
    fn synthetic_counter_advances_only_for_plain_lines() {
        let cx = parse_all(&[b"one\n: 1700000000:0;two\nthree\n"]);
        assert_eq!(cx.store().get(b"three"), Some(&Timestamp::Synthetic(2)));
    }

    #[test]
    fn duplicate_plain_command_takes_last_position() {
        let cx = parse_all(&[b"x\ny\nx\n"]);
        assert_eq!(commands(&cx), vec!["y", "x"]);
        assert_eq!(cx.commands_processed(), 3);
    }

    #[test]
    fn empty_source_still_counts_as_a_file() {
        let cx = parse_all(&[b""]);
        assert_eq!(cx.files_processed(), 1);
        assert_eq!(cx.commands_processed(), 0);
    }

    #[test]
    fn read_error_is_propagated() {
        struct Broken;

        impl io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }

        let mut cx = MergeContext::new();
        let err = cx.parse(io::BufReader::new(Broken)).unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
        assert_eq!(cx.files_processed(), 0);
    }
}

//! Reading pathname lists from a stream.
//!
//! [`LineReader`] yields one pathname at a time from a [`BufRead`] source,
//! for feeding explicit file lists (e.g. `find ... -print0` output or a
//! hand-written manifest) into [`crate::Builder::append_path_list`]. It has
//! no archive semantics of its own.
//!
//! Two separator conventions are supported: [`Separator::Null`] for
//! zero-terminated names (which may legitimately contain newlines), and
//! [`Separator::Newline`] for text lists, where CR, LF, and CRLF all
//! terminate a name and blank lines are skipped.

use std::{collections::VecDeque, io::BufRead};

/// How pathnames are terminated in the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Names end at CR, LF, or CRLF; blank lines are skipped.
    Newline,
    /// Names end at a zero byte and are yielded verbatim, empty or not.
    Null,
}

/// Iterator over pathnames in a stream.
///
/// Yields each name as raw bytes (pathnames need not be valid UTF-8). The
/// final name does not require a trailing separator.
#[derive(Debug)]
pub struct LineReader<R: BufRead> {
    reader: R,
    separator: Separator,
    /// Names split out of an already-read chunk, ahead of the reader.
    pending: VecDeque<Vec<u8>>,
}

impl<R: BufRead> LineReader<R> {
    /// Create a reader over `input` using the given separator convention.
    pub fn new(input: R, separator: Separator) -> Self {
        Self {
            reader: input,
            separator,
            pending: VecDeque::new(),
        }
    }

    fn next_null(&mut self) -> Option<std::io::Result<Vec<u8>>> {
        let mut name = Vec::new();
        match self.reader.read_until(0, &mut name) {
            Ok(0) => None,
            Ok(_) => {
                if name.last() == Some(&0) {
                    name.pop();
                }
                Some(Ok(name))
            }
            Err(e) => Some(Err(e)),
        }
    }

    fn next_line(&mut self) -> Option<std::io::Result<Vec<u8>>> {
        loop {
            if let Some(name) = self.pending.pop_front() {
                return Some(Ok(name));
            }

            let mut chunk = Vec::new();
            match self.reader.read_until(b'\n', &mut chunk) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            if chunk.last() == Some(&b'\n') {
                chunk.pop();
            }
            // A bare CR terminates a name too, so a CRLF pair leaves an
            // empty fragment that the filter drops along with blank lines.
            self.pending.extend(
                chunk
                    .split(|&b| b == b'\r')
                    .filter(|part| !part.is_empty())
                    .map(<[u8]>::to_vec),
            );
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = std::io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.separator {
            Separator::Null => self.next_null(),
            Separator::Newline => self.next_line(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    fn read_all(input: &[u8], separator: Separator) -> Vec<Vec<u8>> {
        LineReader::new(Cursor::new(input), separator)
            .collect::<std::io::Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_newline_separated() {
        let names = read_all(b"a\nb/c\nd\n", Separator::Newline);
        assert_eq!(names, vec![b"a".to_vec(), b"b/c".to_vec(), b"d".to_vec()]);
    }

    #[test]
    fn test_unterminated_final_name() {
        let names = read_all(b"a\nb", Separator::Newline);
        assert_eq!(names, vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let names = read_all(b"a\r\n\r\n\nb\rc\n", Separator::Newline);
        assert_eq!(names, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_null_separated() {
        let names = read_all(b"a\0with\nnewline\0b\0", Separator::Null);
        assert_eq!(
            names,
            vec![b"a".to_vec(), b"with\nnewline".to_vec(), b"b".to_vec()]
        );
    }

    #[test]
    fn test_null_preserves_empty_names() {
        // Empty names between separators are the caller's problem in null
        // mode; only a trailing separator produces no extra name.
        let names = read_all(b"a\0\0b\0", Separator::Null);
        assert_eq!(names, vec![b"a".to_vec(), Vec::new(), b"b".to_vec()]);
    }

    #[test]
    fn test_empty_input() {
        assert!(read_all(b"", Separator::Newline).is_empty());
        assert!(read_all(b"", Separator::Null).is_empty());
        assert!(read_all(b"\n\n", Separator::Newline).is_empty());
    }
}

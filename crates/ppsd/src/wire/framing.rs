//! Bounded line reading for JSONL connections.

use std::io::{self, BufRead, Read};

use super::FrameError;

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Reads one newline-terminated line from `reader`.
///
/// Returns `Ok(None)` when the peer disconnects without sending anything and
/// the buffered bytes when the stream ends before a newline.
pub(crate) fn read_line<R: Read>(
    reader: &mut R,
    max_size: usize,
) -> Result<Option<Vec<u8>>, FrameError> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        let bytes_read = read_with_retry(reader, &mut chunk)?;
        let received = &chunk[..bytes_read];

        if received.is_empty() {
            return Ok((!buffer.is_empty()).then_some(buffer));
        }

        if let Some(newline) = received.iter().position(|byte| *byte == b'\n') {
            buffer.extend_from_slice(&received[..=newline]);
            enforce_limit(buffer.len(), max_size)?;
            return Ok(Some(buffer));
        }

        buffer.extend_from_slice(received);
        enforce_limit(buffer.len(), max_size)?;
    }
}

/// Reads one line from a buffered reader, leaving bytes past the newline
/// buffered for the next call.
///
/// Never consumes more than `max_size + 1` bytes per call.
pub(crate) fn read_buffered_line<R: BufRead>(
    reader: &mut R,
    max_size: usize,
) -> Result<Option<Vec<u8>>, FrameError> {
    let mut buffer = Vec::new();
    let cap = u64::try_from(max_size).unwrap_or(u64::MAX).saturating_add(1);
    reader.by_ref().take(cap).read_until(b'\n', &mut buffer)?;
    enforce_limit(buffer.len(), max_size)?;
    Ok((!buffer.is_empty()).then_some(buffer))
}

fn read_with_retry<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}

const fn enforce_limit(size: usize, max_size: usize) -> Result<(), FrameError> {
    if size > max_size {
        return Err(FrameError::TooLarge { size, max_size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    #[test]
    fn stops_at_first_newline() {
        let mut input = Cursor::new(b"first\nsecond\n".to_vec());
        let line = read_line(&mut input, MAX_LINE_BYTES).expect("read line");
        assert_eq!(line.as_deref(), Some(&b"first\n"[..]));
    }

    #[test]
    fn returns_partial_line_at_end_of_stream() {
        let mut input = Cursor::new(b"unterminated".to_vec());
        let line = read_line(&mut input, MAX_LINE_BYTES).expect("read line");
        assert_eq!(line.as_deref(), Some(&b"unterminated"[..]));
    }

    #[test]
    fn empty_stream_yields_nothing() {
        let mut input = Cursor::new(Vec::new());
        assert!(read_line(&mut input, MAX_LINE_BYTES).expect("read").is_none());
    }

    #[test]
    fn oversized_lines_are_rejected() {
        let mut input = Cursor::new(vec![b'x'; 4096]);
        let error = read_line(&mut input, 2048).expect_err("limit should trip");
        assert!(matches!(error, FrameError::TooLarge { max_size: 2048, .. }));
    }

    #[test]
    fn buffered_lines_keep_the_remainder() {
        let mut input = BufReader::new(Cursor::new(b"first\nsecond\n".to_vec()));
        let first = read_buffered_line(&mut input, MAX_LINE_BYTES).expect("first line");
        let second = read_buffered_line(&mut input, MAX_LINE_BYTES).expect("second line");
        assert_eq!(first.as_deref(), Some(&b"first\n"[..]));
        assert_eq!(second.as_deref(), Some(&b"second\n"[..]));
        assert!(read_buffered_line(&mut input, MAX_LINE_BYTES).expect("eof").is_none());
    }

    #[test]
    fn oversized_buffered_lines_are_rejected() {
        let mut input = BufReader::new(Cursor::new(vec![b'x'; 4096]));
        let error = read_buffered_line(&mut input, 2048).expect_err("limit should trip");
        assert!(matches!(error, FrameError::TooLarge { size: 2049, max_size: 2048 }));
    }
}

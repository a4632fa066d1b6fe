use std::io::{self, Read};

/// Errors produced while decoding an ELF image.
///
/// Structurally-valid-but-unknown enum values (unknown class, unknown OS/ABI,
/// unknown segment type) are never errors; they decode to the `Unknown`
/// variant of the matching enum and parsing continues.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("truncated input: needed {needed} bytes for {context}")]
    TruncatedInput { context: &'static str, needed: usize },

    #[error("bad ELF magic: expected [7f 45 4c 46], found {found:02x?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("unsupported program header entry size {declared} (need at least {expected})")]
    UnsupportedEntrySize { declared: u16, expected: u16 },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// `read_exact` that reports EOF as [`ParseError::TruncatedInput`] instead of
/// a bare i/o error, so callers can tell "file too short" from "disk broke".
pub(crate) fn read_exact_or_truncated<R: Read>(
    src: &mut R,
    buf: &mut [u8],
    context: &'static str,
) -> Result<(), ParseError> {
    src.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ParseError::TruncatedInput {
                context,
                needed: buf.len(),
            }
        } else {
            ParseError::Io(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn short_source_reports_truncation() {
        let mut src = Cursor::new([0u8; 3]);
        let mut buf = [0u8; 8];
        let err = read_exact_or_truncated(&mut src, &mut buf, "test block").unwrap_err();
        match err {
            ParseError::TruncatedInput { context, needed } => {
                assert_eq!(context, "test block");
                assert_eq!(needed, 8);
            }
            other => panic!("expected TruncatedInput, got {other:?}"),
        }
    }

    #[test]
    fn exact_source_fills_buffer() {
        let mut src = Cursor::new([0xAB; 4]);
        let mut buf = [0u8; 4];
        read_exact_or_truncated(&mut src, &mut buf, "test block").unwrap();
        assert_eq!(buf, [0xAB; 4]);
    }
}

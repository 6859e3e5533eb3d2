//! Minimal DER tag/length/value reader.
//!
//! Scoped to exactly what the SEC1 private-key grammar needs: a pure cursor
//! function over a byte buffer. There is no stream object with a hidden
//! position; each call takes an explicit offset and returns the next one, so
//! every parse step is independently testable and re-entrant.

use crate::error::KeyError;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_OID: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;
/// Context tag [0], carries the curve OID in SEC1 keys.
pub const TAG_CTX_0: u8 = 0xA0;
/// Context tag [1], carries the public key BIT STRING in SEC1 keys.
pub const TAG_CTX_1: u8 = 0xA1;

/// One decoded tag/length/value element.
///
/// Borrows its value span from the input buffer and is never retained beyond
/// the parse pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerElement<'a> {
    pub tag: u8,
    pub value: &'a [u8],
}

/// Read one DER element at `offset`, returning the element and the offset of
/// the first byte after it.
///
/// Length rules: a length byte with the high bit clear is the length itself
/// (0-127). With the high bit set, the low 7 bits count subsequent big-endian
/// length bytes; 1 through 4 are accepted, while zero (the BER indefinite
/// form) and counts above 4 are rejected as malformed. Reading past the end
/// of the buffer is a hard error, never a silent truncation.
pub fn read_element(buf: &[u8], offset: usize) -> Result<(DerElement<'_>, usize), KeyError> {
    let tag = *buf.get(offset).ok_or(KeyError::TruncatedDer {
        offset,
        context: "tag",
    })?;
    let mut cursor = offset + 1;

    let len_byte = *buf.get(cursor).ok_or(KeyError::TruncatedDer {
        offset: cursor,
        context: "length",
    })?;
    cursor += 1;

    let length = if len_byte & 0x80 == 0 {
        len_byte as usize
    } else {
        let count = (len_byte & 0x7F) as usize;
        if count == 0 {
            return Err(KeyError::InvalidLength {
                offset: cursor - 1,
                reason: "indefinite length is not valid DER",
            });
        }
        if count > 4 {
            return Err(KeyError::InvalidLength {
                offset: cursor - 1,
                reason: "length field longer than 4 bytes",
            });
        }
        let mut length = 0usize;
        for _ in 0..count {
            let b = *buf.get(cursor).ok_or(KeyError::TruncatedDer {
                offset: cursor,
                context: "length bytes",
            })?;
            length = (length << 8) | b as usize;
            cursor += 1;
        }
        length
    };

    let end = cursor
        .checked_add(length)
        .filter(|&end| end <= buf.len())
        .ok_or(KeyError::TruncatedDer {
            offset: cursor,
            context: "value",
        })?;

    Ok((
        DerElement {
            tag,
            value: &buf[cursor..end],
        },
        end,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form_length() {
        let buf = [0x02, 0x01, 0x2A];
        let (elem, next) = read_element(&buf, 0).unwrap();
        assert_eq!(elem.tag, TAG_INTEGER);
        assert_eq!(elem.value, &[0x2A]);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_zero_length_value() {
        let buf = [0x30, 0x00];
        let (elem, next) = read_element(&buf, 0).unwrap();
        assert_eq!(elem.tag, TAG_SEQUENCE);
        assert!(elem.value.is_empty());
        assert_eq!(next, 2);
    }

    #[test]
    fn test_one_byte_long_form() {
        let mut buf = vec![0x04, 0x81, 0x80];
        buf.extend(std::iter::repeat(0xAB).take(128));
        let (elem, next) = read_element(&buf, 0).unwrap();
        assert_eq!(elem.value.len(), 128);
        assert_eq!(next, buf.len());
    }

    #[test]
    fn test_two_byte_long_form() {
        let mut buf = vec![0x04, 0x82, 0x01, 0x00];
        buf.extend(std::iter::repeat(0xCD).take(256));
        let (elem, _) = read_element(&buf, 0).unwrap();
        assert_eq!(elem.value.len(), 256);
    }

    #[test]
    fn test_reads_at_offset() {
        let buf = [0x02, 0x01, 0x01, 0x04, 0x02, 0xAA, 0xBB];
        let (first, next) = read_element(&buf, 0).unwrap();
        assert_eq!(first.value, &[0x01]);
        let (second, next) = read_element(&buf, next).unwrap();
        assert_eq!(second.tag, TAG_OCTET_STRING);
        assert_eq!(second.value, &[0xAA, 0xBB]);
        assert_eq!(next, buf.len());
    }

    #[test]
    fn test_rejects_indefinite_length() {
        let buf = [0x30, 0x80, 0x02, 0x01, 0x01, 0x00, 0x00];
        assert!(matches!(
            read_element(&buf, 0),
            Err(KeyError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_rejects_length_wider_than_four_bytes() {
        let buf = [0x30, 0x85, 0x00, 0x00, 0x00, 0x00, 0x01];
        assert!(matches!(
            read_element(&buf, 0),
            Err(KeyError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_rejects_truncated_value() {
        let buf = [0x04, 0x05, 0x01, 0x02];
        assert!(matches!(
            read_element(&buf, 0),
            Err(KeyError::TruncatedDer { .. })
        ));
    }

    #[test]
    fn test_rejects_truncated_length_bytes() {
        let buf = [0x04, 0x82, 0x01];
        assert!(matches!(
            read_element(&buf, 0),
            Err(KeyError::TruncatedDer { context: "length bytes", .. })
        ));
    }

    #[test]
    fn test_rejects_missing_length() {
        let buf = [0x02];
        assert!(matches!(
            read_element(&buf, 0),
            Err(KeyError::TruncatedDer { context: "length", .. })
        ));
    }

    #[test]
    fn test_rejects_empty_buffer() {
        assert!(matches!(
            read_element(&[], 0),
            Err(KeyError::TruncatedDer { context: "tag", .. })
        ));
    }

    #[test]
    fn test_huge_declared_length_does_not_overflow() {
        let buf = [0x04, 0x84, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(
            read_element(&buf, 0),
            Err(KeyError::TruncatedDer { .. })
        ));
    }
}

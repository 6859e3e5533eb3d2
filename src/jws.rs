//! ECDSA signature conversion from ASN.1 DER to the raw JWS form.
//!
//! The ECDSA primitive emits `SEQUENCE { INTEGER r; INTEGER s; }`; JWS wants
//! the two integers concatenated at a fixed width with zero padding on the
//! left. The parser here is deliberately bounded: a signature over a named
//! curve never needs more than one extra length byte, so anything wider is
//! structurally invalid.

use crate::error::ProofError;

/// Convert a DER-encoded ECDSA signature into `R || S`, each half
/// right-aligned and zero-padded to `half_len` (or to the widest component,
/// should the primitive ever emit one wider).
///
/// The input comes from our own signing primitive, so every structural
/// failure is an internal defect, not a recoverable condition.
pub fn der_signature_to_jws(der: &[u8], half_len: usize) -> Result<Vec<u8>, ProofError> {
    if der.len() < 2 {
        return Err(malformed("signature shorter than a DER header"));
    }
    if der[0] != 0x30 {
        return Err(malformed("missing outer SEQUENCE tag"));
    }

    let (seq_len, cursor) = match der[1] {
        n @ 0..=0x7F => (n as usize, 2),
        0x81 => {
            let n = *der
                .get(2)
                .ok_or_else(|| malformed("truncated long-form length"))?;
            (n as usize, 3)
        }
        _ => return Err(malformed("length form invalid for a bounded signature")),
    };
    // Structural self-check: the declared length must cover the input exactly.
    if cursor + seq_len != der.len() {
        return Err(malformed("SEQUENCE length does not match input"));
    }

    let (r, next) = read_integer(der, cursor)?;
    let (s, next) = read_integer(der, next)?;
    if next != der.len() {
        return Err(malformed("trailing bytes after s"));
    }

    let half = half_len.max(r.len()).max(s.len());
    let mut out = vec![0u8; 2 * half];
    out[half - r.len()..half].copy_from_slice(r);
    out[2 * half - s.len()..].copy_from_slice(s);
    Ok(out)
}

/// Read one short-form INTEGER, stripping the single zero octet DER prepends
/// when the value's high bit would otherwise mark it negative.
fn read_integer(buf: &[u8], offset: usize) -> Result<(&[u8], usize), ProofError> {
    if buf.get(offset) != Some(&0x02) {
        return Err(malformed("expected INTEGER tag"));
    }
    let len = *buf
        .get(offset + 1)
        .ok_or_else(|| malformed("truncated INTEGER length"))? as usize;
    if len == 0 || len > 0x7F {
        return Err(malformed("INTEGER length invalid for a bounded signature"));
    }
    let end = offset + 2 + len;
    if end > buf.len() {
        return Err(malformed("INTEGER runs past end of signature"));
    }

    let mut value = &buf[offset + 2..end];
    if value.len() > 1 && value[0] == 0x00 {
        value = &value[1..];
    }
    Ok((value, end))
}

fn malformed(detail: &'static str) -> ProofError {
    ProofError::MalformedSignature(detail)
}

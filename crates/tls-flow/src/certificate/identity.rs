//! Issuer/subject RDN sequences and Subject Alternative Names.
//!
//! X.509 encodes an issuer or subject as `Name ::= SEQUENCE OF RelativeDistinguishedName`,
//! where each RDN is in turn a `SET` wrapping one `{OID, value}` pair. Real
//! certificates almost always carry exactly one `AttributeTypeAndValue` per
//! RDN, which is the layout these offsets assume; a certificate that nests
//! more than one attribute inside a single RDN's `SET` will misparse, a
//! known limit of this fixed-offset walk rather than a general ASN.1 reader.

use super::{byte, bytes, u16_at};
use crate::hex;
use serialize::{Serialize, SerializeStruct, Serializer};

/// One `{oid, value}` pair from an issuer or subject name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rdn {
    pub oid: Vec<u8>,
    pub value: String,
}

/// Wraps a borrowed [`Rdn`] to serialize it as an issuer entry
/// (`issuer_id`/`issuer_string`). The same [`Rdn`] data serializes under
/// different field names depending on whether it came from the issuer or
/// the subject name, so the distinction lives in the wrapper rather than
/// in `Rdn` itself.
pub(crate) struct IssuerRdn<'a>(pub(crate) &'a Rdn);

impl Serialize for IssuerRdn<'_> {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct()?;
        s.serialize_field("issuer_id", &hex::encode(&self.0.oid))?;
        s.serialize_field("issuer_string", &self.0.value)?;
        s.finish()
    }
}

/// Wraps a borrowed [`Rdn`] to serialize it as a subject entry
/// (`subject_id`/`subject_string`). See [`IssuerRdn`].
pub(crate) struct SubjectRdn<'a>(pub(crate) &'a Rdn);

impl Serialize for SubjectRdn<'_> {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct()?;
        s.serialize_field("subject_id", &hex::encode(&self.0.oid))?;
        s.serialize_field("subject_string", &self.0.value)?;
        s.finish()
    }
}

/// Reads an issuer or subject `Name` starting at `pos` (pointing at the
/// outer SEQUENCE's length byte, i.e. one byte before the start of this
/// field) and returns its RDNs plus the cursor position just past where
/// the RDN walk stopped — which is past the whole structure only if
/// neither the cap nor the budget cut the walk short early.
///
/// `pos` itself must point one byte *before* the SEQUENCE length byte
/// (`byte(buf, pos + 1)` reads that length), matching every other offset
/// in this module being relative to the position just after a header.
pub(super) fn parse_name(buf: &[u8], pos: usize, max_rdn: usize) -> Option<(Vec<Rdn>, usize)> {
    let marker = byte(buf, pos + 1)?;
    let (mut budget, mut cursor): (i64, usize) = match marker {
        129 => (byte(buf, pos + 2)? as i64, pos + 5),
        130 => (u16_at(buf, pos + 2)? as i64, pos + 6),
        _ => (marker as i64, pos + 4),
    };

    let mut rdns = Vec::new();
    while budget > 0 && rdns.len() < max_rdn {
        let rdn_seq_len = byte(buf, cursor + 1)? as i64;
        cursor += 2;
        budget -= 2;

        let oid_len = byte(buf, cursor + 1)? as usize;
        let oid = bytes(buf, cursor + 2, oid_len)?.to_vec();

        let value_len = byte(buf, cursor + oid_len + 3)? as usize;
        let value_bytes = bytes(buf, cursor + oid_len + 4, value_len)?;
        let value = String::from_utf8_lossy(value_bytes).into_owned();
        rdns.push(Rdn { oid, value });

        cursor += 2;
        budget -= 2;
        cursor = cursor.checked_add(rdn_seq_len as usize)?;
        budget -= rdn_seq_len;
    }

    Some((rdns, cursor))
}

/// Reads the flat `{length byte, DNS name bytes}*` list inside a
/// subjectAltName extension's GeneralNames SEQUENCE. `pos` points at the
/// first name entry (the SEQUENCE's own tag/length wrapper has already
/// been skipped by the caller); `remaining` bounds how many bytes of
/// GeneralNames content are left to read.
pub(super) fn parse_san(buf: &[u8], pos: usize, mut remaining: i64, max_san: usize) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = pos;
    while remaining > 0 && names.len() < max_san {
        let Some(len) = byte(buf, cursor + 1) else {
            break;
        };
        let len = len as usize;
        let Some(data) = bytes(buf, cursor + 2, len) else {
            break;
        };
        names.push(String::from_utf8_lossy(data).into_owned());
        cursor += len + 2;
        remaining -= (len + 2) as i64;
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_rdn() {
        // Name SEQUENCE: len=13 (short form) at pos+1.
        // RDN SET: len=11. AttributeTypeAndValue SEQUENCE: len=9.
        // OID (len 3): 55 04 03 (commonName). Value (PrintableString, len 2): "ab".
        #[rustfmt::skip]
        let buf: &[u8] = &[
            0x00,       // pos (unused tag placeholder)
            13,         // pos+1: Name SEQUENCE length
            0x31, 11,   // RDN SET: tag, length
            0x30, 9,    // AttributeTypeAndValue SEQUENCE: tag, length
            0x06, 3, 0x55, 0x04, 0x03, // OID TLV
            0x13, 2, b'a', b'b',       // value TLV (PrintableString)
        ];
        let (rdns, _cursor) = parse_name(buf, 0, 19).unwrap();
        assert_eq!(rdns.len(), 1);
        assert_eq!(rdns[0].oid, vec![0x55, 0x04, 0x03]);
        assert_eq!(rdns[0].value, "ab");
    }

    #[test]
    fn san_reads_two_dns_names() {
        let buf: &[u8] = &[0x16, 11, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'.', b'c', b'o', b'm', 0x16, 1, b'x'];
        let names = parse_san(buf, 0, buf.len() as i64, 16);
        assert_eq!(names, vec!["example.com".to_string(), "x".to_string()]);
    }

    #[test]
    fn san_respects_the_cap() {
        let mut buf = Vec::new();
        for _ in 0..20 {
            buf.extend([0x16, 1, b'a']);
        }
        let names = parse_san(&buf, 0, buf.len() as i64, 16);
        assert_eq!(names.len(), 16);
    }
}

//! X.509 certificate-chain parsing.
//!
//! This walks a concatenated buffer of one or more TLS Certificate
//! handshake messages (record-layer headers included, as assembled by
//! [`crate::flow`]) and extracts per-certificate identity metadata. It is
//! not a general ASN.1/BER reader: every field is reached by a fixed byte
//! offset computed from the DER tag/length bytes immediately around it,
//! mirroring exactly how the certificates this crate targets are laid out
//! in practice. A certificate with an unusual structural variant (omitted
//! version field, long-form length on the outer SEQUENCE, more than one
//! attribute per RDN) will misparse or abort rather than being handled
//! generally — a deliberate, documented trade-off, not an oversight.

mod identity;

pub use identity::Rdn;

use serialize::{Serialize, SerializeStruct, Serializer};

use crate::hex;
use crate::limits::Limits;
use crate::reader::u16_be;

/// One non-SAN extension: its OID and raw (unparsed) content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertExtension {
    pub oid: Vec<u8>,
    pub data: Vec<u8>,
}

impl Serialize for CertExtension {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct()?;
        s.serialize_field("ext_id", &hex::encode(&self.oid))?;
        s.serialize_field("ext_data", &hex::encode(&self.data))?;
        s.finish()
    }
}

/// One certificate pulled out of a TLS Certificate handshake message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    pub length: u32,
    pub serial_number: Vec<u8>,
    pub signature: Vec<u8>,
    pub issuer: Vec<Rdn>,
    pub validity_not_before: String,
    pub validity_not_after: String,
    pub subject: Vec<Rdn>,
    pub subject_public_key_algorithm: Vec<u8>,
    pub subject_public_key_size: u32,
    pub extensions: Vec<CertExtension>,
    pub san: Vec<String>,
    pub signature_key_size: u32,
}

fn byte(buf: &[u8], pos: usize) -> Option<u8> {
    buf.get(pos).copied()
}

fn bytes(buf: &[u8], pos: usize, len: usize) -> Option<&[u8]> {
    buf.get(pos..pos.checked_add(len)?)
}

fn u16_at(buf: &[u8], pos: usize) -> Option<u16> {
    u16_be(buf.get(pos..pos.checked_add(2)?)?)
}

fn u24_at(buf: &[u8], pos: usize) -> Option<u32> {
    crate::reader::u24_be(buf.get(pos..pos.checked_add(3)?)?)
}

/// Parses every Certificate handshake message found in `buffer`, re-walking
/// TLS records one at a time (the buffer may hold the ServerHello and other
/// handshake messages that surrounded the certificate chain in the
/// original byte stream — those are skipped, not parsed here).
#[must_use]
pub fn parse(buffer: &[u8], limits: &Limits) -> Vec<Certificate> {
    let mut certificates = Vec::new();
    let mut cursor = 0usize;

    while let Some(record) = bytes(buffer, cursor, 5) {
        let content_type = record[0];
        let Some(record_len) = u16_at(buffer, cursor + 3) else {
            break;
        };
        let record_len = record_len as usize;
        let Some(record_end) = cursor.checked_add(5).and_then(|n| n.checked_add(record_len)) else {
            break;
        };

        if content_type == 22 {
            if let Some(handshake_type) = byte(buffer, cursor + 5) {
                if handshake_type == 11 {
                    let body_start = cursor + 9;
                    let body_end = record_end.min(buffer.len());
                    if body_start <= body_end {
                        let new_certs = parse_certificate_message(&buffer[body_start..body_end], limits);
                        for cert in new_certs {
                            if certificates.len() >= limits.max_certificates {
                                break;
                            }
                            certificates.push(cert);
                        }
                    }
                }
            }
        }

        if certificates.len() >= limits.max_certificates {
            break;
        }
        cursor = record_end;
    }

    certificates
}

/// Parses the body of one Certificate handshake message: a 24-bit
/// `certificates_length` followed by a sequence of length-prefixed DER
/// certificates.
fn parse_certificate_message(body: &[u8], limits: &Limits) -> Vec<Certificate> {
    let mut certificates = Vec::new();
    let Some(total_len) = u24_at(body, 0) else {
        return certificates;
    };

    let mut cursor = 3usize;
    let mut budget = total_len as i64;

    while budget > 0 && certificates.len() < limits.max_certificates {
        let Some(cert_len) = u24_at(body, cursor) else {
            break;
        };
        cursor += 3;
        budget -= 3;

        match parse_one_certificate(body, cursor, cert_len, limits) {
            Some((cert, _consumed)) => certificates.push(cert),
            None => break,
        }

        // `cert_len` is the full DER length (the 14-byte SEQUENCE/version/TBS
        // preamble included), and `cursor` already sits at the first byte of
        // that DER blob, so the next certificate's length prefix is exactly
        // `cert_len` further on - not `14 + cert_len`.
        cursor += cert_len as usize;
        budget -= i64::from(cert_len);
    }

    certificates
}

/// Parses one DER certificate starting right after its own 24-bit length
/// prefix. `cert_start` is the offset of the 14-byte SEQUENCE/Version/TBS
/// preamble; everything below reads relative to the cursor as it advances
/// through the TBSCertificate fields.
fn parse_one_certificate(body: &[u8], cert_start: usize, cert_len: u32, limits: &Limits) -> Option<(Certificate, usize)> {
    let mut cursor = cert_start + 14;

    let serial_len = byte(body, cursor)? as usize;
    let serial_number = bytes(body, cursor + 1, serial_len)?.to_vec();
    cursor += serial_len + 1;
    cursor += 2;

    let sig_oid_len = byte(body, cursor + 1)? as usize;
    cursor += 2;
    let signature = bytes(body, cursor, sig_oid_len)?.to_vec();
    cursor += sig_oid_len;
    cursor += 2;

    let (issuer, cursor_after_issuer) = identity::parse_name(body, cursor, limits.max_rdn)?;
    cursor = cursor_after_issuer;

    let not_before_len = byte(body, cursor + 1)? as usize;
    cursor += 2;
    let validity_not_before = String::from_utf8_lossy(bytes(body, cursor, not_before_len)?).into_owned();
    cursor += not_before_len;

    let not_after_len = byte(body, cursor + 1)? as usize;
    cursor += 2;
    let validity_not_after = String::from_utf8_lossy(bytes(body, cursor, not_after_len)?).into_owned();
    cursor += not_after_len;

    let (subject, cursor_after_subject) = identity::parse_name(body, cursor, limits.max_rdn)?;
    cursor = cursor_after_subject;

    cursor += if byte(body, cursor + 1)? == 48 { 3 } else { 4 };
    let key_alg_len = byte(body, cursor + 1)? as usize;
    cursor += 2;
    let subject_public_key_algorithm = bytes(body, cursor, key_alg_len)?.to_vec();
    cursor += key_alg_len;
    cursor += 2;

    let subject_public_key_size;
    match byte(body, cursor + 1)? {
        129 => {
            let len = byte(body, cursor + 2)? as i64;
            subject_public_key_size = ((len - 13) * 8).max(0) as u32;
            cursor += len as usize + 3;
        },
        130 => {
            let len = i64::from(u16_at(body, cursor + 2)?);
            subject_public_key_size = ((len - 15) * 8).max(0) as u32;
            cursor += len as usize + 4;
        },
        _ => return None,
    }

    let mut extensions = Vec::new();
    let mut san = Vec::new();
    if byte(body, cursor)? == 0xA3 && byte(body, cursor + 1)? == 0x82 {
        cursor += 5;
        let mut ext_budget: i64 = if byte(body, cursor)? == 130 {
            let len = i64::from(u16_at(body, cursor + 1)?);
            cursor += 3;
            len
        } else {
            let len = byte(body, cursor)? as i64;
            cursor += 2;
            len
        };

        while ext_budget > 0 {
            if extensions.len() >= limits.max_extensions && san.len() >= limits.max_san {
                break;
            }
            let marker = byte(body, cursor + 1)?;
            let entry_len: i64;
            if marker == 130 {
                entry_len = i64::from(u16_at(body, cursor + 2)?);
                cursor += 4;
                ext_budget -= 4;
            } else {
                entry_len = marker as i64;
                cursor += 2;
                ext_budget -= 2;
            }

            let oid_len = byte(body, cursor + 1)? as usize;
            let oid_tail = bytes(body, cursor + 2, oid_len.min(3))?;
            let is_san = oid_len >= 3 && oid_tail[..3] == [0x55, 0x1D, 0x11];

            // `entry_len` already counts the OID TLV plus whatever follows
            // it (SAN payload or raw extension data) - the cursor only
            // needs to advance past that, not past OID TLV *again*.
            if is_san {
                let san_budget = entry_len - oid_len as i64 - 2 - 4;
                let found = identity::parse_san(body, cursor + oid_len + 2 + 4, san_budget, limits.max_san);
                san.extend(found);
            } else if extensions.len() < limits.max_extensions {
                let oid = bytes(body, cursor + 2, oid_len)?.to_vec();
                let data_len = (entry_len - oid_len as i64 - 2).max(0) as usize;
                let data = bytes(body, cursor + oid_len + 2, data_len)?.to_vec();
                extensions.push(CertExtension { oid, data });
            }

            cursor = cursor.checked_add(entry_len as usize)?;
            ext_budget -= entry_len;
        }
    }

    let sig_alg_skip_len = byte(body, cursor + 1)? as usize;
    cursor += sig_alg_skip_len + 2;

    let signature_key_size;
    match byte(body, cursor + 1)? {
        129 => {
            let len = byte(body, cursor + 2)? as i64;
            signature_key_size = ((len - 1) * 8).max(0) as u32;
            cursor += len as usize + 3;
        },
        130 => {
            let len = i64::from(u16_at(body, cursor + 2)?);
            signature_key_size = ((len - 1) * 8).max(0) as u32;
            cursor += len as usize + 4;
        },
        _ => return None,
    }

    let certificate = Certificate {
        length: cert_len,
        serial_number,
        signature,
        issuer,
        validity_not_before,
        validity_not_after,
        subject,
        subject_public_key_algorithm,
        subject_public_key_size,
        extensions,
        san,
        signature_key_size,
    };
    Some((certificate, cursor - cert_start))
}

impl Serialize for Certificate {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct()?;

        s.serialize_field("length", &(self.length as usize))?;
        s.serialize_field("serial_number", &hex::encode(&self.serial_number))?;

        if !self.signature.is_empty() {
            s.serialize_field("signature", &hex::encode(&self.signature))?;
        }
        if self.signature_key_size != 0 {
            s.serialize_field("signature_key_size", &(self.signature_key_size as usize))?;
        }

        if !self.issuer.is_empty() {
            let issuer: Vec<identity::IssuerRdn<'_>> = self.issuer.iter().map(identity::IssuerRdn).collect();
            s.serialize_field("issuer", &issuer)?;
        }

        if !self.validity_not_before.is_empty() {
            s.serialize_field("validity_not_before", &self.validity_not_before)?;
        }
        if !self.validity_not_after.is_empty() {
            s.serialize_field("validity_not_after", &self.validity_not_after)?;
        }

        if !self.subject.is_empty() {
            let subject: Vec<identity::SubjectRdn<'_>> = self.subject.iter().map(identity::SubjectRdn).collect();
            s.serialize_field("subject", &subject)?;
        }

        if !self.subject_public_key_algorithm.is_empty() {
            s.serialize_field("subject_public_key_algorithm", &hex::encode(&self.subject_public_key_algorithm))?;
        }
        if self.subject_public_key_size != 0 {
            s.serialize_field("subject_public_key_size", &(self.subject_public_key_size as usize))?;
        }

        if !self.san.is_empty() {
            s.serialize_field("SAN", &self.san)?;
        }

        if !self.extensions.is_empty() {
            s.serialize_field("extensions", &self.extensions)?;
        }

        s.finish()
    }
}

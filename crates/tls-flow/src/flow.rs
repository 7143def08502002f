//! `TlsInfo`: the per-direction accumulator and TLS record-layer dissector.
//!
//! One `TlsInfo` is created per direction of one flow and fed every
//! contiguous byte run observed on that direction, in arrival order, via
//! [`TlsInfo::feed`]. It owns every capped collection named in the data
//! model and the certificate-assembly scratch buffer; nothing here blocks,
//! allocates across threads, or holds a lock — a `TlsInfo` is confined to
//! whichever worker the embedding harness assigns its flow to.

use crate::certificate::{self, Certificate};
use crate::hello::{ClientHello, ServerHello};
use crate::limits::Limits;
use crate::reader;
use crate::record::{ContentType, HandshakeType, RecordMeta, Timestamp, Version};
use crate::Extension;

/// Certificate-assembly state (spec §4.3's per-`TlsInfo` state machine).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Assembly {
    Idle,
    Collecting,
}

/// The per-direction accumulator driven by one side of a flow.
///
/// Every variable-length field is a freshly owned buffer; [`TlsInfo::release`]
/// drops them all in one structural traversal (Rust's ordinary `Drop`
/// already does this — `release` exists to make that moment explicit and
/// idempotent for an embedding harness that tracks flow lifecycle itself).
#[derive(Clone, Debug)]
pub struct TlsInfo {
    limits: Limits,
    version: Version,
    random: [u8; 32],
    session_id: Vec<u8>,
    ciphersuites: Vec<u16>,
    sent_client_hello: bool,
    client_key_length: u32,
    extensions: Vec<Extension>,
    server_extensions: Vec<Extension>,
    records: Vec<RecordMeta>,
    record_count: u64,
    certificates: Vec<Certificate>,
    cert_buffer: Vec<u8>,
    assembling: Assembly,
}

impl TlsInfo {
    /// Creates an empty accumulator (`tls_init`). Nothing is allocated
    /// beyond the empty `Vec`s' headers until bytes actually arrive.
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        log::trace!("initializing a new flow-direction accumulator");
        Self {
            limits,
            version: Version::Unknown,
            random: [0; 32],
            session_id: Vec::new(),
            ciphersuites: Vec::new(),
            sent_client_hello: false,
            client_key_length: 0,
            extensions: Vec::new(),
            server_extensions: Vec::new(),
            records: Vec::new(),
            record_count: 0,
            certificates: Vec::new(),
            cert_buffer: Vec::new(),
            assembling: Assembly::Idle,
        }
    }

    /// Creates an empty accumulator using [`Limits::default`].
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Limits::default())
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    #[must_use]
    pub fn random(&self) -> [u8; 32] {
        self.random
    }

    #[must_use]
    pub fn session_id(&self) -> &[u8] {
        &self.session_id
    }

    #[must_use]
    pub fn ciphersuites(&self) -> &[u16] {
        &self.ciphersuites
    }

    /// Whether this direction has ever parsed a ClientHello, independent
    /// of how many ciphersuites it offered. The structured report doesn't
    /// use this directly — it follows the original's own "ciphersuite
    /// count" heuristic for `cs` vs. `scs` — but an embedding harness may
    /// want to distinguish "sent exactly one ciphersuite in a ClientHello"
    /// from "this is a ServerHello's selected cipher".
    #[must_use]
    pub fn sent_client_hello(&self) -> bool {
        self.sent_client_hello
    }

    #[must_use]
    pub fn client_key_length(&self) -> u32 {
        self.client_key_length
    }

    #[must_use]
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    #[must_use]
    pub fn server_extensions(&self) -> &[Extension] {
        &self.server_extensions
    }

    #[must_use]
    pub fn records(&self) -> &[RecordMeta] {
        &self.records
    }

    #[must_use]
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    #[must_use]
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Releases every owned buffer, returning the accumulator to the
    /// state [`TlsInfo::new`] would have produced. Idempotent: calling
    /// this twice in a row is a no-op the second time.
    pub fn release(&mut self) {
        log::trace!("releasing a flow-direction accumulator");
        let limits = self.limits;
        *self = Self::new(limits);
    }

    /// Dissects one contiguous, record-boundary-aligned byte run observed
    /// on this direction at `timestamp`. Malformed input aborts the walk
    /// for *this call* — bytes already captured from earlier calls (and
    /// from already-processed records within this call) are untouched.
    pub fn feed(&mut self, timestamp: Timestamp, bytes: &[u8]) {
        if crate::record::is_sslv2_client_hello(bytes) {
            log::trace!("detected an SSLv2 ClientHello; recording the version and stopping");
            self.version = Version::Sslv2;
            return;
        }

        let mut offset = 0usize;

        while let Some(header) = bytes.get(offset..offset + 5) {
            let content_type_byte = header[0];
            let major = header[1];
            let minor = header[2];
            let Some(length) = reader::u16_be(&header[3..5]) else {
                break;
            };
            let length = length as usize;

            let Some(record_end) = offset
                .checked_add(5)
                .and_then(|body_start| body_start.checked_add(length))
            else {
                break;
            };
            if record_end > bytes.len() {
                // Truncated trailing record: stop cleanly, keep everything
                // captured from records already walked.
                break;
            }
            let body = &bytes[offset + 5..record_end];

            let Some(content_type) = ContentType::from_u8(content_type_byte) else {
                break;
            };

            let mut handshake_type_byte = 0u8;

            match content_type {
                ContentType::ApplicationData => {
                    let Some(version) = Version::from_major_minor(major, minor) else {
                        // Not actually TLS: abort the whole walk.
                        break;
                    };
                    self.version = version;
                },
                ContentType::Handshake => {
                    let Some(&hs_type_byte) = body.first() else {
                        break;
                    };
                    let Some(handshake_type) = HandshakeType::from_u8(hs_type_byte) else {
                        break;
                    };
                    let Some(hs_len) = body.get(1..4).and_then(reader::u24_be) else {
                        break;
                    };
                    handshake_type_byte = hs_type_byte;

                    let hs_body_start = 4.min(body.len());
                    let hs_body_end = hs_body_start.saturating_add(hs_len as usize).min(body.len());
                    let hs_body = &body[hs_body_start..hs_body_end];

                    self.dispatch_handshake(handshake_type, hs_len, hs_body);
                },
                ContentType::ChangeCipherSpec | ContentType::Alert => {},
            }

            self.update_certificate_assembly(content_type, handshake_type_byte, &bytes[offset..record_end]);
            self.push_record(content_type_byte, handshake_type_byte, length as u16, timestamp);

            offset = record_end;
        }
    }

    fn dispatch_handshake(&mut self, handshake_type: HandshakeType, handshake_length: u32, body: &[u8]) {
        match handshake_type {
            HandshakeType::ClientHello => {
                if let Some(hello) = ClientHello::parse(body, &self.limits) {
                    self.version = hello.version;
                    self.random = hello.random;
                    if !hello.session_id.is_empty() {
                        self.session_id = hello.session_id;
                    }
                    self.ciphersuites = hello.ciphersuites;
                    self.extensions = hello.extensions;
                    self.sent_client_hello = true;
                }
            },
            HandshakeType::ServerHello => {
                if let Some(hello) = ServerHello::parse(body, &self.limits) {
                    self.version = hello.version;
                    self.random = hello.random;
                    if !hello.session_id.is_empty() {
                        self.session_id = hello.session_id;
                    }
                    self.ciphersuites = vec![hello.selected_cipher];
                    self.server_extensions = hello.extensions;
                }
            },
            HandshakeType::ClientKeyExchange => {
                if self.client_key_length == 0 {
                    let bits = handshake_length.saturating_mul(8);
                    self.client_key_length = if bits > self.limits.max_client_key_length_bits { 0 } else { bits };
                }
            },
            HandshakeType::HelloRequest
            | HandshakeType::Certificate
            | HandshakeType::ServerKeyExchange
            | HandshakeType::CertificateRequest
            | HandshakeType::ServerHelloDone
            | HandshakeType::CertificateVerify
            | HandshakeType::Finished => {},
        }
    }

    /// Drives the certificate-assembly state machine (spec §4.3) and, on
    /// whichever transition flushes the buffer, hands it to the
    /// certificate parser.
    fn update_certificate_assembly(&mut self, content_type: ContentType, handshake_type_byte: u8, record_bytes: &[u8]) {
        match self.assembling {
            Assembly::Idle => {
                if content_type == ContentType::Handshake && handshake_type_byte == HandshakeType::ServerHello.as_u8() {
                    log::debug!("starting certificate assembly after ServerHello");
                    self.cert_buffer.clear();
                    self.append_to_cert_buffer(record_bytes);
                    self.assembling = Assembly::Collecting;
                }
            },
            Assembly::Collecting => {
                self.append_to_cert_buffer(record_bytes);
            },
        }

        if self.assembling != Assembly::Collecting {
            return;
        }

        let terminator = content_type == ContentType::ApplicationData
            || self.cert_buffer.len() >= self.limits.certificate_assembly_flush_threshold
            || handshake_type_byte == HandshakeType::ServerHelloDone.as_u8();

        if terminator {
            log::debug!(
                "flushing certificate assembly buffer ({} bytes collected)",
                self.cert_buffer.len()
            );
            let parsed = certificate::parse(&self.cert_buffer, &self.limits);
            for cert in parsed {
                if self.certificates.len() >= self.limits.max_certificates {
                    break;
                }
                self.certificates.push(cert);
            }
            self.cert_buffer.clear();
            self.assembling = Assembly::Idle;
        }
    }

    fn append_to_cert_buffer(&mut self, bytes: &[u8]) {
        let remaining = self.limits.max_certificate_buffer.saturating_sub(self.cert_buffer.len());
        if remaining == 0 {
            return;
        }
        let take = bytes.len().min(remaining);
        self.cert_buffer.extend_from_slice(&bytes[..take]);
    }

    fn push_record(&mut self, content_type: u8, handshake_type: u8, length: u16, timestamp: Timestamp) {
        if self.records.len() < self.limits.max_records {
            self.records.push(RecordMeta {
                content_type,
                handshake_type,
                length,
                timestamp,
            });
        }
        self.record_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_hello_record() -> Vec<u8> {
        let mut body = vec![0x03, 0x03];
        body.extend(0u8..32);
        body.push(0x00);
        body.extend([0x00, 0x04, 0xc0, 0x2b, 0xc0, 0x2c]);
        body.extend([0x01, 0x00]);
        body.extend([0x00, 0x00]);

        let mut handshake = vec![1]; // ClientHello
        handshake.extend(&(body.len() as u32).to_be_bytes()[1..]);
        handshake.extend(body);

        let mut record = vec![22, 3, 3];
        record.extend((handshake.len() as u16).to_be_bytes());
        record.extend(handshake);
        record
    }

    #[test]
    fn s1_feed_records_client_hello() {
        let mut info = TlsInfo::with_defaults();
        info.feed(0, &client_hello_record());

        assert_eq!(info.version(), Version::Tls1_2);
        assert_eq!(info.ciphersuites(), &[0xc02b, 0xc02c]);
        assert_eq!(info.record_count(), 1);
        assert_eq!(info.records().len(), 1);
        assert!(info.sent_client_hello());
    }

    #[test]
    fn s4_truncated_ciphersuites_len_records_nothing_and_does_not_panic() {
        let mut body = vec![0x03, 0x03];
        body.extend([0u8; 32]);
        body.push(0x00);
        body.extend([0x00, 0x04, 0xc0, 0x2b, 0xc0]); // declares 4, supplies 3

        let mut handshake = vec![1];
        handshake.extend(&(body.len() as u32).to_be_bytes()[1..]);
        handshake.extend(body);

        let mut record = vec![22, 3, 3];
        record.extend((handshake.len() as u16).to_be_bytes());
        record.extend(handshake);

        let mut info = TlsInfo::with_defaults();
        info.feed(0, &record);

        assert!(info.ciphersuites().is_empty());
        // The record itself is still well-formed at the TLS layer (valid
        // record header, valid handshake header), so it's still counted.
        assert_eq!(info.record_count(), 1);
    }

    #[test]
    fn unknown_content_type_aborts_the_walk() {
        let good = client_hello_record();
        let mut bogus = vec![99, 3, 3, 0, 1, 0xff];
        let mut buffer = good.clone();
        buffer.append(&mut bogus);
        buffer.extend(client_hello_record());

        let mut info = TlsInfo::with_defaults();
        info.feed(0, &buffer);

        // Only the first, well-formed record before the bogus ContentType
        // is counted; the walk aborts at the unknown type.
        assert_eq!(info.record_count(), 1);
    }

    #[test]
    fn record_count_is_monotone_across_feed_calls() {
        let mut info = TlsInfo::with_defaults();
        info.feed(0, &client_hello_record());
        let after_first = info.record_count();
        info.feed(10, &client_hello_record());
        assert!(info.record_count() >= after_first);
    }

    #[test]
    fn release_then_feed_is_like_a_fresh_accumulator() {
        let mut info = TlsInfo::with_defaults();
        info.feed(0, &client_hello_record());
        info.release();
        info.release(); // idempotent

        assert_eq!(info.version(), Version::Unknown);
        assert_eq!(info.record_count(), 0);
        assert!(info.ciphersuites().is_empty());
    }

    #[test]
    fn client_key_exchange_sets_bit_length_once() {
        let mut handshake = vec![16]; // ClientKeyExchange
        handshake.extend(&32u32.to_be_bytes()[1..]); // 32-byte body -> 256 bits
        handshake.extend(vec![0u8; 32]);

        let mut record = vec![22, 3, 3];
        record.extend((handshake.len() as u16).to_be_bytes());
        record.extend(handshake);

        let mut info = TlsInfo::with_defaults();
        info.feed(0, &record);
        assert_eq!(info.client_key_length(), 256);

        // Fed again: already non-zero, so it must not be overwritten.
        let mut handshake2 = vec![16];
        handshake2.extend(&64u32.to_be_bytes()[1..]);
        handshake2.extend(vec![0u8; 64]);
        let mut record2 = vec![22, 3, 3];
        record2.extend((handshake2.len() as u16).to_be_bytes());
        record2.extend(handshake2);
        info.feed(1, &record2);
        assert_eq!(info.client_key_length(), 256);
    }

    #[test]
    fn s3_sslv2_client_hello_is_detected_and_not_parsed_further() {
        let mut info = TlsInfo::with_defaults();
        info.feed(0, &[0x80, 0x2e, 0x01, 0x03, 0x00]);

        assert_eq!(info.version(), Version::Sslv2);
        assert_eq!(info.record_count(), 0);
        assert!(info.records().is_empty());
    }

    #[test]
    fn absurd_client_key_length_resets_to_unknown() {
        // 1200-byte body -> 9600 bits, well above the 8193-bit cap.
        let mut handshake = vec![16];
        handshake.extend(&1200u32.to_be_bytes()[1..]);
        handshake.extend(vec![0u8; 1200]);

        let mut record = vec![22, 3, 3];
        record.extend((handshake.len() as u16).to_be_bytes());
        record.extend(handshake);

        let mut info = TlsInfo::with_defaults();
        info.feed(0, &record);
        assert_eq!(info.client_key_length(), 0);
    }
}

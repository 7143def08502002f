//! TLS record-layer framing: `ContentType`, `HandshakeType`, and the small
//! per-record metadata this crate actually keeps (everything else about a
//! record is consumed and discarded by the dissector in [`crate::flow`]).

/// Milliseconds, on whatever clock the embedding harness uses to timestamp
/// captured bytes. The core never reads a wall clock itself.
pub type Timestamp = u64;

/// TLS record-layer content types (RFC 5246 §6.2.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    ChangeCipherSpec,
    Alert,
    Handshake,
    ApplicationData,
}

impl ContentType {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            20 => Some(Self::ChangeCipherSpec),
            21 => Some(Self::Alert),
            22 => Some(Self::Handshake),
            23 => Some(Self::ApplicationData),
            other => {
                log::trace!("unrecognized TLS content type {other}");
                None
            },
        }
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::ChangeCipherSpec => 20,
            Self::Alert => 21,
            Self::Handshake => 22,
            Self::ApplicationData => 23,
        }
    }
}

/// Handshake message types accepted by the dissector (RFC 5246 §7.4).
///
/// This is the exact accepted set from the spec's REDESIGN FLAGS note,
/// expressed as a `match` with a default reject arm rather than the
/// original's unlabeled fallthrough `if`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeType {
    HelloRequest,
    ClientHello,
    ServerHello,
    Certificate,
    ServerKeyExchange,
    CertificateRequest,
    ServerHelloDone,
    CertificateVerify,
    ClientKeyExchange,
    Finished,
}

impl HandshakeType {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::HelloRequest),
            1 => Some(Self::ClientHello),
            2 => Some(Self::ServerHello),
            11 => Some(Self::Certificate),
            12 => Some(Self::ServerKeyExchange),
            13 => Some(Self::CertificateRequest),
            14 => Some(Self::ServerHelloDone),
            15 => Some(Self::CertificateVerify),
            16 => Some(Self::ClientKeyExchange),
            20 => Some(Self::Finished),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::HelloRequest => 0,
            Self::ClientHello => 1,
            Self::ServerHello => 2,
            Self::Certificate => 11,
            Self::ServerKeyExchange => 12,
            Self::CertificateRequest => 13,
            Self::ServerHelloDone => 14,
            Self::CertificateVerify => 15,
            Self::ClientKeyExchange => 16,
            Self::Finished => 20,
        }
    }
}

/// TLS protocol versions this crate distinguishes.
///
/// Ordered so that `Version::Unknown` sorts before every real version,
/// which keeps the `version as u8` report encoding (1..=5) trivial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Version {
    #[default]
    Unknown,
    Sslv2,
    Sslv3,
    Tls1_0,
    Tls1_1,
    Tls1_2,
}

impl Version {
    /// Decodes a TLS record-layer `{major, minor}` pair. Only `3.0`..`3.3`
    /// are meaningful TLS versions; anything else is `None` (the caller
    /// decides whether that is a hard error).
    #[must_use]
    pub fn from_major_minor(major: u8, minor: u8) -> Option<Self> {
        match (major, minor) {
            (3, 0) => Some(Self::Sslv3),
            (3, 1) => Some(Self::Tls1_0),
            (3, 2) => Some(Self::Tls1_1),
            (3, 3) => Some(Self::Tls1_2),
            _ => None,
        }
    }

    /// The 1..=5 report encoding (`tls_ov`/`tls_iv`); `None` for `Unknown`,
    /// since the report omits the field entirely in that case.
    #[must_use]
    pub fn report_code(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::Sslv2 => Some(1),
            Self::Sslv3 => Some(2),
            Self::Tls1_0 => Some(3),
            Self::Tls1_1 => Some(4),
            Self::Tls1_2 => Some(5),
        }
    }
}

/// One retained `{content_type, handshake_type, length, timestamp}` entry.
///
/// `handshake_type` is `0` for non-Handshake content types, mirroring the
/// "not applicable" convention the report's `tp` field relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordMeta {
    pub content_type: u8,
    pub handshake_type: u8,
    pub length: u16,
    pub timestamp: Timestamp,
}

/// Detects (but does not parse) an SSLv2 ClientHello.
///
/// An SSLv2 record has no TLS content-type byte; instead byte 0 has its
/// high bit set (marking a two-byte record-length field) and, once the
/// length is masked out, the embedded message type at byte 2 is `0x01`
/// (client-hello). `decoded length` here is the 15-bit length recovered
/// from bytes 0-1 with the high bit cleared.
#[must_use]
pub fn is_sslv2_client_hello(bytes: &[u8]) -> bool {
    let Some(&first) = bytes.first() else {
        return false;
    };
    if first & 0x80 == 0 {
        return false;
    }
    let Some(length_bytes) = bytes.get(0..2) else {
        return false;
    };
    let decoded_length = (u16::from_be_bytes([length_bytes[0], length_bytes[1]]) & 0x7fff) as usize;
    if decoded_length <= 9 {
        return false;
    }
    bytes.get(2) == Some(&0x01)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_round_trips() {
        for byte in [20u8, 21, 22, 23] {
            assert_eq!(ContentType::from_u8(byte).unwrap().as_u8(), byte);
        }
        assert_eq!(ContentType::from_u8(99), None);
    }

    #[test]
    fn handshake_type_accepts_exactly_the_documented_set() {
        let accepted = [0u8, 1, 2, 11, 12, 13, 14, 15, 16, 20];
        for byte in accepted {
            assert_eq!(HandshakeType::from_u8(byte).unwrap().as_u8(), byte);
        }
        for byte in [3u8, 17, 18, 19, 21, 255] {
            assert_eq!(HandshakeType::from_u8(byte), None);
        }
    }

    #[test]
    fn s3_sslv2_detection() {
        // 80 2e 01 03 00 - high bit set, decoded length 0x2e (46) > 9, byte 2 == 0x01
        assert!(is_sslv2_client_hello(&[0x80, 0x2e, 0x01, 0x03, 0x00]));
    }

    #[test]
    fn sslv2_detection_rejects_short_or_mistyped_input() {
        assert!(!is_sslv2_client_hello(&[0x00, 0x2e, 0x01]));
        assert!(!is_sslv2_client_hello(&[0x80, 0x00, 0x01]));
        assert!(!is_sslv2_client_hello(&[0x80, 0x2e, 0x02]));
        assert!(!is_sslv2_client_hello(&[]));
    }
}

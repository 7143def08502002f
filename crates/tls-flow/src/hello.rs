//! ClientHello and ServerHello parsing.
//!
//! Both message types share a preamble — protocol version, 32-byte random,
//! session id — so they're parsed by the same small pipeline here and then
//! diverge only in how they carry ciphersuites (a full offered list for
//! ClientHello, a single selected entry for ServerHello) and in the bound
//! applied to extensions.

use crate::{limits::Limits, record::Version, Extension};

/// Everything pulled out of a ClientHello handshake body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientHello {
    pub version: Version,
    pub random: [u8; 32],
    pub session_id: Vec<u8>,
    pub ciphersuites: Vec<u16>,
    pub extensions: Vec<Extension>,
}

/// Everything pulled out of a ServerHello handshake body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerHello {
    pub version: Version,
    pub random: [u8; 32],
    pub session_id: Vec<u8>,
    pub selected_cipher: u16,
    pub extensions: Vec<Extension>,
}

/// Reads the `{major, minor}` + 32-byte random + session-id preamble common
/// to both Hello messages. Returns `(version, random, session_id, rest)`.
///
/// `session_id` is captured only when it fits within `limits.max_session_id`
/// (a malformed or non-conforming declared length just yields an empty
/// session id rather than failing the whole Hello, matching how a truncated
/// non-essential field is handled elsewhere in this parser).
fn read_preamble(body: &[u8], limits: &Limits) -> Option<(Version, [u8; 32], Vec<u8>, &[u8])> {
    let major = *body.first()?;
    let minor = *body.get(1)?;
    // VersionMajor must be 3; VersionMinor above 3 (TLS 1.2) is rejected.
    if major != 3 || minor > 3 {
        return None;
    }
    let version = Version::from_major_minor(major, minor)?;

    let random: [u8; 32] = body.get(2..34)?.try_into().ok()?;

    let session_id_len = *body.get(34)? as usize;
    // The bytes that must remain after the session id (ciphersuite length
    // field, or the selected-cipher-plus-compression pair) are re-checked
    // by each caller, so here we only require the session id itself to fit.
    let rest = body.get(35..)?;
    if rest.len() < session_id_len {
        return None;
    }
    let (session_id, rest) = rest.split_at(session_id_len);
    let session_id = if session_id_len <= limits.max_session_id {
        session_id.to_vec()
    } else {
        Vec::new()
    };

    Some((version, random, session_id, rest))
}

/// Parses a 2-byte-length-prefixed `{type, length, data}` extension vector,
/// appending to `extensions` while input remains. `max_len` is `None` for
/// the client side (no per-extension cap) and `Some(64)` for the server
/// side (a defensive bound with no client-side counterpart); a violating
/// entry stops the loop but keeps everything already collected.
fn read_extensions(mut rest: &[u8], max_len: Option<usize>) -> Vec<Extension> {
    let mut extensions = Vec::new();

    let Some(len_bytes) = rest.get(0..2) else {
        return extensions;
    };
    let Some(extensions_len) = crate::reader::u16_be(len_bytes) else {
        return extensions;
    };
    rest = &rest[2..];
    let Some(mut body) = rest.get(..extensions_len as usize) else {
        return extensions;
    };

    while body.len() >= 4 {
        let Some(ext_type) = crate::reader::u16_be(&body[0..2]) else {
            break;
        };
        let Some(ext_len) = crate::reader::u16_be(&body[2..4]) else {
            break;
        };
        let ext_len = ext_len as usize;

        if let Some(max) = max_len {
            if ext_len > max {
                break;
            }
        }

        let Some(data) = body.get(4..4 + ext_len) else {
            break;
        };

        extensions.push(Extension {
            extension_type: ext_type,
            data: data.to_vec(),
        });

        body = &body[4 + ext_len..];
    }

    extensions
}

impl ClientHello {
    /// Parses a ClientHello handshake body.
    #[must_use]
    pub fn parse(body: &[u8], limits: &Limits) -> Option<Self> {
        let (version, random, session_id, rest) = read_preamble(body, limits)?;

        let ciphersuites_len = crate::reader::u16_be(rest.get(0..2)?)? as usize;
        let cs_bytes = rest.get(2..2 + ciphersuites_len)?;
        let mut ciphersuites = Vec::new();
        for pair in cs_bytes.chunks_exact(2) {
            if ciphersuites.len() >= limits.max_ciphersuites {
                break;
            }
            ciphersuites.push(crate::reader::u16_be(pair)?);
        }

        let after_cs = &rest[2 + ciphersuites_len..];
        // 1-byte compression-methods vector length + that many bytes.
        let compression_len = *after_cs.first()? as usize;
        let after_compression = after_cs.get(1 + compression_len..)?;

        let extensions = read_extensions(after_compression, None);

        Some(Self {
            version,
            random,
            session_id,
            ciphersuites,
            extensions,
        })
    }
}

impl ServerHello {
    /// Parses a ServerHello handshake body.
    #[must_use]
    pub fn parse(body: &[u8], limits: &Limits) -> Option<Self> {
        let (version, random, session_id, rest) = read_preamble(body, limits)?;

        let selected_cipher = crate::reader::u16_be(rest.get(0..2)?)?;
        let after_cipher = rest.get(2..)?;

        // 1-byte compression method.
        let after_compression = after_cipher.get(1..)?;

        // Server extensions are only parsed for TLS 1.2 (VersionMinor == 3);
        // the ClientHello path above accepts minor versions up to 3. This
        // asymmetry is preserved intentionally (see DESIGN.md).
        let extensions = if version == Version::Tls1_2 {
            read_extensions(after_compression, Some(limits.max_server_extension_len))
        } else {
            Vec::new()
        };

        Some(Self {
            version,
            random,
            session_id,
            selected_cipher,
            extensions,
        })
    }
}

//! Every hard bound named in the data model, gathered into one value so an
//! embedding harness can retune the module for its deployment instead of
//! forking the crate to change a constant.
//!
//! `Limits::default()` reproduces the numeric defaults from the spec
//! exactly; nothing about parsing *behavior* changes by using a [`Limits`]
//! value instead of a `const` — only where the bound lives.

/// Static bounds enforced while accumulating a single flow direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of ciphersuite codes retained.
    pub max_ciphersuites: usize,
    /// Maximum number of `{content_type, handshake_type, length,
    /// timestamp}` record summaries retained per direction.
    pub max_records: usize,
    /// Maximum number of certificates retained per direction.
    pub max_certificates: usize,
    /// Capacity of the scratch buffer used to assemble a fragmented
    /// Certificate handshake message.
    pub max_certificate_buffer: usize,
    /// Byte offset into `cert_buffer` at which assembly is force-flushed
    /// even without a ServerHelloDone.
    pub certificate_assembly_flush_threshold: usize,
    /// Maximum number of RDN entries retained per issuer/subject.
    pub max_rdn: usize,
    /// Maximum number of extension entries retained per certificate.
    pub max_extensions: usize,
    /// Maximum number of Subject Alternative Name strings retained.
    pub max_san: usize,
    /// Maximum session id length, in bytes.
    pub max_session_id: usize,
    /// A `client_key_length` above this many bits is treated as bogus and
    /// reset to "unknown" (0).
    pub max_client_key_length_bits: u32,
    /// A server-selected extension whose declared length exceeds this many
    /// bytes is rejected (a defensive bound with no client-side
    /// counterpart).
    pub max_server_extension_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_ciphersuites: 256,
            max_records: 200,
            max_certificates: 8,
            max_certificate_buffer: 16 * 1024,
            certificate_assembly_flush_threshold: 4000,
            max_rdn: 19,
            max_extensions: 16,
            max_san: 16,
            max_session_id: 32,
            max_client_key_length_bits: 8193,
            max_server_extension_len: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_bounds() {
        let limits = Limits::default();
        assert_eq!(limits.max_ciphersuites, 256);
        assert_eq!(limits.max_records, 200);
        assert_eq!(limits.max_certificates, 8);
        assert_eq!(limits.max_certificate_buffer, 16384);
        assert_eq!(limits.max_rdn, 19);
        assert_eq!(limits.max_extensions, 16);
        assert_eq!(limits.max_san, 16);
    }
}

//! Passive TLS handshake metadata extraction.
//!
//! This crate watches one already-reassembled, byte-oriented TLS record
//! stream per direction of a connection and extracts the cryptographic and
//! identity metadata exchanged during the handshake: offered and selected
//! ciphersuites, extensions, the session id and random nonce, the server's
//! certificate chain, and a coarse record-length/timing trace. It never
//! decrypts, validates, or modifies anything it sees — packet capture, flow
//! keying, and file I/O all live in the embedding harness.
//!
//! The pieces, leaves first:
//! - [`reader`]: primitive, panic-free byte decoding.
//! - [`limits`]: the bounds every capped collection in this crate enforces.
//! - [`record`]: TLS record/handshake-type constants and version handling.
//! - [`hello`]: ClientHello/ServerHello body parsing.
//! - [`certificate`]: the X.509 certificate-chain parser.
//! - [`flow`]: [`flow::TlsInfo`], the per-direction accumulator and record
//!   dissector — the thing an embedding harness actually drives.
//! - [`report`]: pairs two [`flow::TlsInfo`] values into a [`report::Report`].

pub mod certificate;
pub mod flow;
pub mod hello;
pub(crate) mod hex;
pub mod limits;
pub mod reader;
pub mod record;
pub mod report;

pub use flow::TlsInfo;
pub use limits::Limits;
pub use record::{ContentType, HandshakeType, RecordMeta, Timestamp, Version};
pub use report::Report;

/// One `{type, data}` entry from a Hello's extensions vector.
///
/// Used for both the client-offered list (`extensions`, uncapped per entry)
/// and the server-selected list (`server_extensions`, each entry capped at
/// `Limits::max_server_extension_len`) — the two differ only in which cap
/// the caller applies while reading them, not in shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    pub extension_type: u16,
    pub data: Vec<u8>,
}

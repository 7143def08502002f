//! Pairs two [`TlsInfo`] accumulators — one per direction of a flow — into
//! a single structured [`Report`], matching the field names of the
//! original per-flow TLS fingerprinting export this crate reimplements.
//!
//! A [`Report`] owns everything it serializes: once built it no longer
//! borrows from the `TlsInfo` values that produced it, so it can outlive a
//! `release()`'d flow on its way to a JSON sink.

use serialize::{Serialize, SerializeStruct, Serializer};

use crate::certificate::Certificate;
use crate::hex;
use crate::record::{RecordMeta, Timestamp};
use crate::{Extension, TlsInfo, Version};

/// Which side of the pair a [`RecordStreamEntry`] came from.
///
/// Follows the original's own (slightly counter-intuitive) convention:
/// entries contributed by the `out` accumulator are tagged `In`, and
/// entries from `in_` are tagged `Out`. This crate's `out`/`in_` naming
/// refers to which [`TlsInfo`] is "this side" vs. "its twin" when calling
/// [`Report::build`], not the wire direction the tag implies — preserved
/// for compatibility with existing consumers of this report shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Serialize for Direction {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
        .serialize_to(serializer)
    }
}

/// One entry of the interleaved record-length/timing trace (`srlt`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordStreamEntry {
    pub bytes: u16,
    pub direction: Direction,
    pub delta_ms: u64,
    pub content_type: u8,
    pub handshake_type: u8,
}

impl Serialize for RecordStreamEntry {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct()?;
        s.serialize_field("b", &usize::from(self.bytes))?;
        s.serialize_field("dir", &self.direction)?;
        s.serialize_field("ipt", &self.delta_ms)?;
        s.serialize_field("tp", &format!("{}:{}", self.content_type, self.handshake_type))?;
        s.finish()
    }
}

/// Merges two time-ordered record-metadata sequences into one
/// timestamp-ordered stream (spec §4.4).
///
/// `twin` distinguishes "the other side is absent" (`None`, every entry
/// from `primary` is tagged `Out`) from "the other side is present but has
/// no records of its own" (`Some(&[])`, entries from `primary` are tagged
/// `In` as usual since the dual-merge algorithm still applies, it just
/// never picks from an empty list).
fn interleave(primary: &[RecordMeta], twin: Option<&[RecordMeta]>) -> Vec<RecordStreamEntry> {
    let Some(twin) = twin else {
        return unidirectional(primary);
    };

    let mut entries = Vec::with_capacity(primary.len() + twin.len());
    let (mut i, mut j) = (0usize, 0usize);
    let mut last_timestamp: Option<Timestamp> = None;

    while i < primary.len() || j < twin.len() {
        let take_primary = if i >= primary.len() {
            false
        } else if j >= twin.len() {
            true
        } else {
            // Ties favor `primary` (spec §4.4: "when timestamps are equal,
            // the `a` side is emitted first").
            primary[i].timestamp <= twin[j].timestamp
        };

        let (record, direction) = if take_primary {
            let record = primary[i];
            i += 1;
            (record, Direction::In)
        } else {
            let record = twin[j];
            j += 1;
            (record, Direction::Out)
        };

        entries.push(next_entry(record, direction, &mut last_timestamp));
    }

    entries
}

/// The degenerate single-sequence merge used when the other side is
/// entirely absent: every entry is tagged `Out` (spec §4.4).
fn unidirectional(records: &[RecordMeta]) -> Vec<RecordStreamEntry> {
    let mut last_timestamp = None;
    records
        .iter()
        .map(|record| next_entry(*record, Direction::Out, &mut last_timestamp))
        .collect()
}

fn next_entry(record: RecordMeta, direction: Direction, last_timestamp: &mut Option<Timestamp>) -> RecordStreamEntry {
    let delta_ms = match *last_timestamp {
        None => 0,
        Some(previous) => record.timestamp.saturating_sub(previous),
    };
    *last_timestamp = Some(record.timestamp);

    RecordStreamEntry {
        bytes: record.length,
        direction,
        delta_ms,
        content_type: record.content_type,
        handshake_type: record.handshake_type,
    }
}

/// One side's contribution to a [`Report`]: everything pulled out of a
/// single [`TlsInfo`], detached from it so the report can outlive a
/// released flow.
#[derive(Clone, Debug, Default)]
struct Side {
    version: Option<Version>,
    client_key_length: u32,
    random: Option<[u8; 32]>,
    session_id: Vec<u8>,
    ciphersuites: Vec<u16>,
    extensions: Vec<Extension>,
    server_extensions: Vec<Extension>,
    certificates: Vec<Certificate>,
}

impl Side {
    fn from_info(info: &TlsInfo) -> Self {
        // The original gates the random nonce (and the cs/scs choice) on
        // "did we see a Hello at all", using ciphersuite count as the
        // proxy for that question rather than tracking it separately.
        let saw_a_hello = !info.ciphersuites().is_empty();
        Self {
            version: (info.version() != Version::Unknown).then_some(info.version()),
            client_key_length: info.client_key_length(),
            random: saw_a_hello.then_some(info.random()),
            session_id: info.session_id().to_vec(),
            ciphersuites: info.ciphersuites().to_vec(),
            extensions: info.extensions().to_vec(),
            server_extensions: info.server_extensions().to_vec(),
            certificates: info.certificates().to_vec(),
        }
    }
}

/// A bidirectional TLS handshake summary, built from up to two
/// [`TlsInfo`] accumulators (spec §6's egress API, `tls_emit`).
#[derive(Clone, Debug)]
pub struct Report {
    out: Side,
    in_: Side,
    record_stream: Vec<RecordStreamEntry>,
}

impl Report {
    /// Builds a report from a flow's two directions. Returns `None` if
    /// neither side ever observed a TLS version — the original's own
    /// "no reliable TLS information" early-out.
    #[must_use]
    pub fn build(out: Option<&TlsInfo>, in_: Option<&TlsInfo>) -> Option<Self> {
        let out_side = out.map(Side::from_info).unwrap_or_default();
        let in_side = in_.map(Side::from_info).unwrap_or_default();

        if out_side.version.is_none() && in_side.version.is_none() {
            return None;
        }

        let primary_records: &[RecordMeta] = out.map(TlsInfo::records).unwrap_or(&[]);
        let twin_records = in_.map(TlsInfo::records);
        let record_stream = interleave(primary_records, twin_records);

        Some(Self {
            out: out_side,
            in_: in_side,
            record_stream,
        })
    }

    /// Renders this report as the `{"tls": {...}}` JSON object described
    /// in the structured-report section of the spec.
    #[must_use]
    pub fn to_json(&self) -> String {
        let inner = serialize_json::JsonSerializer::serialize_to_string(self).unwrap_or_default();
        format!("{{\"tls\":{inner}}}")
    }
}

impl Serialize for Extension {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct()?;
        s.serialize_field("type", &hex::encode(&self.extension_type.to_be_bytes()))?;
        s.serialize_field("length", &self.data.len())?;
        s.serialize_field("data", &hex::encode(&self.data))?;
        s.finish()
    }
}

impl Serialize for Report {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct()?;

        if let Some(code) = self.out.version.and_then(Version::report_code) {
            s.serialize_field("tls_ov", &usize::from(code))?;
        }
        if let Some(code) = self.in_.version.and_then(Version::report_code) {
            s.serialize_field("tls_iv", &usize::from(code))?;
        }

        if self.out.client_key_length != 0 {
            s.serialize_field("tls_client_key_length", &self.out.client_key_length)?;
        }
        if self.in_.client_key_length != 0 {
            s.serialize_field("tls_client_key_length", &self.in_.client_key_length)?;
        }

        if let Some(random) = self.out.random {
            s.serialize_field("tls_orandom", &hex::encode(&random))?;
        }
        if let Some(random) = self.in_.random {
            s.serialize_field("tls_irandom", &hex::encode(&random))?;
        }

        if !self.out.session_id.is_empty() {
            s.serialize_field("tls_osid", &hex::encode(&self.out.session_id))?;
        }
        if !self.in_.session_id.is_empty() {
            s.serialize_field("tls_isid", &hex::encode(&self.in_.session_id))?;
        }

        // `scs` (a single selected cipher, hex) if a side reported exactly
        // one ciphersuite, else `cs` (an array of hex strings). Both sides
        // use the same two field names — if both report ciphersuites, both
        // fields appear twice in the emitted object, matching the
        // original's own per-side (not per-field) gating; see DESIGN.md.
        match self.out.ciphersuites.as_slice() {
            [] => {},
            [single] => s.serialize_field("scs", &hex::encode(&single.to_be_bytes()))?,
            many => {
                let as_hex: Vec<String> = many.iter().map(|cs| hex::encode(&cs.to_be_bytes())).collect();
                s.serialize_field("cs", &as_hex)?;
            },
        }
        match self.in_.ciphersuites.as_slice() {
            [] => {},
            [single] => s.serialize_field("scs", &hex::encode(&single.to_be_bytes()))?,
            many => {
                let as_hex: Vec<String> = many.iter().map(|cs| hex::encode(&cs.to_be_bytes())).collect();
                s.serialize_field("cs", &as_hex)?;
            },
        }

        if !self.out.extensions.is_empty() {
            s.serialize_field("tls_ext", &self.out.extensions)?;
        }
        if !self.in_.extensions.is_empty() {
            s.serialize_field("tls_ext", &self.in_.extensions)?;
        }

        if !self.out.server_extensions.is_empty() {
            s.serialize_field("s_tls_ext", &self.out.server_extensions)?;
        }
        if !self.in_.server_extensions.is_empty() {
            s.serialize_field("s_tls_ext", &self.in_.server_extensions)?;
        }

        if !self.out.certificates.is_empty() {
            s.serialize_field("server_cert", &self.out.certificates)?;
        }
        if !self.in_.certificates.is_empty() {
            s.serialize_field("server_cert", &self.in_.certificates)?;
        }

        if !self.record_stream.is_empty() {
            s.serialize_field("srlt", &self.record_stream)?;
        }

        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;

    fn fed(records: &[(u8, u8, u16, Timestamp)]) -> TlsInfo {
        // Builds a `TlsInfo` with exactly the given `RecordMeta` entries
        // by feeding synthetic ChangeCipherSpec records (content type 20,
        // no handshake parsing) at the requested timestamps/lengths, then
        // overwriting `handshake_type`/`content_type` is unnecessary since
        // ChangeCipherSpec records already report handshake_type 0 and the
        // content type we feed.
        let mut info = TlsInfo::new(Limits::default());
        for &(content_type, _handshake_type, length, timestamp) in records {
            let mut record = vec![content_type, 3, 3];
            record.extend(length.to_be_bytes());
            record.extend(vec![0u8; length as usize]);
            info.feed(timestamp, &record);
        }
        info
    }

    #[test]
    fn no_version_on_either_side_yields_no_report() {
        let info = TlsInfo::with_defaults();
        assert!(Report::build(Some(&info), Some(&info)).is_none());
    }

    #[test]
    fn s6_bidirectional_interleave_matches_the_documented_deltas() {
        // a = out = [(100, t=0), (200, t=5)], b = in_ = [(150, t=3)].
        let a_records = vec![
            RecordMeta {
                content_type: 20,
                handshake_type: 0,
                length: 100,
                timestamp: 0,
            },
            RecordMeta {
                content_type: 20,
                handshake_type: 0,
                length: 200,
                timestamp: 5,
            },
        ];
        let b_records = vec![RecordMeta {
            content_type: 20,
            handshake_type: 0,
            length: 150,
            timestamp: 3,
        }];

        let merged = interleave(&a_records, Some(&b_records));
        let deltas: Vec<u64> = merged.iter().map(|e| e.delta_ms).collect();
        let directions: Vec<Direction> = merged.iter().map(|e| e.direction).collect();
        let bytes: Vec<u16> = merged.iter().map(|e| e.bytes).collect();

        assert_eq!(deltas, vec![0, 3, 2]);
        assert_eq!(directions, vec![Direction::In, Direction::Out, Direction::In]);
        assert_eq!(bytes, vec![100, 150, 200]);
    }

    #[test]
    fn interleave_law_deltas_sum_to_the_full_span() {
        let a_records = vec![
            RecordMeta {
                content_type: 20,
                handshake_type: 0,
                length: 10,
                timestamp: 2,
            },
            RecordMeta {
                content_type: 20,
                handshake_type: 0,
                length: 20,
                timestamp: 9,
            },
        ];
        let b_records = vec![
            RecordMeta {
                content_type: 20,
                handshake_type: 0,
                length: 30,
                timestamp: 0,
            },
            RecordMeta {
                content_type: 20,
                handshake_type: 0,
                length: 40,
                timestamp: 15,
            },
        ];

        let merged = interleave(&a_records, Some(&b_records));
        let total: u64 = merged.iter().map(|e| e.delta_ms).sum();
        assert_eq!(total, 15 - 0);

        // Also timestamp-sorted by construction.
        let mut reconstructed = 0u64;
        for (idx, entry) in merged.iter().enumerate() {
            reconstructed += entry.delta_ms;
            if idx == merged.len() - 1 {
                assert_eq!(reconstructed, 15);
            }
        }
    }

    #[test]
    fn absent_twin_marks_every_entry_out() {
        let solo = fed(&[(20, 0, 10, 0), (20, 0, 20, 5)]);

        let merged = interleave(solo.records(), None);
        assert!(merged.iter().all(|e| e.direction == Direction::Out));
        assert_eq!(merged.iter().map(|e| e.delta_ms).collect::<Vec<_>>(), vec![0, 5]);
    }

    #[test]
    fn present_but_empty_twin_marks_every_entry_in() {
        let solo = fed(&[(20, 0, 10, 0), (20, 0, 20, 5)]);

        let merged = interleave(solo.records(), Some(&[]));
        assert!(merged.iter().all(|e| e.direction == Direction::In));
    }

    #[test]
    fn to_json_emits_scs_for_a_single_ciphersuite_and_cs_for_several() {
        let mut client_hello_body = vec![0x03, 0x03];
        client_hello_body.extend([0u8; 32]);
        client_hello_body.push(0x00); // no session id
        client_hello_body.extend([0x00, 0x04, 0xc0, 0x2b, 0xc0, 0x2c]); // two suites
        client_hello_body.extend([0x01, 0x00]); // compression
        client_hello_body.extend([0x00, 0x00]); // no extensions
        let mut client_handshake = vec![1u8];
        client_handshake.extend(&(client_hello_body.len() as u32).to_be_bytes()[1..]);
        client_handshake.extend(client_hello_body);
        let mut client_record = vec![22u8, 3, 3];
        client_record.extend((client_handshake.len() as u16).to_be_bytes());
        client_record.extend(client_handshake);

        let mut server_hello_body = vec![0x03, 0x03];
        server_hello_body.extend([0u8; 32]);
        server_hello_body.push(0x00);
        server_hello_body.extend([0xc0, 0x30]); // one selected suite
        server_hello_body.push(0x00);
        let mut server_handshake = vec![2u8];
        server_handshake.extend(&(server_hello_body.len() as u32).to_be_bytes()[1..]);
        server_handshake.extend(server_hello_body);
        let mut server_record = vec![22u8, 3, 3];
        server_record.extend((server_handshake.len() as u16).to_be_bytes());
        server_record.extend(server_handshake);

        let mut client = TlsInfo::with_defaults();
        client.feed(0, &client_record);
        let mut server = TlsInfo::with_defaults();
        server.feed(1, &server_record);

        let report = Report::build(Some(&client), Some(&server)).unwrap();
        let json = report.to_json();

        assert!(json.contains("\"cs\":[\"c02b\",\"c02c\"]"));
        assert!(json.contains("\"scs\":\"c030\""));
        assert!(json.starts_with("{\"tls\":{"));
    }
}

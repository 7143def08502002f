#![no_main]
use libfuzzer_sys::fuzz_target;
use tls_flow::limits::Limits;
use tls_flow::TlsInfo;

// Exercises testable property 1 (no read past the supplied slice) and
// property 3 (every capped collection stays within its `Limits` bound)
// directly against the record-layer dissector: arbitrary bytes, split at an
// arbitrary point into two synthetic directions, fed in two separate calls
// to shake out cross-call state as well as within-call parsing bugs.
fuzz_target!(|data: &[u8]| {
    let limits = Limits::default();
    let split = data.first().copied().unwrap_or(0) as usize % (data.len() + 1);
    let (first, second) = data.split_at(split.min(data.len()));

    let mut info = TlsInfo::new(limits);
    info.feed(0, first);
    info.feed(1, second);

    assert!(info.ciphersuites().len() <= limits.max_ciphersuites);
    assert!(info.extensions().len() <= u16::MAX as usize + 1);
    assert!(info.server_extensions().len() <= u16::MAX as usize + 1);
    assert!(info.records().len() <= limits.max_records);
    assert!(info.certificates().len() <= limits.max_certificates);
    assert!(info.session_id().len() <= u8::MAX as usize);

    info.release();
    info.release();
    assert_eq!(info.record_count(), 0);
});

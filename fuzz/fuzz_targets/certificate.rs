#![no_main]
use libfuzzer_sys::fuzz_target;
use tls_flow::certificate;
use tls_flow::limits::Limits;

// Drives the X.509 walk directly, bypassing the record-layer dissector and
// its certificate-assembly buffering, since that's where the riskiest fixed-
// offset arithmetic lives (DER long-form lengths, RDN/SAN/extension walks).
fuzz_target!(|data: &[u8]| {
    let limits = Limits::default();
    let certificates = certificate::parse(data, &limits);

    assert!(certificates.len() <= limits.max_certificates);
    for cert in &certificates {
        assert!(cert.issuer.len() <= limits.max_rdn);
        assert!(cert.subject.len() <= limits.max_rdn);
        assert!(cert.extensions.len() <= limits.max_extensions);
        assert!(cert.san.len() <= limits.max_san);
    }
});

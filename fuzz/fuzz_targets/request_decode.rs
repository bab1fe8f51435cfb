//! Decode fuzzer for the request wire format.
//!
//! Feeds arbitrary bytes through header parsing and whole-frame decoding.
//! Both must return errors on garbage, never panic. Frames that do decode
//! must re-encode to the same decoded value (the padded name field makes
//! byte-level round-trips non-identical, so the comparison happens on the
//! decoded representation).

#![no_main]

use libfuzzer_sys::fuzz_target;
use maildrop_proto::{RequestHeader, request};

fuzz_target!(|data: &[u8]| {
    // Header parsing alone: error or success, never a panic.
    let _ = RequestHeader::from_bytes(data);

    // Whole-frame decoding.
    let Ok((header, decoded)) = request::decode_frame(data) else {
        return;
    };

    // Anything that decoded must survive an encode/decode cycle unchanged.
    let reencoded = decoded
        .encode_frame(header.requester_id())
        .expect("decoded request must re-encode");
    let (header2, decoded2) = request::decode_frame(&reencoded).expect("re-encoded frame decodes");

    assert_eq!(decoded, decoded2);
    assert_eq!(header.requester_id(), header2.requester_id());
    assert_eq!(header.code(), header2.code());
});

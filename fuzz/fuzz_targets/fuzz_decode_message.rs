#![no_main]

use bytes::{Buf, BytesMut};
use libfuzzer_sys::fuzz_target;
use pgprobe::protocol::decode::{decode_message, MAX_STARTUP_MESSAGE_LENGTH};

fuzz_target!(|data: &[u8]| {
    let mut buf = BytesMut::from(data);

    // A startup reply may be preceded by any number of notices
    while !buf.is_empty() {
        match decode_message(&buf) {
            Ok((_, consumed)) => {
                assert!(consumed >= 5 && consumed <= MAX_STARTUP_MESSAGE_LENGTH + 1);
                assert!(consumed <= buf.len());
                buf.advance(consumed);
            }
            Err(_) => break,
        }
    }
});

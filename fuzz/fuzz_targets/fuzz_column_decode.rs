#![no_main]

use libfuzzer_sys::fuzz_target;
use pgprobe::query::ColumnDecoder;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    for decoder in [
        ColumnDecoder::Text,
        ColumnDecoder::Bool,
        ColumnDecoder::Int64,
        ColumnDecoder::Timestamp,
        ColumnDecoder::TimestampTz,
        ColumnDecoder::Date,
    ] {
        let _ = decoder.decode(Some(text));
    }
});

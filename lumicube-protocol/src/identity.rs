//! Device identification reply
//!
//! Answer to the `"ATI"` probe: the identity prefix followed by the device
//! address as colon separated hex pairs, most significant byte first, and a
//! newline. Sent unframed.

use crate::hex::encode_byte;
use crate::writer::ByteSink;

pub fn write_identity<S: ByteSink>(sink: &mut S, prefix: &[u8], address: u64) {
    sink.put(prefix);
    for (i, b) in address.to_be_bytes().iter().enumerate() {
        if i > 0 {
            sink.put(b":");
        }
        sink.put(&encode_byte(*b));
    }
    sink.put(b"\n");
}

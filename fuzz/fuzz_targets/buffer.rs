#![no_main]

use {libfuzzer_sys::fuzz_target, wirebuf::Buffer};

// The first byte picks the operation sequence. Reads of arbitrary input must
// fail with an error, never panic.
fuzz_target!(|data: &[u8]| {
    let Some((&op, rest)) = data.split_first() else {
        return;
    };
    let mut buf = Buffer::from_slice(rest);
    let mut out = Buffer::new();
    for step in 0..16u8 {
        let ok = match op.wrapping_add(step) % 8 {
            0 => buf.read_uvarint().and_then(|v| out.write_uvarint(v)).is_ok(),
            1 => buf.read_varint().and_then(|v| out.write_varint(v)).is_ok(),
            2 => buf.read_string().and_then(|s| out.write_string(&s)).is_ok(),
            3 => buf.read_fixed_string(4).and_then(|s| out.write_fixed_string(&s, 4)).is_ok(),
            4 => buf.read_uuid().and_then(|id| out.write_uuid(&id)).is_ok(),
            5 => buf.read_bit().and_then(|bit| out.write_bit(bit)).is_ok(),
            6 => buf.read_limited_bytes().and_then(|b| out.write_limited_bytes(&b)).is_ok(),
            _ => buf.read_u64_be().and_then(|v| out.write_u64_be(v)).is_ok(),
        };
        if !ok {
            break;
        }
    }
    let _ = out.finish();
});

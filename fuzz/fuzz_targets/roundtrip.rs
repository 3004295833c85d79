#![no_main]

use {
    libfuzzer_sys::fuzz_target,
    std::collections::{BTreeMap, HashSet},
    wirebuf::{
        containers::{CString, Date, Fixed, FixedBe, FixedString},
        Decode, Encode, Uuid,
    },
};

#[derive(Debug, PartialEq, Encode, Decode)]
enum Event {
    Ping,
    Join { user: String, at: u64 },
    Batch(Vec<u16>),
}

#[derive(Debug, PartialEq, Encode, Decode)]
struct Record {
    #[wirebuf(with = "FixedString<8>")]
    tag: String,
    #[wirebuf(with = "FixedBe<u32>")]
    magic: u32,
    #[wirebuf(with = "Vec<Fixed<i64>>")]
    samples: Vec<i64>,
    #[wirebuf(with = "Date")]
    created: wirebuf::DateTime<wirebuf::Utc>,
    #[wirebuf(with = "CString")]
    note: String,
    id: Uuid,
    attrs: BTreeMap<String, i32>,
    events: Vec<Event>,
    parent: Option<Box<Event>>,
}

macro_rules! fuzz_roundtrip {
    ($data:expr, $ty:ty) => {
        if let Ok(value) = wirebuf::unmarshal::<$ty>($data) {
            let bytes = wirebuf::marshal(&value).expect("marshal should succeed");
            assert_eq!(
                wirebuf::encoded_size(&value).expect("size should succeed"),
                bytes.len()
            );
            let roundtrip: $ty =
                wirebuf::unmarshal(&bytes).expect("roundtrip unmarshal should succeed");
            assert_eq!(value, roundtrip, "roundtrip failed for {}", stringify!($ty));
        }
    };
}

fuzz_target!(|data: &[u8]| {
    fuzz_roundtrip!(data, u64);
    fuzz_roundtrip!(data, i128);
    fuzz_roundtrip!(data, String);
    fuzz_roundtrip!(data, Vec<u8>);
    fuzz_roundtrip!(data, Vec<String>);
    fuzz_roundtrip!(data, (bool, char, i16));
    fuzz_roundtrip!(data, HashSet<u32>);
    fuzz_roundtrip!(data, BTreeMap<u16, Vec<i64>>);
    fuzz_roundtrip!(data, [u8; 32]);
    fuzz_roundtrip!(data, Event);
    fuzz_roundtrip!(data, Record);

    if let Ok(plain) = wirebuf::zlib::decompress(data) {
        let packed = wirebuf::zlib::compress(&plain).expect("compress should succeed");
        assert_eq!(wirebuf::zlib::decompress(&packed).unwrap(), plain);
    }
});

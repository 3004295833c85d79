//! Code generated by `wirebuf-idl` from `schemas/`, compiled against
//! `wirebuf`. The tests check it against the structural codec byte for byte.

pub mod geo {
    include!(concat!(env!("OUT_DIR"), "/geo.wb.rs"));
}

pub mod archive {
    include!(concat!(env!("OUT_DIR"), "/archive.wb.rs"));
}

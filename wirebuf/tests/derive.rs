#![cfg(feature = "derive")]

use {
    std::collections::HashMap,
    wirebuf::{
        containers::{Fixed, FixedString},
        marshal, unmarshal, Decode, Encode, Error,
    },
};

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
struct Point {
    #[wirebuf(with = "Fixed<f32>")]
    x: f32,
    #[wirebuf(with = "Fixed<f32>")]
    y: f32,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
enum Shape {
    Empty,
    Circle { center: Point, radius: u32 },
    Polygon(Vec<Point>),
}

#[derive(Debug, PartialEq, Encode, Decode)]
struct Cached {
    id: u64,
    #[wirebuf(skip)]
    hits: u32,
    label: String,
}

#[derive(Debug, PartialEq, Encode, Decode)]
struct Wrapper<T>(T, u8);

#[derive(Debug, PartialEq, Encode, Decode)]
struct Unit;

#[derive(Debug, PartialEq, Encode, Decode)]
struct Profile {
    #[wirebuf(with = "FixedString<8>")]
    handle: String,
    scores: HashMap<String, i32>,
    avatar: Option<Box<Point>>,
}

mod reexport {
    pub use wirebuf as codec;
}

#[derive(Debug, PartialEq, Encode, Decode)]
#[wirebuf(crate = "reexport::codec")]
struct ThroughReexport {
    value: i16,
}

#[test]
fn struct_fields_in_order() {
    let point = Point { x: 1.5, y: -2.25 };
    let bytes = marshal(&point).unwrap();
    let mut expected = 1.5f32.to_le_bytes().to_vec();
    expected.extend_from_slice(&(-2.25f32).to_le_bytes());
    assert_eq!(bytes, expected);
    assert_eq!(unmarshal::<Point>(&bytes).unwrap(), point);
    assert_eq!(<Point as Decode>::MIN_SIZE, 8);
}

#[test]
fn enum_variant_index_then_fields() {
    assert_eq!(marshal(&Shape::Empty).unwrap(), [0]);

    let circle = Shape::Circle {
        center: Point { x: 0.0, y: 0.0 },
        radius: 300,
    };
    let bytes = marshal(&circle).unwrap();
    assert_eq!(bytes[0], 1);
    assert_eq!(&bytes[9..], &[0xac, 0x02]);
    assert_eq!(unmarshal::<Shape>(&bytes).unwrap(), circle);

    let polygon = Shape::Polygon(vec![Point { x: 1.0, y: 2.0 }; 3]);
    let bytes = marshal(&polygon).unwrap();
    assert_eq!(&bytes[..2], &[2, 3]);
    assert_eq!(bytes.len(), 2 + 3 * 8);
    assert_eq!(unmarshal::<Shape>(&bytes).unwrap(), polygon);
}

#[test]
fn unknown_variant_is_rejected() {
    assert!(matches!(
        unmarshal::<Shape>(&[7]),
        Err(Error::InvalidTagEncoding(7))
    ));
}

#[test]
fn skipped_fields_decode_as_default() {
    let cached = Cached {
        id: 1,
        hits: 99,
        label: "x".into(),
    };
    let bytes = marshal(&cached).unwrap();
    assert_eq!(bytes, [1, 1, b'x']);
    assert_eq!(
        unmarshal::<Cached>(&bytes).unwrap(),
        Cached {
            id: 1,
            hits: 0,
            label: "x".into(),
        }
    );
}

#[test]
fn generic_and_unit_structs() {
    let wrapped = Wrapper(String::from("hi"), 4);
    let bytes = marshal(&wrapped).unwrap();
    assert_eq!(bytes, [2, b'h', b'i', 4]);
    assert_eq!(unmarshal::<Wrapper<String>>(&bytes).unwrap(), wrapped);

    assert!(marshal(&Unit).unwrap().is_empty());
    assert_eq!(unmarshal::<Unit>(&[]).unwrap(), Unit);
}

#[test]
fn nested_containers() {
    let profile = Profile {
        handle: "neo".into(),
        scores: [("level".to_string(), -4)].into(),
        avatar: Some(Box::new(Point { x: 3.0, y: 4.0 })),
    };
    let bytes = marshal(&profile).unwrap();
    assert_eq!(&bytes[..8], b"neo\0\0\0\0\0");
    assert_eq!(unmarshal::<Profile>(&bytes).unwrap(), profile);

    let orphan = Profile {
        avatar: None,
        ..profile
    };
    assert!(matches!(marshal(&orphan), Err(Error::NullReference(_))));
}

#[test]
fn crate_path_override() {
    let value = ThroughReexport { value: -300 };
    let bytes = marshal(&value).unwrap();
    assert_eq!(unmarshal::<ThroughReexport>(&bytes).unwrap(), value);
}

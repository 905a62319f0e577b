use asn1::{Cause, DecodeOptions, Dsl, EncodeOptions, Format, Schema, Value};

/// `El ::= CHOICE { int INTEGER, seq SEQUENCE OF El }`
fn element() -> Schema {
    let element = Schema::declare("El");
    let nested = element.clone();
    element
        .define_body(|s| s.choice([("int", s.int()), ("seq", s.seq_of(&nested))]))
        .unwrap();
    element
}

fn seq_header(len: usize) -> Vec<u8> {
    let mut header = vec![0x30];
    if len < 0x80 {
        header.push(len as u8);
    } else {
        let octets: Vec<u8> = len
            .to_be_bytes()
            .into_iter()
            .skip_while(|b| *b == 0)
            .collect();
        header.push(0x80 | octets.len() as u8);
        header.extend(octets);
    }
    header
}

/// `levels` SEQUENCEs wrapped around `02 01 01`.
fn nested(levels: usize) -> Vec<u8> {
    let mut headers = Vec::with_capacity(levels);
    let mut len = 3;
    for _ in 0..levels {
        let header = seq_header(len);
        len += header.len();
        headers.push(header);
    }
    let mut out = Vec::with_capacity(len);
    for header in headers.iter().rev() {
        out.extend(header);
    }
    out.extend([0x02, 0x01, 0x01]);
    out
}

#[test]
fn test_deep_input_through_choice_fails() {
    let input = nested(10_000);
    let err = element()
        .decode(&input, Format::Der, DecodeOptions::default())
        .unwrap_err();
    assert_eq!("no choice matched at: (shallow)", err.to_string());

    let decoded = element()
        .decode(&input, Format::Der, DecodeOptions::default().partial(true))
        .unwrap();
    assert_eq!(None, decoded.value());
    assert_eq!(1, decoded.errors().len());
}

#[test]
fn test_deep_input_reports_depth() {
    let list = Schema::declare("List");
    let nested_list = list.clone();
    list.define_body(|s| s.seq_of(&nested_list)).unwrap();

    let err = list
        .decode(&nested(10_000), Format::Der, DecodeOptions::default())
        .unwrap_err();
    assert!(matches!(err.cause(), Some(Cause::TooDeep(128))));
    // the root plus 127 elements fit, the next element is refused
    assert_eq!(128, err.path().unwrap().segments().len());
}

#[test]
fn test_max_depth_option() {
    let schema = element();
    let shallow = schema
        .decode(&nested(1), Format::Der, DecodeOptions::default().max_depth(4))
        .unwrap();
    assert_eq!(
        Some(&Value::choice("seq", vec![Value::choice("int", 1i64)])),
        shallow.value()
    );

    assert!(
        schema
            .decode(&nested(2), Format::Der, DecodeOptions::default().max_depth(4))
            .is_err()
    );
    assert!(
        schema
            .decode(&nested(2), Format::Der, DecodeOptions::default())
            .is_ok()
    );
}

#[test]
fn test_encode_depth_limit() {
    let value = Value::choice(
        "seq",
        vec![Value::choice("seq", vec![Value::choice("int", 1i64)])],
    );
    let err = element()
        .encode(&value, Format::Der, &EncodeOptions::default().max_depth(4))
        .unwrap_err();
    assert_eq!("nesting deeper than 4 levels at: 0/0", err.to_string());

    let der = element()
        .encode(&value, Format::Der, &EncodeOptions::default())
        .unwrap();
    assert_eq!(nested(2), der);
}

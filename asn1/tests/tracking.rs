use asn1::{DecodeOptions, Dsl, EncodeOptions, Format, Phase, Value, define};

#[test]
fn test_track_nested_offsets() {
    let b = define("B", |s| s.seq().obj([s.key("x").int(), s.key("y").int()])).unwrap();
    let a = define("A", |s| {
        s.seq()
            .obj([s.key("a").explicit(0).uses(&b), s.key("b").uses(&b)])
    })
    .unwrap();

    let pair = |x: i64, y: i64| Value::object([("x", Value::from(x)), ("y", Value::from(y))]);
    let input = Value::object([("a", pair(1, 2)), ("b", pair(3, 4))]);

    let encoded = a.encode(&input, Format::Der, &EncodeOptions::default()).unwrap();
    assert_eq!(20, encoded.len());

    let mut tracked: Vec<(String, String, usize, usize)> = Vec::new();
    let mut track = |path: &str, start: usize, end: usize, phase: Phase| {
        tracked.push((phase.to_string(), path.to_string(), start, end));
    };
    let decoded = a
        .decode(&encoded, Format::Der, DecodeOptions::default().track(&mut track))
        .unwrap();
    assert_eq!(Some(&input), decoded.value());

    let expected: [(&str, &str, usize, usize); 14] = [
        ("tagged", "", 0, 20),
        ("content", "", 2, 20),
        ("tagged", "a", 4, 12),
        ("content", "a", 6, 12),
        ("tagged", "a/x", 6, 9),
        ("content", "a/x", 8, 9),
        ("tagged", "a/y", 9, 12),
        ("content", "a/y", 11, 12),
        ("tagged", "b", 12, 20),
        ("content", "b", 14, 20),
        ("tagged", "b/x", 14, 17),
        ("content", "b/x", 16, 17),
        ("tagged", "b/y", 17, 20),
        ("content", "b/y", 19, 20),
    ];
    let expected: Vec<(String, String, usize, usize)> = expected
        .iter()
        .map(|(phase, path, start, end)| (phase.to_string(), path.to_string(), *start, *end))
        .collect();
    assert_eq!(expected, tracked);
}

#[test]
fn test_track_skips_failed_trials() {
    let time = define("Time", |s| {
        s.choice([("utcTime", s.utctime()), ("generalTime", s.gentime())])
    })
    .unwrap();
    let schema = define("Rec", |s| {
        s.seq()
            .obj([s.key("when").uses(&time).optional(), s.key("n").int()])
    })
    .unwrap();

    let mut tracked = Vec::new();
    let mut track = |path: &str, _: usize, _: usize, phase: Phase| {
        tracked.push(format!("{} {}", phase, path));
    };
    schema
        .decode(
            &[0x30, 0x03, 0x02, 0x01, 0x07],
            Format::Der,
            DecodeOptions::default().track(&mut track),
        )
        .unwrap();
    assert_eq!(
        vec!["tagged ", "content ", "tagged n", "content n"],
        tracked
    );
}

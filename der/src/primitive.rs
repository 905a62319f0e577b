//! Content octets of primitive kinds.

use chrono::{Datelike, NaiveDateTime};
use kumiki::backend::Args;
use kumiki::kind::Kind;
use kumiki::value::{BitString, Oid, Value};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::base128;
use crate::error::Error;

const UTC_TIME_FORMAT: &str = "%Y%m%d%H%M%SZ";
const UTC_TIME_SHORT_FORMAT: &str = "%y%m%d%H%M%SZ";
const GENERALIZED_TIME_FORMAT: &str = "%Y%m%d%H%M%SZ";

pub(crate) fn decode(kind: Kind, data: &[u8], args: &Args) -> Result<Value, Error> {
    match kind {
        Kind::Bool => match data {
            [0x00] => Ok(Value::Bool(false)),
            [0xff] => Ok(Value::Bool(true)),
            _ => Err(Error::InvalidBoolean),
        },
        Kind::Int | Kind::Enum => decode_integer(data, args),
        Kind::Null => {
            if data.is_empty() {
                Ok(Value::Null)
            } else {
                Err(Error::NullWithContent(data.len()))
            }
        }
        Kind::ObjId => decode_oid(data, args),
        Kind::UtcTime => decode_utc_time(data),
        Kind::GenTime => {
            let s = std::str::from_utf8(data).map_err(|_| Error::InvalidUtf8(kind))?;
            NaiveDateTime::parse_from_str(s, GENERALIZED_TIME_FORMAT)
                .map(Value::Time)
                .map_err(|_| Error::InvalidTime {
                    kind,
                    input: s.to_string(),
                })
        }
        Kind::BitStr => {
            let (unused, rest) = data.split_first().ok_or(Error::BitStringNoData)?;
            if *unused > 7 {
                return Err(Error::BitStringUnusedBitsOutOfRange(*unused));
            }
            Ok(Value::BitString(BitString::new(*unused, rest.to_vec())))
        }
        Kind::OctStr | Kind::ObjDesc => Ok(Value::Bytes(data.to_vec())),
        Kind::BmpStr => {
            if data.len() % 2 != 0 {
                return Err(Error::BmpStringOddLength(data.len()));
            }
            let units: Vec<u16> = data
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units)
                .map(Value::Str)
                .map_err(|_| Error::BmpStringInvalidUtf16)
        }
        Kind::NumStr => {
            let s = utf8(kind, data)?;
            if !is_numeric(&s) {
                return Err(Error::NumericStringInvalidCharacters);
            }
            Ok(Value::Str(s))
        }
        Kind::PrintStr => {
            let s = utf8(kind, data)?;
            if !is_printable(&s) {
                return Err(Error::PrintableStringInvalidCharacters);
            }
            Ok(Value::Str(s))
        }
        Kind::CharStr
        | Kind::GenStr
        | Kind::GraphStr
        | Kind::Ia5Str
        | Kind::Iso646Str
        | Kind::T61Str
        | Kind::UniStr
        | Kind::Utf8Str
        | Kind::VideoStr => utf8(kind, data).map(Value::Str),
        Kind::Seq | Kind::SeqOf | Kind::Set | Kind::SetOf => Err(Error::NotPrimitive(kind)),
    }
}

pub(crate) fn encode(kind: Kind, value: &Value, args: &Args) -> kumiki::Result<Vec<u8>> {
    let mismatch = |expected: &'static str| kumiki::Error::TypeMismatch { kind, expected };
    match kind {
        Kind::Bool => match value {
            Value::Bool(true) => Ok(vec![0xff]),
            Value::Bool(false) => Ok(vec![0x00]),
            _ => Err(mismatch("bool")),
        },
        Kind::Int | Kind::Enum => {
            let n = match (value, &args.names) {
                (Value::Int(n), _) => n.clone(),
                (Value::Str(name), Some(names)) => names
                    .value(name)
                    .map(|n| BigInt::from(*n))
                    .ok_or_else(|| Error::EnumValueNotFound(name.clone()))?,
                (Value::Str(name), None) => return Err(Error::EnumValueNotFound(name.clone()).into()),
                _ => return Err(mismatch("integer")),
            };
            Ok(n.to_signed_bytes_be())
        }
        Kind::Null => Ok(Vec::new()),
        Kind::ObjId => {
            let oid = match value {
                Value::Oid(oid) => oid.clone(),
                Value::Str(s) => match args.oids.as_ref().and_then(|oids| oids.value(s)) {
                    Some(oid) => oid.clone(),
                    None => s
                        .parse::<Oid>()
                        .map_err(|_| Error::ObjectIdentifierInvalidString(s.clone()))?,
                },
                _ => return Err(mismatch("object identifier")),
            };
            Ok(encode_oid(&oid, args.relative)?)
        }
        Kind::UtcTime => match value {
            Value::Time(t) => {
                if !(1970..=2069).contains(&t.year()) {
                    return Err(Error::UtcTimeYearOutOfRange(t.year()).into());
                }
                Ok(t.format(UTC_TIME_SHORT_FORMAT).to_string().into_bytes())
            }
            _ => Err(mismatch("time")),
        },
        Kind::GenTime => match value {
            Value::Time(t) => Ok(t.format(GENERALIZED_TIME_FORMAT).to_string().into_bytes()),
            _ => Err(mismatch("time")),
        },
        Kind::BitStr => match value {
            Value::BitString(bs) => {
                if bs.unused_bits() > 7 {
                    return Err(Error::BitStringUnusedBitsOutOfRange(bs.unused_bits()).into());
                }
                let mut out = Vec::with_capacity(bs.as_bytes().len() + 1);
                out.push(bs.unused_bits());
                out.extend_from_slice(bs.as_bytes());
                Ok(out)
            }
            Value::Bytes(data) => {
                let mut out = Vec::with_capacity(data.len() + 1);
                out.push(0);
                out.extend_from_slice(data);
                Ok(out)
            }
            _ => Err(mismatch("bit string")),
        },
        Kind::OctStr | Kind::ObjDesc => match value {
            Value::Bytes(data) => Ok(data.clone()),
            _ => Err(mismatch("bytes")),
        },
        Kind::BmpStr => match value {
            Value::Str(s) => Ok(s.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            _ => Err(mismatch("string")),
        },
        Kind::NumStr => match value {
            Value::Str(s) if is_numeric(s) => Ok(s.as_bytes().to_vec()),
            Value::Str(_) => Err(Error::NumericStringInvalidCharacters.into()),
            _ => Err(mismatch("string")),
        },
        Kind::PrintStr => match value {
            Value::Str(s) if is_printable(s) => Ok(s.as_bytes().to_vec()),
            Value::Str(_) => Err(Error::PrintableStringInvalidCharacters.into()),
            _ => Err(mismatch("string")),
        },
        Kind::CharStr
        | Kind::GenStr
        | Kind::GraphStr
        | Kind::Ia5Str
        | Kind::Iso646Str
        | Kind::T61Str
        | Kind::UniStr
        | Kind::Utf8Str
        | Kind::VideoStr => match value {
            Value::Str(s) => Ok(s.as_bytes().to_vec()),
            _ => Err(mismatch("string")),
        },
        Kind::Seq | Kind::SeqOf | Kind::Set | Kind::SetOf => Err(Error::NotPrimitive(kind).into()),
    }
}

fn decode_integer(data: &[u8], args: &Args) -> Result<Value, Error> {
    if data.is_empty() {
        return Err(Error::IntegerNoData);
    }
    let n = BigInt::from_signed_bytes_be(data);
    if let Some(names) = &args.names {
        if let Some(name) = n.to_i64().and_then(|n| names.name(&n)) {
            return Ok(Value::Str(name.to_string()));
        }
    }
    Ok(Value::Int(n))
}

fn decode_oid(data: &[u8], args: &Args) -> Result<Value, Error> {
    if data.is_empty() {
        return Err(Error::ObjectIdentifierNoData);
    }
    let mut ids = Vec::new();
    let mut acc: u64 = 0;
    for (i, b) in data.iter().enumerate() {
        if acc > (u64::MAX >> 7) {
            return Err(Error::ObjectIdentifierArcOverflow);
        }
        acc = (acc << 7) | (b & 0x7f) as u64;
        if b & 0x80 == 0 {
            ids.push(acc);
            acc = 0;
        } else if i == data.len() - 1 {
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }
    }

    let arcs = if args.relative {
        ids
    } else {
        // X.690 8.19.4: the first subidentifier packs the first two arcs
        let (first, rest) = ids
            .split_first()
            .ok_or(Error::ObjectIdentifierNoData)?;
        let (a, b) = match *first {
            n if n < 40 => (0, n),
            n if n < 80 => (1, n - 40),
            n => (2, n - 80),
        };
        let mut arcs = Vec::with_capacity(ids.len() + 1);
        arcs.push(a);
        arcs.push(b);
        arcs.extend_from_slice(rest);
        arcs
    };
    let oid = Oid::new(arcs);

    if let Some(name) = args.oids.as_ref().and_then(|oids| oids.name(&oid)) {
        return Ok(Value::Str(name.to_string()));
    }
    Ok(Value::Oid(oid))
}

fn encode_oid(oid: &Oid, relative: bool) -> Result<Vec<u8>, Error> {
    let arcs = oid.arcs();
    let mut out = Vec::new();
    if relative {
        for arc in arcs {
            out.extend(base128(*arc));
        }
        return Ok(out);
    }
    let [first, second, rest @ ..] = arcs else {
        return Err(Error::ObjectIdentifierTooFewComponents);
    };
    if *first > 2 || (*first < 2 && *second >= 40) {
        return Err(Error::ObjectIdentifierInvalidFirstArcs(*first, *second));
    }
    let head = (first * 40)
        .checked_add(*second)
        .ok_or(Error::ObjectIdentifierArcOverflow)?;
    out.extend(base128(head));
    for arc in rest {
        out.extend(base128(*arc));
    }
    Ok(out)
}

fn decode_utc_time(data: &[u8]) -> Result<Value, Error> {
    let s = std::str::from_utf8(data).map_err(|_| Error::InvalidUtf8(Kind::UtcTime))?;
    let invalid = || Error::InvalidTime {
        kind: Kind::UtcTime,
        input: s.to_string(),
    };
    let yy: u32 = s.get(0..2).and_then(|y| y.parse().ok()).ok_or_else(invalid)?;
    let century = if yy < 70 { "20" } else { "19" };
    NaiveDateTime::parse_from_str(&format!("{}{}", century, s), UTC_TIME_FORMAT)
        .map(Value::Time)
        .map_err(|_| invalid())
}

fn utf8(kind: Kind, data: &[u8]) -> Result<String, Error> {
    String::from_utf8(data.to_vec()).map_err(|_| Error::InvalidUtf8(kind))
}

fn is_numeric(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit() || c == ' ')
}

fn is_printable(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || " '()+,-./:=?".contains(c))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use kumiki::backend::{Args, Names};
    use kumiki::kind::Kind;
    use kumiki::value::{BitString, Oid, Value};
    use num_bigint::BigInt;
    use rstest::rstest;

    use super::{decode, encode};
    use crate::error::Error;

    fn time(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> Value {
        Value::Time(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(hh, mm, ss)
                .unwrap(),
        )
    }

    #[rstest(kind, input, expected,
        case(Kind::Bool, vec![0xff], Value::Bool(true)),
        case(Kind::Bool, vec![0x00], Value::Bool(false)),
        case(Kind::Int, vec![0x7b], Value::from(123i64)),
        case(Kind::Int, vec![0x01, 0xc8], Value::from(456i64)),
        case(Kind::Int, vec![0x00, 0x80], Value::from(128i64)),
        case(Kind::Int, vec![0xff, 0x7f], Value::from(-129i64)),
        case(Kind::Int, vec![0x80], Value::from(-128i64)),
        case(
            Kind::Int,
            vec![0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            Value::Int(BigInt::from(u64::MAX) * 256 + 255)
        ),
        case(Kind::Null, vec![], Value::Null),
        case(Kind::ObjId, vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d], Value::Oid(Oid::new(vec![1, 2, 840, 113549]))),
        case(Kind::ObjId, vec![0x55, 0x1d, 0x13], Value::Oid(Oid::new(vec![2, 5, 29, 19]))),
        case(Kind::ObjId, vec![0x88, 0x37, 0x03], Value::Oid(Oid::new(vec![2, 999, 3]))),
        case(Kind::ObjId, vec![0x00], Value::Oid(Oid::new(vec![0, 0]))),
        case(Kind::UtcTime, b"190910201010Z".to_vec(), time(2019, 9, 10, 20, 10, 10)),
        case(Kind::UtcTime, b"991231235959Z".to_vec(), time(1999, 12, 31, 23, 59, 59)),
        case(Kind::GenTime, b"20500101000000Z".to_vec(), time(2050, 1, 1, 0, 0, 0)),
        case(Kind::BitStr, vec![0x06, 0x6e, 0x5d, 0xc0], Value::BitString(BitString::new(6, vec![0x6e, 0x5d, 0xc0]))),
        case(Kind::OctStr, vec![0x01, 0x02], Value::Bytes(vec![0x01, 0x02])),
        case(Kind::BmpStr, vec![0x00, 0x68, 0x00, 0x69], Value::from("hi")),
        case(Kind::NumStr, b"12 34".to_vec(), Value::from("12 34")),
        case(Kind::PrintStr, b"Test User 1".to_vec(), Value::from("Test User 1")),
        case(Kind::Ia5Str, b"test@example.com".to_vec(), Value::from("test@example.com")),
        case(Kind::Utf8Str, "日本".as_bytes().to_vec(), Value::from("日本")),
    )]
    fn test_decode(kind: Kind, input: Vec<u8>, expected: Value) {
        let actual = decode(kind, &input, &Args::default()).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(kind, input, expected,
        case(Kind::Bool, vec![0x01], Error::InvalidBoolean),
        case(Kind::Bool, vec![], Error::InvalidBoolean),
        case(Kind::Int, vec![], Error::IntegerNoData),
        case(Kind::Null, vec![0x00], Error::NullWithContent(1)),
        case(Kind::ObjId, vec![], Error::ObjectIdentifierNoData),
        case(Kind::ObjId, vec![0x2a, 0x86], Error::ObjectIdentifierIncompleteEncoding),
        case(Kind::BitStr, vec![], Error::BitStringNoData),
        case(Kind::BitStr, vec![0x08, 0x00], Error::BitStringUnusedBitsOutOfRange(8)),
        case(Kind::BmpStr, vec![0x00], Error::BmpStringOddLength(1)),
        case(Kind::NumStr, b"12a".to_vec(), Error::NumericStringInvalidCharacters),
        case(Kind::PrintStr, b"a@b".to_vec(), Error::PrintableStringInvalidCharacters),
        case(Kind::Utf8Str, vec![0xff, 0xfe], Error::InvalidUtf8(Kind::Utf8Str)),
        case(Kind::Seq, vec![], Error::NotPrimitive(Kind::Seq)),
    )]
    fn test_decode_error(kind: Kind, input: Vec<u8>, expected: Error) {
        let actual = decode(kind, &input, &Args::default()).unwrap_err();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_decode_invalid_time() {
        let err = decode(Kind::UtcTime, b"1909102010Z", &Args::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidTime { kind: Kind::UtcTime, .. }));
    }

    #[rstest(kind, input, expected,
        case(Kind::Bool, Value::Bool(true), vec![0xff]),
        case(Kind::Int, Value::from(0i64), vec![0x00]),
        case(Kind::Int, Value::from(123i64), vec![0x7b]),
        case(Kind::Int, Value::from(128i64), vec![0x00, 0x80]),
        case(Kind::Int, Value::from(-129i64), vec![0xff, 0x7f]),
        case(Kind::Null, Value::Null, vec![]),
        case(Kind::ObjId, Value::Oid(Oid::new(vec![1, 2, 840, 113549])), vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d]),
        case(Kind::ObjId, Value::from("2.5.29.19"), vec![0x55, 0x1d, 0x13]),
        case(Kind::ObjId, Value::Oid(Oid::new(vec![0, 0])), vec![0x00]),
        case(Kind::UtcTime, time(2019, 9, 10, 20, 10, 10), b"190910201010Z".to_vec()),
        case(Kind::GenTime, time(1850, 6, 1, 12, 0, 0), b"18500601120000Z".to_vec()),
        case(Kind::BitStr, Value::BitString(BitString::new(1, vec![0x80])), vec![0x01, 0x80]),
        case(Kind::BitStr, Value::Bytes(vec![0xaa]), vec![0x00, 0xaa]),
        case(Kind::OctStr, Value::Bytes(vec![0x01]), vec![0x01]),
        case(Kind::BmpStr, Value::from("hi"), vec![0x00, 0x68, 0x00, 0x69]),
        case(Kind::PrintStr, Value::from("Org (1)"), b"Org (1)".to_vec()),
        case(Kind::Utf8Str, Value::from("日本"), "日本".as_bytes().to_vec()),
    )]
    fn test_encode(kind: Kind, input: Value, expected: Vec<u8>) {
        let actual = encode(kind, &input, &Args::default()).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(kind, input, expected_message,
        case(Kind::Bool, Value::from(1i64), "bool: expected bool value"),
        case(Kind::Int, Value::from("nope"), "failed to find enum value: nope"),
        case(Kind::OctStr, Value::from("text"), "octstr: expected bytes value"),
        case(Kind::ObjId, Value::Oid(Oid::new(vec![1])), "too few components"),
        case(Kind::ObjId, Value::Oid(Oid::new(vec![1, 40])), "invalid first arcs 1.40"),
        case(Kind::UtcTime, time(2070, 1, 1, 0, 0, 0), "year 2070"),
        case(Kind::PrintStr, Value::from("a*b"), "printstr: unsupported characters"),
    )]
    fn test_encode_error(kind: Kind, input: Value, expected_message: &str) {
        let err = encode(kind, &input, &Args::default()).unwrap_err();
        assert!(
            err.to_string().contains(expected_message),
            "{} does not contain {}",
            err,
            expected_message
        );
    }

    #[test]
    fn test_enum_names() {
        let args = Args::with_names(Names::new([(0i64, "unused"), (1, "keyCompromise")]));
        assert_eq!(
            Value::from("keyCompromise"),
            decode(Kind::Enum, &[0x01], &args).unwrap()
        );
        // unnamed numbers stay numeric
        assert_eq!(Value::from(7i64), decode(Kind::Enum, &[0x07], &args).unwrap());
        assert_eq!(
            vec![0x01],
            encode(Kind::Enum, &Value::from("keyCompromise"), &args).unwrap()
        );
        assert_eq!(vec![0x05], encode(Kind::Enum, &Value::from(5i64), &args).unwrap());
    }

    #[test]
    fn test_oid_names() {
        let oid = Oid::from_str("1.2.840.113549.1.1.11").unwrap();
        let args = Args::with_oids(Names::new([(oid, "sha256WithRSAEncryption")]));
        let bytes = vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x0b];
        assert_eq!(
            Value::from("sha256WithRSAEncryption"),
            decode(Kind::ObjId, &bytes, &args).unwrap()
        );
        assert_eq!(
            bytes,
            encode(Kind::ObjId, &Value::from("sha256WithRSAEncryption"), &args).unwrap()
        );
    }

    #[test]
    fn test_relative_oid() {
        let args = Args {
            relative: true,
            ..Default::default()
        };
        assert_eq!(
            Value::Oid(Oid::new(vec![8571, 3, 2])),
            decode(Kind::ObjId, &[0xc2, 0x7b, 0x03, 0x02], &args).unwrap()
        );
        assert_eq!(
            vec![0xc2, 0x7b, 0x03, 0x02],
            encode(Kind::ObjId, &Value::Oid(Oid::new(vec![8571, 3, 2])), &args).unwrap()
        );
    }
}

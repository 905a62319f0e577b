//! Primitive and structural kinds a schema node can declare.

use std::fmt::{Display, Formatter};

/// Schema-level kind of a node together with its universal tag number.
///
/// `SeqOf`/`SetOf` share the wire tag of `Seq`/`Set`; they differ only in how
/// the engines interpret the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Seq,
    SeqOf,
    Set,
    SetOf,
    ObjId,
    Bool,
    GenTime,
    UtcTime,
    Null,
    Enum,
    Int,
    ObjDesc,
    BitStr,
    BmpStr,
    CharStr,
    GenStr,
    GraphStr,
    Ia5Str,
    Iso646Str,
    NumStr,
    OctStr,
    PrintStr,
    T61Str,
    UniStr,
    Utf8Str,
    VideoStr,
}

impl Kind {
    /// Universal tag number (X.680 §8.4).
    pub fn universal(&self) -> u32 {
        match self {
            Kind::Bool => 0x01,
            Kind::Int => 0x02,
            Kind::BitStr => 0x03,
            Kind::OctStr => 0x04,
            Kind::Null => 0x05,
            Kind::ObjId => 0x06,
            Kind::ObjDesc => 0x07,
            Kind::Enum => 0x0a,
            Kind::Utf8Str => 0x0c,
            Kind::Seq | Kind::SeqOf => 0x10,
            Kind::Set | Kind::SetOf => 0x11,
            Kind::NumStr => 0x12,
            Kind::PrintStr => 0x13,
            Kind::T61Str => 0x14,
            Kind::VideoStr => 0x15,
            Kind::Ia5Str => 0x16,
            Kind::UtcTime => 0x17,
            Kind::GenTime => 0x18,
            Kind::GraphStr => 0x19,
            Kind::Iso646Str => 0x1a,
            Kind::GenStr => 0x1b,
            Kind::UniStr => 0x1c,
            Kind::CharStr => 0x1d,
            Kind::BmpStr => 0x1e,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Kind::SeqOf | Kind::SetOf)
    }

    /// String-like kinds whose payload may carry a `contains` schema.
    pub fn is_container(&self) -> bool {
        matches!(self, Kind::OctStr | Kind::BitStr)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::Seq => "seq",
            Kind::SeqOf => "seqof",
            Kind::Set => "set",
            Kind::SetOf => "setof",
            Kind::ObjId => "objid",
            Kind::Bool => "bool",
            Kind::GenTime => "gentime",
            Kind::UtcTime => "utctime",
            Kind::Null => "null",
            Kind::Enum => "enum",
            Kind::Int => "int",
            Kind::ObjDesc => "objDesc",
            Kind::BitStr => "bitstr",
            Kind::BmpStr => "bmpstr",
            Kind::CharStr => "charstr",
            Kind::GenStr => "genstr",
            Kind::GraphStr => "graphstr",
            Kind::Ia5Str => "ia5str",
            Kind::Iso646Str => "iso646str",
            Kind::NumStr => "numstr",
            Kind::OctStr => "octstr",
            Kind::PrintStr => "printstr",
            Kind::T61Str => "t61str",
            Kind::UniStr => "unistr",
            Kind::Utf8Str => "utf8str",
            Kind::VideoStr => "videostr",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tag class carried in the two high bits of an identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Class {
    Universal = 0,
    Application = 1,
    Context = 2,
    Private = 3,
}

impl From<u8> for Class {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::Context,
            _ => Class::Private,
        }
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Class::Universal => write!(f, "universal"),
            Class::Application => write!(f, "application"),
            Class::Context => write!(f, "context"),
            Class::Private => write!(f, "private"),
        }
    }
}

/// Tag an engine asks a back end to peek or consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSpec {
    /// Universal tag of a declared kind.
    Universal(Kind),
    /// Context-specific tag number (`explicit`/`implicit`).
    Context(u32),
    /// No expectation; only meaningful with `allow_any`.
    Any,
}

impl TagSpec {
    pub fn class(&self) -> Option<Class> {
        match self {
            TagSpec::Universal(_) => Some(Class::Universal),
            TagSpec::Context(_) => Some(Class::Context),
            TagSpec::Any => None,
        }
    }

    pub fn number(&self) -> Option<u32> {
        match self {
            TagSpec::Universal(kind) => Some(kind.universal()),
            TagSpec::Context(n) => Some(*n),
            TagSpec::Any => None,
        }
    }
}

impl Display for TagSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TagSpec::Universal(kind) => write!(f, "{}", kind),
            TagSpec::Context(n) => write!(f, "[{}]", n),
            TagSpec::Any => write!(f, "any"),
        }
    }
}

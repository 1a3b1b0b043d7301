use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnexpectedEof,
    TrailingBytes(usize),
    InvalidMagic(u32),
    InvalidConstantPoolIndex(u16),
    InvalidConstantPoolTag(u8),
    ConstantPoolTypeMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    InvalidModifiedUtf8,
    InvalidDescriptor(String),
    InvalidSignature(String),
    MalformedAttribute(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEof => f.write_str("unexpected end of class file"),
            Error::TrailingBytes(count) => write!(f, "{count} trailing bytes after structure"),
            Error::InvalidMagic(magic) => write!(f, "not a class file (magic 0x{magic:08x})"),
            Error::InvalidConstantPoolIndex(index) => {
                write!(f, "constant pool index {index} is out of range")
            }
            Error::InvalidConstantPoolTag(tag) => write!(f, "unknown constant pool tag {tag}"),
            Error::ConstantPoolTypeMismatch {
                index,
                expected,
                found,
            } => write!(f, "constant #{index} is {found}, expected {expected}"),
            Error::InvalidModifiedUtf8 => f.write_str("malformed modified UTF-8 string"),
            Error::InvalidDescriptor(desc) => write!(f, "malformed descriptor `{desc}`"),
            Error::InvalidSignature(sig) => write!(f, "malformed generic signature `{sig}`"),
            Error::MalformedAttribute(name) => write!(f, "malformed `{name}` attribute"),
        }
    }
}

impl std::error::Error for Error {}

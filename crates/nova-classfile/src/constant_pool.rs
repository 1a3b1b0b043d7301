use crate::error::{Error, Result};
use crate::reader::Reader;

/// Value of a loadable constant as referenced from a `ConstantValue`
/// attribute or an annotation element.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Constant {
    /// Index 0 and the second slot of `Long`/`Double` entries.
    Unusable,
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name: u16 },
    String { utf8: u16 },
    MemberRef { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
    MethodHandle { kind: u8, reference: u16 },
    MethodType { descriptor: u16 },
    Dynamic { bootstrap: u16, name_and_type: u16 },
    Module { name: u16 },
    Package { name: u16 },
}

impl Constant {
    fn describe(&self) -> &'static str {
        match self {
            Constant::Unusable => "unusable slot",
            Constant::Utf8(_) => "Utf8",
            Constant::Integer(_) => "Integer",
            Constant::Float(_) => "Float",
            Constant::Long(_) => "Long",
            Constant::Double(_) => "Double",
            Constant::Class { .. } => "Class",
            Constant::String { .. } => "String",
            Constant::MemberRef { .. } => "member reference",
            Constant::NameAndType { .. } => "NameAndType",
            Constant::MethodHandle { .. } => "MethodHandle",
            Constant::MethodType { .. } => "MethodType",
            Constant::Dynamic { .. } => "Dynamic",
            Constant::Module { .. } => "Module",
            Constant::Package { .. } => "Package",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(Constant::Unusable);
        while entries.len() < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let len = reader.read_u2()? as usize;
                    Constant::Utf8(decode_modified_utf8(reader.read_bytes(len)?)?)
                }
                3 => Constant::Integer(reader.read_i4()?),
                4 => Constant::Float(f32::from_bits(reader.read_u4()?)),
                5 => Constant::Long(reader.read_i8()?),
                6 => Constant::Double(f64::from_bits(reader.read_i8()? as u64)),
                7 => Constant::Class {
                    name: reader.read_u2()?,
                },
                8 => Constant::String {
                    utf8: reader.read_u2()?,
                },
                9 | 10 | 11 => Constant::MemberRef {
                    class: reader.read_u2()?,
                    name_and_type: reader.read_u2()?,
                },
                12 => Constant::NameAndType {
                    name: reader.read_u2()?,
                    descriptor: reader.read_u2()?,
                },
                15 => Constant::MethodHandle {
                    kind: reader.read_u1()?,
                    reference: reader.read_u2()?,
                },
                16 => Constant::MethodType {
                    descriptor: reader.read_u2()?,
                },
                17 | 18 => Constant::Dynamic {
                    bootstrap: reader.read_u2()?,
                    name_and_type: reader.read_u2()?,
                },
                19 => Constant::Module {
                    name: reader.read_u2()?,
                },
                20 => Constant::Package {
                    name: reader.read_u2()?,
                },
                other => return Err(Error::InvalidConstantPoolTag(other)),
            };
            let wide = matches!(entry, Constant::Long(_) | Constant::Double(_));
            entries.push(entry);
            if wide {
                entries.push(Constant::Unusable);
            }
        }
        if entries.len() != count.max(1) {
            // A wide constant in the last slot overflows the declared count.
            return Err(Error::InvalidConstantPoolIndex(count as u16));
        }
        Ok(Self { entries })
    }

    pub(crate) fn entry(&self, index: u16) -> Result<&Constant> {
        match self.entries.get(index as usize) {
            None | Some(Constant::Unusable) => Err(Error::InvalidConstantPoolIndex(index)),
            Some(entry) => Ok(entry),
        }
    }

    pub(crate) fn utf8(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            Constant::Utf8(value) => Ok(value),
            other => Err(mismatch(index, "Utf8", other)),
        }
    }

    /// Internal name (`java/util/Map$Entry`) of a `Class` constant.
    pub(crate) fn class_name(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            Constant::Class { name } => self.utf8(*name),
            other => Err(mismatch(index, "Class", other)),
        }
    }

    pub(crate) fn optional_class_name(&self, index: u16) -> Result<Option<&str>> {
        if index == 0 {
            Ok(None)
        } else {
            self.class_name(index).map(Some)
        }
    }

    pub(crate) fn optional_utf8(&self, index: u16) -> Result<Option<&str>> {
        if index == 0 {
            Ok(None)
        } else {
            self.utf8(index).map(Some)
        }
    }

    pub(crate) fn integer(&self, index: u16) -> Result<i32> {
        match self.entry(index)? {
            Constant::Integer(value) => Ok(*value),
            other => Err(mismatch(index, "Integer", other)),
        }
    }

    pub(crate) fn constant_value(&self, index: u16) -> Result<ConstantValue> {
        Ok(match self.entry(index)? {
            Constant::Integer(v) => ConstantValue::Int(*v),
            Constant::Long(v) => ConstantValue::Long(*v),
            Constant::Float(v) => ConstantValue::Float(*v),
            Constant::Double(v) => ConstantValue::Double(*v),
            Constant::String { utf8 } => ConstantValue::String(self.utf8(*utf8)?.to_string()),
            other => return Err(mismatch(index, "loadable constant", other)),
        })
    }
}

fn mismatch(index: u16, expected: &'static str, found: &Constant) -> Error {
    Error::ConstantPoolTypeMismatch {
        index,
        expected,
        found: found.describe(),
    }
}

/// Decodes the JVM's "modified UTF-8": NUL is encoded on two bytes and
/// supplementary characters are stored as surrogate pairs.
pub(crate) fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i] as u16;
        let continuation = |at: usize| -> Result<u16> {
            match bytes.get(at) {
                Some(b) if b & 0xC0 == 0x80 => Ok((*b & 0x3F) as u16),
                _ => Err(Error::InvalidModifiedUtf8),
            }
        };
        if b0 & 0x80 == 0 {
            if b0 == 0 {
                return Err(Error::InvalidModifiedUtf8);
            }
            units.push(b0);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            units.push(((b0 & 0x1F) << 6) | continuation(i + 1)?);
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            units.push(((b0 & 0x0F) << 12) | (continuation(i + 1)? << 6) | continuation(i + 2)?);
            i += 3;
        } else {
            return Err(Error::InvalidModifiedUtf8);
        }
    }
    // the JVM accepts unpaired surrogates
    Ok(String::from_utf16_lossy(&units))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modified_utf8_nul_and_supplementary() {
        assert_eq!(decode_modified_utf8(&[0xC0, 0x80]).unwrap(), "\0");
        // U+1F600 as the surrogate pair D83D DE00.
        let smiley = [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        assert_eq!(decode_modified_utf8(&smiley).unwrap(), "\u{1F600}");
        assert_eq!(decode_modified_utf8(b"plain").unwrap(), "plain");
        assert!(decode_modified_utf8(&[0x00]).is_err());
    }

    #[test]
    fn unpaired_surrogates_decode_lossily() {
        // D83D without its low half
        let lone = [b'a', 0xED, 0xA0, 0xBD, b'b'];
        assert_eq!(decode_modified_utf8(&lone).unwrap(), "a\u{FFFD}b");
        // DE00 on its own
        assert_eq!(decode_modified_utf8(&[0xED, 0xB8, 0x80]).unwrap(), "\u{FFFD}");
    }

    #[test]
    fn wide_constants_take_two_slots() {
        #[rustfmt::skip]
        let bytes = [
            0x00, 0x04,                                     // count = 4 -> 3 usable slots
            5, 0, 0, 0, 0, 0, 0, 0, 42,                     // #1 Long (occupies #1, #2)
            1, 0x00, 0x01, b'x',                            // #3 Utf8 "x"
        ];
        let pool = ConstantPool::parse(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(pool.constant_value(1).unwrap(), ConstantValue::Long(42));
        assert_eq!(pool.entry(2), Err(Error::InvalidConstantPoolIndex(2)));
        assert_eq!(pool.utf8(3).unwrap(), "x");
        assert!(matches!(
            pool.class_name(3),
            Err(Error::ConstantPoolTypeMismatch { expected: "Class", .. })
        ));
    }
}

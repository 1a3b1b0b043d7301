use crate::constant_pool::{ConstantPool, ConstantValue};
use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation type (`Ljava/lang/Deprecated;`).
    pub type_descriptor: String,
    pub runtime_visible: bool,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    /// Internal name of the annotation type, if the descriptor names a class.
    pub fn type_internal_name(&self) -> Option<&str> {
        self.type_descriptor
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
    }

    pub(crate) fn parse(
        reader: &mut Reader<'_>,
        cp: &ConstantPool,
        runtime_visible: bool,
    ) -> Result<Self> {
        let type_descriptor = cp.utf8(reader.read_u2()?)?.to_string();
        let elements = reader.read_counted(|r| {
            let name = cp.utf8(r.read_u2()?)?.to_string();
            Ok((name, ElementValue::parse(r, cp, runtime_visible)?))
        })?;
        Ok(Self {
            type_descriptor,
            runtime_visible,
            elements,
        })
    }

    pub(crate) fn parse_list(
        reader: &mut Reader<'_>,
        cp: &ConstantPool,
        runtime_visible: bool,
    ) -> Result<Vec<Self>> {
        reader.read_counted(|r| Annotation::parse(r, cp, runtime_visible))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    Enum {
        type_descriptor: String,
        constant: String,
    },
    /// Return descriptor of a class literal (`Ljava/lang/String;`, `V`, `I`).
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub(crate) fn parse(
        reader: &mut Reader<'_>,
        cp: &ConstantPool,
        runtime_visible: bool,
    ) -> Result<Self> {
        const ATTR: &str = "annotation element";
        let tag = reader.read_u1()?;
        Ok(match tag {
            b'B' | b'C' | b'S' | b'Z' | b'I' => {
                let value = cp.integer(reader.read_u2()?)?;
                match tag {
                    b'B' => ElementValue::Byte(value as i8),
                    b'S' => ElementValue::Short(value as i16),
                    b'Z' => ElementValue::Boolean(value != 0),
                    b'C' => ElementValue::Char(
                        char::from_u32(value as u32).ok_or(Error::MalformedAttribute(ATTR))?,
                    ),
                    _ => ElementValue::Int(value),
                }
            }
            // `s` points directly at a Utf8 entry, not at a String constant.
            b's' => ElementValue::String(cp.utf8(reader.read_u2()?)?.to_string()),
            b'J' | b'F' | b'D' => match (tag, cp.constant_value(reader.read_u2()?)?) {
                (b'J', ConstantValue::Long(v)) => ElementValue::Long(v),
                (b'F', ConstantValue::Float(v)) => ElementValue::Float(v),
                (b'D', ConstantValue::Double(v)) => ElementValue::Double(v),
                _ => return Err(Error::MalformedAttribute(ATTR)),
            },
            b'e' => ElementValue::Enum {
                type_descriptor: cp.utf8(reader.read_u2()?)?.to_string(),
                constant: cp.utf8(reader.read_u2()?)?.to_string(),
            },
            b'c' => ElementValue::Class(cp.utf8(reader.read_u2()?)?.to_string()),
            b'@' => ElementValue::Annotation(Box::new(Annotation::parse(
                reader,
                cp,
                runtime_visible,
            )?)),
            b'[' => ElementValue::Array(
                reader.read_counted(|r| ElementValue::parse(r, cp, runtime_visible))?,
            ),
            _ => return Err(Error::MalformedAttribute(ATTR)),
        })
    }
}

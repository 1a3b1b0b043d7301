use crate::error::{Error, Result};
use crate::signature::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
}

impl BaseType {
    pub fn from_descriptor_char(c: u8) -> Option<Self> {
        Some(match c {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'S' => BaseType::Short,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'F' => BaseType::Float,
            b'D' => BaseType::Double,
            b'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Short => "short",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Float => "float",
            BaseType::Double => "double",
            BaseType::Boolean => "boolean",
        }
    }
}

/// Erased type as it appears in a field or method descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    /// Internal name, e.g. `java/lang/String`.
    Object(String),
    Array(Box<FieldType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    /// `None` for `void`.
    pub return_type: Option<FieldType>,
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let mut cursor = Cursor::new(desc, Error::InvalidDescriptor);
    let ty = parse_field_type(&mut cursor)?;
    cursor.finish()?;
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let mut cursor = Cursor::new(desc, Error::InvalidDescriptor);
    cursor.expect(b'(')?;
    let mut params = Vec::new();
    while !cursor.eat(b')') {
        params.push(parse_field_type(&mut cursor)?);
    }
    let return_type = if cursor.eat(b'V') {
        None
    } else {
        Some(parse_field_type(&mut cursor)?)
    };
    cursor.finish()?;
    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

fn parse_field_type(cursor: &mut Cursor<'_>) -> Result<FieldType> {
    let c = cursor.next()?;
    if let Some(base) = BaseType::from_descriptor_char(c) {
        return Ok(FieldType::Base(base));
    }
    match c {
        b'L' => {
            let name = cursor.take_until(b';')?;
            Ok(FieldType::Object(name.to_string()))
        }
        b'[' => Ok(FieldType::Array(Box::new(parse_field_type(cursor)?))),
        _ => Err(cursor.error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn method_descriptor_with_arrays_and_void() {
        let desc = parse_method_descriptor("([[Ljava/lang/String;JZ)V").unwrap();
        assert_eq!(
            desc,
            MethodDescriptor {
                params: vec![
                    FieldType::Array(Box::new(FieldType::Array(Box::new(FieldType::Object(
                        "java/lang/String".into()
                    ))))),
                    FieldType::Base(BaseType::Long),
                    FieldType::Base(BaseType::Boolean),
                ],
                return_type: None,
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_field_descriptor("Ljava/lang/String").is_err());
        assert!(parse_field_descriptor("II").is_err());
        assert!(parse_method_descriptor("(I").is_err());
        assert!(parse_method_descriptor("()").is_err());
    }
}

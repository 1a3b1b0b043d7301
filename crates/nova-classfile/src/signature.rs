//! The generic `Signature` attribute grammar (JVMS 4.7.9.1).

use crate::descriptor::BaseType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<ReferenceTypeSignature>,
    pub interface_bounds: Vec<ReferenceTypeSignature>,
}

impl TypeParameter {
    /// Declared bounds in source order (class bound first, if any).
    pub fn bounds(&self) -> impl Iterator<Item = &ReferenceTypeSignature> {
        self.class_bound.iter().chain(self.interface_bounds.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Reference(ReferenceTypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTypeSignature {
    Class(ClassTypeSignature),
    TypeVariable(String),
    Array(Box<TypeSignature>),
}

/// `Lpkg/Outer<TA;>.Inner<TB;>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// Package in internal form with trailing slash (`java/util/`), or empty.
    pub package: String,
    /// Outermost class first.
    pub segments: Vec<SimpleClassTypeSignature>,
}

impl ClassTypeSignature {
    /// Binary internal name of the innermost class (`java/util/Map$Entry`).
    pub fn internal_name(&self) -> String {
        let mut out = self.package.clone();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('$');
            }
            out.push_str(&segment.name);
        }
        out
    }

    /// Type arguments of the innermost class.
    pub fn arguments(&self) -> &[TypeArgument] {
        self.segments
            .last()
            .map(|s| s.arguments.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleClassTypeSignature {
    pub name: String,
    pub arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Unbounded,
    Exact(ReferenceTypeSignature),
    Extends(ReferenceTypeSignature),
    Super(ReferenceTypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub superclass: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `void`.
    pub result: Option<TypeSignature>,
    pub throws: Vec<ReferenceTypeSignature>,
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut cursor = Cursor::new(sig, Error::InvalidSignature);
    let type_parameters = parse_type_parameters(&mut cursor)?;
    let superclass = parse_class_type(&mut cursor)?;
    let mut interfaces = Vec::new();
    while !cursor.at_end() {
        interfaces.push(parse_class_type(&mut cursor)?);
    }
    Ok(ClassSignature {
        type_parameters,
        superclass,
        interfaces,
    })
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut cursor = Cursor::new(sig, Error::InvalidSignature);
    let type_parameters = parse_type_parameters(&mut cursor)?;
    cursor.expect(b'(')?;
    let mut parameters = Vec::new();
    while !cursor.eat(b')') {
        parameters.push(parse_type(&mut cursor)?);
    }
    let result = if cursor.eat(b'V') {
        None
    } else {
        Some(parse_type(&mut cursor)?)
    };
    let mut throws = Vec::new();
    while cursor.eat(b'^') {
        throws.push(parse_reference_type(&mut cursor)?);
    }
    cursor.finish()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        result,
        throws,
    })
}

/// Parses a field signature, which is always a reference type.
pub fn parse_field_signature(sig: &str) -> Result<ReferenceTypeSignature> {
    let mut cursor = Cursor::new(sig, Error::InvalidSignature);
    let ty = parse_reference_type(&mut cursor)?;
    cursor.finish()?;
    Ok(ty)
}

fn parse_type_parameters(cursor: &mut Cursor<'_>) -> Result<Vec<TypeParameter>> {
    let mut params = Vec::new();
    if !cursor.eat(b'<') {
        return Ok(params);
    }
    while !cursor.eat(b'>') {
        let name = cursor.take_until(b':')?.to_string();
        // The class bound may be empty (`T::Ljava/lang/Comparable;`).
        let class_bound = match cursor.peek() {
            Some(b':') => None,
            _ => Some(parse_reference_type(cursor)?),
        };
        let mut interface_bounds = Vec::new();
        while cursor.eat(b':') {
            interface_bounds.push(parse_reference_type(cursor)?);
        }
        params.push(TypeParameter {
            name,
            class_bound,
            interface_bounds,
        });
    }
    if params.is_empty() {
        return Err(cursor.error());
    }
    Ok(params)
}

fn parse_type(cursor: &mut Cursor<'_>) -> Result<TypeSignature> {
    if let Some(base) = cursor.peek().and_then(BaseType::from_descriptor_char) {
        cursor.bump();
        return Ok(TypeSignature::Base(base));
    }
    parse_reference_type(cursor).map(TypeSignature::Reference)
}

fn parse_reference_type(cursor: &mut Cursor<'_>) -> Result<ReferenceTypeSignature> {
    match cursor.peek() {
        Some(b'L') => parse_class_type(cursor).map(ReferenceTypeSignature::Class),
        Some(b'T') => {
            cursor.bump();
            let name = cursor.take_until(b';')?;
            Ok(ReferenceTypeSignature::TypeVariable(name.to_string()))
        }
        Some(b'[') => {
            cursor.bump();
            Ok(ReferenceTypeSignature::Array(Box::new(parse_type(cursor)?)))
        }
        _ => Err(cursor.error()),
    }
}

fn parse_class_type(cursor: &mut Cursor<'_>) -> Result<ClassTypeSignature> {
    cursor.expect(b'L')?;
    let mut package = String::new();
    let mut segments = Vec::new();
    loop {
        let ident = cursor.take_identifier()?;
        match cursor.peek() {
            Some(b'/') if segments.is_empty() => {
                cursor.bump();
                package.push_str(ident);
                package.push('/');
                continue;
            }
            _ => {}
        }
        let arguments = parse_type_arguments(cursor)?;
        segments.push(SimpleClassTypeSignature {
            name: ident.to_string(),
            arguments,
        });
        if cursor.eat(b'.') {
            continue;
        }
        cursor.expect(b';')?;
        break;
    }
    Ok(ClassTypeSignature { package, segments })
}

fn parse_type_arguments(cursor: &mut Cursor<'_>) -> Result<Vec<TypeArgument>> {
    let mut args = Vec::new();
    if !cursor.eat(b'<') {
        return Ok(args);
    }
    while !cursor.eat(b'>') {
        let arg = match cursor.peek() {
            Some(b'*') => {
                cursor.bump();
                TypeArgument::Unbounded
            }
            Some(b'+') => {
                cursor.bump();
                TypeArgument::Extends(parse_reference_type(cursor)?)
            }
            Some(b'-') => {
                cursor.bump();
                TypeArgument::Super(parse_reference_type(cursor)?)
            }
            _ => TypeArgument::Exact(parse_reference_type(cursor)?),
        };
        args.push(arg);
    }
    if args.is_empty() {
        return Err(cursor.error());
    }
    Ok(args)
}

/// Byte cursor shared by the descriptor and signature grammars.
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    make_error: fn(String) -> Error,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str, make_error: fn(String) -> Error) -> Self {
        Self {
            text,
            pos: 0,
            make_error,
        }
    }

    pub(crate) fn error(&self) -> Error {
        (self.make_error)(self.text.to_string())
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn next(&mut self) -> Result<u8> {
        let c = self.peek().ok_or_else(|| self.error())?;
        self.bump();
        Ok(c)
    }

    pub(crate) fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, c: u8) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    /// Consumes text up to `terminator` and the terminator itself.
    pub(crate) fn take_until(&mut self, terminator: u8) -> Result<&'a str> {
        let rest = &self.text[self.pos..];
        let len = rest
            .bytes()
            .position(|b| b == terminator)
            .ok_or_else(|| self.error())?;
        if len == 0 {
            return Err(self.error());
        }
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    pub(crate) fn take_identifier(&mut self) -> Result<&'a str> {
        let rest = &self.text[self.pos..];
        let len = rest
            .bytes()
            .position(|b| matches!(b, b'.' | b';' | b'[' | b'/' | b'<' | b'>' | b':'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error());
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    pub(crate) fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn class(package: &str, name: &str, arguments: Vec<TypeArgument>) -> ClassTypeSignature {
        ClassTypeSignature {
            package: package.to_string(),
            segments: vec![SimpleClassTypeSignature {
                name: name.to_string(),
                arguments,
            }],
        }
    }

    #[test]
    fn class_signature_with_self_referential_bound() {
        // class Enum<E extends Enum<E>> implements Comparable<E>, Serializable
        let sig = parse_class_signature(
            "<E:Ljava/lang/Enum<TE;>;>Ljava/lang/Object;Ljava/lang/Comparable<TE;>;Ljava/io/Serializable;",
        )
        .unwrap();
        let type_var = ReferenceTypeSignature::TypeVariable("E".into());
        assert_eq!(sig.type_parameters.len(), 1);
        assert_eq!(
            sig.type_parameters[0].class_bound,
            Some(ReferenceTypeSignature::Class(class(
                "java/lang/",
                "Enum",
                vec![TypeArgument::Exact(type_var.clone())]
            )))
        );
        assert_eq!(sig.superclass.internal_name(), "java/lang/Object");
        assert_eq!(
            sig.interfaces,
            vec![
                class("java/lang/", "Comparable", vec![TypeArgument::Exact(type_var)]),
                class("java/io/", "Serializable", vec![]),
            ]
        );
    }

    #[test]
    fn interface_only_bound_and_wildcards() {
        let sig = parse_method_signature(
            "<T::Ljava/lang/Comparable<-TT;>;>(Ljava/util/List<+TT;>;[I)TT;^Ljava/io/IOException;",
        )
        .unwrap();
        let param = &sig.type_parameters[0];
        assert_eq!(param.class_bound, None);
        assert_eq!(param.bounds().count(), 1);
        let ReferenceTypeSignature::Class(list) = parse_field_signature("Ljava/util/List<*>;").unwrap()
        else {
            panic!("expected class type");
        };
        assert_eq!(list.arguments(), &[TypeArgument::Unbounded]);
        assert_eq!(sig.parameters.len(), 2);
        assert_eq!(
            sig.result,
            Some(TypeSignature::Reference(ReferenceTypeSignature::TypeVariable("T".into())))
        );
        assert_eq!(sig.throws.len(), 1);
    }

    #[test]
    fn nested_class_suffix_uses_dollar_name() {
        let ReferenceTypeSignature::Class(entry) =
            parse_field_signature("Ljava/util/Map<TK;TV;>.Entry<TK;TV;>;").unwrap()
        else {
            panic!("expected class type");
        };
        assert_eq!(entry.internal_name(), "java/util/Map$Entry");
        assert_eq!(entry.arguments().len(), 2);
    }

    #[test]
    fn malformed_signatures_are_errors() {
        assert!(parse_field_signature("Ljava/util/List<>;").is_err());
        assert!(parse_field_signature("TT").is_err());
        assert!(parse_class_signature("<>Ljava/lang/Object;").is_err());
    }
}

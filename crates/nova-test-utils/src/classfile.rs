//! A writer for real class files, so analyzer tests run against genuine
//! binary input instead of hand-built symbols.
//!
//! Only the parts the analyzer reads are written: the header, members,
//! `Signature`, `ConstantValue`, `Exceptions`, `InnerClasses`,
//! `AnnotationDefault` and runtime-visible annotations. Methods carry no
//! `Code`.

use std::collections::HashMap;

pub mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SUPER: u16 = 0x0020;
    pub const BRIDGE: u16 = 0x0040;
    pub const VARARGS: u16 = 0x0080;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;
}

const MAJOR_VERSION: u16 = 52;

/// Value of a `ConstantValue` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantSpec {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementSpec {
    Int(i32),
    Boolean(bool),
    String(String),
    /// `type_descriptor` is `Lpkg/Enum;`.
    Enum { type_descriptor: String, constant: String },
    /// A return descriptor such as `Ljava/lang/String;` or `V`.
    Class(String),
    Annotation(AnnotationSpec),
    Array(Vec<ElementSpec>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSpec {
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementSpec)>,
}

impl AnnotationSpec {
    pub fn new(type_descriptor: &str) -> Self {
        Self {
            type_descriptor: type_descriptor.to_string(),
            elements: Vec::new(),
        }
    }

    pub fn element(mut self, name: &str, value: ElementSpec) -> Self {
        self.elements.push((name.to_string(), value));
        self
    }
}

/// A field or method.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberSpec {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub constant: Option<ConstantSpec>,
    pub exceptions: Vec<String>,
    pub annotations: Vec<AnnotationSpec>,
    pub annotation_default: Option<ElementSpec>,
}

impl MemberSpec {
    pub fn new(access: u16, name: &str, descriptor: &str) -> Self {
        Self {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            constant: None,
            exceptions: Vec::new(),
            annotations: Vec::new(),
            annotation_default: None,
        }
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn constant(mut self, constant: ConstantSpec) -> Self {
        self.constant = Some(constant);
        self
    }

    pub fn throws(mut self, internal_name: &str) -> Self {
        self.exceptions.push(internal_name.to_string());
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn default_value(mut self, value: ElementSpec) -> Self {
        self.annotation_default = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
struct InnerClassSpec {
    inner: String,
    outer: Option<String>,
    name: Option<String>,
    access: u16,
}

/// Builds the bytes of one class file. Names are internal names
/// (`java/util/Map$Entry`).
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    access: u16,
    this_class: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    fields: Vec<MemberSpec>,
    methods: Vec<MemberSpec>,
    inner_classes: Vec<InnerClassSpec>,
    annotations: Vec<AnnotationSpec>,
}

impl ClassFileBuilder {
    /// A public class extending `java/lang/Object`.
    pub fn class(internal_name: &str) -> Self {
        Self {
            access: access::PUBLIC | access::SUPER,
            this_class: internal_name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn interface(internal_name: &str) -> Self {
        Self::class(internal_name).access(access::PUBLIC | access::INTERFACE | access::ABSTRACT)
    }

    pub fn annotation_type(internal_name: &str) -> Self {
        Self::class(internal_name)
            .access(access::PUBLIC | access::INTERFACE | access::ABSTRACT | access::ANNOTATION)
            .implements("java/lang/annotation/Annotation")
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn extends(mut self, internal_name: &str) -> Self {
        self.super_class = Some(internal_name.to_string());
        self
    }

    /// Only `java/lang/Object` has no superclass.
    pub fn no_superclass(mut self) -> Self {
        self.super_class = None;
        self
    }

    pub fn implements(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn field(mut self, field: MemberSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MemberSpec) -> Self {
        self.methods.push(method);
        self
    }

    /// A public no-argument constructor.
    pub fn default_constructor(self) -> Self {
        self.method(MemberSpec::new(access::PUBLIC, "<init>", "()V"))
    }

    /// An `InnerClasses` entry for a member class of `outer`.
    pub fn inner_class(mut self, inner: &str, outer: &str, simple_name: &str, access: u16) -> Self {
        self.inner_classes.push(InnerClassSpec {
            inner: inner.to_string(),
            outer: Some(outer.to_string()),
            name: Some(simple_name.to_string()),
            access,
        });
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn internal_name(&self) -> &str {
        &self.this_class
    }

    /// Binary name with dots, as looked up on a classpath.
    pub fn binary_name(&self) -> String {
        self.this_class.replace('/', ".")
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = ConstantPoolWriter::default();
        let mut body = Vec::new();

        put_u2(&mut body, self.access);
        put_u2(&mut body, pool.class(&self.this_class));
        put_u2(&mut body, self.super_class.as_deref().map_or(0, |name| pool.class(name)));
        put_u2(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            put_u2(&mut body, pool.class(interface));
        }

        for members in [&self.fields, &self.methods] {
            put_u2(&mut body, members.len() as u16);
            for member in members {
                write_member(&mut body, &mut pool, member);
            }
        }

        let mut attributes = Vec::new();
        if let Some(signature) = &self.signature {
            attributes.push(signature_attribute(&mut pool, signature));
        }
        if !self.inner_classes.is_empty() {
            let mut data = Vec::new();
            put_u2(&mut data, self.inner_classes.len() as u16);
            for entry in &self.inner_classes {
                put_u2(&mut data, pool.class(&entry.inner));
                put_u2(&mut data, entry.outer.as_deref().map_or(0, |name| pool.class(name)));
                put_u2(&mut data, entry.name.as_deref().map_or(0, |name| pool.utf8(name)));
                put_u2(&mut data, entry.access);
            }
            attributes.push(("InnerClasses", data));
        }
        if !self.annotations.is_empty() {
            attributes.push(annotations_attribute(&mut pool, &self.annotations));
        }
        write_attributes(&mut body, &mut pool, attributes);

        let mut out = Vec::with_capacity(body.len() + pool.bytes.len() + 10);
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        put_u2(&mut out, 0);
        put_u2(&mut out, MAJOR_VERSION);
        put_u2(&mut out, pool.next);
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

fn write_member(out: &mut Vec<u8>, pool: &mut ConstantPoolWriter, member: &MemberSpec) {
    put_u2(out, member.access);
    put_u2(out, pool.utf8(&member.name));
    put_u2(out, pool.utf8(&member.descriptor));

    let mut attributes = Vec::new();
    if let Some(signature) = &member.signature {
        attributes.push(signature_attribute(pool, signature));
    }
    if let Some(constant) = &member.constant {
        let index = pool.constant(constant);
        attributes.push(("ConstantValue", index.to_be_bytes().to_vec()));
    }
    if !member.exceptions.is_empty() {
        let mut data = Vec::new();
        put_u2(&mut data, member.exceptions.len() as u16);
        for exception in &member.exceptions {
            put_u2(&mut data, pool.class(exception));
        }
        attributes.push(("Exceptions", data));
    }
    if !member.annotations.is_empty() {
        attributes.push(annotations_attribute(pool, &member.annotations));
    }
    if let Some(value) = &member.annotation_default {
        let mut data = Vec::new();
        write_element(&mut data, pool, value);
        attributes.push(("AnnotationDefault", data));
    }
    write_attributes(out, pool, attributes);
}

fn signature_attribute(pool: &mut ConstantPoolWriter, signature: &str) -> (&'static str, Vec<u8>) {
    ("Signature", pool.utf8(signature).to_be_bytes().to_vec())
}

fn annotations_attribute(
    pool: &mut ConstantPoolWriter,
    annotations: &[AnnotationSpec],
) -> (&'static str, Vec<u8>) {
    let mut data = Vec::new();
    put_u2(&mut data, annotations.len() as u16);
    for annotation in annotations {
        write_annotation(&mut data, pool, annotation);
    }
    ("RuntimeVisibleAnnotations", data)
}

fn write_attributes(
    out: &mut Vec<u8>,
    pool: &mut ConstantPoolWriter,
    attributes: Vec<(&'static str, Vec<u8>)>,
) {
    put_u2(out, attributes.len() as u16);
    for (name, data) in attributes {
        put_u2(out, pool.utf8(name));
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(&data);
    }
}

fn write_annotation(out: &mut Vec<u8>, pool: &mut ConstantPoolWriter, annotation: &AnnotationSpec) {
    put_u2(out, pool.utf8(&annotation.type_descriptor));
    put_u2(out, annotation.elements.len() as u16);
    for (name, value) in &annotation.elements {
        put_u2(out, pool.utf8(name));
        write_element(out, pool, value);
    }
}

fn write_element(out: &mut Vec<u8>, pool: &mut ConstantPoolWriter, value: &ElementSpec) {
    match value {
        ElementSpec::Int(value) => {
            out.push(b'I');
            put_u2(out, pool.constant(&ConstantSpec::Int(*value)));
        }
        ElementSpec::Boolean(value) => {
            out.push(b'Z');
            put_u2(out, pool.constant(&ConstantSpec::Int(i32::from(*value))));
        }
        ElementSpec::String(value) => {
            out.push(b's');
            put_u2(out, pool.utf8(value));
        }
        ElementSpec::Enum {
            type_descriptor,
            constant,
        } => {
            out.push(b'e');
            put_u2(out, pool.utf8(type_descriptor));
            put_u2(out, pool.utf8(constant));
        }
        ElementSpec::Class(descriptor) => {
            out.push(b'c');
            put_u2(out, pool.utf8(descriptor));
        }
        ElementSpec::Annotation(annotation) => {
            out.push(b'@');
            write_annotation(out, pool, annotation);
        }
        ElementSpec::Array(values) => {
            out.push(b'[');
            put_u2(out, values.len() as u16);
            for value in values {
                write_element(out, pool, value);
            }
        }
    }
}

fn put_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PoolKey {
    Utf8(String),
    Class(String),
    String(String),
    Integer(i32),
    Long(i64),
    Float(u32),
    Double(u64),
}

/// Interning constant pool; indices start at 1 and wide constants take
/// two slots.
#[derive(Debug)]
struct ConstantPoolWriter {
    bytes: Vec<u8>,
    indices: HashMap<PoolKey, u16>,
    next: u16,
}

impl Default for ConstantPoolWriter {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            indices: HashMap::new(),
            next: 1,
        }
    }
}

impl ConstantPoolWriter {
    fn utf8(&mut self, value: &str) -> u16 {
        let key = PoolKey::Utf8(value.to_string());
        if let Some(index) = self.indices.get(&key) {
            return *index;
        }
        let encoded = modified_utf8(value);
        self.bytes.push(1);
        put_u2(&mut self.bytes, encoded.len() as u16);
        self.bytes.extend_from_slice(&encoded);
        self.insert(key, 1)
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        let key = PoolKey::Class(internal_name.to_string());
        if let Some(index) = self.indices.get(&key) {
            return *index;
        }
        let name = self.utf8(internal_name);
        self.bytes.push(7);
        put_u2(&mut self.bytes, name);
        self.insert(key, 1)
    }

    fn constant(&mut self, constant: &ConstantSpec) -> u16 {
        let key = match constant {
            ConstantSpec::Int(value) => PoolKey::Integer(*value),
            ConstantSpec::Long(value) => PoolKey::Long(*value),
            ConstantSpec::Float(value) => PoolKey::Float(value.to_bits()),
            ConstantSpec::Double(value) => PoolKey::Double(value.to_bits()),
            ConstantSpec::String(value) => PoolKey::String(value.clone()),
        };
        if let Some(index) = self.indices.get(&key) {
            return *index;
        }
        match constant {
            ConstantSpec::Int(value) => {
                self.bytes.push(3);
                self.bytes.extend_from_slice(&value.to_be_bytes());
                self.insert(key, 1)
            }
            ConstantSpec::Float(value) => {
                self.bytes.push(4);
                self.bytes.extend_from_slice(&value.to_bits().to_be_bytes());
                self.insert(key, 1)
            }
            ConstantSpec::Long(value) => {
                self.bytes.push(5);
                self.bytes.extend_from_slice(&value.to_be_bytes());
                self.insert(key, 2)
            }
            ConstantSpec::Double(value) => {
                self.bytes.push(6);
                self.bytes.extend_from_slice(&value.to_bits().to_be_bytes());
                self.insert(key, 2)
            }
            ConstantSpec::String(value) => {
                let utf8 = self.utf8(value);
                self.bytes.push(8);
                put_u2(&mut self.bytes, utf8);
                self.insert(key, 1)
            }
        }
    }

    fn insert(&mut self, key: PoolKey, slots: u16) -> u16 {
        let index = self.next;
        self.next += slots;
        self.indices.insert(key, index);
        index
    }
}

/// JVM modified UTF-8: NUL as two bytes, supplementary characters as
/// surrogate pairs.
fn modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_classfile::{ClassFile, ConstantValue, ElementValue};
    use pretty_assertions::assert_eq;

    #[test]
    fn written_classes_parse_back() {
        let bytes = ClassFileBuilder::class("p/Holder$Inner")
            .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .field(
                MemberSpec::new(access::PUBLIC | access::STATIC | access::FINAL, "BIG", "J")
                    .constant(ConstantSpec::Long(1 << 40)),
            )
            .field(
                MemberSpec::new(access::PUBLIC | access::STATIC | access::FINAL, "NAME", "Ljava/lang/String;")
                    .constant(ConstantSpec::String("n\0me".into())),
            )
            .method(
                MemberSpec::new(access::PUBLIC, "get", "()Ljava/lang/Object;")
                    .signature("()TT;")
                    .throws("java/io/IOException")
                    .annotation(AnnotationSpec::new("Ljava/lang/Deprecated;")),
            )
            .inner_class("p/Holder$Inner", "p/Holder", "Inner", access::PUBLIC | access::STATIC)
            .build();

        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(class.this_class, "p/Holder$Inner");
        assert_eq!(class.super_class.as_deref(), Some("java/lang/Object"));
        assert_eq!(class.signature.as_deref(), Some("<T:Ljava/lang/Object;>Ljava/lang/Object;"));
        assert_eq!(class.fields[0].constant_value, Some(ConstantValue::Long(1 << 40)));
        assert_eq!(class.fields[1].constant_value, Some(ConstantValue::String("n\0me".into())));
        assert_eq!(class.methods[0].exceptions, vec!["java/io/IOException".to_string()]);
        assert_eq!(class.methods[0].annotations.len(), 1);
        let own = class.own_inner_class_entry().unwrap();
        assert_eq!(own.inner_name.as_deref(), Some("Inner"));
    }

    #[test]
    fn annotation_defaults_are_written() {
        let bytes = ClassFileBuilder::annotation_type("p/Info")
            .method(
                MemberSpec::new(access::PUBLIC | access::ABSTRACT, "tags", "()[Ljava/lang/String;")
                    .default_value(ElementSpec::Array(vec![ElementSpec::String("x".into())])),
            )
            .build();
        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(
            class.methods[0].annotation_default,
            Some(ElementValue::Array(vec![ElementValue::String("x".into())]))
        );
    }
}

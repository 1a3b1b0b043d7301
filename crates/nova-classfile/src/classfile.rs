use crate::annotation::{Annotation, ElementValue};
use crate::constant_pool::{ConstantPool, ConstantValue};
use crate::error::{Error, Result};
use crate::reader::Reader;

/// JVM access and property flags (`access_flags` items).
pub mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    /// `ACC_SUPER` on classes.
    pub const SYNCHRONIZED: u16 = 0x0020;
    /// `ACC_BRIDGE` on methods.
    pub const VOLATILE: u16 = 0x0040;
    /// `ACC_VARARGS` on methods.
    pub const TRANSIENT: u16 = 0x0080;
    pub const NATIVE: u16 = 0x0100;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const STRICT: u16 = 0x0800;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;

    pub const BRIDGE: u16 = VOLATILE;
    pub const VARARGS: u16 = TRANSIENT;
}

const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal name, e.g. `java/util/ArrayList`.
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub signature: Option<String>,
    pub annotations: Vec<Annotation>,
    pub inner_classes: Vec<InnerClassEntry>,
    pub enclosing_method: Option<EnclosingMethod>,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub constant_value: Option<ConstantValue>,
    pub annotations: Vec<Annotation>,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Internal names from the `Exceptions` attribute.
    pub exceptions: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub parameter_annotations: Vec<Vec<Annotation>>,
    pub annotation_default: Option<ElementValue>,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassEntry {
    pub inner_class: String,
    /// `None` for local and anonymous classes.
    pub outer_class: Option<String>,
    /// `None` for anonymous classes.
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingMethod {
    pub class: String,
    pub method: Option<(String, String)>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic(magic));
        }
        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.class_name(reader.read_u2()?)?.to_string();
        let super_class = cp.optional_class_name(reader.read_u2()?)?.map(str::to_string);
        let interfaces =
            reader.read_counted(|r| Ok(cp.class_name(r.read_u2()?)?.to_string()))?;

        let fields = reader.read_counted(|r| {
            let (access_flags, name, descriptor) = member_header(r, &cp)?;
            let attrs = Attributes::parse(r, &cp)?;
            Ok(FieldInfo {
                access_flags,
                name,
                descriptor,
                signature: attrs.signature,
                constant_value: attrs.constant_value,
                annotations: attrs.annotations,
                deprecated: attrs.deprecated,
            })
        })?;
        let methods = reader.read_counted(|r| {
            let (access_flags, name, descriptor) = member_header(r, &cp)?;
            let attrs = Attributes::parse(r, &cp)?;
            Ok(MethodInfo {
                access_flags,
                name,
                descriptor,
                signature: attrs.signature,
                exceptions: attrs.exceptions,
                annotations: attrs.annotations,
                parameter_annotations: attrs.parameter_annotations,
                annotation_default: attrs.annotation_default,
                deprecated: attrs.deprecated,
            })
        })?;

        let attrs = Attributes::parse(&mut reader, &cp)?;
        reader.finish()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            signature: attrs.signature,
            annotations: attrs.annotations,
            inner_classes: attrs.inner_classes,
            enclosing_method: attrs.enclosing_method,
            deprecated: attrs.deprecated,
        })
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & access::INTERFACE != 0
    }

    /// The `InnerClasses` entry describing this class itself, if it is nested.
    pub fn own_inner_class_entry(&self) -> Option<&InnerClassEntry> {
        self.inner_classes
            .iter()
            .find(|entry| entry.inner_class == self.this_class)
    }
}

fn member_header(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<(u16, String, String)> {
    let access_flags = reader.read_u2()?;
    let name = cp.utf8(reader.read_u2()?)?.to_string();
    let descriptor = cp.utf8(reader.read_u2()?)?.to_string();
    Ok((access_flags, name, descriptor))
}

/// Union of the attributes the analyzer consumes; which ones are present
/// depends on whether a class, field or method was parsed.
#[derive(Default)]
struct Attributes {
    signature: Option<String>,
    constant_value: Option<ConstantValue>,
    exceptions: Vec<String>,
    annotations: Vec<Annotation>,
    parameter_annotations: Vec<Vec<Annotation>>,
    annotation_default: Option<ElementValue>,
    inner_classes: Vec<InnerClassEntry>,
    enclosing_method: Option<EnclosingMethod>,
    deprecated: bool,
}

impl Attributes {
    fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let mut attrs = Attributes::default();
        let count = reader.read_u2()?;
        for _ in 0..count {
            let name = cp.utf8(reader.read_u2()?)?;
            let len = reader.read_u4()? as usize;
            let mut body = Reader::new(reader.read_bytes(len)?);
            match name {
                "Signature" => {
                    attrs.signature = Some(cp.utf8(body.read_u2()?)?.to_string());
                }
                "ConstantValue" => {
                    attrs.constant_value = Some(cp.constant_value(body.read_u2()?)?);
                }
                "Exceptions" => {
                    attrs.exceptions =
                        body.read_counted(|r| Ok(cp.class_name(r.read_u2()?)?.to_string()))?;
                }
                "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                    let visible = name == "RuntimeVisibleAnnotations";
                    attrs
                        .annotations
                        .extend(Annotation::parse_list(&mut body, cp, visible)?);
                }
                "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                    let visible = name == "RuntimeVisibleParameterAnnotations";
                    let params = body.read_u1()? as usize;
                    if attrs.parameter_annotations.len() < params {
                        attrs.parameter_annotations.resize_with(params, Vec::new);
                    }
                    for slot in attrs.parameter_annotations.iter_mut().take(params) {
                        slot.extend(Annotation::parse_list(&mut body, cp, visible)?);
                    }
                }
                "AnnotationDefault" => {
                    attrs.annotation_default = Some(ElementValue::parse(&mut body, cp, true)?);
                }
                "InnerClasses" => {
                    attrs.inner_classes = body.read_counted(|r| {
                        let inner_class = cp.class_name(r.read_u2()?)?.to_string();
                        let outer_class = cp.optional_class_name(r.read_u2()?)?.map(str::to_string);
                        let inner_name = cp.optional_utf8(r.read_u2()?)?.map(str::to_string);
                        Ok(InnerClassEntry {
                            inner_class,
                            outer_class,
                            inner_name,
                            access_flags: r.read_u2()?,
                        })
                    })?;
                }
                "EnclosingMethod" => {
                    let class = cp.class_name(body.read_u2()?)?.to_string();
                    let method = match body.read_u2()? {
                        0 => None,
                        index => match cp.entry(index)? {
                            crate::constant_pool::Constant::NameAndType { name, descriptor } => {
                                Some((cp.utf8(*name)?.to_string(), cp.utf8(*descriptor)?.to_string()))
                            }
                            _ => return Err(Error::MalformedAttribute("EnclosingMethod")),
                        },
                    };
                    attrs.enclosing_method = Some(EnclosingMethod { class, method });
                }
                "Deprecated" => attrs.deprecated = true,
                // Code, LineNumberTable, StackMapTable, ... carry nothing we need.
                _ => continue,
            }
            body.finish()
                .map_err(|_| Error::MalformedAttribute(static_attribute_name(name)))?;
        }
        Ok(attrs)
    }
}

fn static_attribute_name(name: &str) -> &'static str {
    match name {
        "Signature" => "Signature",
        "ConstantValue" => "ConstantValue",
        "Exceptions" => "Exceptions",
        "InnerClasses" => "InnerClasses",
        "EnclosingMethod" => "EnclosingMethod",
        "AnnotationDefault" => "AnnotationDefault",
        _ => "annotations",
    }
}

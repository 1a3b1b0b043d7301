//! Read-only parser for the JVM class-file format, limited to the parts a
//! semantic analyzer consumes: the class header, members, generic
//! signatures, constant values and annotations. Method bodies are skipped.

#![forbid(unsafe_code)]

mod annotation;
mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod reader;
mod signature;

pub use crate::annotation::{Annotation, ElementValue};
pub use crate::classfile::{
    access, ClassFile, EnclosingMethod, FieldInfo, InnerClassEntry, MethodInfo,
};
pub use crate::constant_pool::ConstantValue;
pub use crate::descriptor::{
    parse_field_descriptor, parse_method_descriptor, BaseType, FieldType, MethodDescriptor,
};
pub use crate::error::{Error, Result};
pub use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassTypeSignature, MethodSignature, ReferenceTypeSignature, SimpleClassTypeSignature,
    TypeArgument, TypeParameter, TypeSignature,
};

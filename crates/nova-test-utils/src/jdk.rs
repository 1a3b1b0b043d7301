//! A minimal JDK as real class files: enough of `java.lang`, `java.io` and
//! `java.util` for boxing, string concatenation, exceptions, enums and the
//! collection hierarchy.

use nova_classpath::InMemoryClasspath;

use crate::classfile::{access, ClassFileBuilder, ConstantSpec, MemberSpec};

const PUBLIC_ABSTRACT: u16 = access::PUBLIC | access::ABSTRACT;
const PUBLIC_STATIC: u16 = access::PUBLIC | access::STATIC;
const CONSTANT: u16 = access::PUBLIC | access::STATIC | access::FINAL;
const FINAL_CLASS: u16 = access::PUBLIC | access::FINAL | access::SUPER;
const ABSTRACT_CLASS: u16 = access::PUBLIC | access::ABSTRACT | access::SUPER;

/// The fixture classes, so tests can add their own before building a
/// classpath.
pub fn minimal_jdk_classes() -> Vec<ClassFileBuilder> {
    let mut classes = vec![
        ClassFileBuilder::class("java/lang/Object")
            .no_superclass()
            .default_constructor()
            .method(MemberSpec::new(access::PUBLIC, "equals", "(Ljava/lang/Object;)Z"))
            .method(MemberSpec::new(access::PUBLIC, "hashCode", "()I"))
            .method(MemberSpec::new(access::PUBLIC, "toString", "()Ljava/lang/String;"))
            .method(
                MemberSpec::new(access::PUBLIC | access::FINAL, "getClass", "()Ljava/lang/Class;")
                    .signature("()Ljava/lang/Class<*>;"),
            ),
        ClassFileBuilder::interface("java/io/Serializable"),
        ClassFileBuilder::interface("java/lang/Cloneable"),
        ClassFileBuilder::interface("java/util/RandomAccess"),
        ClassFileBuilder::interface("java/lang/annotation/Annotation"),
        ClassFileBuilder::annotation_type("java/lang/Deprecated"),
        ClassFileBuilder::interface("java/lang/CharSequence")
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "length", "()I"))
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "charAt", "(I)C")),
        ClassFileBuilder::interface("java/lang/Comparable")
            .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "compareTo", "(Ljava/lang/Object;)I").signature("(TT;)I")),
        ClassFileBuilder::class("java/lang/String")
            .access(FINAL_CLASS)
            .implements("java/io/Serializable")
            .implements("java/lang/Comparable")
            .implements("java/lang/CharSequence")
            .signature(
                "Ljava/lang/Object;Ljava/io/Serializable;Ljava/lang/Comparable<Ljava/lang/String;>;Ljava/lang/CharSequence;",
            )
            .default_constructor()
            .method(MemberSpec::new(access::PUBLIC, "length", "()I"))
            .method(MemberSpec::new(access::PUBLIC, "charAt", "(I)C"))
            .method(MemberSpec::new(access::PUBLIC, "compareTo", "(Ljava/lang/String;)I"))
            .method(MemberSpec::new(access::PUBLIC, "concat", "(Ljava/lang/String;)Ljava/lang/String;"))
            .method(MemberSpec::new(PUBLIC_STATIC, "valueOf", "(Ljava/lang/Object;)Ljava/lang/String;"))
            .method(MemberSpec::new(PUBLIC_STATIC, "valueOf", "(I)Ljava/lang/String;")),
        ClassFileBuilder::class("java/lang/Number")
            .access(ABSTRACT_CLASS)
            .implements("java/io/Serializable")
            .default_constructor()
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "intValue", "()I"))
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "longValue", "()J"))
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "doubleValue", "()D")),
        ClassFileBuilder::class("java/lang/Math")
            .access(FINAL_CLASS)
            .method(MemberSpec::new(PUBLIC_STATIC, "max", "(II)I"))
            .method(MemberSpec::new(PUBLIC_STATIC, "max", "(JJ)J"))
            .method(MemberSpec::new(PUBLIC_STATIC, "max", "(DD)D"))
            .method(MemberSpec::new(PUBLIC_STATIC, "abs", "(I)I")),
        ClassFileBuilder::class("java/lang/Void").access(FINAL_CLASS),
        ClassFileBuilder::class("java/lang/Class")
            .access(FINAL_CLASS)
            .implements("java/io/Serializable")
            .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/io/Serializable;")
            .method(MemberSpec::new(access::PUBLIC, "getName", "()Ljava/lang/String;")),
        ClassFileBuilder::class("java/lang/Enum")
            .access(ABSTRACT_CLASS)
            .implements("java/lang/Comparable")
            .implements("java/io/Serializable")
            .signature(
                "<E:Ljava/lang/Enum<TE;>;>Ljava/lang/Object;Ljava/lang/Comparable<TE;>;Ljava/io/Serializable;",
            )
            .method(MemberSpec::new(access::PROTECTED, "<init>", "(Ljava/lang/String;I)V"))
            .method(MemberSpec::new(access::PUBLIC | access::FINAL, "name", "()Ljava/lang/String;"))
            .method(MemberSpec::new(access::PUBLIC | access::FINAL, "ordinal", "()I")),
        ClassFileBuilder::class("java/lang/Throwable")
            .implements("java/io/Serializable")
            .default_constructor()
            .method(MemberSpec::new(access::PUBLIC, "<init>", "(Ljava/lang/String;)V"))
            .method(MemberSpec::new(access::PUBLIC, "getMessage", "()Ljava/lang/String;")),
        ClassFileBuilder::class("java/lang/Exception")
            .extends("java/lang/Throwable")
            .default_constructor()
            .method(MemberSpec::new(access::PUBLIC, "<init>", "(Ljava/lang/String;)V")),
        ClassFileBuilder::class("java/lang/RuntimeException")
            .extends("java/lang/Exception")
            .default_constructor()
            .method(MemberSpec::new(access::PUBLIC, "<init>", "(Ljava/lang/String;)V")),
        ClassFileBuilder::interface("java/lang/Iterable")
            .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .method(
                MemberSpec::new(PUBLIC_ABSTRACT, "iterator", "()Ljava/util/Iterator;")
                    .signature("()Ljava/util/Iterator<TT;>;"),
            ),
        ClassFileBuilder::interface("java/util/Iterator")
            .signature("<E:Ljava/lang/Object;>Ljava/lang/Object;")
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "hasNext", "()Z"))
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "next", "()Ljava/lang/Object;").signature("()TE;")),
        ClassFileBuilder::interface("java/util/Collection")
            .implements("java/lang/Iterable")
            .signature("<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/lang/Iterable<TE;>;")
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "size", "()I"))
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "isEmpty", "()Z"))
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "add", "(Ljava/lang/Object;)Z").signature("(TE;)Z")),
        ClassFileBuilder::interface("java/util/List")
            .implements("java/util/Collection")
            .signature("<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Collection<TE;>;")
            .method(MemberSpec::new(PUBLIC_ABSTRACT, "get", "(I)Ljava/lang/Object;").signature("(I)TE;"))
            .method(
                MemberSpec::new(PUBLIC_STATIC, "of", "()Ljava/util/List;")
                    .signature("<E:Ljava/lang/Object;>()Ljava/util/List<TE;>;"),
            ),
        ClassFileBuilder::class("java/util/AbstractCollection")
            .access(ABSTRACT_CLASS)
            .implements("java/util/Collection")
            .signature("<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Collection<TE;>;")
            .method(MemberSpec::new(access::PROTECTED, "<init>", "()V")),
        ClassFileBuilder::class("java/util/AbstractList")
            .access(ABSTRACT_CLASS)
            .extends("java/util/AbstractCollection")
            .implements("java/util/List")
            .signature("<E:Ljava/lang/Object;>Ljava/util/AbstractCollection<TE;>;Ljava/util/List<TE;>;")
            .method(MemberSpec::new(access::PROTECTED, "<init>", "()V")),
        ClassFileBuilder::class("java/util/ArrayList")
            .extends("java/util/AbstractList")
            .implements("java/util/List")
            .implements("java/util/RandomAccess")
            .implements("java/lang/Cloneable")
            .implements("java/io/Serializable")
            .signature(
                "<E:Ljava/lang/Object;>Ljava/util/AbstractList<TE;>;Ljava/util/List<TE;>;Ljava/util/RandomAccess;Ljava/lang/Cloneable;Ljava/io/Serializable;",
            )
            .default_constructor()
            .method(MemberSpec::new(access::PUBLIC, "<init>", "(I)V"))
            .method(
                MemberSpec::new(access::PUBLIC, "<init>", "(Ljava/util/Collection;)V")
                    .signature("(Ljava/util/Collection<+TE;>;)V"),
            )
            .method(MemberSpec::new(access::PUBLIC, "get", "(I)Ljava/lang/Object;").signature("(I)TE;"))
            .method(MemberSpec::new(access::PUBLIC, "add", "(Ljava/lang/Object;)Z").signature("(TE;)Z"))
            .method(MemberSpec::new(access::PUBLIC, "size", "()I")),
    ];
    classes.extend(boxed_classes());
    classes
}

/// `java.lang` wrappers of the eight primitives.
fn boxed_classes() -> Vec<ClassFileBuilder> {
    let numeric = [
        ("Byte", "B", ConstantSpec::Int(i32::from(i8::MAX))),
        ("Short", "S", ConstantSpec::Int(i32::from(i16::MAX))),
        ("Integer", "I", ConstantSpec::Int(i32::MAX)),
        ("Long", "J", ConstantSpec::Long(i64::MAX)),
        ("Float", "F", ConstantSpec::Float(f32::MAX)),
        ("Double", "D", ConstantSpec::Double(f64::MAX)),
    ];
    let mut classes: Vec<ClassFileBuilder> = numeric
        .into_iter()
        .map(|(name, descriptor, max)| {
            let internal = format!("java/lang/{name}");
            ClassFileBuilder::class(&internal)
                .access(FINAL_CLASS)
                .extends("java/lang/Number")
                .implements("java/lang/Comparable")
                .signature(&format!("Ljava/lang/Number;Ljava/lang/Comparable<L{internal};>;"))
                .field(MemberSpec::new(CONSTANT, "MAX_VALUE", descriptor).constant(max))
                .method(MemberSpec::new(access::PUBLIC, "<init>", &format!("({descriptor})V")))
                .method(MemberSpec::new(PUBLIC_STATIC, "valueOf", &format!("({descriptor})L{internal};")))
        })
        .collect();
    classes.push(
        ClassFileBuilder::class("java/lang/Character")
            .access(FINAL_CLASS)
            .implements("java/io/Serializable")
            .implements("java/lang/Comparable")
            .signature("Ljava/lang/Object;Ljava/io/Serializable;Ljava/lang/Comparable<Ljava/lang/Character;>;")
            .method(MemberSpec::new(access::PUBLIC, "charValue", "()C"))
            .method(MemberSpec::new(PUBLIC_STATIC, "valueOf", "(C)Ljava/lang/Character;")),
    );
    classes.push(
        ClassFileBuilder::class("java/lang/Boolean")
            .access(FINAL_CLASS)
            .implements("java/io/Serializable")
            .implements("java/lang/Comparable")
            .signature("Ljava/lang/Object;Ljava/io/Serializable;Ljava/lang/Comparable<Ljava/lang/Boolean;>;")
            .field(MemberSpec::new(CONSTANT, "TRUE", "Ljava/lang/Boolean;"))
            .method(MemberSpec::new(access::PUBLIC, "booleanValue", "()Z"))
            .method(MemberSpec::new(PUBLIC_STATIC, "valueOf", "(Z)Ljava/lang/Boolean;")),
    );
    classes
}

/// Builds a classpath from class file builders.
pub fn classpath_of(classes: &[ClassFileBuilder]) -> InMemoryClasspath {
    let mut classpath = InMemoryClasspath::new();
    for class in classes {
        classpath.insert_class(&class.binary_name(), class.build());
    }
    classpath
}

pub fn minimal_jdk() -> InMemoryClasspath {
    classpath_of(&minimal_jdk_classes())
}

/// The minimal JDK plus extra classes.
pub fn minimal_jdk_with(extra: Vec<ClassFileBuilder>) -> InMemoryClasspath {
    let mut classes = minimal_jdk_classes();
    classes.extend(extra);
    classpath_of(&classes)
}

#[cfg(test)]
mod tests {
    use nova_classfile::ClassFile;
    use nova_classpath::ClassProvider;

    use super::*;

    #[test]
    fn every_fixture_parses() {
        let classpath = minimal_jdk();
        for class in minimal_jdk_classes() {
            let bytes = classpath.bytes_for_class(&class.binary_name()).unwrap();
            let parsed = ClassFile::parse(&bytes).unwrap();
            assert_eq!(parsed.this_class, class.internal_name());
        }
        assert!(classpath.has_resource("java/util/ArrayList.class"));
    }
}

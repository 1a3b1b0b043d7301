use bitflags::bitflags;
use nova_classfile::access;

bitflags! {
    /// Access and modifier flags of a symbol.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const SYNCHRONIZED = 1 << 5;
        const VOLATILE = 1 << 6;
        const TRANSIENT = 1 << 7;
        const NATIVE = 1 << 8;
        const INTERFACE = 1 << 9;
        const ABSTRACT = 1 << 10;
        const STRICTFP = 1 << 11;
        const SYNTHETIC = 1 << 12;
        const ANNOTATION = 1 << 13;
        const ENUM = 1 << 14;
        const DEPRECATED = 1 << 17;
        const VARARGS = 1 << 18;
        const DEFAULT = 1 << 19;

        const ACCESS = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
    }
}

impl Flags {
    /// Maps class-file `access_flags` of a class or field.
    pub fn from_class_access(bits: u16) -> Self {
        let mut flags = Self::from_common_access(bits);
        for (acc, flag) in [
            (access::VOLATILE, Flags::VOLATILE),
            (access::TRANSIENT, Flags::TRANSIENT),
            (access::INTERFACE, Flags::INTERFACE),
            (access::ANNOTATION, Flags::ANNOTATION),
            (access::ENUM, Flags::ENUM),
        ] {
            if bits & acc != 0 {
                flags |= flag;
            }
        }
        flags
    }

    /// Maps class-file `access_flags` of a method; `ACC_VARARGS` shares its
    /// bit with `ACC_TRANSIENT` and bridge methods are never entered.
    pub fn from_method_access(bits: u16) -> Self {
        let mut flags = Self::from_common_access(bits);
        if bits & access::SYNCHRONIZED != 0 {
            flags |= Flags::SYNCHRONIZED;
        }
        if bits & access::VARARGS != 0 {
            flags |= Flags::VARARGS;
        }
        flags
    }

    fn from_common_access(bits: u16) -> Self {
        let mut flags = Flags::empty();
        for (acc, flag) in [
            (access::PUBLIC, Flags::PUBLIC),
            (access::PRIVATE, Flags::PRIVATE),
            (access::PROTECTED, Flags::PROTECTED),
            (access::STATIC, Flags::STATIC),
            (access::FINAL, Flags::FINAL),
            (access::NATIVE, Flags::NATIVE),
            (access::ABSTRACT, Flags::ABSTRACT),
            (access::STRICT, Flags::STRICTFP),
            (access::SYNTHETIC, Flags::SYNTHETIC),
        ] {
            if bits & acc != 0 {
                flags |= flag;
            }
        }
        flags
    }

    pub fn access(self) -> Flags {
        self & Flags::ACCESS
    }

    /// Package-private: none of the access modifiers.
    pub fn is_package_private(self) -> bool {
        self.access().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_varargs_bit_is_not_transient() {
        let flags = Flags::from_method_access(access::PUBLIC | access::VARARGS);
        assert_eq!(flags, Flags::PUBLIC | Flags::VARARGS);
        let field = Flags::from_class_access(access::PRIVATE | access::TRANSIENT);
        assert_eq!(field, Flags::PRIVATE | Flags::TRANSIENT);
    }

    #[test]
    fn package_private_has_no_access_bits() {
        assert!(Flags::STATIC.is_package_private());
        assert!(!(Flags::STATIC | Flags::PROTECTED).is_package_private());
    }
}

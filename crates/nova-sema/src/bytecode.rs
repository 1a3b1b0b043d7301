//! Completes symbols of classes read from the classpath.
//!
//! A class is first registered as a placeholder under its flat binary name
//! (`java.util.Map$Entry`) and only parsed when something reads a
//! completion-dependent field.

use nova_classfile::{
    access, parse_class_signature, parse_field_descriptor, parse_field_signature,
    parse_method_descriptor, parse_method_signature, Annotation, ClassFile, ClassTypeSignature,
    ConstantValue, ElementValue, FieldInfo, FieldType, MethodInfo, ReferenceTypeSignature,
    TypeArgument, TypeParameter, TypeSignature,
};

use crate::context::Sema;
use crate::flags::Flags;
use crate::ids::{SymbolId, TypeId};
use crate::subst::TypeSubstitution;
use crate::symbols::{
    AnnotationInstance, AnnotationValue, Completer, Constant, SymbolData, SymbolKind,
};
use crate::tree::Name;
use crate::types::{Primitive, WildcardKind};

/// `Outer` for `Outer$Inner`; empty for top-level names and names whose
/// only `$` is leading or trailing.
fn enclosing_class_name(short_name: &str) -> &str {
    match short_name.rfind('$') {
        Some(index) if index > 0 && index + 1 < short_name.len() => &short_name[..index],
        _ => "",
    }
}

fn split_package(flat_name: &str) -> (&str, &str) {
    match flat_name.rfind('.') {
        Some(index) => (&flat_name[..index], &flat_name[index + 1..]),
        None => ("", flat_name),
    }
}

fn flat_name(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}

impl<'a> Sema<'a> {
    /// Package symbol for a dotted name, creating the chain of parent
    /// packages on first use.
    pub fn enter_package(&mut self, full_name: &str) -> SymbolId {
        if let Some(package) = self.registry.packages.get(full_name) {
            return *package;
        }
        let owner = match full_name.rfind('.') {
            Some(index) => self.enter_package(&full_name[..index]),
            None => self.wk.default_package,
        };
        let package = self.new_package(full_name.into(), Some(owner));
        self.set_completer(package, Completer::Bytecode);
        self.registry.packages.insert(full_name.to_string(), package);
        package
    }

    /// Placeholder symbol for a binary class, registered once per flat name.
    pub fn class_symbol(&mut self, flat_name: &str) -> SymbolId {
        self.class_symbol_with_flags(flat_name, Flags::empty())
    }

    fn class_symbol_with_flags(&mut self, flat_name: &str, flags: Flags) -> SymbolId {
        if let Some(symbol) = self.registry.classes.get(flat_name) {
            return *symbol;
        }
        let (package_name, short_name) = split_package(flat_name);
        let enclosing = enclosing_class_name(short_name);
        let (owner, simple_name) = if enclosing.is_empty() {
            (self.enter_package(package_name), short_name)
        } else {
            let outer_name = if package_name.is_empty() {
                enclosing.to_string()
            } else {
                format!("{package_name}.{enclosing}")
            };
            (
                self.class_symbol(&outer_name),
                &short_name[enclosing.len() + 1..],
            )
        };
        let symbol = self.new_type_symbol(flags, simple_name.into(), owner);
        if let Some(data) = self.symbol_mut(symbol).type_data_mut() {
            data.bytecode_name = Some(flat_name.to_string());
        }
        self.set_completer(symbol, Completer::Bytecode);
        self.registry.classes.insert(flat_name.to_string(), symbol);
        symbol
    }

    /// The class with this flat name if it is already known or present on
    /// the classpath.
    pub fn load_class(&mut self, flat_name: &str) -> Option<SymbolId> {
        if let Some(symbol) = self.registry.classes.get(flat_name) {
            return Some(*symbol);
        }
        if !self
            .provider
            .has_resource(&nova_classpath::class_resource_path(flat_name))
        {
            return None;
        }
        Some(self.class_symbol(flat_name))
    }

    pub(crate) fn record_not_found(&mut self, name: &str) {
        if self.registry.not_found.insert(name.to_string())
            && self.config.report_missing_classes
            && !name.ends_with("package-info")
        {
            tracing::warn!(target: "nova.sema", class = name, "class not found on classpath");
        }
    }

    pub(crate) fn complete_from_bytecode(&mut self, symbol: SymbolId) {
        if self.kind(symbol) == SymbolKind::Package {
            self.complete_package(symbol);
            return;
        }
        let Some(name) = self
            .symbol(symbol)
            .type_data()
            .and_then(|data| data.bytecode_name.clone())
        else {
            return;
        };
        let class_file = match self.provider.bytes_for_class(&name) {
            Some(bytes) => match ClassFile::parse(&bytes) {
                Ok(class_file) if flat_name(&class_file.this_class) == name => Some(class_file),
                Ok(class_file) => {
                    tracing::warn!(
                        target: "nova.sema",
                        class = name,
                        found = class_file.this_class,
                        "class file declares a different class"
                    );
                    None
                }
                Err(error) => {
                    tracing::warn!(target: "nova.sema", class = name, %error, "malformed class file");
                    None
                }
            },
            None => {
                self.record_not_found(&name);
                None
            }
        };
        match class_file {
            Some(class_file) => {
                tracing::debug!(target: "nova.sema", class = name, "completing class from bytecode");
                self.complete_class(symbol, &class_file);
            }
            None => {
                let unknown = self.wk.unknown_type;
                self.set_supertypes(symbol, Some(unknown), Vec::new());
            }
        }
    }

    fn complete_package(&mut self, package: SymbolId) {
        let name = self.qualified_child_name(package, "package-info");
        if let Some(info) = self.load_class(&name) {
            self.complete(info);
            if let SymbolData::Package { package_info, .. } = &mut self.symbol_mut(package).data {
                *package_info = Some(info);
            }
        }
    }

    fn complete_class(&mut self, class: SymbolId, class_file: &ClassFile) {
        let pending_mark = self.pending_enum_values.len();
        let mut flags = Flags::from_class_access(class_file.access_flags);
        if let Some(entry) = class_file.own_inner_class_entry() {
            flags = Flags::from_class_access(entry.access_flags);
        }
        if class_file.deprecated || has_deprecated(&class_file.annotations) {
            flags |= Flags::DEPRECATED;
        }
        self.symbol_mut(class).flags = flags;

        if let Some(owner) = self.owner(class) {
            if self.kind(owner) == SymbolKind::Package {
                let members = self.scope_of_package(owner);
                self.enter(members, class);
            }
        }

        let signature = class_file
            .signature
            .as_deref()
            .and_then(|sig| match parse_class_signature(sig) {
                Ok(signature) => Some(signature),
                Err(error) => {
                    tracing::warn!(target: "nova.sema", class = %self.full_name(class), %error, "ignoring class signature");
                    None
                }
            });
        match signature {
            Some(signature) => {
                self.declare_signature_type_parameters(class, &signature.type_parameters);
                let superclass = if class_file.super_class.is_some() {
                    Some(self.class_type_from_signature(&signature.superclass, class))
                } else {
                    None
                };
                let interfaces = signature
                    .interfaces
                    .iter()
                    .map(|interface| self.class_type_from_signature(interface, class))
                    .collect();
                self.set_supertypes(class, superclass, interfaces);
            }
            None => {
                let superclass = class_file
                    .super_class
                    .as_deref()
                    .map(|name| self.class_type_for_internal_name(name));
                let interfaces = class_file
                    .interfaces
                    .iter()
                    .map(|name| self.class_type_for_internal_name(name))
                    .collect();
                self.set_supertypes(class, superclass, interfaces);
            }
        }

        let members = self
            .symbol(class)
            .type_data()
            .map(|data| data.members)
            .unwrap_or_else(|| self.scope_of_package(self.wk.default_package));
        for entry in &class_file.inner_classes {
            if entry.access_flags & access::SYNTHETIC != 0
                || entry.outer_class.as_deref() != Some(class_file.this_class.as_str())
                || entry.inner_name.is_none()
            {
                continue;
            }
            let inner = self.class_symbol_with_flags(
                &flat_name(&entry.inner_class),
                Flags::from_class_access(entry.access_flags),
            );
            self.enter(members, inner);
        }

        for field in &class_file.fields {
            if field.access_flags & access::SYNTHETIC != 0 {
                continue;
            }
            let variable = self.field_symbol(class, field);
            self.enter(members, variable);
        }
        for method in &class_file.methods {
            if method.access_flags & (access::SYNTHETIC | access::BRIDGE) != 0
                || method.name == "<clinit>"
            {
                continue;
            }
            let symbol = self.method_symbol(class, method);
            self.enter(members, symbol);
        }

        let annotations = self.annotation_instances(class, &class_file.annotations);
        self.symbol_mut(class).annotations = annotations;

        // enum values are filled once the enum type is complete, which may
        // be after this class is
        for (target, enum_type) in self.pending_enum_values.split_off(pending_mark) {
            self.on_completed(
                enum_type,
                Box::new(move |sema: &mut Sema<'a>| sema.fill_enum_constants(target, enum_type)),
            );
        }
    }

    fn field_symbol(&mut self, class: SymbolId, field: &FieldInfo) -> SymbolId {
        let mut flags = Flags::from_class_access(field.access_flags);
        if field.deprecated || has_deprecated(&field.annotations) {
            flags |= Flags::DEPRECATED;
        }
        let ty = match field.signature.as_deref().map(parse_field_signature) {
            Some(Ok(signature)) => self.reference_type_from_signature(&signature, class),
            _ => match parse_field_descriptor(&field.descriptor) {
                Ok(field_type) => self.type_from_descriptor(&field_type),
                Err(_) => self.wk.unknown_type,
            },
        };
        let variable = self.new_variable(flags, field.name.as_str().into(), Some(ty), class);
        let constant = field
            .constant_value
            .as_ref()
            .and_then(|value| constant_for_descriptor(value, &field.descriptor));
        if let SymbolData::Variable { constant: slot } = &mut self.symbol_mut(variable).data {
            *slot = constant;
        }
        let annotations = self.annotation_instances(variable, &field.annotations);
        self.symbol_mut(variable).annotations = annotations;
        variable
    }

    fn method_symbol(&mut self, class: SymbolId, info: &MethodInfo) -> SymbolId {
        let mut flags = Flags::from_method_access(info.access_flags);
        if info.deprecated || has_deprecated(&info.annotations) {
            flags |= Flags::DEPRECATED;
        }
        let method = self.new_method(flags, info.name.as_str().into(), class);
        if let Some(data) = self.symbol_mut(method).method_data_mut() {
            data.descriptor = Some(info.descriptor.clone());
        }
        let is_constructor = info.name == "<init>";

        let signature = info
            .signature
            .as_deref()
            .and_then(|sig| parse_method_signature(sig).ok());
        let (params, result, mut thrown) = match signature {
            Some(signature) => {
                self.declare_signature_type_parameters(method, &signature.type_parameters);
                let params: Vec<TypeId> = signature
                    .parameters
                    .iter()
                    .map(|param| self.type_from_signature(param, method))
                    .collect();
                let result = signature
                    .result
                    .as_ref()
                    .map(|result| self.type_from_signature(result, method));
                let thrown = signature
                    .throws
                    .iter()
                    .map(|thrown| self.reference_type_from_signature(thrown, method))
                    .collect();
                let mut params = params;
                if is_constructor {
                    if let Some(outer) = self.implicit_outer_type(class) {
                        params.insert(0, outer);
                    }
                }
                (params, result, thrown)
            }
            None => match parse_method_descriptor(&info.descriptor) {
                Ok(descriptor) => {
                    let params = descriptor
                        .params
                        .iter()
                        .map(|param| self.type_from_descriptor(param))
                        .collect();
                    let result = descriptor
                        .return_type
                        .as_ref()
                        .map(|result| self.type_from_descriptor(result));
                    (params, result, Vec::new())
                }
                Err(_) => (Vec::new(), None, Vec::new()),
            },
        };
        if thrown.is_empty() {
            thrown = info
                .exceptions
                .iter()
                .map(|name| self.class_type_for_internal_name(name))
                .collect();
        }
        let result = if is_constructor {
            None
        } else {
            Some(result.unwrap_or(self.wk.void_type))
        };

        let mut parameters = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            let variable = self.new_variable(
                Flags::empty(),
                format!("arg{index}").into(),
                Some(*param),
                method,
            );
            if let Some(annotations) = info.parameter_annotations.get(index) {
                let annotations = self.annotation_instances(variable, annotations);
                self.symbol_mut(variable).annotations = annotations;
            }
            parameters.push(variable);
        }
        let default_value = info
            .annotation_default
            .as_ref()
            .map(|value| self.annotation_value(method, value));
        if let Some(data) = self.symbol_mut(method).method_data_mut() {
            data.parameters = parameters;
            data.default_value = default_value;
        }
        self.set_method_type(
            method,
            crate::types::MethodType {
                params,
                result,
                thrown,
            },
        );
        let annotations = self.annotation_instances(method, &info.annotations);
        self.symbol_mut(method).annotations = annotations;
        method
    }

    /// Type of the enclosing instance passed to constructors of inner
    /// (non-static) member classes.
    pub(crate) fn implicit_outer_type(&mut self, class: SymbolId) -> Option<TypeId> {
        let owner = self.owner(class)?;
        if self.kind(owner) != SymbolKind::Type || self.raw_flags(class).contains(Flags::STATIC) {
            return None;
        }
        Some(self.class_type(owner))
    }

    // ---- signatures and descriptors ----

    fn declare_signature_type_parameters(&mut self, owner: SymbolId, params: &[TypeParameter]) {
        let variables: Vec<SymbolId> = params
            .iter()
            .map(|param| self.add_type_parameter(owner, param.name.as_str().into()))
            .collect();
        for (variable, param) in variables.into_iter().zip(params) {
            let mut bounds: Vec<TypeId> = param
                .bounds()
                .map(|bound| self.reference_type_from_signature(bound, owner))
                .collect();
            if bounds.is_empty() {
                bounds.push(self.wk.object_type);
            }
            self.set_bounds(variable, bounds);
        }
    }

    fn type_from_signature(&mut self, signature: &TypeSignature, context: SymbolId) -> TypeId {
        match signature {
            TypeSignature::Base(base) => self.wk.primitive(Primitive::from(*base)),
            TypeSignature::Reference(reference) => {
                self.reference_type_from_signature(reference, context)
            }
        }
    }

    fn reference_type_from_signature(
        &mut self,
        signature: &ReferenceTypeSignature,
        context: SymbolId,
    ) -> TypeId {
        match signature {
            ReferenceTypeSignature::Class(class) => self.class_type_from_signature(class, context),
            ReferenceTypeSignature::TypeVariable(name) => self
                .find_type_variable(context, &Name::new(name))
                .unwrap_or(self.wk.object_type),
            ReferenceTypeSignature::Array(element) => {
                let element = self.type_from_signature(element, context);
                self.array_of(element)
            }
        }
    }

    fn class_type_from_signature(
        &mut self,
        signature: &ClassTypeSignature,
        context: SymbolId,
    ) -> TypeId {
        let symbol = self.class_symbol(&flat_name(&signature.internal_name()));
        let arguments = signature.arguments();
        if arguments.is_empty() {
            return self.class_type(symbol);
        }
        let args: Vec<TypeId> = arguments
            .iter()
            .map(|argument| match argument {
                TypeArgument::Unbounded => self.wk.unbounded_wildcard,
                TypeArgument::Exact(ty) => self.reference_type_from_signature(ty, context),
                TypeArgument::Extends(ty) => {
                    let bound = self.reference_type_from_signature(ty, context);
                    self.wildcard(WildcardKind::Extends, bound)
                }
                TypeArgument::Super(ty) => {
                    let bound = self.reference_type_from_signature(ty, context);
                    self.wildcard(WildcardKind::Super, bound)
                }
            })
            .collect();
        let variables = self.type_variables(symbol);
        if variables.is_empty() {
            return self.class_type(symbol);
        }
        let substitution = TypeSubstitution::from_pairs(&variables, &args);
        self.parameterized(symbol, substitution)
    }

    /// Type variable named `name` visible from `context`: its own type
    /// parameters, then those of the enclosing classes.
    fn find_type_variable(&mut self, context: SymbolId, name: &Name) -> Option<TypeId> {
        let mut current = Some(context);
        while let Some(symbol) = current {
            if matches!(self.kind(symbol), SymbolKind::Type | SymbolKind::Method) {
                let scope = match &self.symbol(symbol).data {
                    SymbolData::Type(data) => Some(data.type_parameters),
                    SymbolData::Method(data) => Some(data.type_parameters),
                    _ => None,
                };
                if let Some(scope) = scope {
                    if let Some(found) = self.lookup_local(scope, name).first() {
                        return self.symbol(*found).ty;
                    }
                }
            } else if self.kind(symbol) == SymbolKind::Package {
                return None;
            }
            current = self.owner(symbol);
        }
        None
    }

    fn class_type_for_internal_name(&mut self, internal_name: &str) -> TypeId {
        let symbol = self.class_symbol(&flat_name(internal_name));
        self.class_type(symbol)
    }

    fn type_from_descriptor(&mut self, field_type: &FieldType) -> TypeId {
        match field_type {
            FieldType::Base(base) => self.wk.primitive(Primitive::from(*base)),
            FieldType::Object(name) => self.class_type_for_internal_name(name),
            FieldType::Array(element) => {
                let element = self.type_from_descriptor(element);
                self.array_of(element)
            }
        }
    }

    // ---- annotations ----

    fn annotation_instances(
        &mut self,
        target: SymbolId,
        annotations: &[Annotation],
    ) -> Vec<AnnotationInstance> {
        annotations
            .iter()
            .filter_map(|annotation| self.annotation_instance(target, annotation))
            .collect()
    }

    fn annotation_instance(
        &mut self,
        target: SymbolId,
        annotation: &Annotation,
    ) -> Option<AnnotationInstance> {
        let symbol = self.class_symbol(&flat_name(annotation.type_internal_name()?));
        let values = annotation
            .elements
            .iter()
            .map(|(name, value)| (Name::new(name), self.annotation_value(target, value)))
            .collect();
        Some(AnnotationInstance { symbol, values })
    }

    fn annotation_value(&mut self, target: SymbolId, value: &ElementValue) -> AnnotationValue {
        match value {
            ElementValue::Byte(v) => AnnotationValue::Constant(Constant::Byte(*v)),
            ElementValue::Char(v) => AnnotationValue::Constant(Constant::Char(*v)),
            ElementValue::Short(v) => AnnotationValue::Constant(Constant::Short(*v)),
            ElementValue::Int(v) => AnnotationValue::Constant(Constant::Int(*v)),
            ElementValue::Long(v) => AnnotationValue::Constant(Constant::Long(*v)),
            ElementValue::Float(v) => AnnotationValue::Constant(Constant::Float(*v)),
            ElementValue::Double(v) => AnnotationValue::Constant(Constant::Double(*v)),
            ElementValue::Boolean(v) => AnnotationValue::Constant(Constant::Boolean(*v)),
            ElementValue::String(v) => AnnotationValue::Constant(Constant::String(v.clone())),
            ElementValue::Enum {
                type_descriptor,
                constant,
            } => {
                let Some(internal) = type_descriptor
                    .strip_prefix('L')
                    .and_then(|rest| rest.strip_suffix(';'))
                else {
                    return AnnotationValue::Unresolved;
                };
                let enum_type = self.class_symbol(&flat_name(internal));
                if !self.pending_enum_values.contains(&(target, enum_type)) {
                    self.pending_enum_values.push((target, enum_type));
                }
                AnnotationValue::Enum {
                    type_symbol: enum_type,
                    name: Name::new(constant),
                    constant: None,
                }
            }
            ElementValue::Class(descriptor) => {
                if descriptor == "V" {
                    return AnnotationValue::Class(self.wk.void_type);
                }
                match parse_field_descriptor(descriptor) {
                    Ok(field_type) => AnnotationValue::Class(self.type_from_descriptor(&field_type)),
                    Err(_) => AnnotationValue::Unresolved,
                }
            }
            ElementValue::Annotation(nested) => match self.annotation_instance(target, nested) {
                Some(instance) => AnnotationValue::Annotation(Box::new(instance)),
                None => AnnotationValue::Unresolved,
            },
            ElementValue::Array(values) => AnnotationValue::Array(
                values
                    .iter()
                    .map(|value| self.annotation_value(target, value))
                    .collect(),
            ),
        }
    }

    /// Points every still-unresolved enum value of `enum_type` in the
    /// annotations of `target` (and its default value) at the constant's
    /// symbol.
    fn fill_enum_constants(&mut self, target: SymbolId, enum_type: SymbolId) {
        let Some(members) = self.members(enum_type) else {
            return;
        };
        let mut annotations = std::mem::take(&mut self.symbol_mut(target).annotations);
        for annotation in &mut annotations {
            for (_, value) in &mut annotation.values {
                self.fill_enum_value(value, enum_type, members);
            }
        }
        self.symbol_mut(target).annotations = annotations;

        let default_value = self
            .symbol_mut(target)
            .method_data_mut()
            .and_then(|data| data.default_value.take());
        if let Some(mut value) = default_value {
            self.fill_enum_value(&mut value, enum_type, members);
            if let Some(data) = self.symbol_mut(target).method_data_mut() {
                data.default_value = Some(value);
            }
        }
    }

    fn fill_enum_value(
        &mut self,
        value: &mut AnnotationValue,
        enum_type: SymbolId,
        members: crate::ids::ScopeId,
    ) {
        match value {
            AnnotationValue::Enum {
                type_symbol,
                name,
                constant,
            } if *type_symbol == enum_type && constant.is_none() => {
                *constant = self
                    .lookup_local(members, name)
                    .into_iter()
                    .find(|member| self.kind(*member) == SymbolKind::Variable);
            }
            AnnotationValue::Array(values) => {
                for value in values {
                    self.fill_enum_value(value, enum_type, members);
                }
            }
            AnnotationValue::Annotation(instance) => {
                for (_, value) in &mut instance.values {
                    self.fill_enum_value(value, enum_type, members);
                }
            }
            _ => {}
        }
    }
}

fn has_deprecated(annotations: &[Annotation]) -> bool {
    annotations
        .iter()
        .any(|annotation| annotation.type_descriptor == "Ljava/lang/Deprecated;")
}

/// Maps a `ConstantValue` to the field's declared type; booleans, chars,
/// bytes and shorts are stored as ints in the class file.
fn constant_for_descriptor(value: &ConstantValue, descriptor: &str) -> Option<Constant> {
    Some(match (value, descriptor) {
        (ConstantValue::Int(v), "Z") => Constant::Boolean(*v != 0),
        (ConstantValue::Int(v), "B") => Constant::Byte(*v as i8),
        (ConstantValue::Int(v), "S") => Constant::Short(*v as i16),
        (ConstantValue::Int(v), "C") => Constant::Char(char::from_u32(*v as u32)?),
        (ConstantValue::Int(v), _) => Constant::Int(*v),
        (ConstantValue::Long(v), _) => Constant::Long(*v),
        (ConstantValue::Float(v), _) => Constant::Float(*v),
        (ConstantValue::Double(v), _) => Constant::Double(*v),
        (ConstantValue::String(v), _) => Constant::String(v.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nested_names_split_on_the_last_dollar() {
        assert_eq!(enclosing_class_name("Map$Entry"), "Map");
        assert_eq!(enclosing_class_name("A$B$C"), "A$B");
        assert_eq!(enclosing_class_name("$Proxy"), "");
        assert_eq!(enclosing_class_name("Trailing$"), "");
        assert_eq!(enclosing_class_name("Plain"), "");
    }

    #[test]
    fn boolean_constants_are_stored_as_ints() {
        assert_eq!(
            constant_for_descriptor(&ConstantValue::Int(1), "Z"),
            Some(Constant::Boolean(true))
        );
        assert_eq!(
            constant_for_descriptor(&ConstantValue::Int(65), "C"),
            Some(Constant::Char('A'))
        );
        assert_eq!(
            constant_for_descriptor(&ConstantValue::Int(7), "I"),
            Some(Constant::Int(7))
        );
    }
}

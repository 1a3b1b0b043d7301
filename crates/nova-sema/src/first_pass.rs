//! First pass: declares the symbols of a compilation unit.
//!
//! One walk over the tree creates a symbol for every declaration, enters it
//! in its scope and records the environment of every node that opens a
//! scope. Nothing is resolved yet: declared symbols get the source
//! completer and are filled in by the second pass when first read. Imports
//! are entered after the walk so they can name types declared further down.

use std::iter::Peekable;
use std::str::Chars;

use crate::context::Sema;
use crate::env::Env;
use crate::flags::Flags;
use crate::ids::{EnvId, NodeId, ScopeId, SymbolId};
use crate::resolve::CONSTRUCTOR_NAME;
use crate::scope::ScopeKind;
use crate::symbols::{Completer, Constant, Symbol, SymbolData, SymbolKind};
use crate::tree::{ClassDecl, ClassKind, LiteralKind, MethodDecl, Modifiers, Name, NodeKind, VariableDecl};
use crate::types::MethodType;

impl<'a> Sema<'a> {
    /// Declares everything in the unit and returns the unit environment.
    pub(crate) fn enter_unit(&mut self) -> EnvId {
        let tree = self.tree();
        let root = tree.root();
        let NodeKind::CompilationUnit {
            package,
            imports,
            types,
        } = tree.kind(root)
        else {
            return self.wk.root_env;
        };
        let package = match package.map(|decl| tree.kind(decl)) {
            Some(NodeKind::PackageDecl { name, .. }) => {
                let dotted = tree.qualified_name(*name).unwrap_or_default();
                let package = self.enter_package(&dotted);
                self.associate_symbol(*name, package);
                package
            }
            _ => self.wk.default_package,
        };

        let unit_env = Env {
            outer: None,
            package,
            enclosing_class: None,
            scope: self.new_scope(None, None),
            named_imports: self.new_scope(None, None),
            star_imports: self.new_import_scope(ScopeKind::StarImport),
            static_star_imports: self.new_import_scope(ScopeKind::StaticStarImport),
        };
        let unit_scope = unit_env.scope;
        let env = self.alloc_env(unit_env);
        self.associate_env(root, env);
        for node in types {
            let class = self.enter_class(*node, package, env, false);
            self.enter(unit_scope, class);
        }
        self.enter_imports(env, imports);
        tracing::debug!(
            target: "nova.sema",
            package = %self.name(package),
            classes = types.len(),
            imports = imports.len(),
            "entered compilation unit"
        );
        env
    }

    fn declare(&mut self, node: NodeId, symbol: SymbolId) {
        self.symbol_mut(symbol).declaration = Some(node);
        self.associate_symbol(node, symbol);
        self.set_completer(symbol, Completer::Source);
    }

    fn class_scopes(&self, class: SymbolId) -> Option<(ScopeId, ScopeId)> {
        self.symbol(class)
            .type_data()
            .map(|data| (data.members, data.type_parameters))
    }

    // ---- types ----

    /// `local` classes are declared in a block, an initializer or an
    /// expression (anonymous classes); they get numbered binary names.
    fn enter_class(&mut self, node: NodeId, owner: SymbolId, env: EnvId, local: bool) -> SymbolId {
        let tree = self.tree();
        let NodeKind::Class(decl) = tree.kind(node) else {
            return self.wk.unknown_symbol;
        };
        let flags = self.class_flags(decl, owner, local);
        let name = decl.name.clone().unwrap_or_default();
        let class = self.new_type_symbol(flags, name.clone(), owner);
        if local {
            self.number_local_class(class, owner, name);
        }
        let full_name = self.full_name(class);
        self.registry.classes.insert(full_name, class);
        self.declare(node, class);
        let Some((members, type_parameters)) = self.class_scopes(class) else {
            return class;
        };

        let mut header = self.dup_env(env);
        header.outer = Some(env);
        header.scope = type_parameters;
        let header = self.alloc_env(header);
        for param in &decl.type_params {
            self.enter_type_parameter(*param, class);
        }
        for supertype in decl.superclass.iter().chain(&decl.interfaces) {
            self.associate_env(*supertype, header);
        }

        let mut body = self.dup_env(header);
        body.outer = Some(header);
        body.enclosing_class = Some(class);
        body.scope = members;
        let body = self.alloc_env(body);
        self.associate_env(node, body);

        if decl.kind == ClassKind::Enum {
            self.enter_enum_methods(class, members);
        }
        for member in &decl.members {
            self.enter_member(*member, class, decl.kind, body);
        }
        class
    }

    fn class_flags(&mut self, decl: &ClassDecl, owner: SymbolId, local: bool) -> Flags {
        let mut flags = decl.modifiers.flags | self.annotation_flags(&decl.modifiers);
        match decl.kind {
            ClassKind::Class => {}
            ClassKind::Interface => flags |= Flags::INTERFACE | Flags::ABSTRACT,
            ClassKind::Annotation => flags |= Flags::INTERFACE | Flags::ANNOTATION | Flags::ABSTRACT,
            ClassKind::Enum => flags |= Flags::ENUM,
        }
        if !local && self.kind(owner) == SymbolKind::Type {
            if self.raw_flags(owner).contains(Flags::INTERFACE) {
                flags |= Flags::PUBLIC | Flags::STATIC;
            }
            if decl.kind != ClassKind::Class {
                flags |= Flags::STATIC;
            }
        }
        flags
    }

    /// `Outer$1Local`, `Outer$1` for the first anonymous class, counted per
    /// simple name within the enclosing class.
    fn number_local_class(&mut self, class: SymbolId, owner: SymbolId, name: Name) {
        let counter_owner = self.enclosing_class(owner).unwrap_or(owner);
        let Some(counts) = self
            .symbol_mut(counter_owner)
            .type_data_mut()
            .map(|data| &mut data.local_class_counts)
        else {
            return;
        };
        let count = counts.entry(name.clone()).or_insert(0);
        *count += 1;
        let internal_name = Name::new(format!("{count}{name}"));
        if let Some(data) = self.symbol_mut(class).type_data_mut() {
            data.internal_name = internal_name;
        }
    }

    fn enter_type_parameter(&mut self, node: NodeId, owner: SymbolId) {
        let NodeKind::TypeParameter { name, .. } = self.tree().kind(node) else {
            return;
        };
        let variable = self.add_type_parameter(owner, name.clone());
        self.declare(node, variable);
    }

    fn enter_enum_methods(&mut self, class: SymbolId, members: ScopeId) {
        let class_type = self.class_type(class);
        let array = self.array_of(class_type);
        let string = self.wk.string_type;

        let values = self.new_method(Flags::PUBLIC | Flags::STATIC, "values".into(), class);
        self.set_method_type(
            values,
            MethodType {
                params: Vec::new(),
                result: Some(array),
                thrown: Vec::new(),
            },
        );
        self.enter(members, values);

        let value_of = self.new_method(Flags::PUBLIC | Flags::STATIC, "valueOf".into(), class);
        let name = self.new_variable(Flags::empty(), "name".into(), Some(string), value_of);
        if let Some(data) = self.symbol_mut(value_of).method_data_mut() {
            data.parameters.push(name);
        }
        self.set_method_type(
            value_of,
            MethodType {
                params: vec![string],
                result: Some(class_type),
                thrown: Vec::new(),
            },
        );
        self.enter(members, value_of);
    }

    fn enter_member(&mut self, member: NodeId, class: SymbolId, class_kind: ClassKind, env: EnvId) {
        let tree = self.tree();
        let members = self.env(env).scope;
        let interface = matches!(class_kind, ClassKind::Interface | ClassKind::Annotation);
        match tree.kind(member) {
            NodeKind::Class(_) => {
                let inner = self.enter_class(member, class, env, false);
                self.enter(members, inner);
            }
            NodeKind::Method(decl) => self.enter_method(member, decl, class, class_kind, env),
            NodeKind::Variable(decl) => {
                let implicit = if interface {
                    Flags::PUBLIC | Flags::STATIC | Flags::FINAL
                } else {
                    Flags::empty()
                };
                let field = self.enter_variable(member, decl, class, env, implicit);
                self.fold_constant(field, decl);
                if let Some(init) = decl.initializer {
                    self.enter_node(init, env, field);
                }
            }
            NodeKind::EnumConstant {
                modifiers,
                name,
                args,
                body,
            } => {
                let flags = Flags::PUBLIC | Flags::STATIC | Flags::FINAL | Flags::ENUM | self.annotation_flags(modifiers);
                let constant = self.new_variable(flags, name.clone(), None, class);
                self.declare(member, constant);
                self.enter(members, constant);
                for arg in args {
                    self.enter_node(*arg, env, constant);
                }
                if let Some(body) = body {
                    self.enter_class(*body, constant, env, true);
                }
            }
            NodeKind::Initializer { body, .. } => self.enter_node(*body, env, class),
            _ => {}
        }
    }

    fn enter_method(&mut self, node: NodeId, decl: &MethodDecl, class: SymbolId, class_kind: ClassKind, env: EnvId) {
        let tree = self.tree();
        let constructor = decl.return_type.is_none();
        let mut flags = decl.modifiers.flags | self.annotation_flags(&decl.modifiers);
        match class_kind {
            ClassKind::Interface | ClassKind::Annotation => {
                if !flags.contains(Flags::PRIVATE) {
                    flags |= Flags::PUBLIC;
                }
                if decl.body.is_none() && !flags.intersects(Flags::STATIC | Flags::DEFAULT | Flags::PRIVATE) {
                    flags |= Flags::ABSTRACT;
                }
            }
            ClassKind::Enum if constructor => {
                flags.remove(Flags::PUBLIC | Flags::PROTECTED);
                flags |= Flags::PRIVATE;
            }
            _ => {}
        }
        let varargs = decl
            .params
            .last()
            .is_some_and(|param| matches!(tree.kind(*param), NodeKind::Variable(v) if v.varargs));
        if varargs {
            flags |= Flags::VARARGS;
        }
        let name = if constructor {
            Name::new(CONSTRUCTOR_NAME)
        } else {
            decl.name.clone()
        };
        let method = self.new_method(flags, name, class);
        self.declare(node, method);
        let members = self.env(env).scope;
        self.enter(members, method);
        let Some(type_parameters) = self.symbol(method).method_data().map(|data| data.type_parameters) else {
            return;
        };

        let mut header = self.dup_env(env);
        header.outer = Some(env);
        header.scope = type_parameters;
        let header = self.alloc_env(header);
        self.associate_env(node, header);
        for param in &decl.type_params {
            self.enter_type_parameter(*param, method);
        }

        let mut body = self.dup_env(header);
        body.outer = Some(header);
        body.scope = self.new_scope(Some(method), None);
        let body = self.alloc_env(body);
        let mut parameters = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            if let NodeKind::Variable(param_decl) = tree.kind(*param) {
                parameters.push(self.enter_variable(*param, param_decl, method, body, Flags::empty()));
            }
        }
        if let Some(data) = self.symbol_mut(method).method_data_mut() {
            data.parameters = parameters;
        }
        if let Some(block) = decl.body {
            self.enter_node(block, body, method);
        }
    }

    /// Declares a field, parameter or local variable in the scope of `env`.
    fn enter_variable(
        &mut self,
        node: NodeId,
        decl: &VariableDecl,
        owner: SymbolId,
        env: EnvId,
        implicit: Flags,
    ) -> SymbolId {
        let flags = decl.modifiers.flags | implicit | self.annotation_flags(&decl.modifiers);
        let variable = self.new_variable(flags, decl.name.clone(), None, owner);
        self.declare(node, variable);
        self.associate_env(node, env);
        let scope = self.env(env).scope;
        self.enter(scope, variable);
        variable
    }

    /// `static final` fields initialized with a literal get its value.
    fn fold_constant(&mut self, field: SymbolId, decl: &VariableDecl) {
        if !self.raw_flags(field).contains(Flags::STATIC | Flags::FINAL) {
            return;
        }
        let Some(init) = decl.initializer else {
            return;
        };
        let NodeKind::Literal { kind, text } = self.tree().kind(init) else {
            return;
        };
        let value = literal_constant(*kind, text);
        if let SymbolData::Variable { constant } = &mut self.symbol_mut(field).data {
            *constant = value;
        }
    }

    /// `@Deprecated` is the only annotation that changes flags.
    fn annotation_flags(&self, modifiers: &Modifiers) -> Flags {
        let tree = self.tree();
        let deprecated = modifiers.annotations.iter().any(|annotation| match tree.kind(*annotation) {
            NodeKind::Annotation { annotation_type, .. } => matches!(
                tree.qualified_name(*annotation_type).as_deref(),
                Some("Deprecated" | "java.lang.Deprecated")
            ),
            _ => false,
        });
        if deprecated {
            Flags::DEPRECATED
        } else {
            Flags::empty()
        }
    }

    // ---- bodies ----

    fn enter_node(&mut self, node: NodeId, env: EnvId, owner: SymbolId) {
        let tree = self.tree();
        match tree.kind(node) {
            NodeKind::Block(statements) => {
                let block = self.child_env(env);
                self.associate_env(node, block);
                self.enter_statements(statements, block, owner);
            }
            NodeKind::Variable(decl) => {
                self.enter_variable(node, decl, owner, env, Flags::empty());
                if let Some(init) = decl.initializer {
                    self.enter_node(init, env, owner);
                }
            }
            NodeKind::Class(_) => {
                let class = self.enter_class(node, owner, env, true);
                let scope = self.env(env).scope;
                self.enter(scope, class);
            }
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => {
                let scope = self.child_env(env);
                self.associate_env(node, scope);
                for child in init.iter().chain(cond).chain(update).chain([body]) {
                    self.enter_node(*child, scope, owner);
                }
            }
            NodeKind::ForEach {
                variable,
                iterable,
                body,
            } => {
                self.enter_node(*iterable, env, owner);
                let scope = self.child_env(env);
                self.associate_env(node, scope);
                self.enter_node(*variable, scope, owner);
                self.enter_node(*body, scope, owner);
            }
            NodeKind::Catch { parameter, block } => {
                let scope = self.child_env(env);
                self.associate_env(node, scope);
                self.enter_node(*parameter, scope, owner);
                self.enter_node(*block, scope, owner);
            }
            NodeKind::Try {
                resources,
                block,
                catches,
                finally,
            } => {
                let scope = self.child_env(env);
                for resource in resources {
                    self.enter_node(*resource, scope, owner);
                }
                self.enter_node(*block, scope, owner);
                for child in catches.iter().chain(finally) {
                    self.enter_node(*child, env, owner);
                }
            }
            NodeKind::Switch { selector, cases } => {
                self.enter_node(*selector, env, owner);
                let scope = self.child_env(env);
                for case in cases {
                    self.associate_env(*case, scope);
                    if let NodeKind::Case { labels, body } = tree.kind(*case) {
                        for label in labels {
                            self.enter_node(*label, scope, owner);
                        }
                        self.enter_statements(body, scope, owner);
                    }
                }
            }
            NodeKind::Lambda { params, body } => {
                let scope = self.child_env(env);
                self.associate_env(node, scope);
                for param in params {
                    self.enter_node(*param, scope, owner);
                }
                self.enter_node(*body, scope, owner);
            }
            NodeKind::Labeled { label, body } => {
                let scope = self.child_env(env);
                self.associate_env(node, scope);
                let symbol = self.alloc_symbol(Symbol::new(
                    SymbolKind::Label,
                    Flags::empty(),
                    label.clone(),
                    Some(owner),
                    SymbolData::Label,
                ));
                self.symbol_mut(symbol).declaration = Some(node);
                self.associate_symbol(node, symbol);
                let labels = self.env(scope).scope;
                self.enter(labels, symbol);
                self.enter_node(*body, scope, owner);
            }
            NodeKind::NewClass {
                outer, args, body, ..
            } => {
                for child in outer.iter().chain(args) {
                    self.enter_node(*child, env, owner);
                }
                if let Some(body) = body {
                    self.enter_class(*body, owner, env, true);
                }
            }
            kind => {
                for child in kind.children() {
                    self.enter_node(child, env, owner);
                }
            }
        }
    }

    /// A declaration statement opens a new scope for the statements after
    /// it (and for its own initializer).
    fn enter_statements(&mut self, statements: &[NodeId], env: EnvId, owner: SymbolId) {
        let tree = self.tree();
        let mut current = env;
        for statement in statements {
            if matches!(tree.kind(*statement), NodeKind::Variable(_) | NodeKind::Class(_)) {
                current = self.child_env(current);
            }
            self.associate_env(*statement, current);
            self.enter_node(*statement, current, owner);
        }
    }

    // ---- imports ----

    fn enter_imports(&mut self, env: EnvId, imports: &[NodeId]) {
        let tree = self.tree();
        let scopes = self.env(env).clone();
        let is_static = |import: &NodeId| matches!(tree.kind(*import), NodeKind::Import { is_static: true, .. });
        // static imports read members of the imported types, so they go last
        let ordered = imports
            .iter()
            .filter(|import| !is_static(import))
            .chain(imports.iter().filter(|import| is_static(import)));
        for import in ordered {
            let NodeKind::Import { is_static, name } = tree.kind(*import) else {
                continue;
            };
            let Some(dotted) = tree.qualified_name(*name) else {
                continue;
            };
            self.associate_env(*import, env);
            match (dotted.strip_suffix(".*"), *is_static) {
                (Some(prefix), false) => {
                    let site = match self.find_qualified_class(prefix) {
                        Some(class) => class,
                        None => self.enter_package(prefix),
                    };
                    self.enter(scopes.star_imports, site);
                }
                (Some(prefix), true) => match self.find_qualified_class(prefix) {
                    Some(class) => self.enter(scopes.static_star_imports, class),
                    None => self.record_not_found(prefix),
                },
                (None, false) => match self.find_qualified_class(&dotted) {
                    Some(class) => {
                        self.enter(scopes.named_imports, class);
                        self.associate_symbol(*name, class);
                        self.add_usage(class, *name);
                    }
                    None => self.record_not_found(&dotted),
                },
                (None, true) => {
                    let Some((prefix, member)) = dotted.rsplit_once('.') else {
                        continue;
                    };
                    let Some(class) = self.find_qualified_class(prefix) else {
                        self.record_not_found(prefix);
                        continue;
                    };
                    let Some(members) = self.members(class) else {
                        continue;
                    };
                    for symbol in self.lookup_local(members, &Name::new(member)) {
                        if self.is_static(symbol) {
                            self.enter(scopes.named_imports, symbol);
                        }
                    }
                }
            }
        }
    }

    /// Class named by a canonical name (`java.util.Map.Entry`): the longest
    /// package prefix that names a class, then its member classes.
    pub(crate) fn find_qualified_class(&mut self, dotted: &str) -> Option<SymbolId> {
        if let Some(class) = self.load_class(dotted) {
            return Some(class);
        }
        let (prefix, name) = dotted.rsplit_once('.')?;
        let outer = self.find_qualified_class(prefix)?;
        let flat = format!("{}${name}", self.full_name(outer));
        self.load_class(&flat)
    }
}

/// Value of a literal as written in source; `None` for `null` and for
/// malformed text.
pub(crate) fn literal_constant(kind: LiteralKind, text: &str) -> Option<Constant> {
    match kind {
        LiteralKind::Int => parse_integer(text).map(|value| Constant::Int(value as i32)),
        LiteralKind::Long => parse_integer(text.trim_end_matches(['l', 'L'])).map(Constant::Long),
        LiteralKind::Float => text
            .trim_end_matches(['f', 'F'])
            .replace('_', "")
            .parse()
            .ok()
            .map(Constant::Float),
        LiteralKind::Double => text
            .trim_end_matches(['d', 'D'])
            .replace('_', "")
            .parse()
            .ok()
            .map(Constant::Double),
        LiteralKind::Char => {
            let body = text.strip_prefix('\'')?.strip_suffix('\'')?;
            unescape(body).chars().next().map(Constant::Char)
        }
        LiteralKind::String => {
            let body = text.strip_prefix('"')?.strip_suffix('"')?;
            Some(Constant::String(unescape(body)))
        }
        LiteralKind::Boolean => match text {
            "true" => Some(Constant::Boolean(true)),
            "false" => Some(Constant::Boolean(false)),
            _ => None,
        },
        LiteralKind::Null => None,
    }
}

/// Decimal, hex, octal or binary; values above the signed range wrap the
/// way the two's complement literal does.
fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.replace('_', "");
    let (digits, radix) = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(binary) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        (binary, 2)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (&digits[1..], 8)
    } else {
        (digits.as_str(), 10)
    };
    u64::from_str_radix(digits, radix).ok().map(|value| value as i64)
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('s') => out.push(' '),
            Some(first @ '0'..='7') => {
                // up to three digits, the first at most 3
                let max_digits = if first <= '3' { 3 } else { 2 };
                let mut value = first as u32 - '0' as u32;
                for _ in 1..max_digits {
                    match chars.peek().and_then(|next| next.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            Some('u') => {
                let mut units: Vec<u16> = utf16_unit(&mut chars).into_iter().collect();
                // a surrogate pair is written as two escapes
                while units.last().is_some_and(|unit| (0xD800..0xDC00).contains(unit))
                    && chars.clone().take(2).eq(['\\', 'u'])
                {
                    chars.nth(1);
                    units.extend(utf16_unit(&mut chars));
                }
                out.extend(char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)));
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// The four hex digits of a `\uXXXX` escape, after any repeated `u`s.
fn utf16_unit(chars: &mut Peekable<Chars<'_>>) -> Option<u16> {
    while chars.peek() == Some(&'u') {
        chars.next();
    }
    let digits: String = chars.clone().take(4).collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    chars.nth(3);
    u16::from_str_radix(&digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::test_support::sema;
    use crate::tree::{SyntaxTree, TreeBuilder};
    use crate::types::Primitive;

    fn unit(build: impl FnOnce(&mut TreeBuilder) -> (Vec<NodeId>, Vec<NodeId>)) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let (imports, types) = build(&mut b);
        let unit = b.unit(Some("p"), imports, types);
        b.finish(unit)
    }

    #[test]
    fn literals_fold_to_constants() {
        assert_eq!(literal_constant(LiteralKind::Int, "0xFFFFFFFF"), Some(Constant::Int(-1)));
        assert_eq!(literal_constant(LiteralKind::Int, "1_000"), Some(Constant::Int(1000)));
        assert_eq!(literal_constant(LiteralKind::Int, "017"), Some(Constant::Int(15)));
        assert_eq!(literal_constant(LiteralKind::Long, "42L"), Some(Constant::Long(42)));
        assert_eq!(literal_constant(LiteralKind::Double, "1.5"), Some(Constant::Double(1.5)));
        assert_eq!(literal_constant(LiteralKind::Char, "'\\n'"), Some(Constant::Char('\n')));
        assert_eq!(
            literal_constant(LiteralKind::String, "\"a\\\"b\""),
            Some(Constant::String("a\"b".into()))
        );
        assert_eq!(literal_constant(LiteralKind::Null, "null"), None);
    }

    #[test]
    fn octal_and_unicode_escapes_decode() {
        assert_eq!(literal_constant(LiteralKind::Char, "'\\101'"), Some(Constant::Char('A')));
        assert_eq!(literal_constant(LiteralKind::Char, "'\\0'"), Some(Constant::Char('\0')));
        assert_eq!(literal_constant(LiteralKind::Char, "'\\u0041'"), Some(Constant::Char('A')));
        assert_eq!(literal_constant(LiteralKind::Char, "'\\uuu00e9'"), Some(Constant::Char('\u{e9}')));
        assert_eq!(unescape("\\1234"), "S4");
        assert_eq!(unescape("\\477"), "\u{27}7");
        assert_eq!(unescape("a\\uD83D\\uDE00b"), "a\u{1F600}b");
        assert_eq!(unescape("\\uD83Dx"), "\u{FFFD}x");
    }

    #[test]
    fn classes_members_and_enum_methods_are_declared() {
        let tree = unit(|b| {
            let int = b.primitive(Primitive::Int);
            let one = b.int(1);
            let field = b.variable(
                VariableDecl::new(int, "LIMIT")
                    .flags(Flags::STATIC | Flags::FINAL)
                    .init(Some(one)),
            );
            let color = b.class(ClassDecl::new(ClassKind::Enum, "Color"));
            let outer = b.class(ClassDecl::new(ClassKind::Class, "Outer").members(vec![field, color]));
            (vec![], vec![outer])
        });
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();

        let outer = sema.load_class("p.Outer").unwrap();
        let color = sema.load_class("p.Outer$Color").unwrap();
        assert_eq!(sema.owner(color), Some(outer));
        assert!(sema.raw_flags(color).contains(Flags::STATIC | Flags::ENUM));

        let members = sema.class_scopes(color).unwrap().0;
        let values = sema.lookup_local(members, &Name::new("values"));
        assert_eq!(values.len(), 1);
        let value_of = sema.lookup_local(members, &Name::new("valueOf"))[0];
        let color_type = sema.class_type(color);
        assert_eq!(sema.return_type(value_of), Some(color_type));

        let outer_members = sema.class_scopes(outer).unwrap().0;
        let limit = sema.lookup_local(outer_members, &Name::new("LIMIT"))[0];
        assert_eq!(
            sema.symbol(limit).data,
            SymbolData::Variable {
                constant: Some(Constant::Int(1))
            }
        );
    }

    #[test]
    fn interface_members_get_implicit_modifiers() {
        let tree = unit(|b| {
            let void = b.void();
            let run = b.method(MethodDecl::new("run", Some(void)));
            let body = b.block(vec![]);
            let void = b.void();
            let helper = b.method(MethodDecl::new("helper", Some(void)).flags(Flags::STATIC).body(body));
            let int = b.primitive(Primitive::Int);
            let size = b.variable(VariableDecl::new(int, "SIZE"));
            let task = b.class(ClassDecl::new(ClassKind::Interface, "Task").members(vec![run, helper, size]));
            (vec![], vec![task])
        });
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();

        let task = sema.load_class("p.Task").unwrap();
        let members = sema.class_scopes(task).unwrap().0;
        let run = sema.lookup_local(members, &Name::new("run"))[0];
        let helper = sema.lookup_local(members, &Name::new("helper"))[0];
        let size = sema.lookup_local(members, &Name::new("SIZE"))[0];
        assert!(sema.raw_flags(run).contains(Flags::PUBLIC | Flags::ABSTRACT));
        assert!(!sema.raw_flags(helper).contains(Flags::ABSTRACT));
        assert!(sema.raw_flags(size).contains(Flags::PUBLIC | Flags::STATIC | Flags::FINAL));
    }

    #[test]
    fn local_and_anonymous_classes_are_numbered() {
        let tree = unit(|b| {
            let local = b.class(ClassDecl::new(ClassKind::Class, "Helper"));
            let object = b.ident("Object");
            let anonymous_body = b.class(ClassDecl::anonymous(vec![]));
            let anonymous = b.add(NodeKind::NewClass {
                outer: None,
                type_args: vec![],
                ty: object,
                args: vec![],
                body: Some(anonymous_body),
            });
            let statement = b.expr_stmt(anonymous);
            let body = b.block(vec![local, statement]);
            let void = b.void();
            let method = b.method(MethodDecl::new("run", Some(void)).body(body));
            let outer = b.class(ClassDecl::new(ClassKind::Class, "Outer").members(vec![method]));
            (vec![], vec![outer])
        });
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();

        let helper = sema.load_class("p.Outer$1Helper").unwrap();
        assert_eq!(sema.name(helper), "Helper");
        assert!(sema.load_class("p.Outer$1").is_some());
    }

    #[test]
    fn deprecated_annotation_sets_the_flag() {
        let tree = unit(|b| {
            let deprecated = b.annotation("Deprecated", vec![]);
            let old = b.class(ClassDecl::new(ClassKind::Class, "Old").annotated(deprecated));
            (vec![], vec![old])
        });
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();
        let old = sema.load_class("p.Old").unwrap();
        assert!(sema.raw_flags(old).contains(Flags::DEPRECATED));
    }

    #[test]
    fn imports_name_classes_declared_later_in_the_unit() {
        let tree = unit(|b| {
            let import = b.import("p.Later", false);
            let missing = b.import("com.acme.Missing", false);
            let later = b.class(ClassDecl::new(ClassKind::Class, "Later"));
            (vec![import, missing], vec![later])
        });
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let env = sema.enter_unit();

        let later = sema.load_class("p.Later").unwrap();
        let named = sema.env(env).named_imports;
        assert_eq!(sema.lookup(named, &Name::new("Later")), vec![later]);
        assert!(sema.classes_not_found().contains("com.acme.Missing"));
    }
}

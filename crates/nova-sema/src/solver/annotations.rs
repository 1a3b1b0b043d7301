//! Annotations written in source: the annotation type, each element value
//! checked against the element's declared type, constants folded.

use crate::context::Sema;
use crate::first_pass::literal_constant;
use crate::flags::Flags;
use crate::ids::{NodeId, SymbolId, TypeId};
use crate::symbols::{AnnotationInstance, AnnotationValue, Constant, SymbolKind};
use crate::tree::{BinaryOp, Name, NodeKind, UnaryOp};

impl<'a> Sema<'a> {
    pub(crate) fn resolve_annotations(&mut self, target: SymbolId, nodes: &[NodeId]) -> Vec<AnnotationInstance> {
        nodes
            .iter()
            .filter_map(|node| self.resolve_annotation(target, *node))
            .collect()
    }

    fn resolve_annotation(&mut self, target: SymbolId, node: NodeId) -> Option<AnnotationInstance> {
        let tree = self.tree();
        let NodeKind::Annotation { annotation_type, args } = tree.kind(node) else {
            return None;
        };
        let ty = self.resolve_type(*annotation_type);
        self.register_type(node, ty);
        let symbol = self.type_symbol(ty);
        if !self.is_unknown_symbol(symbol) {
            self.associate_symbol(node, symbol);
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let (name, value) = match tree.kind(*arg) {
                NodeKind::Assignment {
                    op: None,
                    target: element,
                    value,
                } => match tree.kind(*element) {
                    NodeKind::Identifier(name) => (name.clone(), *value),
                    _ => continue,
                },
                _ => (Name::new("value"), *arg),
            };
            let expected = self.annotation_element(symbol, &name, *arg);
            let value = self.annotation_element_value(target, value, expected);
            values.push((name, value));
        }
        Some(AnnotationInstance { symbol, values })
    }

    /// Declared type of element `name` of `annotation`; the name node of a
    /// `name = value` pair is associated with the element method.
    fn annotation_element(&mut self, annotation: SymbolId, name: &Name, arg: NodeId) -> Option<TypeId> {
        if self.is_unknown_symbol(annotation) {
            return None;
        }
        let members = self.members(annotation)?;
        let element = self
            .lookup_local(members, name)
            .into_iter()
            .find(|member| self.kind(*member) == SymbolKind::Method)?;
        if let NodeKind::Assignment { target, .. } = self.tree().kind(arg) {
            self.associate_symbol(*target, element);
            self.add_usage(element, *target);
        }
        self.return_type(element)
    }

    /// Value of one annotation element, or of a method's `default` clause.
    /// A single value given for an array element is wrapped in an array.
    pub(crate) fn annotation_element_value(
        &mut self,
        target: SymbolId,
        node: NodeId,
        expected: Option<TypeId>,
    ) -> AnnotationValue {
        let tree = self.tree();
        let element = expected.and_then(|expected| self.element_type(expected));
        match tree.kind(node) {
            NodeKind::Annotation { .. } => match self.resolve_annotation(target, node) {
                Some(annotation) => AnnotationValue::Annotation(Box::new(annotation)),
                None => AnnotationValue::Unresolved,
            },
            NodeKind::NewArray {
                elem_type: None,
                initializers: Some(initializers),
                ..
            } => AnnotationValue::Array(
                initializers
                    .iter()
                    .map(|init| self.annotation_element_value(target, *init, element))
                    .collect(),
            ),
            _ if element.is_some() => {
                AnnotationValue::Array(vec![self.annotation_element_value(target, node, element)])
            }
            NodeKind::MemberSelect { expr, name } if name == "class" => {
                self.attribute_expression(node, expected);
                let ty = self.type_of_node(*expr).unwrap_or(self.wk.unknown_type);
                AnnotationValue::Class(ty)
            }
            _ => {
                self.attribute_expression(node, expected);
                if let Some(value) = self.enum_constant_value(node) {
                    return value;
                }
                match self.constant_expression_value(node) {
                    Some(constant) => AnnotationValue::Constant(constant),
                    None => AnnotationValue::Unresolved,
                }
            }
        }
    }

    fn enum_constant_value(&mut self, node: NodeId) -> Option<AnnotationValue> {
        let symbol = self.symbol_of_node(node)?;
        if self.kind(symbol) != SymbolKind::Variable || !self.has_flag(symbol, Flags::ENUM) {
            return None;
        }
        let type_symbol = self.owner(symbol)?;
        Some(AnnotationValue::Enum {
            type_symbol,
            name: self.name(symbol).clone(),
            constant: Some(symbol),
        })
    }

    /// Compile-time value of an already typed expression: literals, named
    /// constants, negation and string concatenation.
    pub(crate) fn constant_expression_value(&mut self, node: NodeId) -> Option<Constant> {
        let tree = self.tree();
        match tree.kind(node) {
            NodeKind::Literal { kind, text } => literal_constant(*kind, text),
            NodeKind::Parenthesized(inner) => self.constant_expression_value(*inner),
            NodeKind::Identifier(_) | NodeKind::MemberSelect { .. } => {
                let symbol = self.symbol_of_node(node)?;
                if self.kind(symbol) != SymbolKind::Variable {
                    return None;
                }
                self.constant_value(symbol)
            }
            NodeKind::Unary {
                op: UnaryOp::Plus,
                operand,
            } => self.constant_expression_value(*operand),
            NodeKind::Unary {
                op: UnaryOp::Minus,
                operand,
            } => match self.constant_expression_value(*operand)? {
                Constant::Int(value) => Some(Constant::Int(value.wrapping_neg())),
                Constant::Long(value) => Some(Constant::Long(value.wrapping_neg())),
                Constant::Float(value) => Some(Constant::Float(-value)),
                Constant::Double(value) => Some(Constant::Double(-value)),
                _ => None,
            },
            NodeKind::Binary {
                op: BinaryOp::Add,
                left,
                right,
            } => {
                let left = self.constant_expression_value(*left)?;
                let right = self.constant_expression_value(*right)?;
                match (left, right) {
                    (Constant::Int(l), Constant::Int(r)) => Some(Constant::Int(l.wrapping_add(r))),
                    (Constant::Long(l), Constant::Long(r)) => Some(Constant::Long(l.wrapping_add(r))),
                    (l @ Constant::String(_), r) | (l, r @ Constant::String(_)) => {
                        Some(Constant::String(format!("{}{}", constant_text(&l), constant_text(&r))))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Text a constant contributes to a string concatenation.
fn constant_text(constant: &Constant) -> String {
    match constant {
        Constant::Boolean(value) => value.to_string(),
        Constant::Byte(value) => value.to_string(),
        Constant::Char(value) => value.to_string(),
        Constant::Short(value) => value.to_string(),
        Constant::Int(value) => value.to_string(),
        Constant::Long(value) => value.to_string(),
        Constant::Float(value) => format!("{value:?}"),
        Constant::Double(value) => format!("{value:?}"),
        Constant::String(value) => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use crate::context::test_support::sema;
    use crate::flags::Flags;
    use crate::symbols::{AnnotationValue, Constant};
    use crate::tree::{BinaryOp, ClassDecl, ClassKind, MethodDecl, NodeKind, TreeBuilder, VariableDecl};

    #[test]
    fn element_values_fold_constants_and_wrap_single_array_values() {
        let mut b = TreeBuilder::new();
        // @interface Info { String[] tags(); String value(); }
        let string = b.ident("String");
        let strings = b.array_of(string);
        let tags = b.method(MethodDecl::new("tags", Some(strings)));
        let string = b.ident("String");
        let value = b.method(MethodDecl::new("value", Some(string)));
        let info = b.class(ClassDecl::new(ClassKind::Annotation, "Info").members(vec![tags, value]));

        // class Use { static final String PREFIX = "v"; @Info(tags = "a", value = PREFIX + 1) void run() {} }
        let string = b.ident("String");
        let prefix_init = b.string("v");
        let prefix = b.variable(
            VariableDecl::new(string, "PREFIX")
                .flags(Flags::STATIC | Flags::FINAL)
                .init(Some(prefix_init)),
        );
        let tags_name = b.ident("tags");
        let tag = b.string("a");
        let tags_arg = b.assign(tags_name, tag);
        let value_name = b.ident("value");
        let prefix_ref = b.ident("PREFIX");
        let one = b.int(1);
        let concat = b.binary(BinaryOp::Add, prefix_ref, one);
        let value_arg = b.assign(value_name, concat);
        let annotation = b.annotation("Info", vec![tags_arg, value_arg]);
        let void = b.void();
        let body = b.block(vec![]);
        let run = b.method(MethodDecl::new("run", Some(void)).annotated(annotation).body(body));
        let class = b.class(ClassDecl::new(ClassKind::Class, "Use").members(vec![prefix, run]));
        let unit = b.unit(Some("p"), vec![], vec![info, class]);
        let tree = b.finish(unit);

        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();
        let method = sema.symbol_of_node(run).unwrap();
        let annotations = sema.annotations(method);
        assert_eq!(annotations.len(), 1);
        let info_symbol = sema.symbol_of_node(info).unwrap();
        assert_eq!(annotations[0].symbol, info_symbol);
        assert_eq!(
            annotations[0].values,
            vec![
                (
                    "tags".into(),
                    AnnotationValue::Array(vec![AnnotationValue::Constant(Constant::String("a".into()))])
                ),
                ("value".into(), AnnotationValue::Constant(Constant::String("v1".into()))),
            ]
        );
        assert!(matches!(tree.kind(tags_arg), NodeKind::Assignment { .. }));
        assert_eq!(sema.symbol_of_node(tags_name), Some(sema.symbol_of_node(tags).unwrap()));
    }
}

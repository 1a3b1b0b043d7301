//! The syntax tree consumed by the analyzer.
//!
//! Parsing is somebody else's job: embedders (and tests) build a
//! [`SyntaxTree`] with [`TreeBuilder`] and hand it to [`crate::analyze`].
//! Nodes are never mutated by the analyzer; symbols and types are recorded
//! in side tables keyed by [`NodeId`].

use smol_str::SmolStr;

use crate::flags::Flags;
pub use crate::ids::NodeId;
use crate::types::Primitive;

pub type Name = SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifiers {
    /// Keyword modifiers only (`public`, `static`, ...).
    pub flags: Flags,
    pub annotations: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    /// `None` for anonymous classes.
    pub name: Option<Name>,
    pub type_params: Vec<NodeId>,
    pub superclass: Option<NodeId>,
    pub interfaces: Vec<NodeId>,
    pub members: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub type_params: Vec<NodeId>,
    /// `None` for constructors.
    pub return_type: Option<NodeId>,
    pub name: Name,
    pub params: Vec<NodeId>,
    pub throws: Vec<NodeId>,
    pub body: Option<NodeId>,
    pub default_value: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub modifiers: Modifiers,
    /// A type tree, or [`NodeKind::InferredType`] for `var` and implicit
    /// lambda parameters.
    pub ty: NodeId,
    pub name: Name,
    pub initializer: Option<NodeId>,
    /// Last parameter declared as `T...`.
    pub varargs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    Not,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardBoundKind {
    Unbounded,
    Extends,
    Super,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    CompilationUnit {
        package: Option<NodeId>,
        imports: Vec<NodeId>,
        types: Vec<NodeId>,
    },
    PackageDecl {
        annotations: Vec<NodeId>,
        name: NodeId,
    },
    /// `name` is a qualified expression; on-demand imports end in `*`.
    Import {
        is_static: bool,
        name: NodeId,
    },
    Class(ClassDecl),
    Method(MethodDecl),
    Variable(VariableDecl),
    EnumConstant {
        modifiers: Modifiers,
        name: Name,
        args: Vec<NodeId>,
        /// Anonymous class body.
        body: Option<NodeId>,
    },
    TypeParameter {
        name: Name,
        bounds: Vec<NodeId>,
    },
    Annotation {
        annotation_type: NodeId,
        /// Plain values or `name = value` assignments.
        args: Vec<NodeId>,
    },
    Initializer {
        is_static: bool,
        body: NodeId,
    },

    Block(Vec<NodeId>),
    Empty,
    ExpressionStatement(NodeId),
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    For {
        init: Vec<NodeId>,
        cond: Option<NodeId>,
        update: Vec<NodeId>,
        body: NodeId,
    },
    ForEach {
        variable: NodeId,
        iterable: NodeId,
        body: NodeId,
    },
    Labeled {
        label: Name,
        body: NodeId,
    },
    Break(Option<Name>),
    Continue(Option<Name>),
    Return(Option<NodeId>),
    Throw(NodeId),
    Switch {
        selector: NodeId,
        cases: Vec<NodeId>,
    },
    /// `labels` is empty for `default`.
    Case {
        labels: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    Try {
        resources: Vec<NodeId>,
        block: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    Catch {
        parameter: NodeId,
        block: NodeId,
    },
    Synchronized {
        lock: NodeId,
        body: NodeId,
    },
    Assert {
        cond: NodeId,
        detail: Option<NodeId>,
    },

    Literal {
        kind: LiteralKind,
        text: SmolStr,
    },
    /// Also used for `this` and `super`.
    Identifier(Name),
    /// `a.b`, `X.class`, `X.this`, `super.m`.
    MemberSelect {
        expr: NodeId,
        name: Name,
    },
    MethodInvocation {
        type_args: Vec<NodeId>,
        /// An identifier or a member select.
        method: NodeId,
        args: Vec<NodeId>,
    },
    NewClass {
        outer: Option<NodeId>,
        type_args: Vec<NodeId>,
        /// A type tree; a parameterized type without arguments is `<>`.
        ty: NodeId,
        args: Vec<NodeId>,
        body: Option<NodeId>,
    },
    NewArray {
        elem_type: Option<NodeId>,
        dimensions: Vec<NodeId>,
        /// Extra `[]` pairs without a dimension expression.
        extra_dimensions: usize,
        initializers: Option<Vec<NodeId>>,
    },
    ArrayAccess {
        array: NodeId,
        index: NodeId,
    },
    Parenthesized(NodeId),
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    /// `op` is `Some` for compound assignments (`+=`).
    Assignment {
        op: Option<BinaryOp>,
        target: NodeId,
        value: NodeId,
    },
    Conditional {
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    InstanceOf {
        expr: NodeId,
        ty: NodeId,
    },
    Cast {
        ty: NodeId,
        expr: NodeId,
    },
    Lambda {
        params: Vec<NodeId>,
        /// An expression or a block.
        body: NodeId,
    },
    MethodReference {
        expr: NodeId,
        type_args: Vec<NodeId>,
        /// `new` for constructor references.
        name: Name,
    },

    PrimitiveType(Primitive),
    VoidType,
    ArrayType {
        elem: NodeId,
    },
    /// Empty `args` is the diamond operator.
    ParameterizedType {
        ty: NodeId,
        args: Vec<NodeId>,
    },
    Wildcard {
        kind: WildcardBoundKind,
        bound: Option<NodeId>,
    },
    UnionType(Vec<NodeId>),
    /// `var` or an implicitly typed lambda parameter.
    InferredType,
}

impl NodeKind {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        fn all<'a>(items: impl IntoIterator<Item = &'a NodeId>) -> Vec<NodeId> {
            items.into_iter().copied().collect()
        }
        match self {
            NodeKind::CompilationUnit {
                package,
                imports,
                types,
            } => all(package.iter().chain(imports).chain(types)),
            NodeKind::PackageDecl { annotations, name } => {
                all(annotations.iter().chain(std::iter::once(name)))
            }
            NodeKind::Import { name, .. } => vec![*name],
            NodeKind::Class(decl) => all(decl
                .modifiers
                .annotations
                .iter()
                .chain(&decl.type_params)
                .chain(&decl.superclass)
                .chain(&decl.interfaces)
                .chain(&decl.members)),
            NodeKind::Method(decl) => all(decl
                .modifiers
                .annotations
                .iter()
                .chain(&decl.type_params)
                .chain(&decl.return_type)
                .chain(&decl.params)
                .chain(&decl.throws)
                .chain(&decl.body)
                .chain(&decl.default_value)),
            NodeKind::Variable(decl) => all(decl
                .modifiers
                .annotations
                .iter()
                .chain(std::iter::once(&decl.ty))
                .chain(&decl.initializer)),
            NodeKind::EnumConstant {
                modifiers,
                args,
                body,
                ..
            } => all(modifiers.annotations.iter().chain(args).chain(body)),
            NodeKind::TypeParameter { bounds, .. } => all(bounds),
            NodeKind::Annotation {
                annotation_type,
                args,
            } => all(std::iter::once(annotation_type).chain(args)),
            NodeKind::Initializer { body, .. } => vec![*body],
            NodeKind::Block(stmts) => stmts.clone(),
            NodeKind::ExpressionStatement(expr) => vec![*expr],
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => all([cond, then_branch].into_iter().chain(else_branch)),
            NodeKind::While { cond, body } => vec![*cond, *body],
            NodeKind::DoWhile { body, cond } => vec![*body, *cond],
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => all(init.iter().chain(cond).chain(update).chain([body])),
            NodeKind::ForEach {
                variable,
                iterable,
                body,
            } => vec![*variable, *iterable, *body],
            NodeKind::Labeled { body, .. } => vec![*body],
            NodeKind::Return(expr) => all(expr),
            NodeKind::Throw(expr) => vec![*expr],
            NodeKind::Switch { selector, cases } => all(std::iter::once(selector).chain(cases)),
            NodeKind::Case { labels, body } => all(labels.iter().chain(body)),
            NodeKind::Try {
                resources,
                block,
                catches,
                finally,
            } => all(resources.iter().chain([block]).chain(catches).chain(finally)),
            NodeKind::Catch { parameter, block } => vec![*parameter, *block],
            NodeKind::Synchronized { lock, body } => vec![*lock, *body],
            NodeKind::Assert { cond, detail } => all(std::iter::once(cond).chain(detail)),
            NodeKind::MemberSelect { expr, .. } => vec![*expr],
            NodeKind::MethodInvocation {
                type_args,
                method,
                args,
            } => all(type_args.iter().chain([method]).chain(args)),
            NodeKind::NewClass {
                outer,
                type_args,
                ty,
                args,
                body,
            } => all(outer
                .iter()
                .chain(type_args)
                .chain([ty])
                .chain(args)
                .chain(body)),
            NodeKind::NewArray {
                elem_type,
                dimensions,
                initializers,
                ..
            } => all(elem_type
                .iter()
                .chain(dimensions)
                .chain(initializers.iter().flatten())),
            NodeKind::ArrayAccess { array, index } => vec![*array, *index],
            NodeKind::Parenthesized(expr) => vec![*expr],
            NodeKind::Unary { operand, .. } => vec![*operand],
            NodeKind::Binary { left, right, .. } => vec![*left, *right],
            NodeKind::Assignment { target, value, .. } => vec![*target, *value],
            NodeKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => vec![*cond, *then_expr, *else_expr],
            NodeKind::InstanceOf { expr, ty } => vec![*expr, *ty],
            NodeKind::Cast { ty, expr } => vec![*ty, *expr],
            NodeKind::Lambda { params, body } => all(params.iter().chain([body])),
            NodeKind::MethodReference {
                expr, type_args, ..
            } => all(std::iter::once(expr).chain(type_args)),
            NodeKind::ArrayType { elem } => vec![*elem],
            NodeKind::ParameterizedType { ty, args } => all(std::iter::once(ty).chain(args)),
            NodeKind::Wildcard { bound, .. } => all(bound),
            NodeKind::UnionType(alternatives) => alternatives.clone(),
            NodeKind::Empty
            | NodeKind::Break(_)
            | NodeKind::Continue(_)
            | NodeKind::Literal { .. }
            | NodeKind::Identifier(_)
            | NodeKind::PrimitiveType(_)
            | NodeKind::VoidType
            | NodeKind::InferredType => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

/// One compilation unit.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Skips enclosing parentheses upwards.
    pub fn parent_skipping_parens(&self, id: NodeId) -> Option<NodeId> {
        let mut parent = self.parent(id)?;
        while let NodeKind::Parenthesized(_) = self.kind(parent) {
            parent = self.parent(parent)?;
        }
        Some(parent)
    }

    /// Simple name of an identifier or member select (`List` for `java.util.List`).
    pub fn simple_name(&self, id: NodeId) -> Option<&Name> {
        match self.kind(id) {
            NodeKind::Identifier(name) | NodeKind::MemberSelect { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Dotted text of a qualified name expression (`java.util.List`).
    pub fn qualified_name(&self, id: NodeId) -> Option<String> {
        match self.kind(id) {
            NodeKind::Identifier(name) => Some(name.to_string()),
            NodeKind::MemberSelect { expr, name } => {
                let mut prefix = self.qualified_name(*expr)?;
                prefix.push('.');
                prefix.push_str(name);
                Some(prefix)
            }
            _ => None,
        }
    }

    /// Iterates the subtree rooted at `id` in pre-order.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![id];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            let mut children = self.kind(next).children();
            children.reverse();
            stack.extend(children);
            Some(next)
        })
    }
}

/// Appends nodes bottom-up; children must be created before their parent.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node { kind, parent: None });
        id
    }

    /// Links parents and seals the tree. `root` is usually a compilation unit.
    pub fn finish(mut self, root: NodeId) -> SyntaxTree {
        for index in 0..self.nodes.len() {
            let parent = NodeId::from_index(index);
            for child in self.nodes[index].kind.children() {
                self.nodes[child.index()].parent = Some(parent);
            }
        }
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        self.add(NodeKind::Identifier(name.into()))
    }

    pub fn select(&mut self, expr: NodeId, name: &str) -> NodeId {
        self.add(NodeKind::MemberSelect {
            expr,
            name: name.into(),
        })
    }

    /// `a.b.c` as nested member selects.
    pub fn qualified(&mut self, dotted: &str) -> NodeId {
        let mut parts = dotted.split('.');
        let first = parts.next().unwrap_or_default();
        let mut expr = self.ident(first);
        for part in parts {
            expr = self.select(expr, part);
        }
        expr
    }

    pub fn primitive(&mut self, primitive: Primitive) -> NodeId {
        self.add(NodeKind::PrimitiveType(primitive))
    }

    pub fn void(&mut self) -> NodeId {
        self.add(NodeKind::VoidType)
    }

    pub fn array_of(&mut self, elem: NodeId) -> NodeId {
        self.add(NodeKind::ArrayType { elem })
    }

    pub fn parameterized(&mut self, ty: NodeId, args: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::ParameterizedType { ty, args })
    }

    pub fn wildcard(&mut self, kind: WildcardBoundKind, bound: Option<NodeId>) -> NodeId {
        self.add(NodeKind::Wildcard { kind, bound })
    }

    pub fn inferred(&mut self) -> NodeId {
        self.add(NodeKind::InferredType)
    }

    pub fn literal(&mut self, kind: LiteralKind, text: &str) -> NodeId {
        self.add(NodeKind::Literal {
            kind,
            text: text.into(),
        })
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.literal(LiteralKind::Int, &value.to_string())
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        self.literal(LiteralKind::String, &format!("\"{value}\""))
    }

    pub fn null(&mut self) -> NodeId {
        self.literal(LiteralKind::Null, "null")
    }

    pub fn call(&mut self, method: NodeId, args: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::MethodInvocation {
            type_args: Vec::new(),
            method,
            args,
        })
    }

    /// `name(args)` invoked on the implicit receiver.
    pub fn call_named(&mut self, name: &str, args: Vec<NodeId>) -> NodeId {
        let method = self.ident(name);
        self.call(method, args)
    }

    pub fn new_class(&mut self, ty: NodeId, args: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::NewClass {
            outer: None,
            type_args: Vec::new(),
            ty,
            args,
            body: None,
        })
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.add(NodeKind::Binary { op, left, right })
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.add(NodeKind::Assignment {
            op: None,
            target,
            value,
        })
    }

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.add(NodeKind::ExpressionStatement(expr))
    }

    pub fn ret(&mut self, expr: Option<NodeId>) -> NodeId {
        self.add(NodeKind::Return(expr))
    }

    pub fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::Block(stmts))
    }

    pub fn lambda(&mut self, params: Vec<NodeId>, body: NodeId) -> NodeId {
        self.add(NodeKind::Lambda { params, body })
    }

    pub fn variable(&mut self, decl: VariableDecl) -> NodeId {
        self.add(NodeKind::Variable(decl))
    }

    /// A local variable or parameter without modifiers.
    pub fn local(&mut self, ty: NodeId, name: &str, initializer: Option<NodeId>) -> NodeId {
        self.variable(VariableDecl::new(ty, name).init(initializer))
    }

    pub fn method(&mut self, decl: MethodDecl) -> NodeId {
        self.add(NodeKind::Method(decl))
    }

    pub fn class(&mut self, decl: ClassDecl) -> NodeId {
        self.add(NodeKind::Class(decl))
    }

    pub fn type_param(&mut self, name: &str, bounds: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::TypeParameter {
            name: name.into(),
            bounds,
        })
    }

    pub fn import(&mut self, dotted: &str, is_static: bool) -> NodeId {
        let name = self.qualified(dotted);
        self.add(NodeKind::Import { is_static, name })
    }

    pub fn annotation(&mut self, dotted: &str, args: Vec<NodeId>) -> NodeId {
        let annotation_type = self.qualified(dotted);
        self.add(NodeKind::Annotation {
            annotation_type,
            args,
        })
    }

    /// Builds the compilation unit; `package` is a dotted name.
    pub fn unit(
        &mut self,
        package: Option<&str>,
        imports: Vec<NodeId>,
        types: Vec<NodeId>,
    ) -> NodeId {
        let package = package.map(|dotted| {
            let name = self.qualified(dotted);
            self.add(NodeKind::PackageDecl {
                annotations: Vec::new(),
                name,
            })
        });
        self.add(NodeKind::CompilationUnit {
            package,
            imports,
            types,
        })
    }
}

impl ClassDecl {
    pub fn new(kind: ClassKind, name: &str) -> Self {
        Self {
            kind,
            modifiers: Modifiers::default(),
            name: Some(name.into()),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn anonymous(members: Vec<NodeId>) -> Self {
        Self {
            name: None,
            members,
            ..Self::new(ClassKind::Class, "")
        }
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.modifiers.flags |= flags;
        self
    }

    pub fn annotated(mut self, annotation: NodeId) -> Self {
        self.modifiers.annotations.push(annotation);
        self
    }

    pub fn type_params(mut self, params: Vec<NodeId>) -> Self {
        self.type_params = params;
        self
    }

    pub fn extends(mut self, superclass: NodeId) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn implements(mut self, interfaces: Vec<NodeId>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn members(mut self, members: Vec<NodeId>) -> Self {
        self.members = members;
        self
    }
}

impl MethodDecl {
    pub fn new(name: &str, return_type: Option<NodeId>) -> Self {
        Self {
            modifiers: Modifiers::default(),
            type_params: Vec::new(),
            return_type,
            name: name.into(),
            params: Vec::new(),
            throws: Vec::new(),
            body: None,
            default_value: None,
        }
    }

    pub fn constructor(name: &str) -> Self {
        Self::new(name, None)
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.modifiers.flags |= flags;
        self
    }

    pub fn annotated(mut self, annotation: NodeId) -> Self {
        self.modifiers.annotations.push(annotation);
        self
    }

    pub fn type_params(mut self, params: Vec<NodeId>) -> Self {
        self.type_params = params;
        self
    }

    pub fn params(mut self, params: Vec<NodeId>) -> Self {
        self.params = params;
        self
    }

    pub fn throws(mut self, throws: Vec<NodeId>) -> Self {
        self.throws = throws;
        self
    }

    pub fn body(mut self, body: NodeId) -> Self {
        self.body = Some(body);
        self
    }
}

impl VariableDecl {
    pub fn new(ty: NodeId, name: &str) -> Self {
        Self {
            modifiers: Modifiers::default(),
            ty,
            name: name.into(),
            initializer: None,
            varargs: false,
        }
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.modifiers.flags |= flags;
        self
    }

    pub fn annotated(mut self, annotation: NodeId) -> Self {
        self.modifiers.annotations.push(annotation);
        self
    }

    pub fn init(mut self, initializer: Option<NodeId>) -> Self {
        self.initializer = initializer;
        self
    }

    pub fn varargs(mut self) -> Self {
        self.varargs = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finish_links_parents() {
        let mut b = TreeBuilder::new();
        let list = b.qualified("java.util.List");
        let import = b.add(NodeKind::Import {
            is_static: false,
            name: list,
        });
        let unit = b.unit(Some("p"), vec![import], vec![]);
        let tree = b.finish(unit);

        assert_eq!(tree.parent(list), Some(import));
        assert_eq!(tree.parent(import), Some(unit));
        assert_eq!(tree.qualified_name(list).as_deref(), Some("java.util.List"));
        assert_eq!(tree.simple_name(list).map(|n| n.as_str()), Some("List"));
        assert_eq!(tree.descendants(unit).next(), Some(unit));
        assert_eq!(tree.descendants(unit).count(), tree.len());
    }
}

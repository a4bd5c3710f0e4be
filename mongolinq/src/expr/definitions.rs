use crate::host::HostType;
use bson::Bson;
use std::fmt;

/// The identity of an expression node. Two structurally identical
/// sub-expressions at different tree positions have different ids; a
/// cloned `Expression` keeps its id, which is how one parameter node
/// is shared between a lambda's parameter list and its body. Ids are
/// minted by [`ExpressionBuilder`] only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One node of the query expression tree. Immutable once built; the
/// inference engine never mutates the tree, it only accumulates
/// node-id keyed associations on the side.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub id: NodeId,
    pub ty: HostType,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Constant(Constant),
    Parameter(Parameter),
    Binary(Binary),
    Unary(Unary),
    Convert(Convert),
    MemberAccess(MemberAccess),
    MethodCall(MethodCall),
    Lambda(Lambda),
    Quote(Box<Expression>),
    Conditional(Conditional),
    New(New),
    NewArray(NewArray),
    Index(Index),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: Bson,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    Coalesce,
    ArrayIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnaryOperator,
    pub operand: Box<Expression>,
}

/// A conversion; the target type is the node's own `ty`.
#[derive(Debug, Clone, PartialEq)]
pub struct Convert {
    pub operand: Box<Expression>,
}

/// Member access. `object` is absent for static members such as
/// `DateTime.Now`; `declaring` is the type declaring the member
/// (the object's type for instance members).
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    pub object: Option<Box<Expression>>,
    pub declaring: HostType,
    pub member: String,
}

/// A method call. Sequence operators are modeled the way extension
/// methods present them: no receiver, source collection first in
/// `arguments`. Instance methods carry their receiver in `object`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub object: Option<Box<Expression>>,
    pub method: String,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub parameters: Vec<Expression>,
    pub body: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub test: Box<Expression>,
    pub if_true: Box<Expression>,
    pub if_false: Box<Expression>,
}

/// Object construction: positional constructor arguments (paired with
/// the parameter names of the invoked constructor) plus any
/// member-initializer assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct New {
    pub parameter_names: Vec<String>,
    pub arguments: Vec<Expression>,
    pub member_inits: Vec<MemberInit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberInit {
    pub member: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewArray {
    /// `new T[] { a, b, c }`
    Items(Vec<Expression>),
    /// `new T[n]`: bounds only, no element expressions to infer from.
    Bounds(Vec<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub object: Box<Expression>,
    pub arguments: Vec<Expression>,
}

impl Expression {
    /// Direct children in a fixed order; the traversal order of every
    /// walk in the engine.
    pub fn children(&self) -> Vec<&Expression> {
        match &self.kind {
            ExpressionKind::Constant(_) | ExpressionKind::Parameter(_) => vec![],
            ExpressionKind::Binary(b) => vec![&b.left, &b.right],
            ExpressionKind::Unary(u) => vec![&u.operand],
            ExpressionKind::Convert(c) => vec![&c.operand],
            ExpressionKind::MemberAccess(m) => {
                m.object.iter().map(|o| o.as_ref()).collect()
            }
            ExpressionKind::MethodCall(m) => m
                .object
                .iter()
                .map(|o| o.as_ref())
                .chain(m.arguments.iter())
                .collect(),
            ExpressionKind::Lambda(l) => {
                let mut children: Vec<&Expression> = l.parameters.iter().collect();
                children.push(&l.body);
                children
            }
            ExpressionKind::Quote(inner) => vec![inner],
            ExpressionKind::Conditional(c) => vec![&c.test, &c.if_true, &c.if_false],
            ExpressionKind::New(n) => n
                .arguments
                .iter()
                .chain(n.member_inits.iter().map(|mi| &mi.value))
                .collect(),
            ExpressionKind::NewArray(NewArray::Items(items))
            | ExpressionKind::NewArray(NewArray::Bounds(items)) => items.iter().collect(),
            ExpressionKind::Index(i) => std::iter::once(i.object.as_ref())
                .chain(i.arguments.iter())
                .collect(),
        }
    }

    /// Unwrap a quoted lambda argument down to the lambda itself.
    pub fn unquote(&self) -> &Expression {
        match &self.kind {
            ExpressionKind::Quote(inner) => inner.unquote(),
            _ => self,
        }
    }

    pub fn as_lambda(&self) -> Option<&Lambda> {
        match &self.unquote().kind {
            ExpressionKind::Lambda(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Bson> {
        match &self.kind {
            ExpressionKind::Constant(c) => Some(&c.value),
            _ => None,
        }
    }

    /// Whether this node itself can carry a serializer. Lambdas and
    /// quotes are structural wrappers with function types; only their
    /// bodies and parameters are serialized values.
    pub fn has_serializable_value(&self) -> bool {
        !matches!(
            self.kind,
            ExpressionKind::Lambda(_) | ExpressionKind::Quote(_)
        )
    }
}

/// Mints node ids and builds expression nodes. The sole source of
/// `NodeId`s: to share identity (a lambda parameter referenced in its
/// body), clone the built node rather than rebuilding it.
#[derive(Debug, Default)]
pub struct ExpressionBuilder {
    next_id: u32,
}

impl ExpressionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn constant(&mut self, value: impl Into<Bson>, ty: HostType) -> Expression {
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::Constant(Constant {
                value: value.into(),
            }),
        }
    }

    pub fn parameter(&mut self, name: &str, ty: HostType) -> Expression {
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::Parameter(Parameter {
                name: name.to_string(),
            }),
        }
    }

    pub fn binary(
        &mut self,
        op: BinaryOperator,
        left: Expression,
        right: Expression,
        ty: HostType,
    ) -> Expression {
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::Binary(Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }),
        }
    }

    pub fn unary(&mut self, op: UnaryOperator, operand: Expression, ty: HostType) -> Expression {
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::Unary(Unary {
                op,
                operand: Box::new(operand),
            }),
        }
    }

    pub fn convert(&mut self, operand: Expression, target: HostType) -> Expression {
        Expression {
            id: self.fresh(),
            ty: target,
            kind: ExpressionKind::Convert(Convert {
                operand: Box::new(operand),
            }),
        }
    }

    pub fn member(&mut self, object: Expression, member: &str, ty: HostType) -> Expression {
        let declaring = object.ty.clone();
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::MemberAccess(MemberAccess {
                object: Some(Box::new(object)),
                declaring,
                member: member.to_string(),
            }),
        }
    }

    pub fn static_member(
        &mut self,
        declaring: HostType,
        member: &str,
        ty: HostType,
    ) -> Expression {
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::MemberAccess(MemberAccess {
                object: None,
                declaring,
                member: member.to_string(),
            }),
        }
    }

    pub fn call(
        &mut self,
        object: Option<Expression>,
        method: &str,
        arguments: Vec<Expression>,
        ty: HostType,
    ) -> Expression {
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::MethodCall(MethodCall {
                object: object.map(Box::new),
                method: method.to_string(),
                arguments,
            }),
        }
    }

    pub fn lambda(&mut self, parameters: Vec<Expression>, body: Expression) -> Expression {
        let ty = HostType::function(
            parameters.iter().map(|p| p.ty.clone()).collect(),
            body.ty.clone(),
        );
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::Lambda(Lambda {
                parameters,
                body: Box::new(body),
            }),
        }
    }

    pub fn quote(&mut self, lambda: Expression) -> Expression {
        let ty = lambda.ty.clone();
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::Quote(Box::new(lambda)),
        }
    }

    pub fn conditional(
        &mut self,
        test: Expression,
        if_true: Expression,
        if_false: Expression,
        ty: HostType,
    ) -> Expression {
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::Conditional(Conditional {
                test: Box::new(test),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            }),
        }
    }

    pub fn new_object(
        &mut self,
        ty: HostType,
        parameter_names: Vec<&str>,
        arguments: Vec<Expression>,
        member_inits: Vec<(&str, Expression)>,
    ) -> Expression {
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::New(New {
                parameter_names: parameter_names.into_iter().map(String::from).collect(),
                arguments,
                member_inits: member_inits
                    .into_iter()
                    .map(|(member, value)| MemberInit {
                        member: member.to_string(),
                        value,
                    })
                    .collect(),
            }),
        }
    }

    pub fn new_array(&mut self, item_ty: HostType, items: Vec<Expression>) -> Expression {
        Expression {
            id: self.fresh(),
            ty: HostType::array(item_ty),
            kind: ExpressionKind::NewArray(NewArray::Items(items)),
        }
    }

    pub fn new_array_bounds(&mut self, item_ty: HostType, bounds: Vec<Expression>) -> Expression {
        Expression {
            id: self.fresh(),
            ty: HostType::array(item_ty),
            kind: ExpressionKind::NewArray(NewArray::Bounds(bounds)),
        }
    }

    pub fn index(
        &mut self,
        object: Expression,
        arguments: Vec<Expression>,
        ty: HostType,
    ) -> Expression {
        Expression {
            id: self.fresh(),
            ty,
            kind: ExpressionKind::Index(Index {
                object: Box::new(object),
                arguments,
            }),
        }
    }
}

use crate::expr::*;
use std::fmt;

// Source-like rendering. Error messages name offending nodes with this
// so the caller can see exactly which part of their query failed.

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionKind::Constant(c) => write!(f, "{}", c.value),
            ExpressionKind::Parameter(p) => write!(f, "{}", p.name),
            ExpressionKind::Binary(b) => match b.op {
                BinaryOperator::ArrayIndex => write!(f, "{}[{}]", b.left, b.right),
                op => write!(f, "({} {} {})", b.left, operator_token(op), b.right),
            },
            ExpressionKind::Unary(u) => match u.op {
                UnaryOperator::Negate => write!(f, "-{}", u.operand),
                UnaryOperator::Not => write!(f, "!{}", u.operand),
            },
            ExpressionKind::Convert(c) => write!(f, "({}){}", self.ty, c.operand),
            ExpressionKind::MemberAccess(m) => match &m.object {
                Some(object) => write!(f, "{}.{}", object, m.member),
                None => write!(f, "{}.{}", m.declaring, m.member),
            },
            ExpressionKind::MethodCall(m) => {
                if let Some(object) = &m.object {
                    write!(f, "{}.", object)?;
                }
                write!(f, "{}(", m.method)?;
                for (i, argument) in m.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")
            }
            ExpressionKind::Lambda(l) => {
                match l.parameters.as_slice() {
                    [single] => write!(f, "{}", single)?,
                    parameters => {
                        write!(f, "(")?;
                        for (i, parameter) in parameters.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{}", parameter)?;
                        }
                        write!(f, ")")?;
                    }
                }
                write!(f, " => {}", l.body)
            }
            ExpressionKind::Quote(inner) => write!(f, "{}", inner),
            ExpressionKind::Conditional(c) => {
                write!(f, "({} ? {} : {})", c.test, c.if_true, c.if_false)
            }
            ExpressionKind::New(n) => {
                write!(f, "new {}(", self.ty)?;
                for (i, argument) in n.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")?;
                if !n.member_inits.is_empty() {
                    write!(f, " {{ ")?;
                    for (i, init) in n.member_inits.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{} = {}", init.member, init.value)?;
                    }
                    write!(f, " }}")?;
                }
                Ok(())
            }
            ExpressionKind::NewArray(NewArray::Items(items)) => {
                write!(f, "new {} {{ ", self.ty)?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, " }}")
            }
            ExpressionKind::NewArray(NewArray::Bounds(bounds)) => {
                let item = match &self.ty {
                    crate::host::HostType::Array(item) => format!("{}", item),
                    other => format!("{}", other),
                };
                write!(f, "new {}[", item)?;
                for (i, bound) in bounds.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", bound)?;
                }
                write!(f, "]")
            }
            ExpressionKind::Index(index) => {
                write!(f, "{}[", index.object)?;
                for (i, argument) in index.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, "]")
            }
        }
    }
}

fn operator_token(op: BinaryOperator) -> &'static str {
    use BinaryOperator::*;
    match op {
        Eq => "==",
        Ne => "!=",
        Lt => "<",
        Lte => "<=",
        Gt => ">",
        Gte => ">=",
        Add => "+",
        Subtract => "-",
        Multiply => "*",
        Divide => "/",
        Modulo => "%",
        And => "&&",
        Or => "||",
        Coalesce => "??",
        ArrayIndex => "[]",
    }
}

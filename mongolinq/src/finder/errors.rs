use crate::usererror::UserError;
use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// Incomplete convergence: the fixed point was reached with at
    /// least one reachable node still unresolved. Carries the node in
    /// source-like text.
    UnableToDetermineSerializer(String),
    /// A node whose method/shape/member matches no recognized rule and
    /// must not be silently mistranslated.
    NotSupported { expression: String, reason: String },
    /// Two different serializers were deduced for the same node. Two
    /// deduction rules disagreeing is a bug, never a user error.
    AmbiguousSerializer {
        expression: String,
        existing: String,
        new: String,
    },
    /// A serializer whose value type matches the node's static type by
    /// none of the supported coercions.
    MismatchedSerializer {
        expression: String,
        node_type: String,
        serializer_type: String,
    },
    MemberNotFound { type_name: String, member: String },
    /// Member access against a serializer without the per-member
    /// serialization capability.
    NotADocumentSerializer { expression: String, serializer: String },
    ConstructorParameterCountMismatch {
        type_name: String,
        parameters: usize,
        matched: usize,
    },
    ConstructorParameterNotMatched {
        type_name: String,
        parameter: String,
    },
    BoundedArrayNotSupported(String),
    /// `get_required` landed on a sentinel; sentinels are never valid
    /// final answers for a consumer needing an actual codec.
    SentinelSerializerRequired { expression: String, serializer: String },
    ExpectedLambda { expression: String },
    ExpectedConstant { expression: String },
}

impl UserError for Error {
    fn code(&self) -> u32 {
        match self {
            Error::UnableToDetermineSerializer(_) => 4000,
            Error::NotSupported { .. } => 4001,
            Error::AmbiguousSerializer { .. } => 4002,
            Error::MismatchedSerializer { .. } => 4003,
            Error::MemberNotFound { .. } => 4004,
            Error::NotADocumentSerializer { .. } => 4005,
            Error::ConstructorParameterCountMismatch { .. } => 4006,
            Error::ConstructorParameterNotMatched { .. } => 4007,
            Error::BoundedArrayNotSupported(_) => 4008,
            Error::SentinelSerializerRequired { .. } => 4009,
            Error::ExpectedLambda { .. } => 4010,
            Error::ExpectedConstant { .. } => 4011,
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            Error::UnableToDetermineSerializer(expression) => Some(format!(
                "We were unable to determine which serializer to use for the result of `{expression}`."
            )),
            Error::NotSupported { expression, reason } => Some(format!(
                "Expression `{expression}` is not supported: {reason}."
            )),
            Error::AmbiguousSerializer { .. } => None,
            Error::MismatchedSerializer { .. } => None,
            Error::MemberNotFound { type_name, member } => Some(format!(
                "Type `{type_name}` does not have a member named `{member}`."
            )),
            Error::NotADocumentSerializer { .. } => None,
            Error::ConstructorParameterCountMismatch {
                type_name,
                parameters,
                matched,
            } => Some(format!(
                "The constructor of `{type_name}` has {parameters} parameters but {matched} were matched to members."
            )),
            Error::ConstructorParameterNotMatched { .. } => None,
            Error::BoundedArrayNotSupported(_) => None,
            Error::SentinelSerializerRequired { .. } => None,
            Error::ExpectedLambda { .. } => None,
            Error::ExpectedConstant { .. } => None,
        }
    }

    fn technical_message(&self) -> String {
        match self {
            Error::UnableToDetermineSerializer(expression) => format!("no serializer could be determined for expression: {expression}"),
            Error::NotSupported { expression, reason } => format!("expression {expression} is not supported because {reason}"),
            Error::AmbiguousSerializer { expression, existing, new } => format!("two serializers were deduced for expression {expression}: {existing} and {new}"),
            Error::MismatchedSerializer { expression, node_type, serializer_type } => format!("serializer for value type {serializer_type} cannot be used for expression {expression} of type {node_type}"),
            Error::MemberNotFound { type_name, member } => format!("type {type_name} does not have a member named {member}"),
            Error::NotADocumentSerializer { expression, serializer } => format!("serializer {serializer} for expression {expression} does not have member serialization info"),
            Error::ConstructorParameterCountMismatch { type_name, parameters, matched } => format!("constructor of {type_name} has {parameters} parameters but {matched} were matched"),
            Error::ConstructorParameterNotMatched { type_name, parameter } => format!("constructor parameter {parameter} of {type_name} could not be matched to a member"),
            Error::BoundedArrayNotSupported(expression) => format!("bounds-only array creation is not supported: {expression}"),
            Error::SentinelSerializerRequired { expression, serializer } => format!("expression {expression} resolved to the {serializer} sentinel, which is not a usable serializer"),
            Error::ExpectedLambda { expression } => format!("expected a lambda expression but found {expression}"),
            Error::ExpectedConstant { expression } => format!("expected a constant expression but found {expression}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = if let Some(user_message) = self.user_message() {
            format!("{}\n\tCaused by:\n\t{}", user_message, self.technical_message())
        } else {
            self.technical_message()
        };
        write!(f, "Error {}: {}", self.code(), message)
    }
}

impl std::error::Error for Error {}

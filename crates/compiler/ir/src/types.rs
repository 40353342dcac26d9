//! # Type system
//!
//! The builtin scalar types of the dialect plus the user-defined-type and
//! array kinds. Equality is structural throughout.

use dbasic_compiler_ast::{Literal, Sigil, TypeAnnotation};

use crate::UdtId;

/// The builtin scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Boolean,
    Byte,
    Word,
    Dword,
    /// 32-bit signed integer, the default numeric type
    Integer,
    /// 64-bit signed integer
    DoubleInteger,
    Float,
    DoubleFloat,
    String,
}

impl BuiltinType {
    /// Whether values of this type are whole numbers
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::Byte
                | Self::Word
                | Self::Dword
                | Self::Integer
                | Self::DoubleInteger
        )
    }

    /// Whether values of this type are floating point
    pub const fn is_floating_point(self) -> bool {
        matches!(self, Self::Float | Self::DoubleFloat)
    }

    /// The type of a literal constant
    pub const fn of_literal(literal: &Literal) -> Self {
        match literal {
            Literal::Boolean(_) => Self::Boolean,
            Literal::Byte(_) => Self::Byte,
            Literal::Word(_) => Self::Word,
            Literal::Dword(_) => Self::Dword,
            Literal::Integer(_) => Self::Integer,
            Literal::DoubleInteger(_) => Self::DoubleInteger,
            Literal::Float(_) => Self::Float,
            Literal::DoubleFloat(_) => Self::DoubleFloat,
            Literal::String(_) => Self::String,
        }
    }

    /// The implicit type a variable takes from its sigil
    pub const fn of_sigil(sigil: Sigil) -> Self {
        match sigil {
            Sigil::None => Self::Integer,
            Sigil::String => Self::String,
            Sigil::Float => Self::Float,
        }
    }
}

impl From<TypeAnnotation> for BuiltinType {
    fn from(annotation: TypeAnnotation) -> Self {
        match annotation {
            TypeAnnotation::Boolean => Self::Boolean,
            TypeAnnotation::Byte => Self::Byte,
            TypeAnnotation::Word => Self::Word,
            TypeAnnotation::Dword => Self::Dword,
            TypeAnnotation::Integer => Self::Integer,
            TypeAnnotation::DoubleInteger => Self::DoubleInteger,
            TypeAnnotation::Float => Self::Float,
            TypeAnnotation::DoubleFloat => Self::DoubleFloat,
            TypeAnnotation::String => Self::String,
        }
    }
}

impl std::fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Byte => write!(f, "byte"),
            Self::Word => write!(f, "word"),
            Self::Dword => write!(f, "dword"),
            Self::Integer => write!(f, "integer"),
            Self::DoubleInteger => write!(f, "double integer"),
            Self::Float => write!(f, "float"),
            Self::DoubleFloat => write!(f, "double float"),
            Self::String => write!(f, "string"),
        }
    }
}

/// A type in the IR
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Type {
    /// No value; the return type of commands and functions that yield
    /// nothing
    #[default]
    Void,
    Builtin(BuiltinType),
    /// A user-defined type, by id
    Udt(UdtId),
    /// An array of elements of the inner type
    Array(Box<Type>),
}

impl Type {
    pub const fn builtin(kind: BuiltinType) -> Self {
        Self::Builtin(kind)
    }

    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// The builtin kind, if this is a builtin type
    pub const fn as_builtin(&self) -> Option<BuiltinType> {
        match self {
            Self::Builtin(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Whether this is a builtin integral type
    pub fn is_integral(&self) -> bool {
        self.as_builtin().is_some_and(BuiltinType::is_integral)
    }

    /// Whether this is a builtin floating point type
    pub fn is_floating_point(&self) -> bool {
        self.as_builtin()
            .is_some_and(BuiltinType::is_floating_point)
    }
}

impl From<BuiltinType> for Type {
    fn from(kind: BuiltinType) -> Self {
        Self::Builtin(kind)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Builtin(kind) => write!(f, "{kind}"),
            Self::Udt(id) => write!(f, "udt#{}", id.index()),
            Self::Array(inner) => write!(f, "array of {inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archetype_predicates() {
        assert!(BuiltinType::Boolean.is_integral());
        assert!(BuiltinType::DoubleInteger.is_integral());
        assert!(!BuiltinType::Float.is_integral());
        assert!(BuiltinType::DoubleFloat.is_floating_point());
        assert!(!BuiltinType::String.is_integral());
        assert!(!BuiltinType::String.is_floating_point());
    }

    #[test]
    fn test_sigil_types() {
        assert_eq!(BuiltinType::of_sigil(Sigil::None), BuiltinType::Integer);
        assert_eq!(BuiltinType::of_sigil(Sigil::String), BuiltinType::String);
        assert_eq!(BuiltinType::of_sigil(Sigil::Float), BuiltinType::Float);
    }

    #[test]
    fn test_structural_equality() {
        let a = Type::Array(Box::new(Type::builtin(BuiltinType::Integer)));
        let b = Type::Array(Box::new(Type::builtin(BuiltinType::Integer)));
        let c = Type::Array(Box::new(Type::builtin(BuiltinType::Float)));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Type::builtin(BuiltinType::Integer));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Type::builtin(BuiltinType::DoubleInteger).to_string(), "double integer");
        assert_eq!(Type::Void.to_string(), "void");
        assert_eq!(
            Type::Array(Box::new(Type::builtin(BuiltinType::String))).to_string(),
            "array of string"
        );
    }
}

use std::{fmt, sync::Arc};

/// The static type of an expression node in the host language's type
/// system. `Dynamic` doubles as the universal root supertype and the
/// wire's dynamic value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    Bool,
    Char,
    String,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    DateTime,
    TimeSpan,
    Binary,
    ObjectId,
    Dynamic,
    Nullable(Box<HostType>),
    Array(Box<HostType>),
    List(Box<HostType>),
    Set(Box<HostType>),
    Dictionary(Box<HostType>, Box<HostType>),
    Tuple(Vec<HostType>),
    KeyValuePair(Box<HostType>, Box<HostType>),
    Grouping(Box<HostType>, Box<HostType>),
    LookupResult(Box<HostType>, Box<HostType>),
    // Lambda nodes are typed as functions; function-typed nodes never
    // carry serializers themselves.
    Function(Vec<HostType>, Box<HostType>),
    Enum(Arc<EnumType>),
    Class(Arc<ClassType>),
}

/// A named enum with an integral underlying type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    pub name: String,
    pub underlying: HostType,
}

/// A named user class: ordered members, optional base class, declared
/// constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub name: String,
    pub base: Option<Arc<ClassType>>,
    pub members: Vec<ClassMember>,
    pub constructors: Vec<Constructor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassMember {
    pub name: String,
    pub ty: HostType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constructor {
    pub parameters: Vec<ConstructorParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructorParameter {
    pub name: String,
    pub ty: HostType,
}

impl ClassType {
    /// Iterate this class followed by its base chain, most derived first.
    pub fn chain(self: &Arc<Self>) -> impl Iterator<Item = Arc<ClassType>> {
        let mut next = Some(Arc::clone(self));
        std::iter::from_fn(move || {
            let current = next.take()?;
            next = current.base.clone();
            Some(current)
        })
    }

    /// Find a member by exact name, walking up the base chain.
    pub fn find_member(self: &Arc<Self>, name: &str) -> Option<ClassMember> {
        self.chain()
            .find_map(|c| c.members.iter().find(|m| m.name == name).cloned())
    }

    /// Find a member by case-insensitive name, walking up the base
    /// chain. Constructor parameters are matched to members this way.
    pub fn find_member_ignore_case(self: &Arc<Self>, name: &str) -> Option<ClassMember> {
        self.chain().find_map(|c| {
            c.members
                .iter()
                .find(|m| m.name.eq_ignore_ascii_case(name))
                .cloned()
        })
    }

    /// All members of this class and its base chain, base members last,
    /// deduplicated by name in favor of the most derived declaration.
    pub fn all_members(self: &Arc<Self>) -> Vec<ClassMember> {
        let mut out: Vec<ClassMember> = vec![];
        for class in self.chain() {
            for member in &class.members {
                if !out.iter().any(|m| m.name == member.name) {
                    out.push(member.clone());
                }
            }
        }
        out
    }

    pub fn is_subclass_of(self: &Arc<Self>, other: &Arc<ClassType>) -> bool {
        let mut base = self.base.clone();
        while let Some(b) = base {
            if b == *other {
                return true;
            }
            base = b.base.clone();
        }
        false
    }
}

impl HostType {
    pub fn nullable(inner: HostType) -> HostType {
        HostType::Nullable(Box::new(inner))
    }

    pub fn array(item: HostType) -> HostType {
        HostType::Array(Box::new(item))
    }

    pub fn list(item: HostType) -> HostType {
        HostType::List(Box::new(item))
    }

    pub fn set(item: HostType) -> HostType {
        HostType::Set(Box::new(item))
    }

    pub fn dictionary(key: HostType, value: HostType) -> HostType {
        HostType::Dictionary(Box::new(key), Box::new(value))
    }

    pub fn key_value_pair(key: HostType, value: HostType) -> HostType {
        HostType::KeyValuePair(Box::new(key), Box::new(value))
    }

    pub fn grouping(key: HostType, element: HostType) -> HostType {
        HostType::Grouping(Box::new(key), Box::new(element))
    }

    pub fn lookup_result(local: HostType, foreign: HostType) -> HostType {
        HostType::LookupResult(Box::new(local), Box::new(foreign))
    }

    pub fn function(parameters: Vec<HostType>, result: HostType) -> HostType {
        HostType::Function(parameters, Box::new(result))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            HostType::Int16
                | HostType::Int32
                | HostType::Int64
                | HostType::Single
                | HostType::Double
                | HostType::Decimal
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, HostType::Int16 | HostType::Int32 | HostType::Int64)
    }

    pub fn is_numeric_or_nullable_numeric(&self) -> bool {
        match self {
            HostType::Nullable(inner) => inner.is_numeric(),
            other => other.is_numeric(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, HostType::Nullable(_))
    }

    pub fn nullable_inner(&self) -> Option<&HostType> {
        match self {
            HostType::Nullable(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Arc<EnumType>> {
        match self {
            HostType::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Arc<ClassType>> {
        match self {
            HostType::Class(c) => Some(c),
            _ => None,
        }
    }

    /// The item type of a homogeneous sequence, if this is one.
    pub fn item_type(&self) -> Option<&HostType> {
        match self {
            HostType::Array(item) | HostType::List(item) | HostType::Set(item) => Some(item),
            HostType::Grouping(_, element) => Some(element),
            _ => None,
        }
    }

    pub fn is_sequence(&self) -> bool {
        self.item_type().is_some()
    }

    /// A sequence of the same container kind as `self`, but holding
    /// `item` elements. Used when a collection serializer is rebuilt
    /// around a sibling's item serializer.
    pub fn with_item_type(&self, item: HostType) -> Option<HostType> {
        match self {
            HostType::Array(_) => Some(HostType::array(item)),
            HostType::List(_) => Some(HostType::list(item)),
            HostType::Set(_) => Some(HostType::set(item)),
            HostType::Grouping(key, _) => Some(HostType::grouping((**key).clone(), item)),
            _ => None,
        }
    }

    /// Widening conversions the host language performs implicitly:
    /// char to the integral family, smaller integrals to larger ones,
    /// integrals to the floating family, single to double.
    pub fn widens_to(&self, target: &HostType) -> bool {
        use HostType::*;
        match (self, target) {
            (Char, Int32 | Int64 | Single | Double | Decimal) => true,
            (Int16, Int32 | Int64 | Single | Double | Decimal) => true,
            (Int32, Int64 | Single | Double | Decimal) => true,
            (Int64, Single | Double | Decimal) => true,
            (Single, Double) => true,
            _ => false,
        }
    }

    /// Whether `self` is a supertype of `other`. `Dynamic` sits above
    /// every type; classes relate through their base chains.
    pub fn is_supertype_of(&self, other: &HostType) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (HostType::Dynamic, _) => true,
            (HostType::Class(base), HostType::Class(derived)) => derived.is_subclass_of(base),
            _ => false,
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Bool => write!(f, "bool"),
            HostType::Char => write!(f, "char"),
            HostType::String => write!(f, "string"),
            HostType::Int16 => write!(f, "short"),
            HostType::Int32 => write!(f, "int"),
            HostType::Int64 => write!(f, "long"),
            HostType::Single => write!(f, "float"),
            HostType::Double => write!(f, "double"),
            HostType::Decimal => write!(f, "decimal"),
            HostType::DateTime => write!(f, "DateTime"),
            HostType::TimeSpan => write!(f, "TimeSpan"),
            HostType::Binary => write!(f, "byte[]"),
            HostType::ObjectId => write!(f, "ObjectId"),
            HostType::Dynamic => write!(f, "BsonValue"),
            HostType::Nullable(inner) => write!(f, "{}?", inner),
            HostType::Array(item) => write!(f, "{}[]", item),
            HostType::List(item) => write!(f, "List<{}>", item),
            HostType::Set(item) => write!(f, "HashSet<{}>", item),
            HostType::Dictionary(k, v) => write!(f, "Dictionary<{}, {}>", k, v),
            HostType::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            HostType::KeyValuePair(k, v) => write!(f, "KeyValuePair<{}, {}>", k, v),
            HostType::Grouping(k, e) => write!(f, "IGrouping<{}, {}>", k, e),
            HostType::LookupResult(l, r) => write!(f, "LookupResult<{}, {}>", l, r),
            HostType::Function(parameters, result) => {
                write!(f, "Func<")?;
                for p in parameters {
                    write!(f, "{}, ", p)?;
                }
                write!(f, "{}>", result)
            }
            HostType::Enum(e) => write!(f, "{}", e.name),
            HostType::Class(c) => write!(f, "{}", c.name),
        }
    }
}

//! Host type system as seen by the resolver.
//!
//! Rule files reference types of the host language (facts, globals, unit
//! classes). The resolver never owns those types; it asks a [`TypeLookup`]
//! and works with the [`TypeDescriptor`]s it hands back.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::ids::Revision;

// ============================================================================
// TYPE REFERENCES
// ============================================================================

/// Primitive host types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

/// A (possibly parameterized) reference to a host type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeRef {
    Primitive(PrimitiveType),
    /// `java.util.List<Person>` is `Named { "java.util.List", [Person] }`.
    Named { name: SmolStr, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    /// Opaque: the type could not be determined.
    Unknown,
}

impl TypeRef {
    pub fn named(name: &str) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: &str, args: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    pub fn string() -> Self {
        Self::named("java.lang.String")
    }

    /// Parse a type as written in source: `int`, `Person[]`,
    /// `java.util.Map<String, List<Person>>`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::Unknown;
        }
        if let Some(element) = text.strip_suffix("[]") {
            return Self::Array(Box::new(Self::parse(element)));
        }
        if let Some(primitive) = PrimitiveType::from_keyword(text) {
            return Self::Primitive(primitive);
        }
        match (text.find('<'), text.strip_suffix('>')) {
            (Some(open), Some(without_close)) => Self::Named {
                name: text[..open].trim().into(),
                args: split_type_args(&without_close[open + 1..])
                    .into_iter()
                    .map(Self::parse)
                    .collect(),
            },
            _ => Self::named(text),
        }
    }

    /// Qualified name of a named type.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// `int`/`long`/`short`/`byte` and their boxed forms.
    pub fn is_integer_like(&self) -> bool {
        match self {
            Self::Primitive(p) => matches!(
                p,
                PrimitiveType::Int
                    | PrimitiveType::Long
                    | PrimitiveType::Short
                    | PrimitiveType::Byte
            ),
            Self::Named { name, .. } => matches!(
                name.as_str(),
                "java.lang.Integer" | "java.lang.Long" | "java.lang.Short" | "java.lang.Byte"
            ),
            _ => false,
        }
    }

    /// Unwrap `Container<T>` to `T` when `Container` is one of `containers`.
    ///
    /// Containers match by qualified name or by simple name, since unit
    /// classes often spell them unqualified.
    pub fn element_type_in(&self, containers: &[SmolStr]) -> Option<&TypeRef> {
        let Self::Named { name, args } = self else {
            return None;
        };
        let [element] = args.as_slice() else {
            return None;
        };
        let simple = simple_name(name);
        containers
            .iter()
            .any(|c| c == name || simple_name(c) == simple)
            .then_some(element)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.keyword()),
            Self::Named { name, args } if args.is_empty() => f.write_str(name),
            Self::Named { name, args } => {
                write!(f, "{name}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            Self::Array(element) => write!(f, "{element}[]"),
            Self::Unknown => f.write_str("Object"),
        }
    }
}

fn split_type_args(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.retain(|p| !p.trim().is_empty());
    parts
}

/// `a.b.C` → `C`.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit_once('.').map_or(qualified, |(_, name)| name)
}

// ============================================================================
// TYPE DESCRIPTORS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: SmolStr,
    pub ty: TypeRef,
    pub is_static: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: SmolStr,
    /// `None` for `void`.
    pub return_type: Option<TypeRef>,
    pub params: Vec<TypeRef>,
    pub is_static: bool,
}

/// A getter/setter pair collapsed into one property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeanProperty {
    pub name: SmolStr,
    pub value_type: TypeRef,
    pub getter: Option<SmolStr>,
    pub setter: Option<SmolStr>,
}

/// Fields and methods of one host type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub qualified_name: SmolStr,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    /// Comes from a library rather than the project sources.
    pub library: bool,
}

impl TypeDescriptor {
    pub fn new(qualified_name: &str) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
            library: false,
        }
    }

    pub fn in_library(mut self) -> Self {
        self.library = true;
        self
    }

    pub fn with_field(mut self, name: &str, ty: &str) -> Self {
        self.fields.push(FieldInfo {
            name: name.into(),
            ty: TypeRef::parse(ty),
            is_static: false,
        });
        self
    }

    pub fn with_static_field(mut self, name: &str, ty: &str) -> Self {
        self.fields.push(FieldInfo {
            name: name.into(),
            ty: TypeRef::parse(ty),
            is_static: true,
        });
        self
    }

    pub fn with_method(self, name: &str, return_type: Option<&str>, params: &[&str]) -> Self {
        self.push_method(name, return_type, params, false)
    }

    pub fn with_static_method(
        self,
        name: &str,
        return_type: Option<&str>,
        params: &[&str],
    ) -> Self {
        self.push_method(name, return_type, params, true)
    }

    fn push_method(
        mut self,
        name: &str,
        return_type: Option<&str>,
        params: &[&str],
        is_static: bool,
    ) -> Self {
        self.methods.push(MethodInfo {
            name: name.into(),
            return_type: return_type.map(TypeRef::parse),
            params: params.iter().map(|p| TypeRef::parse(p)).collect(),
            is_static,
        });
        self
    }

    /// Package part of the qualified name (empty for the default package).
    pub fn package(&self) -> &str {
        self.qualified_name
            .rsplit_once('.')
            .map_or("", |(package, _)| package)
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.qualified_name)
    }

    pub fn as_type_ref(&self) -> TypeRef {
        TypeRef::named(&self.qualified_name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Every overload named `name`, in declaration order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodInfo> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// Bean-style properties, in order of first accessor.
    ///
    /// `getX()`/`isX()` and `setX(v)` collapse into one property `x`; the
    /// getter's return type wins over the setter's parameter type.
    pub fn bean_properties(&self) -> IndexMap<SmolStr, BeanProperty> {
        let mut properties: IndexMap<SmolStr, BeanProperty> = IndexMap::new();
        for method in self.methods.iter().filter(|m| !m.is_static) {
            match accessor_kind(method) {
                Some(Accessor::Getter(name, ty)) => {
                    let entry = properties.entry(name.clone()).or_insert_with(|| BeanProperty {
                        name,
                        value_type: ty.clone(),
                        getter: None,
                        setter: None,
                    });
                    entry.value_type = ty;
                    entry.getter.get_or_insert_with(|| method.name.clone());
                }
                Some(Accessor::Setter(name, ty)) => {
                    let entry = properties.entry(name.clone()).or_insert_with(|| BeanProperty {
                        name,
                        value_type: ty,
                        getter: None,
                        setter: None,
                    });
                    entry.setter.get_or_insert_with(|| method.name.clone());
                }
                None => {}
            }
        }
        properties
    }

    pub fn bean_property(&self, name: &str) -> Option<BeanProperty> {
        self.bean_properties().swap_remove(name)
    }
}

enum Accessor {
    Getter(SmolStr, TypeRef),
    Setter(SmolStr, TypeRef),
}

fn accessor_kind(method: &MethodInfo) -> Option<Accessor> {
    let name = method.name.as_str();
    if let (Some(rest), [], Some(ty)) =
        (name.strip_prefix("get"), method.params.as_slice(), &method.return_type)
    {
        return property_name(rest).map(|p| Accessor::Getter(p, ty.clone()));
    }
    if let (Some(rest), [], Some(ty @ TypeRef::Primitive(PrimitiveType::Boolean))) =
        (name.strip_prefix("is"), method.params.as_slice(), &method.return_type)
    {
        return property_name(rest).map(|p| Accessor::Getter(p, ty.clone()));
    }
    if let (Some(rest), [ty]) = (name.strip_prefix("set"), method.params.as_slice()) {
        return property_name(rest).map(|p| Accessor::Setter(p, ty.clone()));
    }
    None
}

/// `Name` → `name`, but `URL` stays `URL` (two leading capitals).
fn property_name(rest: &str) -> Option<SmolStr> {
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    if chars.next().is_some_and(char::is_uppercase) {
        return Some(rest.into());
    }
    let mut name: String = first.to_lowercase().collect();
    name.push_str(&rest[first.len_utf8()..]);
    Some(name.into())
}

// ============================================================================
// LOOKUP
// ============================================================================

/// Which types a lookup may see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchScope {
    /// Project sources only.
    Project,
    /// Project sources plus library dependencies.
    #[default]
    WithLibraries,
}

impl SearchScope {
    pub fn includes(self, descriptor: &TypeDescriptor) -> bool {
        match self {
            Self::Project => !descriptor.library,
            Self::WithLibraries => true,
        }
    }
}

/// Name → type lookup supplied by the surrounding system.
///
/// Implementations must answer `None` for anything they do not know and
/// must not panic; an unresolved name is an ordinary outcome.
pub trait TypeLookup: Send + Sync {
    fn find_type(&self, qualified_name: &str, scope: SearchScope) -> Option<Arc<TypeDescriptor>>;

    /// All types of a package, or `None` when the package is unknown.
    fn package_types(&self, package: &str, scope: SearchScope) -> Option<Vec<Arc<TypeDescriptor>>>;

    /// Changes whenever the answers above may change.
    ///
    /// `Revision::default()` marks an unversioned lookup; answers derived
    /// from it are never memoized.
    fn revision(&self) -> Revision {
        Revision::default()
    }
}

/// Registry revisions are drawn from one process-wide counter, so two
/// registries only share a revision when one is an unmodified clone of the
/// other.
static NEXT_REGISTRY_REVISION: AtomicU64 = AtomicU64::new(1);

fn fresh_registry_revision() -> Revision {
    Revision(NEXT_REGISTRY_REVISION.fetch_add(1, Ordering::Relaxed))
}

/// In-memory [`TypeLookup`], ordered by insertion.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    types: IndexMap<SmolStr, Arc<TypeDescriptor>>,
    revision: Revision,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self {
            types: IndexMap::new(),
            revision: fresh_registry_revision(),
        }
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a type.
    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        self.revision = fresh_registry_revision();
        self.types
            .insert(descriptor.qualified_name.clone(), Arc::new(descriptor));
    }

    pub fn remove(&mut self, qualified_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.revision = fresh_registry_revision();
        self.types.shift_remove(qualified_name)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeLookup for TypeRegistry {
    fn find_type(&self, qualified_name: &str, scope: SearchScope) -> Option<Arc<TypeDescriptor>> {
        self.types
            .get(qualified_name)
            .filter(|descriptor| scope.includes(descriptor))
            .cloned()
    }

    fn package_types(&self, package: &str, scope: SearchScope) -> Option<Vec<Arc<TypeDescriptor>>> {
        let types: Vec<_> = self
            .types
            .values()
            .filter(|d| d.package() == package && scope.includes(d))
            .cloned()
            .collect();
        (!types.is_empty()).then_some(types)
    }

    fn revision(&self) -> Revision {
        self.revision
    }
}

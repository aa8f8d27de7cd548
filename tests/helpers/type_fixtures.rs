//! Host types shared by the integration tests.

use once_cell::sync::Lazy;

use drlscope::base::FileId;
use drlscope::hir::{FileSnapshot, TypeDescriptor, TypeRegistry};
use drlscope::syntax::RuleFile;

pub const RULE_CONTEXT: &str = "org.kie.api.runtime.rule.RuleContext";
pub const LEGACY_HELPER: &str = "org.drools.core.spi.KnowledgeHelper";
pub const HELPER: &str = "org.drools.core.rule.consequence.KnowledgeHelper";

/// A small host type system:
///
/// - `org.example`: `Fact`, `Person`, `Address`, `Utils`, `PersonUnit`
/// - `org.example.model`: `Order`, `Item`
/// - `java.lang.String`
/// - the runtime's `RuleContext` and the current `KnowledgeHelper` (but not
///   the legacy one), both library types
pub static TYPES: Lazy<TypeRegistry> = Lazy::new(|| {
    TypeRegistry::new()
        .with(TypeDescriptor::new("org.example.Fact"))
        .with(
            TypeDescriptor::new("org.example.Person")
                .with_method("getName", Some("java.lang.String"), &[])
                .with_method("setName", None, &["java.lang.String"])
                .with_method("getAddress", Some("org.example.Address"), &[]),
        )
        .with(
            TypeDescriptor::new("org.example.Address").with_method(
                "getCity",
                Some("java.lang.String"),
                &[],
            ),
        )
        .with(
            TypeDescriptor::new("org.example.Utils")
                .with_static_field("MAX", "int")
                .with_field("instanceOnly", "int")
                .with_static_method("clamp", Some("int"), &["int"])
                .with_static_method("clamp", Some("long"), &["long"])
                .with_method("helper", None, &[]),
        )
        .with(
            TypeDescriptor::new("org.example.PersonUnit")
                .with_method("getPersons", Some("DataStore<Person>"), &[])
                .with_method("getThreshold", Some("int"), &[])
                .with_method("setThreshold", None, &["int"])
                .with_method("log", None, &["java.lang.String"]),
        )
        .with(TypeDescriptor::new("org.example.model.Order"))
        .with(TypeDescriptor::new("org.example.model.Item"))
        .with(TypeDescriptor::new("java.lang.String").in_library())
        .with(TypeDescriptor::new(RULE_CONTEXT).in_library())
        .with(
            TypeDescriptor::new(HELPER)
                .in_library()
                .with_method("update", None, &["java.lang.Object"])
                .with_method("insert", None, &["java.lang.Object"]),
        )
});

/// The fixture types plus anything extra a test needs.
pub fn types_with(extra: Vec<TypeDescriptor>) -> TypeRegistry {
    extra
        .into_iter()
        .fold(TYPES.clone(), |registry, descriptor| registry.with(descriptor))
}

pub fn snapshot(tree: RuleFile) -> FileSnapshot {
    FileSnapshot::new(FileId::new(0), tree)
}

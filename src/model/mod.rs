use std::collections::HashMap;
use std::fmt;

use crate::mapping::MappingSink;

/// Identity of a field or method: owning class (internal name), member name
/// and descriptor. Which coordinate system the three strings are expressed in
/// depends on where the key came from; see the parser and engine modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    pub owner: String,
    pub name: String,
    pub desc: String,
}

impl MemberKey {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            desc: desc.into(),
        }
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.owner, self.name, self.desc)
    }
}

/// The rename tables produced by one parse of a mapping document.
///
/// Built exactly once, then shared read-only with every remapping consumer.
/// Class keys are class internal names; member keys are [`MemberKey`]s in the
/// parser's source coordinates, except `locals`, which is keyed by the fully
/// renamed (owner, name, descriptor) triple because the engine only knows a
/// method's renamed identity by the time local variables are visited.
#[derive(Debug, Default, Clone)]
pub struct RenameTables {
    pub classes: HashMap<String, String>,
    pub fields: HashMap<MemberKey, String>,
    pub methods: HashMap<MemberKey, String>,
    pub locals: HashMap<MemberKey, Vec<Option<String>>>,
}

impl RenameTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_name(&self, name: &str) -> Option<&str> {
        self.classes.get(name).map(String::as_str)
    }

    pub fn field_name(&self, owner: &str, name: &str, desc: &str) -> Option<&str> {
        self.fields
            .get(&MemberKey::new(owner, name, desc))
            .map(String::as_str)
    }

    pub fn method_name(&self, owner: &str, name: &str, desc: &str) -> Option<&str> {
        self.methods
            .get(&MemberKey::new(owner, name, desc))
            .map(String::as_str)
    }

    /// Slot-indexed local names for a method, looked up by its renamed identity.
    pub fn local_names(&self, owner: &str, name: &str, desc: &str) -> Option<&[Option<String>]> {
        self.locals
            .get(&MemberKey::new(owner, name, desc))
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.fields.is_empty()
            && self.methods.is_empty()
            && self.locals.is_empty()
    }
}

impl MappingSink for RenameTables {
    fn accept_class(&mut self, from: &str, to: &str) {
        self.classes.insert(from.to_string(), to.to_string());
    }

    fn accept_field(&mut self, key: MemberKey, to: &str) {
        self.fields.insert(key, to.to_string());
    }

    fn accept_method(&mut self, key: MemberKey, to: &str) {
        self.methods.insert(key, to.to_string());
    }

    fn accept_locals(&mut self, key: MemberKey, names: Vec<Option<String>>) {
        self.locals.insert(key, names);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_key_display() {
        let key = MemberKey::new("com/example/Foo", "run", "()V");
        assert_eq!(key.to_string(), "com/example/Foo/run()V");
    }

    #[test]
    fn test_tables_lookups_default_to_none() {
        let tables = RenameTables::new();
        assert!(tables.is_empty());
        assert_eq!(tables.class_name("a/B"), None);
        assert_eq!(tables.method_name("a/B", "m", "()V"), None);
        assert_eq!(tables.field_name("a/B", "f", "I"), None);
        assert_eq!(tables.local_names("a/B", "m", "()V"), None);
    }

    #[test]
    fn test_sink_inserts_are_last_write_wins() {
        let mut tables = RenameTables::new();
        tables.accept_class("a/B", "x/First");
        tables.accept_class("a/B", "x/Second");
        assert_eq!(tables.class_name("a/B"), Some("x/Second"));

        let key = MemberKey::new("a/B", "m", "()V");
        tables.accept_method(key.clone(), "first");
        tables.accept_method(key, "second");
        assert_eq!(tables.method_name("a/B", "m", "()V"), Some("second"));
    }

    #[test]
    fn test_sparse_local_names() {
        let mut tables = RenameTables::new();
        tables.accept_locals(
            MemberKey::new("a/B", "m", "(II)V"),
            vec![
                None,
                Some("first".to_string()),
                None,
                Some("third".to_string()),
            ],
        );
        let locals = tables.local_names("a/B", "m", "(II)V").unwrap();
        assert_eq!(locals.len(), 4);
        assert_eq!(locals[1].as_deref(), Some("first"));
        assert_eq!(locals[2], None);
    }
}

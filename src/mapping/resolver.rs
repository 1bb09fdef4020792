use std::collections::HashMap;

use crate::descriptor;

/// Deferred cross-reference fix-up used by both parsers.
///
/// Mapping documents key members in anchor-namespace coordinates, but a
/// descriptor may reference a class whose rename is declared anywhere in the
/// document. After the whole document is consumed, descriptors and owner
/// names are rewritten through the class-name table collected in pass 1 so
/// every table key ends up in one coordinate system.
#[derive(Debug, Default)]
pub struct ClassNameResolver {
    map: HashMap<String, String>,
}

impl ClassNameResolver {
    pub fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn is_identity(&self) -> bool {
        self.map.is_empty()
    }

    pub fn map_name(&self, name: &str) -> String {
        self.map.get(name).cloned().unwrap_or_else(|| name.to_string())
    }

    pub fn map_desc(&self, desc: &str) -> String {
        if self.is_identity() {
            return desc.to_string();
        }
        descriptor::map_desc(desc, &|name| self.map.get(name).cloned())
    }

    pub fn map_method_desc(&self, desc: &str) -> String {
        if self.is_identity() {
            return desc.to_string();
        }
        descriptor::map_method_desc(desc, &|name| self.map.get(name).cloned())
    }
}

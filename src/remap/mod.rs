//! Structural remapping of one compiled unit.
//!
//! [`ClassRemapper`] wraps a downstream [`ClassVisitor`] and rewrites every
//! name, descriptor and signature that passes through it using the renaming
//! capability in [`NameMapper`]. Rename tables are immutable, so any number
//! of remappers may share one [`RenameTables`] across threads; everything
//! mutable (synthetic name counters) lives inside a single method visitation.

use crate::descriptor;
use crate::model::RenameTables;

pub mod lambda;
pub mod locals;
pub mod visitor;

use locals::{is_valid_identifier, LocalNamer};
use visitor::{BootstrapValue, ClassVisitor, Handle, HandleKind, MethodVisitor};

/// The renaming capability the engine is driven by. Absence of an entry
/// always means identity: keep the original name.
pub trait NameMapper {
    fn map_class(&self, name: &str) -> String;
    fn map_method(&self, owner: &str, name: &str, desc: &str) -> String;
    fn map_field(&self, owner: &str, name: &str, desc: &str) -> String;

    fn map_desc(&self, desc: &str) -> String {
        descriptor::map_desc(desc, &|name| Some(self.map_class(name)))
    }

    fn map_method_desc(&self, desc: &str) -> String {
        descriptor::map_method_desc(desc, &|name| Some(self.map_class(name)))
    }

    /// Maps a type operand that may be an internal name or array descriptor.
    fn map_type(&self, ty: &str) -> String {
        descriptor::map_type(ty, &|name| Some(self.map_class(name)))
    }

    fn map_signature(&self, signature: Option<&str>) -> Option<String> {
        signature.map(|s| descriptor::map_signature(s, &|name| Some(self.map_class(name))))
    }

    /// Names of dynamic call sites whose bootstrap was not recognized. A
    /// category of its own, deliberately not consulting the method table, so
    /// an unrelated method rename can never capture a dynamic-call name.
    fn map_invoke_dynamic(&self, name: &str, _desc: &str) -> String {
        name.to_string()
    }

    fn map_handle(&self, handle: &Handle) -> Handle {
        let is_field = matches!(
            handle.kind,
            HandleKind::GetField
                | HandleKind::GetStatic
                | HandleKind::PutField
                | HandleKind::PutStatic
        );

        let (name, desc) = if is_field {
            (
                self.map_field(&handle.owner, &handle.name, &handle.desc),
                self.map_desc(&handle.desc),
            )
        } else {
            (
                self.map_method(&handle.owner, &handle.name, &handle.desc),
                self.map_method_desc(&handle.desc),
            )
        };

        Handle {
            kind: handle.kind,
            owner: self.map_class(&handle.owner),
            name,
            desc,
            is_interface: handle.is_interface,
        }
    }

    fn map_value(&self, value: &BootstrapValue) -> BootstrapValue {
        match value {
            BootstrapValue::Type(desc) => BootstrapValue::Type(self.map_desc(desc)),
            BootstrapValue::MethodType(desc) => {
                BootstrapValue::MethodType(self.map_method_desc(desc))
            }
            BootstrapValue::Handle(handle) => BootstrapValue::Handle(self.map_handle(handle)),
            other => other.clone(),
        }
    }
}

/// [`NameMapper`] over a parsed set of rename tables.
#[derive(Debug, Clone, Copy)]
pub struct TablesMapper<'a> {
    tables: &'a RenameTables,
}

impl<'a> TablesMapper<'a> {
    pub fn new(tables: &'a RenameTables) -> Self {
        Self { tables }
    }

    /// Slot-indexed local names for a method's renamed identity.
    pub fn local_names(
        &self,
        owner: &str,
        name: &str,
        desc: &str,
    ) -> Option<&'a [Option<String>]> {
        self.tables.local_names(owner, name, desc)
    }
}

impl NameMapper for TablesMapper<'_> {
    fn map_class(&self, name: &str) -> String {
        self.tables.class_name(name).unwrap_or(name).to_string()
    }

    fn map_method(&self, owner: &str, name: &str, desc: &str) -> String {
        self.tables
            .method_name(owner, name, desc)
            .unwrap_or(name)
            .to_string()
    }

    fn map_field(&self, owner: &str, name: &str, desc: &str) -> String {
        self.tables
            .field_name(owner, name, desc)
            .unwrap_or(name)
            .to_string()
    }
}

/// The remap engine for one compiled unit.
pub struct ClassRemapper<'a, V: ClassVisitor> {
    inner: V,
    mapper: TablesMapper<'a>,
    rename_invalid_locals: bool,
    class_name: String,
}

impl<'a, V: ClassVisitor> ClassRemapper<'a, V> {
    pub fn new(inner: V, tables: &'a RenameTables, rename_invalid_locals: bool) -> Self {
        Self {
            inner,
            mapper: TablesMapper::new(tables),
            rename_invalid_locals,
            class_name: String::new(),
        }
    }

    pub fn into_inner(self) -> V {
        self.inner
    }
}

impl<V: ClassVisitor> ClassVisitor for ClassRemapper<'_, V> {
    fn visit_class(
        &mut self,
        access: u32,
        name: &str,
        signature: Option<&str>,
        super_name: Option<&str>,
        interfaces: &[String],
    ) {
        self.class_name = name.to_string();

        let mapped_name = self.mapper.map_class(name);
        let mapped_signature = self.mapper.map_signature(signature);
        let mapped_super = super_name.map(|s| self.mapper.map_class(s));
        let mapped_interfaces: Vec<String> =
            interfaces.iter().map(|i| self.mapper.map_class(i)).collect();

        self.inner.visit_class(
            access,
            &mapped_name,
            mapped_signature.as_deref(),
            mapped_super.as_deref(),
            &mapped_interfaces,
        );
    }

    fn visit_field(&mut self, access: u32, name: &str, desc: &str, signature: Option<&str>) {
        let mapped_name = self.mapper.map_field(&self.class_name, name, desc);
        let mapped_desc = self.mapper.map_desc(desc);
        let mapped_signature = self.mapper.map_signature(signature);

        self.inner
            .visit_field(access, &mapped_name, &mapped_desc, mapped_signature.as_deref());
    }

    fn visit_method(
        &mut self,
        access: u32,
        name: &str,
        desc: &str,
        signature: Option<&str>,
        exceptions: &[String],
    ) -> Box<dyn MethodVisitor + '_> {
        // The method's renamed identity is resolved here, before its body
        // visitor exists: the local-name table is keyed by the renamed
        // (owner, name, descriptor) triple, and body events must never feed
        // back into identity resolution.
        let mapped_name = self.mapper.map_method(&self.class_name, name, desc);
        let mapped_desc = self.mapper.map_method_desc(desc);
        let mapped_signature = self.mapper.map_signature(signature);
        let mapped_exceptions: Vec<String> =
            exceptions.iter().map(|e| self.mapper.map_class(e)).collect();

        let mapped_owner = self.mapper.map_class(&self.class_name);
        let local_names = self
            .mapper
            .local_names(&mapped_owner, &mapped_name, &mapped_desc)
            .map(|names| names.to_vec());

        let mapper = self.mapper;
        let rename_invalid_locals = self.rename_invalid_locals;
        let inner = self.inner.visit_method(
            access,
            &mapped_name,
            &mapped_desc,
            mapped_signature.as_deref(),
            &mapped_exceptions,
        );

        Box::new(MethodRemapper {
            inner,
            mapper,
            local_names,
            rename_invalid_locals,
            namer: LocalNamer::new(),
        })
    }

    fn visit_end(&mut self) {
        self.inner.visit_end();
    }
}

struct MethodRemapper<'a, 'v> {
    inner: Box<dyn MethodVisitor + 'v>,
    mapper: TablesMapper<'a>,
    local_names: Option<Vec<Option<String>>>,
    rename_invalid_locals: bool,
    namer: LocalNamer,
}

impl MethodVisitor for MethodRemapper<'_, '_> {
    fn visit_type_insn(&mut self, opcode: u8, ty: &str) {
        self.inner.visit_type_insn(opcode, &self.mapper.map_type(ty));
    }

    fn visit_field_insn(&mut self, opcode: u8, owner: &str, name: &str, desc: &str) {
        // Instruction owners may be array descriptors, not just class names.
        self.inner.visit_field_insn(
            opcode,
            &self.mapper.map_type(owner),
            &self.mapper.map_field(owner, name, desc),
            &self.mapper.map_desc(desc),
        );
    }

    fn visit_method_insn(
        &mut self,
        opcode: u8,
        owner: &str,
        name: &str,
        desc: &str,
        is_interface: bool,
    ) {
        self.inner.visit_method_insn(
            opcode,
            &self.mapper.map_type(owner),
            &self.mapper.map_method(owner, name, desc),
            &self.mapper.map_method_desc(desc),
            is_interface,
        );
    }

    fn visit_invoke_dynamic(
        &mut self,
        name: &str,
        desc: &str,
        bootstrap: &Handle,
        args: &[BootstrapValue],
    ) {
        // The visible name of a lambda call site is the interface method it
        // implements; its rename comes from the reconstructed identity, not
        // from the literal invoked name.
        let mapped_name = match lambda::implemented_method(name, desc, bootstrap, args) {
            Some(implemented) => {
                self.mapper
                    .map_method(&implemented.owner, &implemented.name, &implemented.desc)
            }
            None => self.mapper.map_invoke_dynamic(name, desc),
        };

        let mapped_args: Vec<BootstrapValue> =
            args.iter().map(|arg| self.mapper.map_value(arg)).collect();

        self.inner.visit_invoke_dynamic(
            &mapped_name,
            &self.mapper.map_method_desc(desc),
            &self.mapper.map_handle(bootstrap),
            &mapped_args,
        );
    }

    fn visit_local_variable(
        &mut self,
        name: &str,
        desc: &str,
        signature: Option<&str>,
        start: u32,
        end: u32,
        slot: u16,
    ) {
        let mapped_desc = self.mapper.map_desc(desc);

        let explicit = self
            .local_names
            .as_ref()
            .and_then(|names| names.get(slot as usize))
            .and_then(|name| name.clone());

        let mapped_name = match explicit {
            Some(name) => name,
            None if self.rename_invalid_locals && !is_valid_identifier(name) => {
                self.namer.next(&mapped_desc)
            }
            None => name.to_string(),
        };

        self.inner.visit_local_variable(
            &mapped_name,
            &mapped_desc,
            self.mapper.map_signature(signature).as_deref(),
            start,
            end,
            slot,
        );
    }

    fn visit_end(&mut self) {
        self.inner.visit_end();
    }
}

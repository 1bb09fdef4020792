//! Abstract structural-visitation boundary.
//!
//! Classfile reading and writing live in an external library; the engine only
//! sees visitation events and re-emits them downstream. The traits here are
//! the narrow slice of that event stream the remapper cares about.

use std::fmt;

/// Reference kind of a method handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

/// A method or field handle, as carried by `invokedynamic` bootstrap data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    pub kind: HandleKind,
    pub owner: String,
    pub name: String,
    pub desc: String,
    pub is_interface: bool,
}

impl Handle {
    pub fn new(
        kind: HandleKind,
        owner: impl Into<String>,
        name: impl Into<String>,
        desc: impl Into<String>,
        is_interface: bool,
    ) -> Self {
        Self {
            kind,
            owner: owner.into(),
            name: name.into(),
            desc: desc.into(),
            is_interface,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.owner, self.name, self.desc)
    }
}

/// A static bootstrap argument of an `invokedynamic` instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    /// A type constant, as a field/type descriptor.
    Type(String),
    /// A method type constant, as a method descriptor.
    MethodType(String),
    Handle(Handle),
}

/// Downstream consumer of class-level visitation events.
pub trait ClassVisitor {
    fn visit_class(
        &mut self,
        access: u32,
        name: &str,
        signature: Option<&str>,
        super_name: Option<&str>,
        interfaces: &[String],
    );

    fn visit_field(&mut self, access: u32, name: &str, desc: &str, signature: Option<&str>);

    fn visit_method(
        &mut self,
        access: u32,
        name: &str,
        desc: &str,
        signature: Option<&str>,
        exceptions: &[String],
    ) -> Box<dyn MethodVisitor + '_>;

    fn visit_end(&mut self) {}
}

/// Downstream consumer of method-body visitation events.
pub trait MethodVisitor {
    fn visit_type_insn(&mut self, _opcode: u8, _ty: &str) {}

    fn visit_field_insn(&mut self, _opcode: u8, _owner: &str, _name: &str, _desc: &str) {}

    fn visit_method_insn(
        &mut self,
        _opcode: u8,
        _owner: &str,
        _name: &str,
        _desc: &str,
        _is_interface: bool,
    ) {
    }

    fn visit_invoke_dynamic(
        &mut self,
        _name: &str,
        _desc: &str,
        _bootstrap: &Handle,
        _args: &[BootstrapValue],
    ) {
    }

    fn visit_local_variable(
        &mut self,
        _name: &str,
        _desc: &str,
        _signature: Option<&str>,
        _start: u32,
        _end: u32,
        _slot: u16,
    ) {
    }

    fn visit_end(&mut self) {}
}

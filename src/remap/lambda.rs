//! Recovery of the method identity implemented by a lambda call site.
//!
//! `invokedynamic` instructions carry no direct reference to the interface
//! method a lambda implements; the identity has to be reconstructed from the
//! call-site descriptor and the bootstrap's static arguments before its
//! rename can be looked up.

use tracing::warn;

use super::visitor::{BootstrapValue, Handle, HandleKind};
use crate::descriptor;

const METAFACTORY_OWNER: &str = "java/lang/invoke/LambdaMetafactory";

const METAFACTORY_NAME: &str = "metafactory";
const METAFACTORY_DESC: &str = "(Ljava/lang/invoke/MethodHandles$Lookup;\
Ljava/lang/String;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodType;\
Ljava/lang/invoke/MethodHandle;Ljava/lang/invoke/MethodType;)\
Ljava/lang/invoke/CallSite;";

const ALT_METAFACTORY_NAME: &str = "altMetafactory";
const ALT_METAFACTORY_DESC: &str = "(Ljava/lang/invoke/MethodHandles$Lookup;\
Ljava/lang/String;Ljava/lang/invoke/MethodType;[Ljava/lang/Object;)\
Ljava/lang/invoke/CallSite;";

/// Reconstructs the interface method a `LambdaMetafactory` call site
/// implements: owner is the call-site descriptor's return type, name is the
/// invoked name, descriptor is the method type in static argument 0. Returns
/// `None`, after emitting a diagnostic, for any other bootstrap.
pub fn implemented_method(
    name: &str,
    call_site_desc: &str,
    bootstrap: &Handle,
    args: &[BootstrapValue],
) -> Option<Handle> {
    if !is_lambda_metafactory(bootstrap) {
        warn!(
            owner = %bootstrap.owner,
            name = %bootstrap.name,
            desc = %bootstrap.desc,
            tag = ?bootstrap.kind,
            is_interface = bootstrap.is_interface,
            "unknown invokedynamic bootstrap"
        );
        return None;
    }

    let owner = match descriptor::return_type_internal_name(call_site_desc) {
        Some(owner) => owner,
        None => {
            warn!(desc = call_site_desc, "lambda call site with non-object return type");
            return None;
        }
    };

    let implemented_desc = match args.first() {
        Some(BootstrapValue::MethodType(desc)) => desc,
        _ => {
            warn!(name, "lambda bootstrap missing method type argument");
            return None;
        }
    };

    Some(Handle::new(
        HandleKind::InvokeInterface,
        owner,
        name,
        implemented_desc.clone(),
        true,
    ))
}

fn is_lambda_metafactory(bootstrap: &Handle) -> bool {
    bootstrap.kind == HandleKind::InvokeStatic
        && bootstrap.owner == METAFACTORY_OWNER
        && (bootstrap.name == METAFACTORY_NAME && bootstrap.desc == METAFACTORY_DESC
            || bootstrap.name == ALT_METAFACTORY_NAME && bootstrap.desc == ALT_METAFACTORY_DESC)
        && !bootstrap.is_interface
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metafactory_handle() -> Handle {
        Handle::new(
            HandleKind::InvokeStatic,
            METAFACTORY_OWNER,
            METAFACTORY_NAME,
            METAFACTORY_DESC,
            false,
        )
    }

    #[test]
    fn test_metafactory_call_site_resolves_implemented_identity() {
        let args = vec![
            BootstrapValue::MethodType("(I)Ljava/lang/String;".to_string()),
            BootstrapValue::Handle(Handle::new(
                HandleKind::InvokeStatic,
                "a/B",
                "lambda$main$0",
                "(I)Ljava/lang/String;",
                false,
            )),
            BootstrapValue::MethodType("(I)Ljava/lang/String;".to_string()),
        ];

        let implemented = implemented_method(
            "apply",
            "()Ljava/util/function/IntFunction;",
            &metafactory_handle(),
            &args,
        )
        .unwrap();

        assert_eq!(implemented.owner, "java/util/function/IntFunction");
        assert_eq!(implemented.name, "apply");
        assert_eq!(implemented.desc, "(I)Ljava/lang/String;");
        assert_eq!(implemented.kind, HandleKind::InvokeInterface);
        assert!(implemented.is_interface);
    }

    #[test]
    fn test_alt_metafactory_recognized() {
        let bootstrap = Handle::new(
            HandleKind::InvokeStatic,
            METAFACTORY_OWNER,
            ALT_METAFACTORY_NAME,
            ALT_METAFACTORY_DESC,
            false,
        );
        let args = vec![BootstrapValue::MethodType("()V".to_string())];
        let implemented =
            implemented_method("run", "()Ljava/lang/Runnable;", &bootstrap, &args).unwrap();
        assert_eq!(implemented.owner, "java/lang/Runnable");
        assert_eq!(implemented.desc, "()V");
    }

    #[test]
    fn test_wrong_bootstrap_owner_is_no_match() {
        let bootstrap = Handle::new(
            HandleKind::InvokeStatic,
            "java/lang/invoke/StringConcatFactory",
            "makeConcatWithConstants",
            METAFACTORY_DESC,
            false,
        );
        assert!(implemented_method("concat", "()Ljava/lang/Runnable;", &bootstrap, &[]).is_none());
    }

    #[test]
    fn test_non_static_or_interface_handle_is_no_match() {
        let mut bootstrap = metafactory_handle();
        bootstrap.kind = HandleKind::InvokeVirtual;
        assert!(implemented_method("run", "()Ljava/lang/Runnable;", &bootstrap, &[]).is_none());

        let mut bootstrap = metafactory_handle();
        bootstrap.is_interface = true;
        assert!(implemented_method("run", "()Ljava/lang/Runnable;", &bootstrap, &[]).is_none());
    }

    #[test]
    fn test_missing_method_type_argument_is_no_match() {
        let args = vec![BootstrapValue::Str("not a method type".to_string())];
        assert!(
            implemented_method("run", "()Ljava/lang/Runnable;", &metafactory_handle(), &args)
                .is_none()
        );
    }

    #[test]
    fn test_primitive_return_type_is_no_match() {
        let args = vec![BootstrapValue::MethodType("()V".to_string())];
        assert!(implemented_method("run", "()I", &metafactory_handle(), &args).is_none());
    }
}

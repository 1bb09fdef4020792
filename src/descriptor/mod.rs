//! JVM descriptor and generic-signature string machinery.
//!
//! Descriptors use internal class names (`java/lang/String`). All rewriting
//! functions take a lookup returning the replacement for a class name, or
//! `None` to keep the original.

/// Maps a class internal name through `lookup`, falling back to the original.
pub fn map_internal_name(name: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    lookup(name).unwrap_or_else(|| name.to_string())
}

/// Maps a type that may be either an internal name or an array descriptor,
/// matching how owners of array types appear in instruction operands.
pub fn map_type(ty: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    if ty.starts_with('[') || (ty.starts_with('L') && ty.ends_with(';')) {
        map_desc(ty, lookup)
    } else {
        map_internal_name(ty, lookup)
    }
}

/// Rewrites class names inside a single field/type descriptor.
pub fn map_desc(desc: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(desc.len());
    let mut rest = desc;

    while let Some(stripped) = rest.strip_prefix('[') {
        out.push('[');
        rest = stripped;
    }

    if let Some(inner) = rest.strip_prefix('L').and_then(|r| r.strip_suffix(';')) {
        out.push('L');
        out.push_str(&map_internal_name(inner, lookup));
        out.push(';');
    } else {
        out.push_str(rest);
    }

    out
}

/// Rewrites class names inside a method descriptor, e.g.
/// `(ILjava/lang/String;)[La/B;`.
pub fn map_method_desc(desc: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(desc.len());
    let mut chars = desc.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '(' | ')' | '[' => out.push(c),
            'L' => {
                let start = i + 1;
                let end = desc[start..]
                    .find(';')
                    .map(|p| start + p)
                    .unwrap_or(desc.len());
                out.push('L');
                out.push_str(&map_internal_name(&desc[start..end], lookup));
                out.push(';');
                while let Some(&(j, _)) = chars.peek() {
                    if j > end {
                        break;
                    }
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Return type portion of a method descriptor, or `None` if malformed.
pub fn return_type(method_desc: &str) -> Option<&str> {
    method_desc.rfind(')').map(|p| &method_desc[p + 1..])
}

/// Internal name of an object return type, e.g. `(I)La/B;` -> `a/B`.
/// `None` for primitive, array and void returns.
pub fn return_type_internal_name(method_desc: &str) -> Option<&str> {
    return_type(method_desc)?
        .strip_prefix('L')
        .and_then(|r| r.strip_suffix(';'))
}

/// Base name and plurality for a synthetic local variable of the given type.
///
/// Arrays use the element type and are marked plural. The base is the type's
/// unqualified simple name with its first character lowercased; nested-class
/// `$` separators are kept, matching `Class.getSimpleName` derivation from an
/// internal name.
pub fn synthetic_base_name(desc: &str) -> (String, bool) {
    let plural = desc.starts_with('[');
    let element = desc.trim_start_matches('[');

    let simple = match element {
        "B" => "byte",
        "C" => "char",
        "D" => "double",
        "F" => "float",
        "I" => "int",
        "J" => "long",
        "S" => "short",
        "Z" => "boolean",
        _ => element
            .strip_prefix('L')
            .and_then(|r| r.strip_suffix(';'))
            .map(|inner| inner.rsplit('/').next().unwrap_or(inner))
            .unwrap_or("var"),
    };

    let mut base = String::with_capacity(simple.len());
    let mut chars = simple.chars();
    match chars.next() {
        Some(first) => {
            base.extend(first.to_lowercase());
            base.push_str(chars.as_str());
        }
        None => base.push_str("var"),
    }

    (base, plural)
}

/// Rewrites class names inside a generic signature (class, method or field
/// form). Signatures that fail to scan are passed through unchanged; the
/// format is produced by compilers and malformed input is not worth failing
/// a whole class over.
pub fn map_signature(signature: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut scanner = SignatureScanner {
        input: signature,
        pos: 0,
        out: String::with_capacity(signature.len()),
        lookup,
    };

    if scanner.scan() {
        scanner.out
    } else {
        signature.to_string()
    }
}

struct SignatureScanner<'a> {
    input: &'a str,
    pos: usize,
    out: String,
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl SignatureScanner<'_> {
    fn scan(&mut self) -> bool {
        // Signatures are a sequence of characters where class names only ever
        // appear after an `L` or a `.` (inner class suffix) and run until one
        // of `<;.`. Type variables (`T...;`) must not be rewritten. Formal
        // type parameter names (`<Name:...>`) are free identifiers, so the
        // leading region is consumed first lest a name starting with `L` or
        // `T` be mistaken for a type.
        if self.input.starts_with('<') && !self.scan_formal_parameters() {
            return false;
        }

        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'L' => {
                    if !self.scan_class_name() {
                        return false;
                    }
                }
                b'.' => {
                    // Inner class suffix: a simple name, never remapped on its
                    // own since the owner was already rewritten.
                    self.out.push('.');
                    self.pos += 1;
                    if !self.copy_identifier() {
                        return false;
                    }
                }
                b'T' => {
                    if !self.scan_type_variable() {
                        return false;
                    }
                }
                c => {
                    self.out.push(c as char);
                    self.pos += 1;
                }
            }
        }

        true
    }

    fn scan_formal_parameters(&mut self) -> bool {
        self.out.push('<');
        self.pos += 1;

        let bytes = self.input.as_bytes();
        let mut depth = 1usize;
        let mut at_name = true;
        while self.pos < bytes.len() {
            if at_name {
                if !self.copy_formal_name() {
                    return false;
                }
                at_name = false;
                continue;
            }
            match bytes[self.pos] {
                b'<' => {
                    depth += 1;
                    self.out.push('<');
                    self.pos += 1;
                }
                b'>' => {
                    depth -= 1;
                    self.out.push('>');
                    self.pos += 1;
                    if depth == 0 {
                        return true;
                    }
                }
                b'L' => {
                    if !self.scan_class_name() {
                        return false;
                    }
                }
                b'T' => {
                    if !self.scan_type_variable() {
                        return false;
                    }
                }
                b'.' => {
                    self.out.push('.');
                    self.pos += 1;
                    if !self.copy_identifier() {
                        return false;
                    }
                }
                b';' if depth == 1 => {
                    // End of a bound at region depth: a following `:` opens
                    // another bound, `>` closes the region, anything else
                    // starts the next formal parameter name.
                    self.out.push(';');
                    self.pos += 1;
                    match bytes.get(self.pos) {
                        Some(b':') | Some(b'>') => {}
                        Some(_) => at_name = true,
                        None => return false,
                    }
                }
                c => {
                    self.out.push(c as char);
                    self.pos += 1;
                }
            }
        }

        false
    }

    fn copy_formal_name(&mut self) -> bool {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && bytes[self.pos] != b':' {
            if matches!(bytes[self.pos], b'<' | b'>' | b';') {
                return false;
            }
            self.pos += 1;
        }
        if self.pos >= bytes.len() || self.pos == start {
            return false;
        }
        self.out.push_str(&self.input[start..self.pos]);
        self.out.push(':');
        self.pos += 1;
        true
    }

    fn scan_class_name(&mut self) -> bool {
        self.out.push('L');
        self.pos += 1;

        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && !matches!(bytes[self.pos], b'<' | b';' | b'.') {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return false;
        }

        let name = &self.input[start..self.pos];
        self.out.push_str(&map_internal_name(name, self.lookup));
        true
    }

    fn copy_identifier(&mut self) -> bool {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && !matches!(bytes[self.pos], b'<' | b';' | b'.') {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return false;
        }
        self.out.push_str(&self.input[start..self.pos]);
        true
    }

    /// Copies a type variable reference (`TIdent`) verbatim, leaving its
    /// terminator for the caller.
    fn scan_type_variable(&mut self) -> bool {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && !matches!(bytes[self.pos], b';' | b':' | b'<' | b'.') {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return false;
        }
        self.out.push_str(&self.input[start..self.pos]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_map_desc_object() {
        let lookup = lookup_from(&[("a/B", "x/Y")]);
        assert_eq!(map_desc("La/B;", &lookup), "Lx/Y;");
        assert_eq!(map_desc("La/Unmapped;", &lookup), "La/Unmapped;");
    }

    #[test]
    fn test_map_desc_primitives_and_arrays() {
        let lookup = lookup_from(&[("a/B", "x/Y")]);
        assert_eq!(map_desc("I", &lookup), "I");
        assert_eq!(map_desc("[[I", &lookup), "[[I");
        assert_eq!(map_desc("[La/B;", &lookup), "[Lx/Y;");
    }

    #[test]
    fn test_map_method_desc() {
        let lookup = lookup_from(&[("a/B", "x/Y"), ("a/C", "x/Z")]);
        assert_eq!(
            map_method_desc("(ILa/B;[La/C;)La/B;", &lookup),
            "(ILx/Y;[Lx/Z;)Lx/Y;"
        );
        assert_eq!(map_method_desc("()V", &lookup), "()V");
    }

    #[test]
    fn test_map_type_owner_forms() {
        let lookup = lookup_from(&[("a/B", "x/Y")]);
        assert_eq!(map_type("a/B", &lookup), "x/Y");
        assert_eq!(map_type("[La/B;", &lookup), "[Lx/Y;");
    }

    #[test]
    fn test_return_type_extraction() {
        assert_eq!(return_type("(I)Ljava/lang/String;"), Some("Ljava/lang/String;"));
        assert_eq!(
            return_type_internal_name("(I)Ljava/lang/String;"),
            Some("java/lang/String")
        );
        assert_eq!(return_type_internal_name("(I)I"), None);
        assert_eq!(return_type_internal_name("no-parens"), None);
    }

    #[test]
    fn test_synthetic_base_names() {
        assert_eq!(synthetic_base_name("I"), ("int".to_string(), false));
        assert_eq!(synthetic_base_name("[I"), ("int".to_string(), true));
        assert_eq!(
            synthetic_base_name("Ljava/lang/String;"),
            ("string".to_string(), false)
        );
        assert_eq!(
            synthetic_base_name("[[Ljava/util/List;"),
            ("list".to_string(), true)
        );
        assert_eq!(
            synthetic_base_name("La/Outer$Inner;"),
            ("outer$Inner".to_string(), false)
        );
    }

    #[test]
    fn test_map_signature_generics() {
        let lookup = lookup_from(&[("java/util/List", "x/List"), ("a/B", "x/Y")]);
        assert_eq!(
            map_signature("Ljava/util/List<La/B;>;", &lookup),
            "Lx/List<Lx/Y;>;"
        );
    }

    #[test]
    fn test_map_signature_type_variables_untouched() {
        let lookup = lookup_from(&[("TT", "broken")]);
        assert_eq!(
            map_signature("<T:Ljava/lang/Object;>(TT;)TT;", &lookup),
            "<T:Ljava/lang/Object;>(TT;)TT;"
        );
    }

    #[test]
    fn test_map_signature_type_parameter_bound_is_rewritten() {
        let lookup = lookup_from(&[("a/B", "x/Y")]);
        assert_eq!(map_signature("<T:La/B;>(TT;)V", &lookup), "<T:Lx/Y;>(TT;)V");
    }

    #[test]
    fn test_map_signature_formal_names_are_not_types() {
        // Formal type parameter names may begin with `L` or `T`; only their
        // bounds are class references.
        let lookup = lookup_from(&[("a/B", "x/Y"), ("LFoo", "broken"), ("Thing", "broken")]);
        assert_eq!(
            map_signature("<LFoo:La/B;>(TLFoo;)V", &lookup),
            "<LFoo:Lx/Y;>(TLFoo;)V"
        );
        assert_eq!(
            map_signature("<Thing:La/B;:La/B;>(TThing;)V", &lookup),
            "<Thing:Lx/Y;:Lx/Y;>(TThing;)V"
        );
    }

    #[test]
    fn test_map_signature_multiple_formal_parameters() {
        let lookup = lookup_from(&[("a/B", "x/Y")]);
        assert_eq!(
            map_signature("<A:La/B;B:TT;C::La/B;>(TA;TB;TC;)V", &lookup),
            "<A:Lx/Y;B:TT;C::Lx/Y;>(TA;TB;TC;)V"
        );
    }

    #[test]
    fn test_map_signature_inner_class_suffix() {
        let lookup = lookup_from(&[("a/Outer", "x/Mapped")]);
        assert_eq!(
            map_signature("La/Outer<TT;>.Inner;", &lookup),
            "Lx/Mapped<TT;>.Inner;"
        );
    }

    #[test]
    fn test_map_signature_malformed_passes_through() {
        let lookup = lookup_from(&[("a/B", "x/Y")]);
        assert_eq!(map_signature("La/B", &lookup), "La/B");
    }
}

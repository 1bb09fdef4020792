//! Hierarchical tiny v2 mapping format.
//!
//! A whitespace-indented tree: one leading tab per nesting depth. Depth 0
//! `c` rows declare classes (one name per namespace), depth 1 `m`/`f` rows
//! declare members (anchor descriptor plus one name per namespace), depth 2
//! `p` rows name method parameters by local-variable slot. The pre-class
//! header region may set `escaped-names`, which turns on escape decoding for
//! the rest of the document. `v` rows are structurally validated but not
//! supported.
//!
//! Parsing buffers immutable records and derives the final tables in a pure
//! second pass, because member descriptors may reference classes declared
//! later in the tree.

use std::collections::HashMap;
use std::io;

use super::resolver::ClassNameResolver;
use super::{namespace_index, MappingError, MappingSink};
use crate::model::MemberKey;

#[derive(Debug)]
struct ClassRec {
    /// One name per namespace, already unescaped.
    names: Vec<String>,
}

#[derive(Debug)]
struct MemberRec {
    class_idx: usize,
    is_method: bool,
    /// Descriptor in anchor (namespace 0) coordinates.
    desc_anchor: String,
    names: Vec<String>,
}

#[derive(Debug)]
struct ParamRec {
    member_idx: usize,
    slot: usize,
    names: Vec<String>,
}

#[derive(Debug, Default)]
struct Document {
    classes: Vec<ClassRec>,
    members: Vec<MemberRec>,
    params: Vec<ParamRec>,
}

pub(crate) fn read<S: MappingSink>(
    header: &str,
    lines: impl Iterator<Item = io::Result<String>>,
    from: &str,
    to: &str,
    sink: &mut S,
) -> Result<(), MappingError> {
    let cols: Vec<&str> = header.split('\t').collect();
    // tiny + major + minor + at least two namespaces
    if cols.len() < 5 {
        return Err(MappingError::format(1, "invalid tiny v2 header"));
    }

    let namespaces = &cols[3..];
    let ns_a = namespace_index(namespaces, from)?;
    let ns_b = namespace_index(namespaces, to)?;

    let doc = collect(lines, namespaces.len(), ns_b)?;
    derive(&doc, ns_a, ns_b, sink);
    Ok(())
}

/// Pass 1: stream the indent tree into flat records.
fn collect(
    lines: impl Iterator<Item = io::Result<String>>,
    ns_count: usize,
    ns_b: usize,
) -> Result<Document, MappingError> {
    let mut doc = Document::default();
    let mut escaped_names = false;

    let mut in_header = true;
    let mut in_class = false;
    let mut in_method = false;

    let mut line_no = 1;
    for line in lines {
        line_no += 1;
        let line = line?;
        if line.is_empty() {
            continue;
        }

        let indent = line.bytes().take_while(|b| *b == b'\t').count();
        let cols: Vec<&str> = line[indent..].split('\t').collect();
        let tag = cols[0];

        match indent {
            0 => {
                in_header = false;
                in_class = false;
                in_method = false;

                if tag == "c" {
                    if cols.len() != 1 + ns_count {
                        return Err(MappingError::format(line_no, "invalid class declaration"));
                    }
                    doc.classes.push(ClassRec {
                        names: unescape_all(&cols[1..], escaped_names, line_no)?,
                    });
                    in_class = true;
                }
            }
            1 => {
                in_method = false;

                if in_header {
                    if tag == "escaped-names" {
                        escaped_names = true;
                    }
                } else if in_class && (tag == "m" || tag == "f") {
                    if cols.len() != 2 + ns_count {
                        return Err(MappingError::format(
                            line_no,
                            format!("invalid {} declaration", if tag == "m" { "method" } else { "field" }),
                        ));
                    }
                    doc.members.push(MemberRec {
                        class_idx: doc.classes.len() - 1,
                        is_method: tag == "m",
                        desc_anchor: unescape_opt(cols[1], escaped_names, line_no)?,
                        names: unescape_all(&cols[2..], escaped_names, line_no)?,
                    });
                    in_method = tag == "m";
                }
            }
            2 => {
                if in_method && tag == "p" {
                    if cols.len() != 2 + ns_count {
                        return Err(MappingError::format(
                            line_no,
                            "invalid method parameter declaration",
                        ));
                    }
                    let names = unescape_all(&cols[2..], escaped_names, line_no)?;
                    if names[ns_b].is_empty() {
                        continue;
                    }
                    let slot = cols[1].parse().map_err(|_| {
                        MappingError::format(line_no, "invalid local variable slot index")
                    })?;
                    doc.params.push(ParamRec {
                        member_idx: doc.members.len() - 1,
                        slot,
                        names,
                    });
                } else if in_method && tag == "v" {
                    if cols.len() != 4 + ns_count {
                        return Err(MappingError::format(
                            line_no,
                            "invalid method variable declaration",
                        ));
                    }
                    // Validated but unsupported: failing loudly beats losing
                    // the entry without any observable symptom.
                    let mapped = unescape_opt(cols[4 + ns_b], escaped_names, line_no)?;
                    if !mapped.is_empty() {
                        return Err(MappingError::Unsupported(format!(
                            "local variable table row '{}' on line {}",
                            mapped, line_no
                        )));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(doc)
}

/// Pass 2: pure derivation of the final tables from the records and the
/// selected namespace pair.
fn derive<S: MappingSink>(doc: &Document, ns_a: usize, ns_b: usize, sink: &mut S) {
    let mut anchor_to_src: HashMap<String, String> = HashMap::new();
    let mut src_to_dst: HashMap<String, String> = HashMap::new();

    for class in &doc.classes {
        let src = &class.names[ns_a];
        let dst = &class.names[ns_b];
        if dst.is_empty() {
            continue;
        }

        sink.accept_class(src, dst);
        src_to_dst.insert(src.clone(), dst.clone());
        if ns_a != 0 {
            anchor_to_src.insert(class.names[0].clone(), src.clone());
        }
    }

    let anchor_fixer = ClassNameResolver::new(anchor_to_src);

    // Member keys land in source coordinates; duplicates collapse
    // last-write-wins before anything reaches the sinks.
    let mut fields: HashMap<MemberKey, String> = HashMap::new();
    let mut methods: HashMap<MemberKey, String> = HashMap::new();
    let mut member_keys: Vec<MemberKey> = Vec::with_capacity(doc.members.len());

    for rec in &doc.members {
        let owner = doc.classes[rec.class_idx].names[ns_a].clone();
        let desc = if rec.is_method {
            anchor_fixer.map_method_desc(&rec.desc_anchor)
        } else {
            anchor_fixer.map_desc(&rec.desc_anchor)
        };
        let key = MemberKey::new(owner, rec.names[ns_a].clone(), desc);

        let dst = &rec.names[ns_b];
        if !dst.is_empty() {
            if rec.is_method {
                methods.insert(key.clone(), dst.clone());
            } else {
                fields.insert(key.clone(), dst.clone());
            }
        }
        member_keys.push(key);
    }

    // Parameter names grouped into slot-indexed rows per method. Grouping is
    // by the deduplicated source key, so duplicate method rows merge into one
    // row in document order and each key is delivered exactly once.
    let mut locals: HashMap<MemberKey, Vec<Option<String>>> = HashMap::new();
    for param in &doc.params {
        let name = &param.names[ns_b];
        if name.is_empty() {
            continue;
        }
        let row = locals
            .entry(member_keys[param.member_idx].clone())
            .or_default();
        if row.len() <= param.slot {
            row.resize(param.slot + 1, None);
        }
        row[param.slot] = Some(name.clone());
    }

    for (key, to) in &fields {
        sink.accept_field(key.clone(), to);
    }
    for (key, to) in &methods {
        sink.accept_method(key.clone(), to);
    }

    // Local tables are looked up by the engine under the renamed method
    // identity, so the key is finalized into target coordinates: renamed
    // owner, renamed method name, target-mapped descriptor.
    let target_fixer = ClassNameResolver::new(src_to_dst);
    for (src_key, row) in locals {
        let owner = target_fixer.map_name(&src_key.owner);
        let name = methods
            .get(&src_key)
            .cloned()
            .unwrap_or_else(|| src_key.name.clone());
        let desc = target_fixer.map_method_desc(&src_key.desc);
        sink.accept_locals(MemberKey::new(owner, name, desc), row);
    }
}

fn unescape_all(
    cols: &[&str],
    escaped_names: bool,
    line_no: usize,
) -> Result<Vec<String>, MappingError> {
    cols.iter()
        .map(|col| unescape_opt(col, escaped_names, line_no))
        .collect()
}

fn unescape_opt(s: &str, escaped_names: bool, line_no: usize) -> Result<String, MappingError> {
    if !escaped_names || !s.contains('\\') {
        return Ok(s.to_string());
    }
    unescape(s).map_err(|message| MappingError::format(line_no, message))
}

fn unescape(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('t') => out.push('\t'),
            Some(other) => return Err(format!("invalid escape character: \\{}", other)),
            None => return Err("incomplete escape sequence at end of string".to_string()),
        }
    }

    Ok(out)
}

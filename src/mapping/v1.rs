//! Legacy flat mapping format.
//!
//! Header `v1<TAB>ns0<TAB>ns1...`, body rows tagged `CLASS`, `FIELD` or
//! `METHOD`. Member rows carry their owner and descriptor in anchor
//! (namespace 0) coordinates, and may reference classes whose rename appears
//! later in the stream, so parsing is two-pass: pass 1 handles class rows and
//! buffers member rows, pass 2 rewrites the buffered rows through the class
//! table and emits them.

use std::collections::HashMap;
use std::io;

use super::resolver::ClassNameResolver;
use super::{namespace_index, MappingError, MappingSink};
use crate::model::MemberKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberKind {
    Field,
    Method,
}

/// A buffered `FIELD`/`METHOD` row: owner and descriptor in anchor
/// coordinates, one member name per namespace.
#[derive(Debug)]
struct MemberRow {
    kind: MemberKind,
    owner_anchor: String,
    desc_anchor: String,
    names: Vec<String>,
}

pub(crate) fn read<S: MappingSink>(
    header: &str,
    lines: impl Iterator<Item = io::Result<String>>,
    from: &str,
    to: &str,
    sink: &mut S,
) -> Result<(), MappingError> {
    let header_cols: Vec<&str> = header.split('\t').collect();
    let namespaces = &header_cols[1..];
    if namespaces.len() < 2 {
        return Err(MappingError::format(
            1,
            "v1 header declares fewer than two namespaces",
        ));
    }

    let from_idx = namespace_index(namespaces, from)?;
    let to_idx = namespace_index(namespaces, to)?;
    let ns_count = namespaces.len();

    let mut anchor_to_src: HashMap<String, String> = HashMap::new();
    let mut members: Vec<MemberRow> = Vec::new();

    let mut line_no = 1;
    for line in lines {
        line_no += 1;
        let line = line?;
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 2 {
            continue;
        }

        match cols[0] {
            "CLASS" => {
                if cols.len() != 1 + ns_count {
                    return Err(MappingError::format(line_no, "invalid CLASS row"));
                }

                let src_name = cols[1 + from_idx];
                let dst_name = cols[1 + to_idx];

                if !dst_name.is_empty() {
                    sink.accept_class(src_name, dst_name);
                    if from_idx != 0 {
                        anchor_to_src.insert(cols[1].to_string(), src_name.to_string());
                    }
                }
            }
            tag @ ("FIELD" | "METHOD") => {
                if cols.len() != 3 + ns_count {
                    return Err(MappingError::format(line_no, format!("invalid {} row", tag)));
                }

                members.push(MemberRow {
                    kind: if tag == "FIELD" {
                        MemberKind::Field
                    } else {
                        MemberKind::Method
                    },
                    owner_anchor: cols[1].to_string(),
                    desc_anchor: cols[2].to_string(),
                    names: cols[3..].iter().map(|s| s.to_string()).collect(),
                });
            }
            _ => {}
        }
    }

    emit_members(
        &members,
        &ClassNameResolver::new(anchor_to_src),
        from_idx,
        to_idx,
        sink,
    );
    Ok(())
}

/// Pass 2: pure function over buffered rows. Owner and descriptor move from
/// anchor coordinates into source coordinates so they match the names the
/// remap engine will look up.
fn emit_members<S: MappingSink>(
    rows: &[MemberRow],
    resolver: &ClassNameResolver,
    from_idx: usize,
    to_idx: usize,
    sink: &mut S,
) {
    for row in rows {
        let dst_name = &row.names[to_idx];
        if dst_name.is_empty() {
            continue;
        }

        let owner = resolver.map_name(&row.owner_anchor);
        let desc = match row.kind {
            MemberKind::Field => resolver.map_desc(&row.desc_anchor),
            MemberKind::Method => resolver.map_method_desc(&row.desc_anchor),
        };
        let key = MemberKey::new(owner, row.names[from_idx].clone(), desc);

        match row.kind {
            MemberKind::Field => sink.accept_field(key, dst_name),
            MemberKind::Method => sink.accept_method(key, dst_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping;
    use crate::model::RenameTables;
    use std::io::Cursor;

    fn parse(doc: &str, from: &str, to: &str) -> Result<RenameTables, MappingError> {
        let mut tables = RenameTables::new();
        mapping::read(Cursor::new(doc), from, to, &mut tables)?;
        Ok(tables)
    }

    const DOC: &str = "v1\tofficial\tintermediary\tnamed\n\
        CLASS\ta\tclass_1\tpkg/ClassA\n\
        FIELD\ta\tLa;\tx\tfield_1\tneighbour\n\
        METHOD\ta\t(La;I)V\trun\tmethod_1\texecute\n";

    #[test]
    fn test_anchor_source_selection() {
        let tables = parse(DOC, "official", "named").unwrap();
        assert_eq!(tables.class_name("a"), Some("pkg/ClassA"));
        assert_eq!(tables.field_name("a", "x", "La;"), Some("neighbour"));
        assert_eq!(tables.method_name("a", "run", "(La;I)V"), Some("execute"));
    }

    #[test]
    fn test_non_anchor_source_rewrites_owner_and_descriptor() {
        // Source namespace index 1: the field's anchor owner `a` and its
        // descriptor reference to `a` must both resolve to the intermediary
        // name, consistently derived from the same anchor identity.
        let tables = parse(DOC, "intermediary", "named").unwrap();
        assert_eq!(tables.class_name("class_1"), Some("pkg/ClassA"));
        assert_eq!(
            tables.field_name("class_1", "field_1", "Lclass_1;"),
            Some("neighbour")
        );
        assert_eq!(
            tables.method_name("class_1", "method_1", "(Lclass_1;I)V"),
            Some("execute")
        );
    }

    #[test]
    fn test_forward_reference_to_later_class_row() {
        // The FIELD row references `b`, whose CLASS row comes after it.
        let doc = "v1\tofficial\tintermediary\n\
            FIELD\ta\tLb;\tx\tfield_1\n\
            CLASS\ta\tclass_1\n\
            CLASS\tb\tclass_2\n";
        let tables = parse(doc, "intermediary", "intermediary").unwrap();
        assert_eq!(
            tables.field_name("class_1", "field_1", "Lclass_2;"),
            Some("field_1")
        );
    }

    #[test]
    fn test_empty_target_rows_are_dropped() {
        let doc = "v1\tofficial\tnamed\n\
            CLASS\ta\t\n\
            FIELD\ta\tI\tx\t\n\
            METHOD\ta\t()V\trun\t\n";
        let tables = parse(doc, "official", "named").unwrap();
        assert!(tables.is_empty());
    }

    #[test]
    fn test_unknown_namespace_fails() {
        let err = parse(DOC, "official", "missing").unwrap_err();
        assert!(matches!(err, MappingError::Format { line: 1, .. }));
    }

    #[test]
    fn test_wrong_column_count_reports_line() {
        let doc = "v1\tofficial\tnamed\nCLASS\ta\tpkg/A\textra\n";
        match parse(doc, "official", "named").unwrap_err() {
            MappingError::Format { line, .. } => assert_eq!(line, 2),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_and_unknown_rows_are_skipped() {
        let doc = "v1\tofficial\tnamed\n\
            \n\
            COMMENT\tignored\tstuff\tentirely\n\
            CLASS\ta\tpkg/A\n";
        let tables = parse(doc, "official", "named").unwrap();
        assert_eq!(tables.classes.len(), 1);
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let doc = "v1\tofficial\tnamed\n\
            METHOD\ta\t()V\trun\tfirst\n\
            METHOD\ta\t()V\trun\tsecond\n";
        let tables = parse(doc, "official", "named").unwrap();
        assert_eq!(tables.method_name("a", "run", "()V"), Some("second"));
    }

    #[test]
    fn test_idempotent_reparse() {
        let first = parse(DOC, "intermediary", "named").unwrap();
        let second = parse(DOC, "intermediary", "named").unwrap();
        assert_eq!(first.classes, second.classes);
        assert_eq!(first.fields, second.fields);
        assert_eq!(first.methods, second.methods);
    }
}

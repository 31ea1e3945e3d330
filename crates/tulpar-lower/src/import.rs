//! Import inlining (§4.5 point 8): the emitter itself lexes and
//! parses the imported file, folds its top-level `FuncDecl`s and
//! other statements into the importing program's statement list, and
//! de-duplicates on absolute-path equality. A missing file is a
//! compile-time diagnostic that skips the import (§7), matching
//! `original_source`'s "file missing" handling — never a hard abort.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tulpar_par::{Node, Parser};
use tulpar_util::{DiagnosticBuilder, Handler, Span};

/// Recursively expands every `Import` node in `stmts`, returning a
/// flat statement list with no `Import` nodes left in it. `base_dir`
/// is the directory import paths are resolved relative to.
pub fn flatten(stmts: &[Node], base_dir: &Path, handler: &Handler, seen: &mut HashSet<PathBuf>) -> Vec<Node> {
    let mut out = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        match stmt {
            Node::Import(path) => {
                expand_import(path.as_str(), base_dir, handler, seen, &mut out);
            },
            other => out.push(other.clone()),
        }
    }
    out
}

fn expand_import(path: &str, base_dir: &Path, handler: &Handler, seen: &mut HashSet<PathBuf>, out: &mut Vec<Node>) {
    let candidate = base_dir.join(path);
    let absolute = match candidate.canonicalize() {
        Ok(absolute) => absolute,
        Err(_) => {
            DiagnosticBuilder::error(format!("cannot import '{}': file not found", path))
                .span(Span::DUMMY)
                .emit(handler);
            return;
        },
    };

    if !seen.insert(absolute.clone()) {
        return;
    }

    let source = match std::fs::read_to_string(&absolute) {
        Ok(source) => source,
        Err(err) => {
            DiagnosticBuilder::error(format!("cannot import '{}': {}", path, err))
                .span(Span::DUMMY)
                .emit(handler);
            return;
        },
    };

    let mut parser = Parser::new(&source, handler);
    let program = parser.parse();
    let Node::Program(inner_stmts) = program else { return };

    let imported_dir = absolute.parent().map(Path::to_path_buf).unwrap_or_else(|| base_dir.to_path_buf());
    let expanded = flatten(&inner_stmts, &imported_dir, handler, seen);
    out.extend(expanded);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_import_is_a_diagnostic_not_a_panic() {
        let handler = Handler::new();
        let mut seen = HashSet::new();
        let stmts = vec![Node::Import(tulpar_util::Symbol::intern("does_not_exist.tlp"))];
        let flattened = flatten(&stmts, Path::new("."), &handler, &mut seen);
        assert!(flattened.is_empty());
        assert!(handler.has_errors());
    }

    #[test]
    fn importing_the_same_file_twice_inlines_it_once() {
        let pid = std::process::id();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        let dir = std::env::temp_dir().join(format!("tulpar-import-test-{}-{}", pid, nanos));
        std::fs::create_dir_all(&dir).unwrap();
        let imported = dir.join("shared.tlp");
        std::fs::File::create(&imported).unwrap().write_all(b"int shared_var = 1;").unwrap();

        let handler = Handler::new();
        let mut seen = HashSet::new();
        let stmts = vec![
            Node::Import(tulpar_util::Symbol::intern("shared.tlp")),
            Node::Import(tulpar_util::Symbol::intern("shared.tlp")),
        ];
        let flattened = flatten(&stmts, &dir, &handler, &mut seen);
        assert_eq!(flattened.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}

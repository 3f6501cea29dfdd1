//! Code-dependency graph (§4.6): definitions, imports, call edges, and
//! inheritance edges extracted from each changed file's added lines.
//!
//! Definition `kind` reuses `codegraph_prep::model::ast::AstKind` so the
//! same taxonomy is shared across the full-repo tree-sitter pipeline and
//! this lightweight diff-driven builder; call-edge detection follows the
//! same conservative "name appears in a sibling signature" heuristic as
//! `codegraph_prep::graph::calls::add_intrafile_calls`, just applied to
//! added-line text instead of parsed signatures.

pub mod impact;

use std::collections::{BTreeMap, BTreeSet};

use codegraph_prep::model::ast::AstKind;
use codegraph_prep::model::language::LanguageKind;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diff::map_added_lines;
use crate::model::FileChange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub symbol: String,
    pub file: String,
    pub kind: AstKind,
    pub exported: bool,
    pub line: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileFacts {
    pub definitions: Vec<Definition>,
    pub imports: Vec<String>,
    /// `(caller_symbol, callee_symbol)` pairs found in this file.
    pub calls: Vec<(String, String)>,
    /// `(base_class, derived_class)` pairs declared in this file.
    pub inherits: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub files: usize,
    pub definitions: usize,
    pub imports: usize,
    pub calls: usize,
    pub inherits: usize,
}

/// `symbol -> Definition`, `file -> [import target]`,
/// `(file, caller) -> {callee}`, and `base-class -> {derived-class}`, all
/// derived on demand from a per-file fact table, which is the structure
/// actually mutated by `removeFile`/`update`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeGraph {
    files: BTreeMap<String, FileFacts>,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every definition/import/call/inherit edge originating in
    /// `file`.
    pub fn remove_file(&mut self, file: &str) {
        self.files.remove(file);
    }

    pub fn insert_file(&mut self, file: impl Into<String>, facts: FileFacts) {
        self.files.insert(file.into(), facts);
    }

    /// Removes `changed_files` from the graph, then re-adds them via
    /// `build_file`, in the teacher's "remove then re-add" update style.
    pub fn update(&mut self, changed_files: &[FileChange]) {
        for file in changed_files {
            self.remove_file(&file.filename);
            let facts = build_file_facts(file);
            self.insert_file(file.filename.clone(), facts);
        }
    }

    pub fn get_stats(&self) -> GraphStats {
        GraphStats {
            files: self.files.len(),
            definitions: self.files.values().map(|f| f.definitions.len()).sum(),
            imports: self.files.values().map(|f| f.imports.len()).sum(),
            calls: self.files.values().map(|f| f.calls.len()).sum(),
            inherits: self.files.values().map(|f| f.inherits.len()).sum(),
        }
    }

    pub fn symbol_table(&self) -> BTreeMap<String, &Definition> {
        let mut table = BTreeMap::new();
        for facts in self.files.values() {
            for def in &facts.definitions {
                table.insert(def.symbol.clone(), def);
            }
        }
        table
    }

    /// Files whose imports reference a symbol defined in `file` (i.e.
    /// any import target matching `file`'s path, ignoring extension).
    pub fn get_dependents(&self, file: &str, max_depth: u32) -> Vec<String> {
        self.bfs_dependents(file, max_depth)
    }

    fn bfs_dependents(&self, start: &str, max_depth: u32) -> Vec<String> {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut frontier = vec![start.to_string()];
        let mut depth = 0;
        while depth < max_depth.max(1) && !frontier.is_empty() {
            let mut next = Vec::new();
            for target in &frontier {
                for (other_file, facts) in &self.files {
                    if other_file == target {
                        continue;
                    }
                    if facts.imports.iter().any(|imp| import_matches(imp, target)) && seen.insert(other_file.clone()) {
                        next.push(other_file.clone());
                    }
                }
            }
            frontier = next;
            depth += 1;
        }
        seen.into_iter().collect()
    }

    pub fn find_callers(&self, symbol: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (file, facts) in &self.files {
            for (caller, callee) in &facts.calls {
                if callee == symbol {
                    out.push((file.clone(), caller.clone()));
                }
            }
        }
        out
    }

    pub fn find_consumers(&self, module: &str, max_depth: u32) -> Vec<String> {
        self.get_dependents(module, max_depth)
    }

    pub fn find_derived_classes(&self, class_name: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for facts in self.files.values() {
            for (base, derived) in &facts.inherits {
                if base == class_name {
                    out.insert(derived.clone());
                }
            }
        }
        out
    }

    pub fn find_dependencies(&self, file: &str) -> Vec<String> {
        self.files
            .get(file)
            .map(|f| f.imports.clone())
            .unwrap_or_default()
    }
}

fn import_matches(import_target: &str, file: &str) -> bool {
    let strip_ext = |p: &str| p.rsplit_once('.').map(|(base, _)| base).unwrap_or(p);
    let normalized_import = strip_ext(import_target.trim_start_matches("./"));
    let normalized_file = strip_ext(file);
    normalized_file.ends_with(normalized_import) || normalized_import.ends_with(normalized_file)
}

fn language_for(file: &str) -> Option<LanguageKind> {
    let ext = file.rsplit_once('.').map(|(_, e)| e)?;
    LanguageKind::from_extension(ext)
}

/// Builds the `FileFacts` for one changed file from its added lines
/// only, using conservative line-oriented patterns — this mirrors the
/// "no body parsing" philosophy of the intrafile call heuristic in
/// `codegraph_prep`, applied to diff text rather than a full parse tree.
pub fn build_file_facts(file: &FileChange) -> FileFacts {
    let mut facts = FileFacts::default();
    let Some(patch) = &file.patch else {
        return facts;
    };
    let lang = language_for(&file.filename);
    let added = map_added_lines(patch);

    let def_re = definition_regex(lang);
    let import_re = import_regex(lang);
    let inherit_re = inherit_regex(lang);
    let call_re = Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap();

    let mut local_names: Vec<(String, u32)> = Vec::new();

    for added_line in &added {
        if let Some(caps) = def_re.captures(&added_line.content) {
            let name = caps.get(1).unwrap().as_str().to_string();
            let exported = added_line.content.contains("pub ")
                || added_line.content.contains("export ")
                || added_line.content.starts_with("export");
            facts.definitions.push(Definition {
                symbol: name.clone(),
                file: file.filename.clone(),
                kind: kind_for(&added_line.content, lang),
                exported,
                line: added_line.new_line_number,
            });
            local_names.push((name, added_line.new_line_number));
        }
        if let Some(caps) = import_re.captures(&added_line.content) {
            facts.imports.push(caps.get(1).unwrap().as_str().to_string());
        }
        if let Some(caps) = inherit_re.captures(&added_line.content) {
            let derived = caps.get(1).unwrap().as_str().to_string();
            let base = caps.get(2).unwrap().as_str().to_string();
            facts.inherits.push((base, derived));
        }
    }

    // Heuristic call edges: a definition's own line mentions a sibling
    // definition's name as a call.
    for added_line in &added {
        for cap in call_re.captures_iter(&added_line.content) {
            let callee = cap.get(1).unwrap().as_str();
            if let Some((caller, _)) = local_names
                .iter()
                .find(|(_, line)| *line == added_line.new_line_number)
            {
                if caller != callee && local_names.iter().any(|(n, _)| n == callee) {
                    facts.calls.push((caller.clone(), callee.to_string()));
                }
            }
        }
    }

    facts
}

fn definition_regex(lang: Option<LanguageKind>) -> Regex {
    let pattern = match lang {
        Some(LanguageKind::Rust) => {
            r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:fn|struct|enum|trait)\s+([A-Za-z_][A-Za-z0-9_]*)"
        }
        Some(LanguageKind::Python) => r"^\s*(?:def|class)\s+([A-Za-z_][A-Za-z0-9_]*)",
        Some(LanguageKind::JavaScript) | Some(LanguageKind::TypeScript) => {
            r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?(?:function|class)\s+([A-Za-z_][A-Za-z0-9_]*)"
        }
        _ => r"^\s*(?:function|def|class|fn)\s+([A-Za-z_][A-Za-z0-9_]*)",
    };
    Regex::new(pattern).unwrap()
}

fn import_regex(lang: Option<LanguageKind>) -> Regex {
    let pattern = match lang {
        Some(LanguageKind::Rust) => r#"^\s*use\s+([A-Za-z0-9_:]+)"#,
        Some(LanguageKind::Python) => r#"^\s*(?:from\s+([A-Za-z0-9_\.]+)\s+import|import\s+([A-Za-z0-9_\.]+))"#,
        Some(LanguageKind::JavaScript) | Some(LanguageKind::TypeScript) => {
            r#"(?:from\s+['"]([^'"]+)['"]|require\(['"]([^'"]+)['"]\))"#
        }
        _ => r#"import\s+([A-Za-z0-9_\./]+)"#,
    };
    Regex::new(pattern).unwrap()
}

fn inherit_regex(lang: Option<LanguageKind>) -> Regex {
    let pattern = match lang {
        Some(LanguageKind::Python) => r"^\s*class\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(\s*([A-Za-z_][A-Za-z0-9_]*)",
        Some(LanguageKind::JavaScript) | Some(LanguageKind::TypeScript) => {
            r"class\s+([A-Za-z_][A-Za-z0-9_]*)\s+extends\s+([A-Za-z_][A-Za-z0-9_]*)"
        }
        _ => r"class\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?::|extends)\s*([A-Za-z_][A-Za-z0-9_]*)",
    };
    Regex::new(pattern).unwrap()
}

fn kind_for(line: &str, lang: Option<LanguageKind>) -> AstKind {
    let _ = lang;
    if line.contains("class ") {
        AstKind::Class
    } else if line.contains("trait ") {
        AstKind::Trait
    } else if line.contains("enum ") {
        AstKind::Enum
    } else if line.contains("struct ") {
        AstKind::Class
    } else {
        AstKind::Function
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileStatus;

    fn rust_file(patch: &str) -> FileChange {
        FileChange::new("src/lib.rs", FileStatus::Modified, 2, 0, Some(patch.to_string()), None)
    }

    #[test]
    fn builds_definitions_and_calls_from_added_lines() {
        let patch = "@@ -1,0 +1,2 @@\n+pub fn helper() {}\n+pub fn caller() { helper(); }\n";
        let facts = build_file_facts(&rust_file(patch));
        assert_eq!(facts.definitions.len(), 2);
        assert!(facts.calls.contains(&("caller".to_string(), "helper".to_string())));
    }

    #[test]
    fn graph_update_then_remove_file_drops_all_its_facts() {
        let mut graph = CodeGraph::new();
        let patch = "@@ -1,0 +1,1 @@\n+pub fn only() {}\n";
        let file = rust_file(patch);
        graph.update(std::slice::from_ref(&file));
        assert_eq!(graph.get_stats().definitions, 1);
        graph.remove_file(&file.filename);
        assert_eq!(graph.get_stats().definitions, 0);
    }

    #[test]
    fn python_inheritance_is_recorded() {
        let patch = "@@ -1,0 +1,1 @@\n+class Dog(Animal):\n";
        let file = FileChange::new("a.py", FileStatus::Modified, 1, 0, Some(patch.to_string()), None);
        let facts = build_file_facts(&file);
        assert!(facts.inherits.contains(&("Animal".to_string(), "Dog".to_string())));
    }

    #[test]
    fn find_derived_classes_returns_direct_children() {
        let mut graph = CodeGraph::new();
        let patch = "@@ -1,0 +1,1 @@\n+class Dog(Animal):\n";
        let file = FileChange::new("a.py", FileStatus::Modified, 1, 0, Some(patch.to_string()), None);
        graph.update(&[file]);
        let derived = graph.find_derived_classes("Animal");
        assert!(derived.contains("Dog"));
    }
}

//! Context & impact analyzers (§4.7 of the original component list):
//! traverse the code graph to find unchanged callers/consumers of
//! changed files, classify impact level, and emit a mermaid diagram.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::CodeGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ImpactLevel {
    pub fn from_affected_count(count: usize) -> Self {
        if count >= 20 {
            ImpactLevel::Critical
        } else if count >= 8 {
            ImpactLevel::High
        } else if count >= 3 {
            ImpactLevel::Medium
        } else {
            ImpactLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    pub file: String,
    pub level: ImpactLevel,
    pub affected_callers: Vec<(String, String)>,
    pub affected_consumers: Vec<String>,
    pub derived_classes: BTreeSet<String>,
    pub summary: String,
    pub mermaid: String,
}

/// Computes affected callers/consumers/derived-class snippets for one
/// changed file and classifies the overall impact by the number of
/// unique affected files.
pub fn analyze_impact(graph: &CodeGraph, file: &str, max_depth: u32) -> ImpactReport {
    let mut affected_files: BTreeSet<String> = BTreeSet::new();

    let consumers = graph.find_consumers(file, max_depth);
    affected_files.extend(consumers.iter().cloned());

    let mut affected_callers = Vec::new();
    for def in graph.symbol_table().values().filter(|d| d.file == file) {
        for (caller_file, caller_symbol) in graph.find_callers(&def.symbol) {
            if caller_file != file {
                affected_files.insert(caller_file.clone());
            }
            affected_callers.push((caller_file, caller_symbol));
        }
    }

    let mut derived_classes = BTreeSet::new();
    for def in graph.symbol_table().values().filter(|d| d.file == file) {
        for derived in graph.find_derived_classes(&def.symbol) {
            derived_classes.insert(derived);
        }
    }

    let level = ImpactLevel::from_affected_count(affected_files.len());
    let summary = format!(
        "{file} affects {count} other file(s) via {callers} caller(s), {consumers} consumer(s), and {derived} derived class(es); impact classified as {level:?}",
        count = affected_files.len(),
        callers = affected_callers.len(),
        consumers = consumers.len(),
        derived = derived_classes.len(),
    );

    let mermaid = render_mermaid(file, &consumers, &affected_callers);

    ImpactReport {
        file: file.to_string(),
        level,
        affected_callers,
        affected_consumers: consumers,
        derived_classes,
        summary,
        mermaid,
    }
}

/// Deterministic `graph LR` diagram over the changed file and its
/// affected callers/consumers.
fn render_mermaid(file: &str, consumers: &[String], callers: &[(String, String)]) -> String {
    let mut lines = vec!["graph LR".to_string()];
    for consumer in consumers {
        lines.push(format!("    {} --> {}", mermaid_id(consumer), mermaid_id(file)));
    }
    for (caller_file, caller_symbol) in callers {
        lines.push(format!(
            "    {}[{}] --> {}",
            mermaid_id(caller_file),
            caller_symbol,
            mermaid_id(file)
        ));
    }
    lines.join("\n")
}

fn mermaid_id(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_level_thresholds_match_spec() {
        assert_eq!(ImpactLevel::from_affected_count(0), ImpactLevel::Low);
        assert_eq!(ImpactLevel::from_affected_count(3), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::from_affected_count(8), ImpactLevel::High);
        assert_eq!(ImpactLevel::from_affected_count(20), ImpactLevel::Critical);
    }

    #[test]
    fn mermaid_output_starts_with_graph_directive() {
        let graph = CodeGraph::new();
        let report = analyze_impact(&graph, "a.rs", 4);
        assert!(report.mermaid.starts_with("graph LR"));
    }
}

use crate::loci::{is_hidden, SAMPLE_VCF_SUFFIX};
use log::{debug, info};
use regex::Regex;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

/// Regions, graphs and samples found under a call directory.
/// Sets are ordered so every later step iterates them deterministically.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    pub regions: BTreeSet<String>,
    /// Graphs present under every region
    pub graphs: BTreeSet<String>,
    /// Union of samples seen under any (region, graph), completeness not yet checked
    pub samples: BTreeSet<String>,
}

impl Hierarchy {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn sample_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // `<sample>_..._sample.vcf`, sample being everything before the first underscore
        Regex::new(&format!(
            r"^([^_]+)_(?:.*_)?{}$",
            regex::escape(&SAMPLE_VCF_SUFFIX[1..])
        ))
        .expect("sample file pattern is valid")
    })
}

/// Extract the sample token from a per-sample call file name, if it is one
pub fn sample_from_file_name(file_name: &str) -> Option<&str> {
    sample_pattern()
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Names of the subdirectories directly under `dir`
fn subdirectories(dir: &Path) -> io::Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Failed to read directory '{}': {}", dir.display(), e),
        )
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if is_hidden(&name) => debug!("Ignoring hidden directory '{}'", name),
            Ok(name) => names.push(name),
            Err(name) => debug!("Skipping non UTF-8 directory name {:?}", name),
        }
    }
    Ok(names)
}

/// Walk `<root>/<region>/<graph>/<sample>_sample.vcf` and collect the candidate sets.
pub fn scan_hierarchy(root: &Path, recognized_regions: &[&str]) -> io::Result<Hierarchy> {
    let mut hierarchy = Hierarchy::default();

    for name in subdirectories(root)? {
        if recognized_regions.contains(&name.as_str()) {
            hierarchy.regions.insert(name);
        } else {
            debug!("Ignoring unrecognized directory '{}'", name);
        }
    }
    info!("Regions: {:?}", hierarchy.regions);

    let mut graph_counts: FxHashMap<String, usize> = FxHashMap::default();
    for region in &hierarchy.regions {
        for graph in subdirectories(&root.join(region))? {
            *graph_counts.entry(graph).or_insert(0) += 1;
        }
    }
    for (graph, count) in graph_counts {
        if count == hierarchy.regions.len() {
            hierarchy.graphs.insert(graph);
        } else {
            debug!(
                "Graph '{}' found in {} of {} regions, ignoring",
                graph,
                count,
                hierarchy.regions.len()
            );
        }
    }
    info!("Graphs: {:?}", hierarchy.graphs);

    for region in &hierarchy.regions {
        for graph in &hierarchy.graphs {
            let graph_dir = root.join(region).join(graph);
            for entry in fs::read_dir(&graph_dir)? {
                let path = entry?.path();
                if !path.is_file() {
                    continue;
                }
                let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if is_hidden(file_name) {
                    continue;
                }
                if let Some(sample) = sample_from_file_name(file_name) {
                    hierarchy.samples.insert(sample.to_string());
                } else if file_name.ends_with(SAMPLE_VCF_SUFFIX) {
                    debug!("Skipping malformed sample file '{}'", path.display());
                }
            }
        }
    }
    info!("Samples: {:?}", hierarchy.samples);

    Ok(hierarchy)
}

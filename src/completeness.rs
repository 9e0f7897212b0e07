use crate::loci::sample_vcf_name;
use crate::scan::Hierarchy;
use log::info;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// A (graph, sample) pair with a call file under every region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeUnit {
    pub graph: String,
    pub sample: String,
    /// (region, input VCF), ordered by region name
    pub inputs: Vec<(String, PathBuf)>,
}

/// A (graph, sample) pair left out because some regions lack its call file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUnit {
    pub graph: String,
    pub sample: String,
    pub missing_regions: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub eligible: Vec<MergeUnit>,
    pub skipped: Vec<SkippedUnit>,
}

/// Order names naturally ("s2" before "s10"), falling back to byte order for ties
pub fn natural_order<'a, I>(names: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut names: Vec<&str> = names.into_iter().map(String::as_str).collect();
    names.sort_by(|a, b| match natord::compare(a, b) {
        Ordering::Equal => a.cmp(b),
        other => other,
    });
    names
}

/// Decide, for every graph × sample, whether it can be merged.
/// Each pair is judged on its own: a sample missing from one graph
/// is still merged for the graphs where it is complete.
pub fn evaluate(root: &Path, hierarchy: &Hierarchy) -> Eligibility {
    let mut eligibility = Eligibility::default();

    for graph in natural_order(&hierarchy.graphs) {
        for sample in natural_order(&hierarchy.samples) {
            let file_name = sample_vcf_name(sample);
            let mut inputs = Vec::with_capacity(hierarchy.regions.len());
            let mut missing_regions = Vec::new();

            // BTreeSet iteration keeps regions in lexicographic order
            for region in &hierarchy.regions {
                let vcf = root.join(region).join(graph).join(&file_name);
                if vcf.is_file() {
                    inputs.push((region.clone(), vcf));
                } else {
                    missing_regions.push(region.clone());
                }
            }

            if inputs.len() == hierarchy.regions.len() {
                eligibility.eligible.push(MergeUnit {
                    graph: graph.to_string(),
                    sample: sample.to_string(),
                    inputs,
                });
            } else {
                info!(
                    "Skipping Sample {} for Graph {} (missing in {})",
                    sample,
                    graph,
                    missing_regions.join(", ")
                );
                eligibility.skipped.push(SkippedUnit {
                    graph: graph.to_string(),
                    sample: sample.to_string(),
                    missing_regions,
                });
            }
        }
    }

    eligibility
}

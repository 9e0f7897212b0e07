// Consolidation of `<root>/<region>/<graph>/<sample>_sample.vcf` into
// `<root>/<name>/<graph>/<sample>_sample.vcf(.gz)(.tbi)`.

use crate::artifact::count_records;
use crate::completeness::{evaluate, MergeUnit, SkippedUnit};
use crate::loci::{sample_vcf_name, with_suffix, STAGING_DIR};
use crate::scan::scan_hierarchy;
use crate::tools::{normalize, remove_quietly, FailMode, VcfTools};
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Output paths, all derived from (input root, output name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    out_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path, name: &str) -> Self {
        OutputLayout {
            out_dir: root.join(name),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Uncompressed merged VCF; `.gz` and `.gz.tbi` live next to it
    pub fn merged_vcf(&self, graph: &str, sample: &str) -> PathBuf {
        self.out_dir.join(graph).join(sample_vcf_name(sample))
    }

    /// Working directory with the staged per-region inputs, kept for debugging
    pub fn work_dir(&self, graph: &str, sample: &str) -> PathBuf {
        self.out_dir.join(graph).join(STAGING_DIR).join(sample)
    }

    pub fn staged_vcf(&self, graph: &str, sample: &str, region: &str) -> PathBuf {
        self.work_dir(graph, sample).join(format!("{}.vcf", region))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedArtifact {
    pub graph: String,
    pub sample: String,
    pub vcf: PathBuf,
    pub compressed: PathBuf,
    /// Record count of the compressed artifact, when it could be read back
    pub records: Option<usize>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub merged: Vec<MergedArtifact>,
    pub skipped: Vec<SkippedUnit>,
}

fn create_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Failed to create directory '{}': {}", dir.display(), e),
        )
    })
}

/// Sort, compress and index one region's input into the working directory.
/// Only the sort is fatal; a failed compress or index shows up at concatenation.
fn stage_region(
    tools: &dyn VcfTools,
    layout: &OutputLayout,
    unit: &MergeUnit,
    region: &str,
    input: &Path,
) -> io::Result<PathBuf> {
    let staged = layout.staged_vcf(&unit.graph, &unit.sample, region);
    let compressed = with_suffix(&staged, "gz");

    FailMode::Hard.settle("sort", tools.sort(input, &staged))?;
    let compress_result = tools.compress(&staged, &compressed);
    let compressed_ok = compress_result.is_ok();
    FailMode::Soft.settle("compress", compress_result)?;
    // keep the uncompressed copy for inspection when compression failed
    if compressed_ok {
        remove_quietly(&staged);
    }
    FailMode::Soft.settle("index", tools.index(&compressed))?;

    Ok(compressed)
}

/// Merge one eligible unit. Inputs are concatenated in region-name order;
/// the concatenation tool plus the final re-sort make the output globally ordered.
pub fn merge_unit(
    tools: &dyn VcfTools,
    layout: &OutputLayout,
    unit: &MergeUnit,
) -> io::Result<MergedArtifact> {
    create_dir(&layout.work_dir(&unit.graph, &unit.sample))?;

    let mut staged = Vec::with_capacity(unit.inputs.len());
    for (region, input) in &unit.inputs {
        staged.push(stage_region(tools, layout, unit, region, input)?);
    }

    let merged = layout.merged_vcf(&unit.graph, &unit.sample);
    FailMode::Hard.settle("concat", tools.concat(&staged, &merged))?;
    let compressed = normalize(tools, &merged)?;

    let records = match count_records(&compressed) {
        Ok(records) => Some(records),
        Err(e) => {
            warn!("Could not read back '{}': {}", compressed.display(), e);
            None
        }
    };
    info!(
        "Merged {} region(s) for sample {} graph {} into {}{}",
        staged.len(),
        unit.sample,
        unit.graph,
        compressed.display(),
        records
            .map(|n| format!(" ({} records)", n))
            .unwrap_or_default()
    );

    Ok(MergedArtifact {
        graph: unit.graph.clone(),
        sample: unit.sample.clone(),
        vcf: merged,
        compressed,
        records,
    })
}

/// Scan `root`, keep the complete (graph, sample) units and merge them under `<root>/<name>`.
/// The first hard tool failure aborts the whole run.
pub fn consolidate(
    root: &Path,
    name: &str,
    recognized_regions: &[&str],
    tools: &dyn VcfTools,
) -> io::Result<ConsolidationReport> {
    let hierarchy = scan_hierarchy(root, recognized_regions)?;
    let eligibility = evaluate(root, &hierarchy);

    let layout = OutputLayout::new(root, name);
    create_dir(layout.out_dir())?;

    let mut report = ConsolidationReport {
        merged: Vec::with_capacity(eligibility.eligible.len()),
        skipped: eligibility.skipped,
    };
    for unit in &eligibility.eligible {
        report.merged.push(merge_unit(tools, &layout, unit)?);
    }

    info!(
        "Merged {} unit(s), skipped {}",
        report.merged.len(),
        report.skipped.len()
    );
    Ok(report)
}

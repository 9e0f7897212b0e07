// Classic layout: `<root>/<sample>/<LOCUS>.vcf`, merged into `<root>/<sample>/TOTAL.vcf`.
// No completeness requirement: every sample directory stands alone.

use crate::artifact::count_records;
use crate::completeness::natural_order;
use crate::loci::{is_hidden, with_suffix, CLASSIC_TOTAL};
use crate::tools::{normalize, remove_quietly, FailMode, VcfTools};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleTotal {
    pub sample: String,
    /// Locus files that went into the total, by basename
    pub loci: Vec<String>,
    pub compressed: PathBuf,
    pub records: Option<usize>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassicReport {
    pub totals: Vec<SampleTotal>,
    /// Sample directories without any whitelisted locus
    pub empty_samples: Vec<String>,
}

/// Whitelisted locus files directly inside `sample_dir`, sorted by name
fn locus_files(sample_dir: &Path, loci: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(sample_dir)? {
        let path = entry?.path();
        let whitelisted = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| loci.contains(&n));
        if whitelisted && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Sort, compress and index one locus file, leaving `<vcf>.gz(.tbi)` beside it
fn prepare_locus(tools: &dyn VcfTools, vcf: &Path) -> io::Result<PathBuf> {
    let sorted = with_suffix(vcf, "sort");
    let compressed = with_suffix(vcf, "gz");

    FailMode::Hard.settle("sort", tools.sort(vcf, &sorted))?;
    FailMode::Hard.settle("compress", tools.compress(&sorted, &compressed))?;
    remove_quietly(&sorted);
    FailMode::Hard.settle("index", tools.index(&compressed))?;

    Ok(compressed)
}

/// Merge the whitelisted loci of one sample directory. `None` when it has none.
pub fn merge_sample(
    tools: &dyn VcfTools,
    sample_dir: &Path,
    loci: &[&str],
) -> io::Result<Option<SampleTotal>> {
    let files = locus_files(sample_dir, loci)?;
    if files.is_empty() {
        return Ok(None);
    }

    let mut prepared = Vec::with_capacity(files.len());
    for vcf in &files {
        prepared.push(prepare_locus(tools, vcf)?);
    }

    let total = sample_dir.join(CLASSIC_TOTAL);
    FailMode::Hard.settle("concat", tools.concat(&prepared, &total))?;
    let compressed = normalize(tools, &total)?;

    let records = count_records(&compressed)
        .map_err(|e| warn!("Could not read back '{}': {}", compressed.display(), e))
        .ok();

    let sample = sample_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(Some(SampleTotal {
        sample,
        loci: files
            .iter()
            .filter_map(|f| f.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .collect(),
        compressed,
        records,
    }))
}

/// Merge every sample directory directly under `root`
pub fn merge_classic(
    root: &Path,
    loci: &[&str],
    tools: &dyn VcfTools,
) -> io::Result<ClassicReport> {
    let entries = fs::read_dir(root).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Failed to read directory '{}': {}", root.display(), e),
        )
    })?;
    let mut samples = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.path().is_dir() && !is_hidden(&name) {
            samples.push(name);
        }
    }

    let mut report = ClassicReport::default();
    for sample in natural_order(&samples) {
        match merge_sample(tools, &root.join(sample), loci)? {
            Some(total) => {
                info!(
                    "Merged {} for sample {} into {}",
                    total.loci.join(", "),
                    sample,
                    total.compressed.display()
                );
                report.totals.push(total);
            }
            None => {
                debug!("No whitelisted loci for sample {}", sample);
                report.empty_samples.push(sample.to_string());
            }
        }
    }

    info!("Wrote {} sample total(s)", report.totals.len());
    Ok(report)
}

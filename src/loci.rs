// Fixed whitelists and file naming used by both merge modes

/// Region directories recognized under the call directory root.
/// Anything else (scratch space, outputs of earlier runs) is ignored.
pub const RECOGNIZED_REGIONS: &[&str] = &["brca1", "brca2", "mhc", "lrc_kir", "sma"];

/// Per-locus VCF basenames merged in classic mode.
pub const CLASSIC_LOCI: &[&str] = &["BRCA1.vcf", "BRCA2.vcf", "SMA.vcf", "LRC_KIR.vcf", "MHC.vcf"];

/// Suffix of per-sample call files: `<sample>_sample.vcf`
pub const SAMPLE_VCF_SUFFIX: &str = "_sample.vcf";

/// Name of the per-sample total written in classic mode
pub const CLASSIC_TOTAL: &str = "TOTAL.vcf";

/// Subdirectory of `<out>/<graph>/` holding per-sample staged inputs
pub const STAGING_DIR: &str = "input";

/// File name of the call file for `sample`
pub fn sample_vcf_name(sample: &str) -> String {
    format!("{}{}", sample, SAMPLE_VCF_SUFFIX)
}

/// Dot entries (`.snapshot`, editor swap files) are never regions, graphs or samples
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Append `ext` to the full file name of `path` (`a.vcf` + `gz` -> `a.vcf.gz`)
pub fn with_suffix(path: &std::path::Path, ext: &str) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    std::path::PathBuf::from(name)
}

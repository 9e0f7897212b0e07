//! End-to-end runs of the calltotals binary on temporary call directories.
//!
//! The external tools are replaced by coreutils (`sort`, `cat`, `true`, `false`)
//! through the `--*-cmd` options, so these tests only need a Unix userland.
//! `test_real_toolchain` runs only when vcfsort, bgzip, tabix and vt are installed.
#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const HEADER: &str = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

fn get_calltotals_binary() -> PathBuf {
    // set by cargo test for the binary target
    PathBuf::from(env!("CARGO_BIN_EXE_calltotals"))
}

fn write_vcf(root: &Path, rel: &str, records: &[&str]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut contents = HEADER.to_string();
    for record in records {
        contents.push_str(record);
        contents.push('\n');
    }
    fs::write(path, contents).unwrap();
}

/// Run with coreutils stand-ins: lexical sort, plain-text "compression", no-op index.
/// `overrides` replaces individual stand-ins by option name.
fn run_with_stand_ins(call_dir: &Path, overrides: &[(&str, &str)], extra: &[&str]) -> Output {
    let mut command = Command::new(get_calltotals_binary());
    command.env("LC_ALL", "C").arg(call_dir);
    for (option, default) in [
        ("--sort-cmd", "sort"),
        ("--compress-cmd", "cat"),
        ("--index-cmd", "true"),
        ("--concat-cmd", "cat"),
    ] {
        let value = overrides
            .iter()
            .find(|(o, _)| *o == option)
            .map_or(default, |(_, v)| *v);
        command.args([option, value]);
    }
    command
        .args(extra)
        .output()
        .expect("Failed to run calltotals")
}

fn records(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn all_paths(dir: &Path, found: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            all_paths(&path, found);
        }
        found.push(path);
    }
}

/// brca1 and brca2 both hold g1/s1; s2 is only under brca1; scratch is noise
fn build_scenario(root: &Path) {
    write_vcf(root, "brca1/g1/s1_sample.vcf", &["chr17\t43044400\t.\tA\tG\t50\tPASS\t."]);
    write_vcf(root, "brca2/g1/s1_sample.vcf", &["chr13\t32315500\t.\tT\tC\t50\tPASS\t."]);
    write_vcf(root, "brca1/g1/s2_sample.vcf", &["chr17\t43044500\t.\tC\tT\t50\tPASS\t."]);
    write_vcf(root, "scratch/g1/s1_sample.vcf", &["chr1\t10\t.\tA\tC\t50\tPASS\t."]);
}

#[test]
fn test_consolidation_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    build_scenario(root);

    let output = run_with_stand_ins(root, &[], &[]);
    assert!(
        output.status.success(),
        "calltotals failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Skipping Sample s2 for Graph g1 (missing in brca2)"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("total/g1/s1_sample.vcf.gz"));

    let merged = root.join("total/g1/s1_sample.vcf");
    assert!(root.join("total/g1/s1_sample.vcf.gz").exists());
    assert_eq!(
        records(&merged),
        vec![
            "chr13\t32315500\t.\tT\tC\t50\tPASS\t.",
            "chr17\t43044400\t.\tA\tG\t50\tPASS\t.",
        ]
    );
    assert!(root.join("total/g1/input/s1/brca1.vcf.gz").exists());
    assert!(root.join("total/g1/input/s1/brca2.vcf.gz").exists());
    assert!(!root.join("total/g1/s2_sample.vcf").exists());

    let mut produced = Vec::new();
    all_paths(&root.join("total"), &mut produced);
    assert!(produced
        .iter()
        .all(|p| !p.to_string_lossy().contains("scratch")));
}

#[test]
fn test_custom_output_name_and_rerun() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    build_scenario(root);

    assert!(run_with_stand_ins(root, &[], &["--name", "merged"]).status.success());
    let first = fs::read(root.join("merged/g1/s1_sample.vcf")).unwrap();

    // the previous output directory must not be mistaken for a region
    assert!(run_with_stand_ins(root, &[], &["--name", "merged"]).status.success());
    let second = fs::read(root.join("merged/g1/s1_sample.vcf")).unwrap();

    assert_eq!(first, second);
    assert!(!root.join("total").exists());
}

#[test]
fn test_failing_tool_aborts_with_error() {
    let temp_dir = TempDir::new().unwrap();
    build_scenario(temp_dir.path());

    let output = run_with_stand_ins(temp_dir.path(), &[("--sort-cmd", "false")], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sort: "));
    // the skip was reported before the failing merge aborted the run
    assert!(stderr.contains("Skipping Sample s2 for Graph g1"));
    assert!(!temp_dir.path().join("total/g1/s1_sample.vcf.gz").exists());
}

#[test]
fn test_missing_tool_aborts_with_error() {
    let temp_dir = TempDir::new().unwrap();
    build_scenario(temp_dir.path());

    let output = run_with_stand_ins(
        temp_dir.path(),
        &[("--concat-cmd", "calltotals-missing-concat")],
        &[],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("calltotals-missing-concat"));
}

#[test]
fn test_no_regions_is_not_an_error() {
    let temp_dir = TempDir::new().unwrap();
    write_vcf(temp_dir.path(), "scratch/g1/s1_sample.vcf", &[]);

    let output = run_with_stand_ins(temp_dir.path(), &[], &[]);
    assert!(output.status.success());
    assert!(!temp_dir.path().join("total/g1").exists());
}

#[test]
fn test_quiet_run_hides_info_but_keeps_errors() {
    let temp_dir = TempDir::new().unwrap();
    build_scenario(temp_dir.path());

    let output = run_with_stand_ins(temp_dir.path(), &[("--sort-cmd", "false")], &["-v", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Skipping Sample"));
    assert!(stderr.contains("sort: "));
}

#[test]
fn test_classic_mode() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_vcf(root, "HG002/SMA.vcf", &["chr5\t70925000\t.\tA\tG\t50\tPASS\t."]);
    write_vcf(root, "HG002/BRCA1.vcf", &["chr17\t43044400\t.\tA\tG\t50\tPASS\t."]);
    write_vcf(root, "HG003/unrelated.vcf", &["chr1\t1\t.\tA\tG\t50\tPASS\t."]);

    let output = run_with_stand_ins(root, &[], &["--classic"]);
    assert!(
        output.status.success(),
        "calltotals failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert!(root.join("HG002/TOTAL.vcf.gz").exists());
    assert_eq!(
        records(&root.join("HG002/TOTAL.vcf")),
        vec![
            "chr17\t43044400\t.\tA\tG\t50\tPASS\t.",
            "chr5\t70925000\t.\tA\tG\t50\tPASS\t.",
        ]
    );
    assert!(root.join("HG002/BRCA1.vcf.gz").exists());
    assert!(root.join("HG002/SMA.vcf.gz").exists());
    assert!(!root.join("HG003/TOTAL.vcf").exists());
    // classic mode never creates the consolidation output
    assert!(!root.join("total").exists());
}

fn tool_available(program: &str, args: &[&str]) -> bool {
    // bgzip/tabix/vt print usage and may exit non-zero; being spawnable is enough
    Command::new(program).args(args).output().is_ok()
}

#[test]
fn test_real_toolchain() {
    let tools = [
        ("vcfsort", &["--help"][..]),
        ("bgzip", &["--help"][..]),
        ("tabix", &["--help"][..]),
        ("vt", &["--help"][..]),
    ];
    if !tools.iter().all(|(program, args)| tool_available(program, args)) {
        eprintln!("Skipping test: vcfsort, bgzip, tabix or vt not available");
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let header = "##fileformat=VCFv4.2\n##contig=<ID=chr13>\n##contig=<ID=chr17>\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";
    for (rel, record) in [
        ("brca1/g1/s1_sample.vcf", "chr17\t43044400\t.\tA\tG\t50\tPASS\t."),
        ("brca2/g1/s1_sample.vcf", "chr13\t32315500\t.\tT\tC\t50\tPASS\t."),
    ] {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("{}{}\n", header, record)).unwrap();
    }

    let output = Command::new(get_calltotals_binary())
        .arg(root)
        .output()
        .expect("Failed to run calltotals");
    assert!(
        output.status.success(),
        "calltotals failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(root.join("total/g1/s1_sample.vcf.gz").exists());
    assert!(root.join("total/g1/s1_sample.vcf.gz.tbi").exists());
    assert_eq!(records(&root.join("total/g1/s1_sample.vcf")).len(), 2);
}

use calltotals::classic::merge_classic;
use calltotals::loci::{CLASSIC_LOCI, RECOGNIZED_REGIONS};
use calltotals::merge::consolidate;
use calltotals::tools::{CommandTools, ToolCommands};
use clap::Parser;
use log::{debug, info};
use std::io;
use std::path::PathBuf;

/// Command lines of the external tools. Input paths are appended; sort, compress
/// and concat must write to stdout.
#[derive(Parser, Debug)]
struct ToolOpts {
    /// Sort a VCF by position
    #[clap(long, value_parser, default_value = "vcfsort")]
    sort_cmd: String,

    /// Block-compress a sorted VCF
    #[clap(long, value_parser, default_value = "bgzip -c")]
    compress_cmd: String,

    /// Index a block-compressed VCF in place
    #[clap(long, value_parser, default_value = "tabix -f -p vcf")]
    index_cmd: String,

    /// Concatenate compressed, indexed VCFs
    #[clap(long, value_parser, default_value = "vt cat")]
    concat_cmd: String,
}

impl From<ToolOpts> for ToolCommands {
    fn from(opts: ToolOpts) -> Self {
        ToolCommands {
            sort: opts.sort_cmd,
            compress: opts.compress_cmd,
            index: opts.index_cmd,
            concat: opts.concat_cmd,
        }
    }
}

/// Merge per-region VCFs of every graph/sample into one call set spanning all regions.
/// Run after variant calling; only VCFs are merged.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Call directory: <CALL_DIR>/<region>/<graph>/<sample>_sample.vcf
    #[clap(value_parser)]
    call_dir: PathBuf,

    /// Name of the output directory created under the call directory
    #[clap(long, value_parser, default_value = "total")]
    name: String,

    /// Merge the classic layout instead: <CALL_DIR>/<sample>/<LOCUS>.vcf
    #[clap(long, action)]
    classic: bool,

    /// Verbosity level (0 = error, 1 = info, 2 = debug)
    #[clap(short, long, default_value = "1")]
    verbose: u8,

    #[clap(flatten)]
    tools: ToolOpts,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let tools = CommandTools::new(args.tools.into());
    debug!("Tool commands: {:?}", tools.commands());

    if args.classic {
        let report = merge_classic(&args.call_dir, CLASSIC_LOCI, &tools)?;
        info!(
            "Classic merge done: {} total(s), {} sample(s) without loci",
            report.totals.len(),
            report.empty_samples.len()
        );
        return Ok(());
    }

    let report = consolidate(&args.call_dir, &args.name, RECOGNIZED_REGIONS, &tools)?;
    for artifact in &report.merged {
        println!("{}", artifact.compressed.display());
    }

    Ok(())
}

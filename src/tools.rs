// Adapter over the external VCF tools (sort, block-compress, tabix index, concatenate).
//
// Every operation blocks until the tool exits. Whether a failure aborts the run
// is decided by the caller through `FailMode`, not by the tool.

use crate::loci::with_suffix;
use log::{debug, warn};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// The four record-level operations the merge needs from the outside world.
pub trait VcfTools {
    /// Write the records of `input` sorted by genomic position to `output`
    fn sort(&self, input: &Path, output: &Path) -> io::Result<()>;

    /// Block-compress `input` (sorted) into `output`
    fn compress(&self, input: &Path, output: &Path) -> io::Result<()>;

    /// Build a positional index next to a block-compressed file
    fn index(&self, compressed: &Path) -> io::Result<()>;

    /// Concatenate sorted, compressed and indexed files into one VCF at `output`
    fn concat(&self, inputs: &[PathBuf], output: &Path) -> io::Result<()>;
}

/// How a failed invocation is treated at a given call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    /// Propagate the error and abort the run
    Hard,
    /// Log and carry on
    Soft,
}

impl FailMode {
    /// Hard failures come back with `what` prepended; soft ones are logged and dropped.
    pub fn settle(self, what: &str, result: io::Result<()>) -> io::Result<()> {
        match (self, result) {
            (_, Ok(())) => Ok(()),
            (FailMode::Hard, Err(e)) => {
                Err(io::Error::new(e.kind(), format!("{}: {}", what, e)))
            }
            (FailMode::Soft, Err(e)) => {
                warn!("Ignoring failed {}: {}", what, e);
                Ok(())
            }
        }
    }
}

/// Remove a file, ignoring a missing target. Other errors are only logged.
pub fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove '{}': {}", path.display(), e),
    }
}

/// Re-normalize a VCF in place: sort it, compress it to `<vcf>.gz` and index that.
/// Every step fails hard. Returns the path of the compressed file.
pub fn normalize(tools: &dyn VcfTools, vcf: &Path) -> io::Result<PathBuf> {
    let sorted = with_suffix(vcf, "sort");
    FailMode::Hard.settle("sort", tools.sort(vcf, &sorted))?;
    fs::rename(&sorted, vcf).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!(
                "Failed to move '{}' to '{}': {}",
                sorted.display(),
                vcf.display(),
                e
            ),
        )
    })?;

    let compressed = with_suffix(vcf, "gz");
    FailMode::Hard.settle("compress", tools.compress(vcf, &compressed))?;
    FailMode::Hard.settle("index", tools.index(&compressed))?;
    Ok(compressed)
}

/// Command lines for each tool contract. Input paths are appended as arguments;
/// sort, compress and concat are expected to write their result to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommands {
    pub sort: String,
    pub compress: String,
    pub index: String,
    pub concat: String,
}

impl Default for ToolCommands {
    fn default() -> Self {
        ToolCommands {
            sort: "vcfsort".to_string(),
            compress: "bgzip -c".to_string(),
            index: "tabix -f -p vcf".to_string(),
            concat: "vt cat".to_string(),
        }
    }
}

/// `VcfTools` backed by external executables
#[derive(Debug, Clone)]
pub struct CommandTools {
    commands: ToolCommands,
}

impl CommandTools {
    pub fn new(commands: ToolCommands) -> Self {
        CommandTools { commands }
    }

    pub fn commands(&self) -> &ToolCommands {
        &self.commands
    }

    /// Run `line` with `args` appended, sending stdout into a freshly created `output`
    fn run_into(&self, line: &str, args: &[&Path], output: &Path) -> io::Result<()> {
        let described = describe(line, args);
        let mut command = build_command(line, args)?;
        let file = File::create(output).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to create '{}': {}", output.display(), e),
            )
        })?;
        debug!("Running {} > {}", described, output.display());
        let result = command
            .stdout(Stdio::from(file))
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| spawn_error(&described, e))?;
        check_status(&described, result)
    }

    fn run(&self, line: &str, args: &[&Path]) -> io::Result<()> {
        let described = describe(line, args);
        let mut command = build_command(line, args)?;
        debug!("Running {}", described);
        let result = command
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| spawn_error(&described, e))?;
        check_status(&described, result)
    }
}

impl VcfTools for CommandTools {
    fn sort(&self, input: &Path, output: &Path) -> io::Result<()> {
        self.run_into(&self.commands.sort, &[input], output)
    }

    fn compress(&self, input: &Path, output: &Path) -> io::Result<()> {
        self.run_into(&self.commands.compress, &[input], output)
    }

    fn index(&self, compressed: &Path) -> io::Result<()> {
        self.run(&self.commands.index, &[compressed])
    }

    fn concat(&self, inputs: &[PathBuf], output: &Path) -> io::Result<()> {
        let args: Vec<&Path> = inputs.iter().map(PathBuf::as_path).collect();
        self.run_into(&self.commands.concat, &args, output)
    }
}

fn build_command(line: &str, args: &[&Path]) -> io::Result<Command> {
    let mut words = line.split_whitespace();
    let program = words.next().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Empty tool command line")
    })?;
    let mut command = Command::new(program);
    command.args(words).args(args);
    Ok(command)
}

fn describe(line: &str, args: &[&Path]) -> String {
    let mut described = line.trim().to_string();
    for arg in args {
        described.push(' ');
        described.push_str(&arg.display().to_string());
    }
    described
}

fn spawn_error(described: &str, e: io::Error) -> io::Error {
    io::Error::new(e.kind(), format!("Could not execute '{}': {}", described, e))
}

fn check_status(described: &str, output: Output) -> io::Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let detail = if stderr.is_empty() {
        format!("exit status {}", output.status)
    } else {
        stderr
    };
    Err(io::Error::other(format!("'{}' failed: {}", described, detail)))
}

use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use cal_core::{Evaluation, evaluate, render};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Evaluate arithmetic expression files and write one result line per file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(
        value_name = "INPUT",
        help = "Expression files or directories of *.txt files (reads stdin when omitted)"
    )]
    inputs: Vec<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Directory for result files (defaults to the current directory)")]
    output_dir: Option<PathBuf>,

    #[arg(long, default_value = "john")]
    name: String,

    #[arg(long, default_value = "doe")]
    lastname: String,

    #[arg(long, value_name = "ID", default_value = "98765")]
    student_id: String,

    #[arg(short, long, help = "Log evaluation details to stderr")]
    verbose: bool,
}

impl Cli {
    /// Suffix appended to every output file stem.
    fn identity_suffix(&self) -> String {
        format!("_{}_{}_{}", self.name, self.lastname, self.student_id)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(cli)
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "cal=debug,cal_core=debug"
    } else {
        "cal=warn,cal_core=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn execute(cli: Cli) -> Result<ExitCode> {
    if cli.inputs.is_empty() {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read expression from stdin")?;
        let evaluation = evaluate(&buffer);
        report_failure(Path::new("<stdin>"), &evaluation);
        println!("{}", render(&evaluation));
        return Ok(exit_code(evaluation.is_ok()));
    }

    let files = collect_inputs(&cli.inputs, &cli.identity_suffix());
    if files.is_empty() {
        return Err(anyhow::anyhow!("no input files found"));
    }

    let output_dir = cli.output_dir.clone().unwrap_or_default();
    let suffix = cli.identity_suffix();
    let mut written = HashSet::new();
    let mut all_ok = true;
    for input in &files {
        match process_file(input, &output_dir, &suffix, &mut written) {
            Ok(ok) => all_ok &= ok,
            Err(err) => {
                warn!(input = %input.display(), "{err:#}");
                all_ok = false;
            }
        }
    }
    Ok(exit_code(all_ok))
}

/// Evaluate one file and write its result; returns whether evaluation succeeded.
///
/// `written` holds the outputs of earlier inputs in this run; an input whose
/// output would replace one of them is rejected.
fn process_file(
    input: &Path,
    output_dir: &Path,
    suffix: &str,
    written: &mut HashSet<PathBuf>,
) -> Result<bool> {
    let output = output_dir.join(output_file_name(input, suffix));
    if written.contains(&output) {
        bail!(
            "output file {} was already written by an earlier input",
            output.display()
        );
    }

    let source = fs::read(input)
        .with_context(|| format!("failed to read input file {}", input.display()))?;

    let evaluation = evaluate(&source);
    report_failure(input, &evaluation);

    write_output(&output, &render(&evaluation))?;
    written.insert(output.clone());

    println!(
        "Processed '{}'. Output written to '{}'.",
        input.display(),
        output.display()
    );
    Ok(evaluation.is_ok())
}

fn report_failure(input: &Path, evaluation: &Evaluation) {
    match &evaluation.error {
        Some(diagnostic) => {
            let position = diagnostic.position;
            let message = diagnostic.kind;
            warn!(input = %input.display(), category = ?message.category(), "Error at pos {position}: {message}");
        }
        None => debug!(input = %input.display(), value = %evaluation.value, "evaluated"),
    }
}

/// Expand directories into the `*.txt` files beneath them, skipping files
/// that are themselves results of an earlier run.
fn collect_inputs(inputs: &[PathBuf], suffix: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();
            let is_txt = path.extension().is_some_and(|ext| ext == "txt");
            let is_output = path
                .file_stem()
                .is_some_and(|stem| stem.to_string_lossy().ends_with(suffix));
            if path.is_file() && is_txt && !is_output {
                files.push(path.to_path_buf());
            } else if is_output {
                info!(path = %path.display(), "skipping previous result file");
            }
        }
    }
    files
}

/// `<stem>_<name>_<lastname>_<id>.txt`, where the stem is the file name
/// without its last extension.
fn output_file_name(input: &Path, suffix: &str) -> String {
    let text = input.to_string_lossy();
    let file_name = text.rsplit(['/', '\\']).next().unwrap_or(&text);
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    format!("{stem}{suffix}.txt")
}

fn write_output(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, format!("{line}\n"))
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

// CLI command implementations
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use glob::glob;
use tagscan::{FormatDispatcher, ScanConfig, ScanOutput, ScannerKind};
use tracing::debug;

use crate::cli::output::{file_report, OutputFormatter, ProgressBar};
use crate::cli::{CliError, CliResult, Commands};

const SNIFF_LEN: usize = 16;

/// Run one parsed subcommand
pub fn run(command: Commands, scan_config: &ScanConfig, formatter: &OutputFormatter) -> CliResult<()> {
    match command {
        Commands::Read {
            files,
            with_art,
            output,
        } => command_read(files, with_art, output, scan_config, formatter),
        Commands::Detect { files } => command_detect(files, formatter),
        Commands::ExportCover { file, output } => {
            command_export_cover(file, output, scan_config, formatter)
        }
        Commands::Batch { directory, pattern } => {
            command_batch(directory, pattern, scan_config, formatter)
        }
    }
}

/// Scan one file and apply the presentation fallbacks.
pub fn read_file(path: &str, scan_config: &ScanConfig) -> CliResult<(ScannerKind, ScanOutput)> {
    if !Path::new(path).is_file() {
        return Err(CliError::FileNotFound(path.to_string()));
    }
    let kind = FormatDispatcher::for_path(path)
        .ok_or_else(|| CliError::UnsupportedFormat(path.to_string()))?;

    let mut reader = BufReader::new(File::open(path)?);
    let mut output = kind
        .scan(&mut reader, scan_config)
        .map_err(|source| CliError::Scan {
            path: path.to_string(),
            source,
        })?;

    output
        .tag
        .apply_compilation_fallback(&scan_config.various_artists_label);
    if !output.tag.loaded {
        if let Some(stem) = Path::new(path).file_stem() {
            debug!(path, "no usable tag, titling from file name");
            output.tag.title = Some(stem.to_string_lossy().into_owned());
        }
    }
    Ok((kind, output))
}

/// Read metadata from files
fn command_read(
    files: Vec<String>,
    with_art: bool,
    output: Option<PathBuf>,
    scan_config: &ScanConfig,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(BufWriter::new(File::create(path)?))
    } else {
        Box::new(std::io::stdout().lock())
    };

    let mut failures = 0;
    for file_path in &files {
        match read_file(file_path, scan_config) {
            Ok((kind, scanned)) => {
                let report = file_report(file_path, kind, &scanned, with_art)?;
                formatter.output_metadata(&report, &mut *writer)?;
            }
            Err(e) => {
                formatter.print_error(&e.to_string());
                failures += 1;
            }
        }
    }
    writer.flush()?;

    if failures == files.len() {
        return Err(CliError::Other(format!("no file could be read ({} failed)", failures)));
    }
    Ok(())
}

/// Detect file format
fn command_detect(files: Vec<String>, formatter: &OutputFormatter) -> CliResult<()> {
    for file_path in files {
        if !Path::new(&file_path).is_file() {
            formatter.print_error(&format!("File not found: {}", file_path));
            continue;
        }

        let by_extension = FormatDispatcher::for_path(&file_path);
        let head = match read_head(&file_path) {
            Ok(head) => head,
            Err(e) => {
                formatter.print_error(&format!("Cannot read {}: {}", file_path, e));
                continue;
            }
        };
        let by_content = ScannerKind::sniff(&head);

        let name = |kind: Option<ScannerKind>| kind.map(|k| k.name()).unwrap_or("unknown");
        let line = if by_extension == by_content {
            format!("{}: {}", file_path, name(by_extension))
        } else {
            format!(
                "{}: {} (extension) / {} (content)",
                file_path,
                name(by_extension),
                name(by_content)
            )
        };
        println!("{}", line);
    }

    Ok(())
}

fn read_head(path: &str) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?.take(SNIFF_LEN as u64).read_to_end(&mut head)?;
    Ok(head)
}

/// Export cover art
fn command_export_cover(
    file: String,
    output_dir: PathBuf,
    scan_config: &ScanConfig,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    let (_, scanned) = read_file(&file, scan_config)?;
    let art = scanned.art.ok_or_else(|| CliError::NoCover(file.clone()))?;

    fs::create_dir_all(&output_dir)?;
    let stem = Path::new(&file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cover".to_string());
    let target = output_dir.join(format!("{}.{}", stem, art.extension()));
    art.save(&target)?;

    formatter.print_success(&format!(
        "Exported {} ({} bytes) to {}",
        art.mime_type,
        art.bytes.len(),
        target.display()
    ));
    Ok(())
}

/// Batch process directory
fn command_batch(
    directory: String,
    pattern: String,
    scan_config: &ScanConfig,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    // Build glob pattern
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory, pattern)
    } else {
        format!("{}/**/{}", directory, pattern)
    };

    let mut files: Vec<String> = Vec::new();
    for entry in glob(&glob_pattern)? {
        match entry {
            Ok(path) if path.is_file() => {
                if let Some(path_str) = path.to_str() {
                    files.push(path_str.to_string());
                }
            }
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
        }
    }

    let total = files.len();
    if total == 0 {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(total);
    formatter.print_info(&format!("Processing {} files on {} threads...", total, workers));

    let mut results = scan_all(&files, workers, scan_config, formatter);
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut success_count = 0;
    let mut error_count = 0;
    for (path, result) in results {
        match result {
            Ok((kind, scanned)) => {
                success_count += 1;
                let tag = &scanned.tag;
                formatter.print_success(&format!(
                    "{} [{}] {} - {}",
                    path,
                    kind.name(),
                    tag.artist.as_deref().unwrap_or("?"),
                    tag.title.as_deref().unwrap_or("?")
                ));
            }
            Err(e) => {
                error_count += 1;
                formatter.print_error(&e.to_string());
            }
        }
    }

    formatter.print_info(&format!(
        "Completed: {} successful, {} errors",
        success_count, error_count
    ));
    Ok(())
}

type BatchResult = (String, CliResult<(ScannerKind, ScanOutput)>);

/// Scan `files` on `workers` scoped threads, reporting progress as each
/// file finishes.
fn scan_all(
    files: &[String],
    workers: usize,
    scan_config: &ScanConfig,
    formatter: &OutputFormatter,
) -> Vec<BatchResult> {
    let next = AtomicUsize::new(0);
    let (tx, rx): (Sender<BatchResult>, Receiver<BatchResult>) = crossbeam_channel::unbounded();
    let mut progress = ProgressBar::new(files.len(), !formatter.is_quiet());
    let mut results = Vec::with_capacity(files.len());

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(path) = files.get(index) else {
                    break;
                };
                let result = read_file(path, scan_config);
                if tx.send((path.clone(), result)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        for result in rx {
            progress.increment(&result.0);
            results.push(result);
        }
    });

    results
}

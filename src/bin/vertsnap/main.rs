//! Vertsnap CLI - snap mesh vertices onto a reference surface.
//!
//! Usage: vertsnap [OPTIONS] <REFERENCE> <SOURCE> <OUTPUT>
//!
//! Run `vertsnap --help` for available options.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use vertsnap::algo::snap::{snap_to_reference, SnapOptions, SnapReport};
use vertsnap::algo::{CancelToken, Progress};
use vertsnap::error::SnapError;
use vertsnap::io;
use vertsnap::scene::Scene;

const REFERENCE: &str = "reference";
const SOURCE: &str = "source";

#[derive(Parser)]
#[command(name = "vertsnap")]
#[command(author, version, about = "Snap mesh vertices to the closest vertex of a reference mesh", long_about = None)]
struct Cli {
    /// Reference mesh file (the surface to snap onto)
    reference: PathBuf,

    /// Source mesh file (the vertices to move)
    source: PathBuf,

    /// Output mesh file for the snapped source
    output: PathBuf,

    /// Maximum distance a vertex may move
    #[arg(short, long, default_value_t = SnapOptions::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Initial closest distance; candidates at or beyond it are ignored
    #[arg(long, default_value_t = SnapOptions::DEFAULT_INITIAL_DISTANCE)]
    initial_distance: f64,

    /// Source vertex indices to snap (default: all)
    #[arg(short, long, value_delimiter = ',')]
    vertices: Option<Vec<usize>>,

    /// Use single-threaded nearest-face queries (for benchmarking)
    #[arg(long)]
    sequential: bool,

    /// Stop snapping after this many seconds and save the partial result
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<f64>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.tolerance.is_nan() {
        return Err(SnapError::invalid_param("tolerance", cli.tolerance, "must be a number").into());
    }
    if cli.initial_distance.is_nan() {
        return Err(SnapError::invalid_param(
            "initial-distance",
            cli.initial_distance,
            "must be a number",
        )
        .into());
    }
    let time_limit = cli
        .time_limit
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|_| {
                SnapError::invalid_param("time-limit", secs, "must be a non-negative number of seconds")
            })
        })
        .transpose()?;

    let mut scene = Scene::new().with_parallel(!cli.sequential);
    scene.add_object(REFERENCE, io::load(&cli.reference)?);
    let source = scene.add_object(SOURCE, io::load(&cli.source)?);

    let vertices = match &cli.vertices {
        Some(indices) => scene.select_vertices(SOURCE, indices)?,
        None => scene.vertices_of(SOURCE)?,
    };

    let options = SnapOptions::default()
        .with_tolerance(cli.tolerance)
        .with_initial_distance(cli.initial_distance);

    let mode = if cli.sequential { "sequential" } else { "parallel" };
    println!(
        "Snapping {} vertices (tolerance={}, {})...",
        vertices.len(),
        options.tolerance,
        mode
    );

    let progress = create_progress(CancelToken::new(), time_limit);
    let start = Instant::now();
    let report = snap_to_reference(&mut scene, REFERENCE, &vertices, &options, &progress)?;
    let elapsed = start.elapsed();

    // A stopped run still saves: vertices already snapped stay snapped
    println!("{}", summarize(&report, vertices.len()));

    let mesh = scene
        .mesh(source)
        .ok_or_else(|| SnapError::UnknownObject(SOURCE.to_string()))?;
    io::save(mesh, &cli.output)?;
    println!("Saved: {} ({:.2?})", cli.output.display(), elapsed);

    Ok(())
}

/// One-line summary of a snap run over `total` selected vertices.
fn summarize(report: &SnapReport, total: usize) -> String {
    if let Some(reason) = report.skipped {
        return format!("Nothing to do: {}", reason);
    }

    let mut summary = format!(
        "Snapped {} of {} vertices ({} without candidates)",
        report.moved, report.processed, report.skipped_anomalies
    );
    if report.cancelled {
        summary.push_str(&format!(
            "; time limit reached, {} of {} vertices left as they were",
            total - report.processed,
            total
        ));
    }
    summary
}

/// Create a progress reporter that displays a progress bar on the terminal.
///
/// With a time limit, `cancel` is set on the first update after the limit
/// has passed, which stops the run before its next vertex.
fn create_progress(cancel: CancelToken, time_limit: Option<Duration>) -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));
    let deadline = cancel.clone();
    let start = Instant::now();

    Progress::new(move |current, total, message| {
        if time_limit.is_some_and(|limit| start.elapsed() >= limit) {
            deadline.cancel();
        }

        if total == 0 {
            return;
        }

        let percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Redraw only when the bar grows
        let previous = max_percent.fetch_max(percent, Ordering::Relaxed);
        if percent <= previous && percent != 100 && current != 0 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total || message == "cancelled" {
            eprintln!();
        }
    })
    .with_cancel(cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vertsnap::algo::snap::SkipReason;
    use vertsnap::algo::ProgressChannel;

    #[test]
    fn test_time_limit_cancels_run() {
        let token = CancelToken::new();
        let progress = create_progress(token.clone(), Some(Duration::ZERO));

        progress.begin_progress(3, "Snapping");
        assert!(token.is_cancelled());
        assert!(progress.is_cancelled());
    }

    #[test]
    fn test_no_time_limit_never_cancels() {
        let progress = create_progress(CancelToken::new(), None);

        progress.begin_progress(2, "Snapping");
        progress.report_progress(1);
        progress.report_progress(2);
        progress.end_progress();
        assert!(!progress.is_cancelled());
    }

    #[test]
    fn test_summarize() {
        let finished = SnapReport {
            processed: 4,
            moved: 3,
            moves: 5,
            skipped_anomalies: 1,
            ..SnapReport::default()
        };
        assert_eq!(
            summarize(&finished, 4),
            "Snapped 3 of 4 vertices (1 without candidates)"
        );

        let stopped = SnapReport {
            processed: 2,
            moved: 2,
            moves: 2,
            cancelled: true,
            ..SnapReport::default()
        };
        assert_eq!(
            summarize(&stopped, 5),
            "Snapped 2 of 2 vertices (0 without candidates); time limit reached, 3 of 5 vertices left as they were"
        );

        let skipped = SnapReport::skipped(SkipReason::EmptySelection);
        assert_eq!(summarize(&skipped, 0), "Nothing to do: no vertices selected");
    }
}

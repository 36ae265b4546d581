//! External LaTeX compiler collaborator.
//!
//! `latexmk` is driven as a batch subprocess: one invocation per build, a
//! hard wall-clock timeout, and no automatic retry. Success means a zero
//! exit status *and* a `main.pdf` in the build directory; anything else is
//! surfaced with the tail of the compiler diagnostics.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::template::tex_path;

/// Default wall-clock budget for one compiler run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(360);

/// Name of the artifact `latexmk` leaves in the build directory.
const OUTPUT_PDF: &str = "main.pdf";

/// How many diagnostic lines the failure tail keeps at most.
const LOG_TAIL_LINES: usize = 120;

/// Fallback tail size when no diagnostic lines were recognized.
const LOG_TAIL_CHARS: usize = 4000;

/// Result of a successful compiler run.
#[derive(Debug)]
pub struct CompileOutcome {
    /// The produced PDF inside the build directory.
    pub pdf: PathBuf,
    /// Wall-clock duration of the compiler run.
    pub elapsed: Duration,
}

/// Build the `latexmk` argument vector for one document.
fn latexmk_args(build_dir: &Path, main_tex: &Path) -> Vec<String> {
    vec![
        "-lualatex".to_string(),
        "-shell-escape".to_string(),
        "-interaction=nonstopmode".to_string(),
        "-file-line-error".to_string(),
        "-halt-on-error".to_string(),
        format!("-outdir={}", tex_path(build_dir)),
        tex_path(main_tex),
    ]
}

/// Extract the interesting tail of a failed compiler run.
///
/// LaTeX buries its errors in pages of noise; keep the lines that matter
/// (`! …`, `LaTeX Error`, `Undefined control sequence`), capped at the last
/// [`LOG_TAIL_LINES`]. When nothing matched, fall back to the raw tail.
fn failure_tail(stdout: &str, stderr: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in stdout.lines().chain(stderr.lines()) {
        if line.starts_with("! ")
            || line.contains("LaTeX Error")
            || line.contains("Undefined control sequence")
        {
            lines.push(line);
        }
    }
    if !lines.is_empty() {
        let keep = lines.len().saturating_sub(LOG_TAIL_LINES);
        return lines[keep..].join("\n");
    }

    let combined = format!("{stdout}\n{stderr}");
    let tail_start = combined
        .char_indices()
        .rev()
        .nth(LOG_TAIL_CHARS.saturating_sub(1))
        .map_or(0, |(i, _)| i);
    combined[tail_start..].to_string()
}

/// Compile the assembled document with `latexmk`.
///
/// Blocks (asynchronously) for at most `timeout`; an overrun kills the
/// subprocess and fails with [`Error::CompilerTimeout`]. Never retried here:
/// a timeout is a terminal failure for the invocation.
pub async fn compile(
    build_dir: &Path,
    main_tex: &Path,
    timeout: Duration,
) -> Result<CompileOutcome> {
    let args = latexmk_args(build_dir, main_tex);
    info!("RUN: latexmk {}", args.join(" "));

    let started = Instant::now();
    let output_future = Command::new("latexmk")
        .args(&args)
        .current_dir(build_dir)
        .kill_on_drop(true)
        .output();

    let output = tokio::select! {
        result = output_future => {
            result.map_err(|e| Error::io(e, main_tex.to_path_buf()))?
        }
        () = tokio::time::sleep(timeout) => {
            return Err(Error::CompilerTimeout { seconds: timeout.as_secs() });
        }
    };

    let elapsed = started.elapsed();
    info!("Compile finished in {:.3}s", elapsed.as_secs_f64());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        debug!("latexmk exit status: {:?}", output.status.code());
        return Err(Error::CompilerFailure {
            status: output.status.code(),
            log_tail: failure_tail(&stdout, &stderr),
        });
    }

    let pdf = build_dir.join(OUTPUT_PDF);
    if !pdf.exists() {
        return Err(Error::CompilerFailure {
            status: output.status.code(),
            log_tail: format!("{OUTPUT_PDF} missing from {}", build_dir.display()),
        });
    }

    Ok(CompileOutcome { pdf, elapsed })
}

// Render service: LaTeX source -> PDF bytes via latexmk.
// Each render runs in its own temp directory, so concurrent renders never share files.

pub mod handlers;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

const DOCUMENT_STEM: &str = "document";
/// How much of the TeX log is kept for the caller when compilation fails.
const LOG_TAIL_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document source is empty")]
    EmptySource,

    #[error("failed to start the typesetting toolchain: {0}")]
    Spawn(std::io::Error),

    #[error("render I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render timed out after {0}s")]
    Timeout(u64),

    #[error("LaTeX compilation failed:\n{log_tail}")]
    Compilation { log_tail: String },
}

impl RenderError {
    /// True when the document itself is at fault rather than the toolchain.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            RenderError::EmptySource | RenderError::Compilation { .. } | RenderError::Timeout(_)
        )
    }
}

#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, source: &str) -> Result<Vec<u8>, RenderError>;
}

/// Renders with a local `latexmk` install using pdfLaTeX.
#[derive(Debug, Clone)]
pub struct LatexmkRenderer {
    binary: String,
    timeout: Duration,
}

impl LatexmkRenderer {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn command(&self, workdir: &Path, tex_path: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-pdf")
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg("-file-line-error")
            .arg(format!("-output-directory={}", workdir.display()))
            .arg(tex_path)
            .current_dir(workdir)
            .env("TEXMFVAR", workdir)
            .env("max_print_line", "10000")
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Renderer for LatexmkRenderer {
    async fn render(&self, source: &str) -> Result<Vec<u8>, RenderError> {
        if source.trim().is_empty() {
            return Err(RenderError::EmptySource);
        }

        let workdir = tempfile::tempdir()?;
        let tex_path = workdir.path().join(format!("{DOCUMENT_STEM}.tex"));
        tokio::fs::write(&tex_path, source).await?;
        debug!(
            "Rendering {} bytes of LaTeX in {}",
            source.len(),
            workdir.path().display()
        );

        let mut command = self.command(workdir.path(), &tex_path);
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| RenderError::Timeout(self.timeout.as_secs()))?
            .map_err(RenderError::Spawn)?;

        let pdf_path = workdir.path().join(format!("{DOCUMENT_STEM}.pdf"));
        match tokio::fs::read(&pdf_path).await {
            Ok(bytes) => {
                info!("Rendered PDF ({} bytes)", bytes.len());
                Ok(bytes)
            }
            Err(_) => {
                let log_path = workdir.path().join(format!("{DOCUMENT_STEM}.log"));
                let log = match tokio::fs::read_to_string(&log_path).await {
                    Ok(log) => log,
                    Err(_) => String::from_utf8_lossy(&output.stderr).into_owned(),
                };
                warn!("latexmk exited with {} and produced no PDF", output.status);
                Err(RenderError::Compilation {
                    log_tail: tail(&log, LOG_TAIL_CHARS),
                })
            }
        }
    }
}

/// The last `max_chars` characters of `text`.
fn tail(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    text.chars().skip(total.saturating_sub(max_chars)).collect()
}

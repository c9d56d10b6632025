//! Best-effort deck to PDF conversion through an installed office suite.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// PowerPoint's `ppSaveAsPDF`.
const PP_SAVE_AS_PDF: u32 = 32;

#[async_trait]
pub trait PdfConvert: Send + Sync {
    /// Write `pdf` from `deck`. Failures are logged and reported as `false`;
    /// the deck itself is never modified.
    async fn convert(&self, deck: &Path, pdf: &Path) -> bool;
}

/// PowerPoint automation on Windows, headless LibreOffice elsewhere.
#[derive(Debug, Default, Clone)]
pub struct PdfConverter {
    #[cfg_attr(windows, allow(dead_code))]
    office: Option<PathBuf>,
}

impl PdfConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this LibreOffice executable instead of searching `PATH`.
    pub fn with_office_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            office: Some(path.into()),
        }
    }

    async fn try_convert(&self, deck: &Path, pdf: &Path) -> Result<()> {
        if !deck.is_file() {
            return Err(anyhow!("deck not found: {}", deck.display()));
        }
        let deck = std::fs::canonicalize(deck)
            .with_context(|| format!("resolving {}", deck.display()))?;
        let out_dir = match pdf.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let out_dir = std::fs::canonicalize(&out_dir)
            .with_context(|| format!("resolving {}", out_dir.display()))?;
        let file_name = pdf
            .file_name()
            .ok_or_else(|| anyhow!("invalid pdf path: {}", pdf.display()))?;
        let pdf = out_dir.join(file_name);

        // A converter can exit 0 without writing anything.
        remove_stale(&pdf)?;

        #[cfg(windows)]
        run_powerpoint(&deck, &pdf).await?;

        #[cfg(not(windows))]
        {
            let binary = match &self.office {
                Some(path) => path.clone(),
                None => office_binary()
                    .ok_or_else(|| anyhow!("LibreOffice (soffice) not found on PATH"))?,
            };
            run_libreoffice(&binary, &deck, &out_dir, &pdf).await?;
        }

        if !pdf.is_file() {
            return Err(anyhow!("converter finished but {} is missing", pdf.display()));
        }
        Ok(())
    }
}

#[async_trait]
impl PdfConvert for PdfConverter {
    async fn convert(&self, deck: &Path, pdf: &Path) -> bool {
        match self.try_convert(deck, pdf).await {
            Ok(()) => {
                tracing::info!("Converted {} to {}", deck.display(), pdf.display());
                true
            }
            Err(e) => {
                tracing::warn!("Error converting {} to PDF: {e:#}", deck.display());
                false
            }
        }
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("removing stale {}", path.display())),
    }
}

async fn run(mut cmd: Command) -> Result<()> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let output = cmd.output().await.context("spawning converter")?;
    if !output.status.success() {
        return Err(anyhow!(
            "converter exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    tracing::debug!(
        "Converter output: {}",
        String::from_utf8_lossy(&output.stdout).trim()
    );
    Ok(())
}

/// PowerShell literal string.
#[cfg_attr(not(windows), allow(dead_code))]
fn ps_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "''"))
}

#[cfg_attr(not(windows), allow(dead_code))]
fn powershell_script(deck: &Path, pdf: &Path) -> String {
    format!(
        "$ErrorActionPreference = 'Stop'; \
         $app = New-Object -ComObject PowerPoint.Application; \
         try {{ \
           $pres = $app.Presentations.Open({deck}, $true, $false, $false); \
           $pres.SaveAs({pdf}, {PP_SAVE_AS_PDF}); \
           $pres.Close() \
         }} finally {{ $app.Quit() }}",
        deck = ps_quote(deck),
        pdf = ps_quote(pdf),
    )
}

#[cfg(windows)]
async fn run_powerpoint(deck: &Path, pdf: &Path) -> Result<()> {
    let mut cmd = Command::new("powershell");
    cmd.args(["-NoProfile", "-NonInteractive", "-Command"])
        .arg(powershell_script(deck, pdf));
    run(cmd).await
}

#[cfg_attr(windows, allow(dead_code))]
fn office_binary() -> Option<PathBuf> {
    ["soffice", "libreoffice"]
        .into_iter()
        .find_map(|name| which::which(name).ok())
}

#[cfg_attr(windows, allow(dead_code))]
fn libreoffice_args(deck: &Path, out_dir: &Path) -> Vec<OsString> {
    vec![
        "--headless".into(),
        "--convert-to".into(),
        "pdf".into(),
        "--outdir".into(),
        out_dir.as_os_str().to_owned(),
        deck.as_os_str().to_owned(),
    ]
}

#[cfg(not(windows))]
async fn run_libreoffice(binary: &Path, deck: &Path, out_dir: &Path, pdf: &Path) -> Result<()> {
    // LibreOffice names the output after the deck's stem.
    let produced = out_dir.join(Path::new(deck.file_stem().unwrap_or_default()).with_extension("pdf"));
    if produced != pdf {
        remove_stale(&produced)?;
    }

    let mut cmd = Command::new(binary);
    cmd.args(libreoffice_args(deck, out_dir));
    run(cmd).await?;

    if produced != pdf && produced.is_file() {
        std::fs::rename(&produced, pdf)
            .with_context(|| format!("moving {} to {}", produced.display(), pdf.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_deck_reports_false() {
        let dir = tempfile::tempdir().unwrap();
        let deck = dir.path().join("absent.pptx");
        let pdf = dir.path().join("absent.pdf");
        assert!(!PdfConverter::new().convert(&deck, &pdf).await);
        assert!(!pdf.exists());
    }

    #[cfg(unix)]
    fn fake_office(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("soffice");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_converter_failure_does_not_reuse_an_old_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let office = fake_office(dir.path(), "echo 'Error: source file could not be loaded' >&2\nexit 0");
        let deck = dir.path().join("talk.pptx");
        let pdf = dir.path().join("talk.pdf");
        std::fs::write(&deck, b"PK").unwrap();
        std::fs::write(&pdf, b"%PDF stale from previous run").unwrap();

        assert!(!PdfConverter::with_office_binary(office).convert(&deck, &pdf).await);
        assert!(!pdf.exists());
        assert!(deck.is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn converter_output_is_renamed_to_the_requested_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let office = fake_office(dir.path(), "printf '%PDF fresh' > \"$5/talk.pdf\"");
        let deck = dir.path().join("talk.pptx");
        let pdf = dir.path().join("slides.pdf");
        std::fs::write(&deck, b"PK").unwrap();

        assert!(PdfConverter::with_office_binary(office).convert(&deck, &pdf).await);
        assert_eq!(std::fs::read_to_string(&pdf).unwrap(), "%PDF fresh");
        assert!(!dir.path().join("talk.pdf").exists());
    }

    #[test]
    fn powershell_paths_are_single_quoted() {
        let script = powershell_script(Path::new("C:\\d\\bob's.pptx"), Path::new("C:\\d\\out.pdf"));
        assert!(script.contains("Open('C:\\d\\bob''s.pptx', $true, $false, $false)"));
        assert!(script.contains("SaveAs('C:\\d\\out.pdf', 32)"));
        assert!(script.contains("$app.Quit()"));
    }

    #[test]
    fn libreoffice_runs_headless_into_the_pdf_directory() {
        let args = libreoffice_args(Path::new("/tmp/a/deck.pptx"), Path::new("/tmp/b"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["--headless", "--convert-to", "pdf", "--outdir", "/tmp/b", "/tmp/a/deck.pptx"]
        );
    }
}

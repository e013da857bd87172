//! Output artifacts: the resolved name/office list as text, Markdown and CSV.
//!
//! Rendering is pure ([`render_text`], [`render_markdown`], [`render_csv`]);
//! [`write_all`] puts the three renderings on disk next to each other.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use despachos_shared::{DespachosError, ResolvedEntry, Result};

/// Column headers shared by the Markdown and CSV outputs.
const NAME_HEADER: &str = "Nombre";
const OFFICE_HEADER: &str = "Despacho";

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// One of the generated output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Tab-separated `name\toffice` lines.
    Text,
    /// Two-column Markdown table.
    Markdown,
    /// CSV with quoted names.
    Csv,
}

impl ArtifactKind {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Csv => "csv",
        }
    }

    /// Render `entries` in this format.
    pub fn render(self, entries: &[ResolvedEntry]) -> String {
        match self {
            Self::Text => render_text(entries),
            Self::Markdown => render_markdown(entries),
            Self::Csv => render_csv(entries),
        }
    }

    /// `<prefix>.<ext>`. The prefix is used verbatim, dots included.
    pub fn path_for(self, prefix: &str) -> PathBuf {
        PathBuf::from(format!("{prefix}.{}", self.extension()))
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// One `name<TAB>office` line per entry.
pub fn render_text(entries: &[ResolvedEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{}\t{}", entry.name, entry.office);
    }
    out
}

/// A `| Nombre | Despacho |` table.
pub fn render_markdown(entries: &[ResolvedEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "| {NAME_HEADER} | {OFFICE_HEADER} |");
    out.push_str("|--------|----------|\n");
    for entry in entries {
        let _ = writeln!(out, "| {} | {} |", entry.name, entry.office);
    }
    out
}

/// `Nombre,Despacho` header, then `"name",office` rows.
///
/// Names are always quoted with embedded quotes doubled; office codes never
/// contain separators and are written bare.
pub fn render_csv(entries: &[ResolvedEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{NAME_HEADER},{OFFICE_HEADER}");
    for entry in entries {
        let _ = writeln!(out, "\"{}\",{}", entry.name.replace('"', "\"\""), entry.office);
    }
    out
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Paths of the files produced by [`write_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub text: PathBuf,
    pub markdown: PathBuf,
    pub csv: PathBuf,
}

impl ArtifactPaths {
    /// The three paths, in write order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [&self.text, &self.markdown, &self.csv]
            .into_iter()
            .map(PathBuf::as_path)
    }
}

/// Write `entries` as `<prefix>.txt`, `<prefix>.md` and `<prefix>.csv`.
///
/// Existing files are overwritten. Files are written one after another, so a
/// failure part-way leaves the earlier ones on disk. Parent directories are
/// not created.
#[instrument(skip(entries), fields(count = entries.len()))]
pub fn write_all(entries: &[ResolvedEntry], prefix: &str) -> Result<ArtifactPaths> {
    let text = write_artifact(ArtifactKind::Text, entries, prefix)?;
    let markdown = write_artifact(ArtifactKind::Markdown, entries, prefix)?;
    let csv = write_artifact(ArtifactKind::Csv, entries, prefix)?;

    info!("artifacts written");
    Ok(ArtifactPaths {
        text,
        markdown,
        csv,
    })
}

fn write_artifact(kind: ArtifactKind, entries: &[ResolvedEntry], prefix: &str) -> Result<PathBuf> {
    let path = kind.path_for(prefix);
    let content = kind.render(entries);

    std::fs::write(&path, &content).map_err(|e| DespachosError::io(&path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote artifact");

    Ok(path)
}

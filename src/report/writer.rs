use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::AccessReport;

/// Serializes rows as CSV with a header taken from the row type's fields.
pub fn write_csv<W: Write, R: Serialize>(writer: W, rows: &[R]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Paths of the files written for one report.
#[derive(Debug, Clone)]
pub struct ReportFiles {
    pub permissions: PathBuf,
    pub subjects: PathBuf,
    pub repositories: PathBuf,
}

pub struct ReportWriter {
    dir: PathBuf,
    organization: String,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>, organization: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            organization: organization.into(),
        }
    }

    pub fn write(&self, report: &AccessReport) -> Result<ReportFiles> {
        fs::create_dir_all(&self.dir)?;

        let files = ReportFiles {
            permissions: self.path("direct_permissions"),
            subjects: self.path("direct_summary"),
            repositories: self.path("repository_summary"),
        };

        write_atomically(&files.permissions, &report.permissions)?;
        write_atomically(&files.subjects, &report.subjects)?;
        write_atomically(&files.repositories, &report.repositories)?;

        tracing::info!("Saved {} permission records to {}", report.permissions.len(), files.permissions.display());
        tracing::info!("Saved {} subject summaries to {}", report.subjects.len(), files.subjects.display());
        tracing::info!("Saved {} repository summaries to {}", report.repositories.len(), files.repositories.display());

        Ok(files)
    }

    fn path(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", self.organization, suffix))
    }
}

/// Writes to a hidden sibling, then renames it over `target`.
fn write_atomically<R: Serialize>(target: &Path, rows: &[R]) -> Result<()> {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = target.with_file_name(format!(".{}.tmp", file_name));

    let result = File::create(&temp)
        .map_err(Into::into)
        .and_then(|file| write_csv(BufWriter::new(file), rows));

    match result {
        Ok(()) => {
            fs::rename(&temp, target)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&temp);
            Err(e)
        }
    }
}

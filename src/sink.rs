use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::solver::FittedModel;

/// What happened to one model's output. Failures are already reported when
/// this is returned; they never abort a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum PersistOutcome {
    Written(PathBuf),
    Failed(PathBuf),
}

impl PersistOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Written(p) | Self::Failed(p) => p,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

pub trait ModelSink {
    fn persist(&mut self, model: &dyn FittedModel, path: &Path) -> PersistOutcome;
}

/// Writes each model as an XML file; the handle is closed before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileModelSink;

impl ModelSink for FileModelSink {
    fn persist(&mut self, model: &dyn FittedModel, path: &Path) -> PersistOutcome {
        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                log::error!(
                    "Could not open output file for writing. ('{}': {e})",
                    path.display()
                );
                return PersistOutcome::Failed(path.to_path_buf());
            }
        };
        let mut out = BufWriter::new(file);
        if let Err(e) = model.write_xml(&mut out).and_then(|()| out.flush()) {
            log::error!("failed writing model '{}': {e}", path.display());
            return PersistOutcome::Failed(path.to_path_buf());
        }
        log::info!("saved model: {}", path.display());
        PersistOutcome::Written(path.to_path_buf())
    }
}

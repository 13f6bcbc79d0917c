// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Errors surfaced by the stitching pass and its netlist collaborator.
///
/// Conditions the pass can recover from (no LUTs, no candidates, dependency
/// cycles) are logged as warnings and never show up here.
#[derive(Debug)]
pub enum StitchError {
    /// The design has no top-level module to operate on.
    NoTopModule,
    UnknownCell {
        cell: String,
    },
    MissingPort {
        cell: String,
        port: String,
    },
    MissingParameter {
        cell: String,
        param: String,
    },
    CellExists {
        cell: String,
    },
    /// A merge plan names a cell that is gone by the time it is committed.
    PlanReferencesMissingCell {
        cell: String,
    },
    InvalidTruthTable(String),
    DesignFormat(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    EquivalenceMismatch {
        signal: String,
        assignment: String,
    },
}

impl std::fmt::Display for StitchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StitchError::NoTopModule => write!(f, "no top module found"),
            StitchError::UnknownCell { cell } => write!(f, "no cell named '{}'", cell),
            StitchError::MissingPort { cell, port } => {
                write!(f, "cell '{}' has no connection on port '{}'", cell, port)
            }
            StitchError::MissingParameter { cell, param } => {
                write!(f, "cell '{}' has no parameter '{}'", cell, param)
            }
            StitchError::CellExists { cell } => write!(f, "cell '{}' already exists", cell),
            StitchError::PlanReferencesMissingCell { cell } => write!(
                f,
                "merge plan references cell '{}' which is absent at commit time",
                cell
            ),
            StitchError::InvalidTruthTable(msg) => write!(f, "invalid truth table: {}", msg),
            StitchError::DesignFormat(msg) => write!(f, "malformed design: {}", msg),
            StitchError::Io { path, source } => {
                write!(f, "I/O error on '{}': {}", path.display(), source)
            }
            StitchError::EquivalenceMismatch { signal, assignment } => write!(
                f,
                "signal '{}' differs after stitching under input assignment {}",
                signal, assignment
            ),
        }
    }
}

impl std::error::Error for StitchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StitchError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

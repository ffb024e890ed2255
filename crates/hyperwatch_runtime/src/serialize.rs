//! Trace serialization and deserialization using `MessagePack`.
//!
//! A trace is written as a positional array: proposition count, term
//! count, last cycle, every proposition's change points, then every term
//! variable's kind tag and change points. Only change points are stored,
//! so the encoded size follows the number of value changes. Decoding
//! validates every history before building the store.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use hyperwatch_foundation::{Cycle, Error, ErrorContext, ErrorKind, Result, ValueKind};
use hyperwatch_storage::{History, PointsDefect, TermHistory, TraceStore};
use log::debug;
use serde::{Deserialize, Serialize};

/// Wire tag of a term with no declared kind.
const UNDECLARED_TAG: u8 = 0;

#[derive(Serialize, Deserialize)]
struct TraceImage {
    num_props: u32,
    num_vars: u32,
    last_cycle: Cycle,
    props: Vec<Vec<(Cycle, bool)>>,
    terms: Vec<TermImage>,
}

#[derive(Serialize, Deserialize)]
struct TermImage(u8, TermPoints);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TermPoints {
    Scalar(Vec<(Cycle, u32)>),
    Vector(Vec<(Cycle, Vec<u32>)>),
}

impl TermPoints {
    fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(points) => points.is_empty(),
            Self::Vector(points) => points.is_empty(),
        }
    }
}

fn serialization_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Serialization(message.into()))
}

fn count(n: usize, what: &str) -> Result<u32> {
    u32::try_from(n).map_err(|_| serialization_error(format!("too many {what}: {n}")))
}

impl TraceImage {
    fn capture(trace: &TraceStore) -> Result<Self> {
        let props = trace
            .prop_histories()
            .map(|h| h.change_points().copied().collect())
            .collect();
        let terms = trace.term_histories().map(TermImage::capture).collect();
        Ok(Self {
            num_props: count(trace.num_props(), "propositions")?,
            num_vars: count(trace.num_vars(), "term variables")?,
            last_cycle: trace.last_cycle(),
            props,
            terms,
        })
    }

    fn restore(self) -> Result<TraceStore> {
        if self.props.len() != self.num_props as usize {
            return Err(serialization_error(format!(
                "header declares {} proposition(s), found {}",
                self.num_props,
                self.props.len()
            )));
        }
        if self.terms.len() != self.num_vars as usize {
            return Err(serialization_error(format!(
                "header declares {} term variable(s), found {}",
                self.num_vars,
                self.terms.len()
            )));
        }

        let props = self
            .props
            .into_iter()
            .enumerate()
            .map(|(i, points)| {
                History::from_points(points).map_err(|d| defect("proposition", i, &d))
            })
            .collect::<Result<Vec<_>>>()?;
        let terms = self
            .terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| term.restore(i))
            .collect::<Result<Vec<_>>>()?;

        TraceStore::from_parts(props, terms, self.last_cycle)
            .map_err(|d| serialization_error(d.to_string()))
    }
}

impl TermImage {
    fn capture(history: &TermHistory) -> Self {
        match history {
            TermHistory::Unwritten(kind) => Self(
                kind.map_or(UNDECLARED_TAG, ValueKind::tag),
                TermPoints::Scalar(Vec::new()),
            ),
            TermHistory::Scalar(h) => Self(
                ValueKind::Scalar.tag(),
                TermPoints::Scalar(h.change_points().copied().collect()),
            ),
            TermHistory::Vector(h) => Self(
                ValueKind::Vector.tag(),
                TermPoints::Vector(
                    h.change_points()
                        .map(|(c, v)| (*c, v.to_vec()))
                        .collect(),
                ),
            ),
        }
    }

    fn restore(self, index: usize) -> Result<TermHistory> {
        let Self(tag, points) = self;
        let kind = if tag == UNDECLARED_TAG {
            None
        } else {
            Some(ValueKind::from_tag(tag).ok_or_else(|| {
                serialization_error(format!("term variable {index} has unknown kind tag {tag}"))
            })?)
        };

        if points.is_empty() {
            return Ok(TermHistory::Unwritten(kind));
        }
        match (kind, points) {
            (Some(ValueKind::Scalar), TermPoints::Scalar(points)) => History::from_points(points)
                .map(TermHistory::Scalar)
                .map_err(|d| defect("term variable", index, &d)),
            (Some(ValueKind::Vector), TermPoints::Vector(points)) => History::from_points(
                points
                    .into_iter()
                    .map(|(c, v)| (c, Arc::<[u32]>::from(v)))
                    .collect(),
            )
            .map(TermHistory::Vector)
            .map_err(|d| defect("term variable", index, &d)),
            (kind, _) => Err(serialization_error(format!(
                "term variable {index} points do not match kind {}",
                kind.map_or_else(|| "undeclared".to_string(), |k| k.to_string())
            ))),
        }
    }
}

fn defect(what: &str, index: usize, defect: &PointsDefect) -> Error {
    serialization_error(format!("{what} {index}: {defect}"))
}

/// Encodes a trace as `MessagePack` bytes.
///
/// # Errors
///
/// Returns a serialization error if the trace has more than `u32::MAX`
/// signals or the encoder fails.
pub fn encode(trace: &TraceStore) -> Result<Vec<u8>> {
    let bytes = rmp_serde::to_vec(&TraceImage::capture(trace)?)
        .map_err(|e| serialization_error(e.to_string()))?;
    debug!(
        "encoded trace of {} cycle(s), {} change point(s) into {} byte(s)",
        trace.length(),
        trace.change_point_count(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decodes a trace written by [`encode`].
///
/// # Errors
///
/// Returns a serialization error if the bytes are malformed, the counts
/// disagree with the data, or a history breaks the change-point
/// invariants.
pub fn decode(bytes: &[u8]) -> Result<TraceStore> {
    let image: TraceImage =
        rmp_serde::from_slice(bytes).map_err(|e| serialization_error(e.to_string()))?;
    let trace = image.restore()?;
    debug!(
        "decoded trace of {} cycle(s) from {} byte(s)",
        trace.length(),
        bytes.len()
    );
    Ok(trace)
}

fn io_error(action: &str, path: &Path, e: &std::io::Error) -> Error {
    Error::new(ErrorKind::Io(format!("failed to {action} '{}': {e}", path.display())))
        .with_context(ErrorContext::new().with_source(path.display().to_string()))
}

/// Saves a trace to a file, replacing any existing content.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written, or a
/// serialization error if encoding fails.
pub fn save_to_file<P: AsRef<Path>>(trace: &TraceStore, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode(trace)?;

    let file = File::create(path).map_err(|e| io_error("create file", path, &e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .map_err(|e| io_error("write to file", path, &e))?;
    writer
        .flush()
        .map_err(|e| io_error("flush file", path, &e))?;

    Ok(())
}

/// Loads a trace saved by [`save_to_file`].
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or a serialization
/// error if its content is not a valid trace.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<TraceStore> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error("open file", path, &e))?;

    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| io_error("read file", path, &e))?;

    decode(&bytes)
        .map_err(|e| e.with_context(ErrorContext::new().with_source(path.display().to_string())))
}

use std::path::{Path, PathBuf};
use std::str::FromStr;

use glam::Vec3;
use glob::glob;
use indicatif::ParallelProgressIterator;
use nalgebra as na;
use rayon::prelude::*;

use crate::error::{Error, Result};

pub const INSTATE_PATTERN: &str = "instate_features_*.txt";
pub const ALL_PATTERN: &str = "all_features_*.txt";

const TIMESTAMP_SEGMENT: usize = 2;
const MIN_COLUMNS: usize = 3;
const IN_MEMORY: &str = "<in-memory>";

/// One row per detected point: `[id, x, y, z, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    data: na::DMatrix<f64>,
}

impl FeatureTable {
    pub fn from_row_slice(nrows: usize, ncols: usize, values: &[f64]) -> FeatureTable {
        FeatureTable {
            data: na::DMatrix::from_row_slice(nrows, ncols, values),
        }
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    pub fn matrix(&self) -> &na::DMatrix<f64> {
        &self.data
    }

    pub fn ids(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.column(0).into_iter().copied()
    }

    /// Coordinate columns as points. Tables without a z column lie on z = 0.
    pub fn positions(&self) -> Vec<Vec3> {
        self.data
            .row_iter()
            .map(|row| {
                let z = if row.len() > 3 { row[3] } else { 0.0 };
                Vec3::new(row[1] as f32, row[2] as f32, z as f32)
            })
            .collect()
    }
}

/// `<prefix>_<prefix2>_<timestamp>.txt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFileName {
    pub prefix: String,
    pub timestamp: i64,
}

impl FeatureFileName {
    pub fn from_path(path: &Path) -> Result<FeatureFileName> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::FileName {
                name: path.display().to_string(),
                reason: "no utf-8 file stem".to_string(),
            })?;
        stem.parse()
    }
}

impl FromStr for FeatureFileName {
    type Err = Error;

    fn from_str(stem: &str) -> Result<Self> {
        let segments: Vec<&str> = stem.split('_').collect();
        let fail = |reason: String| Error::FileName {
            name: stem.to_string(),
            reason,
        };
        let raw = segments.get(TIMESTAMP_SEGMENT).ok_or_else(|| {
            fail(format!(
                "expected at least {} '_' separated segments",
                TIMESTAMP_SEGMENT + 1
            ))
        })?;
        let timestamp = raw
            .parse::<i64>()
            .map_err(|e| fail(format!("segment {:?} is not an integer: {}", raw, e)))?;
        Ok(FeatureFileName {
            prefix: segments[..TIMESTAMP_SEGMENT].join("_"),
            timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    pub timestamp: i64,
    /// `None` when the file held no data.
    pub table: Option<FeatureTable>,
}

/// Frames in ascending timestamp order, timestamps unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    frames: Vec<FeatureFrame>,
}

impl FeatureSet {
    /// Sorts `frames` by timestamp. Fails on repeated timestamps.
    pub fn new(mut frames: Vec<FeatureFrame>) -> Result<FeatureSet> {
        frames.sort_by_key(|f| f.timestamp);
        if let Some(w) = frames.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(Error::DuplicateTimestamp {
                timestamp: w[0].timestamp,
                first: PathBuf::from(IN_MEMORY),
                second: PathBuf::from(IN_MEMORY),
            });
        }
        Ok(FeatureSet { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[FeatureFrame] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureFrame> {
        self.frames.iter()
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.frames.iter().map(|f| f.timestamp).collect()
    }

    pub fn get(&self, timestamp: i64) -> Option<&FeatureFrame> {
        self.frames
            .binary_search_by_key(&timestamp, |f| f.timestamp)
            .ok()
            .map(|i| &self.frames[i])
    }

    /// Table at `timestamp`, `None` when the frame is missing or empty.
    pub fn table(&self, timestamp: i64) -> Option<&FeatureTable> {
        self.get(timestamp).and_then(|f| f.table.as_ref())
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = &'a FeatureFrame;
    type IntoIter = std::slice::Iter<'a, FeatureFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Parses delimited numeric rows. `:` counts as a comma.
///
/// Returns `None` if there is no data row.
pub fn parse_feature_text(path: &Path, text: &str) -> Result<Option<FeatureTable>> {
    let mut values = Vec::new();
    let mut ncols = None;
    let mut nrows = 0;

    for (line_idx, line) in text.lines().enumerate() {
        let parse_error = |message: String| Error::Parse {
            path: path.to_path_buf(),
            line: line_idx + 1,
            message,
        };
        let line = line.replace(':', ", ");
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = if line.contains(',') {
            line.split(',').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };
        match ncols {
            None if fields.len() < MIN_COLUMNS => {
                return Err(parse_error(format!(
                    "expected at least {} columns (id, x, y), got {}",
                    MIN_COLUMNS,
                    fields.len()
                )));
            }
            None => ncols = Some(fields.len()),
            Some(n) if n != fields.len() => {
                return Err(parse_error(format!(
                    "expected {} columns, got {}",
                    n,
                    fields.len()
                )));
            }
            Some(_) => {}
        }
        for field in fields {
            let v = field
                .parse::<f64>()
                .map_err(|_| parse_error(format!("could not convert {:?} to a number", field)))?;
            values.push(v);
        }
        nrows += 1;
    }

    Ok(ncols.map(|ncols| FeatureTable::from_row_slice(nrows, ncols, &values)))
}

/// Reads one feature file. Empty files have no table.
pub fn read_feature_file(path: &Path) -> Result<Option<FeatureTable>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    if text.is_empty() {
        log::debug!("{} is empty", path.display());
        return Ok(None);
    }
    parse_feature_text(path, &text)
}

/// Lists files in `dir` matching `pattern`, ordered by the timestamp in their
/// name.
pub fn feature_paths(dir: &Path, pattern: &str) -> Result<Vec<(FeatureFileName, PathBuf)>> {
    let dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = format!("{}/{}", dir, pattern);
    log::trace!("globbing {}", full_pattern);

    let mut named = Vec::new();
    for entry in glob(&full_pattern)? {
        let path = entry?;
        if !path.is_file() {
            continue;
        }
        named.push((FeatureFileName::from_path(&path)?, path));
    }
    named.sort_by_key(|(name, _)| name.timestamp);

    if let Some(w) = named
        .windows(2)
        .find(|w| w[0].0.timestamp == w[1].0.timestamp)
    {
        return Err(Error::DuplicateTimestamp {
            timestamp: w[0].0.timestamp,
            first: w[0].1.clone(),
            second: w[1].1.clone(),
        });
    }
    Ok(named)
}

/// Loads every feature file in `dir` matching `pattern`.
///
/// No match gives an empty set. Any unreadable or malformed file fails the
/// whole call.
pub fn gather_features(dir: &Path, pattern: &str) -> Result<FeatureSet> {
    let named = feature_paths(dir, pattern)?;
    log::info!("loading {} files matching {}", named.len(), pattern);

    let frames = named
        .par_iter()
        .progress_count(named.len() as u64)
        .map(|(name, path)| -> Result<FeatureFrame> {
            log::trace!("reading {}", path.display());
            Ok(FeatureFrame {
                timestamp: name.timestamp,
                table: read_feature_file(path)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // already sorted and unique
    Ok(FeatureSet { frames })
}

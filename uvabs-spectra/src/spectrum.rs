use crate::error::SpectrumError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};

/// Timestamp format assembled from header lines 6 and 7: "yy/mm/dd HH:MM:SS"
pub const TIMESTAMP_FORMAT: &str = "%y/%m/%d %H:%M:%S";

/// 1-indexed header line holding the analysis date ("yy/mm/dd").
pub const HEADER_DATE_LINE: usize = 6;

/// 1-indexed header line beginning with the analysis time ("HH:MM:SS").
pub const HEADER_TIME_LINE: usize = 7;

/// 1-indexed line at which the wavelength table starts.
pub const DATA_START_LINE: usize = 87;

/// Expected number of wavelength rows per spectrum.
pub const EXPECTED_POINTS: usize = 701;

/// First wavelength of the axis, in nm.
pub const WAVELENGTH_START: i32 = 200;

/// Last wavelength of the axis, in nm.
pub const WAVELENGTH_END: i32 = 900;

/// Whether a file holds a calibration reading or a sample measurement.
/// Assigned once when the batch folder is classified; downstream logic
/// branches on this tag and never re-inspects the filename.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum FileKind {
    Sample,
    Blank,
}

/// One (wavelength, absorbance) row of the spectrum table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPoint {
    pub wavelength: i32,
    pub absorbance: f64,
}

/// A parsed raw spectrophotometer export: header timestamp, filename-derived
/// identity, and the complete 200-900 nm wavelength table.
#[derive(Debug, Clone)]
pub struct RawSpectrum {
    pub source_path: PathBuf,
    pub timestamp: NaiveDateTime,
    /// Filename stem: the zero-padded 5-digit serial for samples,
    /// "BL"/"BLANK" for blanks.
    pub serial_no: String,
    pub kind: FileKind,
    pub points: Vec<SpectrumPoint>,
}

impl RawSpectrum {
    /// Parse the text of a raw export file.
    ///
    /// The header carries the analysis date on line 6 ("yy/mm/dd") and the
    /// time in the first 8 characters of line 7. The wavelength table starts
    /// at line 87, one whitespace-delimited `wavelength absorbance` pair per
    /// row, and must hold exactly 701 rows covering 200-900 nm in 1 nm steps.
    pub fn parse(text: &str, path: &Path, kind: FileKind) -> Result<Self, SpectrumError> {
        let lines: Vec<&str> = text.lines().collect();
        let timestamp = parse_timestamp(&lines, path)?;

        let mut points = Vec::with_capacity(EXPECTED_POINTS);
        for (idx, raw_line) in lines.iter().enumerate().skip(DATA_START_LINE - 1) {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(wavelength), Some(absorbance)) = (fields.next(), fields.next()) else {
                return Err(SpectrumError::MalformedRow {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    detail: format!("expected 'wavelength absorbance', found '{line}'"),
                });
            };
            // Wavelengths are printed with a decimal part ("200.0"); truncate.
            let wavelength = wavelength.parse::<f64>().map_err(|e| SpectrumError::MalformedRow {
                path: path.to_path_buf(),
                line: idx + 1,
                detail: format!("bad wavelength '{wavelength}': {e}"),
            })? as i32;
            let absorbance = absorbance.parse::<f64>().map_err(|e| SpectrumError::MalformedRow {
                path: path.to_path_buf(),
                line: idx + 1,
                detail: format!("bad absorbance '{absorbance}': {e}"),
            })?;
            points.push(SpectrumPoint {
                wavelength,
                absorbance,
            });
        }

        if points.len() != EXPECTED_POINTS {
            return Err(SpectrumError::IncompleteSpectrum {
                path: path.to_path_buf(),
                found: points.len(),
                expected: EXPECTED_POINTS,
            });
        }

        for (i, point) in points.iter().enumerate() {
            let expected = WAVELENGTH_START + i as i32;
            if point.wavelength != expected {
                return Err(SpectrumError::BadWavelengthAxis {
                    path: path.to_path_buf(),
                    detail: format!(
                        "expected {expected} nm at position {i}, found {} nm",
                        point.wavelength
                    ),
                });
            }
        }

        let serial_no = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(RawSpectrum {
            source_path: path.to_path_buf(),
            timestamp,
            serial_no,
            kind,
            points,
        })
    }
}

/// Read and parse one raw export file from disk.
pub fn read_spectrum(path: &Path, kind: FileKind) -> Result<RawSpectrum, SpectrumError> {
    let text = fs::read_to_string(path).map_err(|source| SpectrumError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    RawSpectrum::parse(&text, path, kind)
}

fn parse_timestamp(lines: &[&str], path: &Path) -> Result<NaiveDateTime, SpectrumError> {
    let date = lines
        .get(HEADER_DATE_LINE - 1)
        .ok_or_else(|| SpectrumError::MalformedHeader {
            path: path.to_path_buf(),
            detail: format!("file has no header line {HEADER_DATE_LINE}"),
        })?
        .trim();
    let time: String = lines
        .get(HEADER_TIME_LINE - 1)
        .ok_or_else(|| SpectrumError::MalformedHeader {
            path: path.to_path_buf(),
            detail: format!("file has no header line {HEADER_TIME_LINE}"),
        })?
        .chars()
        .take(8)
        .collect();
    let stamp = format!("{date} {time}");
    NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).map_err(|e| {
        SpectrumError::MalformedHeader {
            path: path.to_path_buf(),
            detail: format!("'{stamp}': {e}"),
        }
    })
}

impl PartialEq for RawSpectrum {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp && self.source_path == other.source_path
    }
}

impl Eq for RawSpectrum {}

impl Ord for RawSpectrum {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.source_path.cmp(&other.source_path))
    }
}

impl PartialOrd for RawSpectrum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

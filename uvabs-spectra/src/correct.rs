//! Blank subtraction and dilution/path-length correction.
//!
//! Corrected values are reported per 1 cm of optical path:
//! `corrected = dilution * (sample - blank) / cuvette_len_cm`.

use crate::error::CorrectionError;
use crate::identity::LabwareId;
use crate::spectrum::{RawSpectrum, SpectrumPoint, EXPECTED_POINTS};

/// A blank-subtracted, dilution- and path-length-adjusted spectrum.
/// Transient: consumed by the upload step, never persisted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedSpectrum {
    pub points: Vec<SpectrumPoint>,
}

/// Source of per-sample dilution factors.
///
/// Dilutions are not yet recorded upstream, so the only implementation is
/// [`FixedDilution`]; swapping in a real lookup does not change the
/// correction contract.
pub trait DilutionSource {
    fn dilution_for(&self, labware: &LabwareId) -> f64;
}

/// Placeholder dilution source returning the same factor for every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDilution(pub f64);

impl Default for FixedDilution {
    /// Undiluted samples: factor 1.
    fn default() -> Self {
        FixedDilution(1.0)
    }
}

impl DilutionSource for FixedDilution {
    fn dilution_for(&self, _labware: &LabwareId) -> f64 {
        self.0
    }
}

/// Correct a sample spectrum against its assigned blank.
///
/// Pure and deterministic. Both spectra must carry the complete 701-point
/// 200-900 nm axis; anything else means the caller paired mismatched
/// spectra and is reported as [`CorrectionError::SpectrumMismatch`].
pub fn correct(
    sample: &RawSpectrum,
    blank: &RawSpectrum,
    dilution: f64,
    cuvette_len_cm: f64,
) -> Result<CorrectedSpectrum, CorrectionError> {
    if sample.points.len() != EXPECTED_POINTS || blank.points.len() != EXPECTED_POINTS {
        return Err(CorrectionError::SpectrumMismatch {
            detail: format!(
                "sample has {} points, blank has {} (expected {EXPECTED_POINTS} each)",
                sample.points.len(),
                blank.points.len()
            ),
        });
    }

    let mut points = Vec::with_capacity(EXPECTED_POINTS);
    for (s, b) in sample.points.iter().zip(blank.points.iter()) {
        if s.wavelength != b.wavelength {
            return Err(CorrectionError::SpectrumMismatch {
                detail: format!(
                    "sample at {} nm paired with blank at {} nm",
                    s.wavelength, b.wavelength
                ),
            });
        }
        points.push(SpectrumPoint {
            wavelength: s.wavelength,
            absorbance: dilution * (s.absorbance - b.absorbance) / cuvette_len_cm,
        });
    }

    Ok(CorrectedSpectrum { points })
}

//! Blank assignment: match each sample measurement to the calibration
//! reading taken before it.
//!
//! An analysis run begins with a blank reading, followed by a set of
//! samples, then usually another blank and more samples. The protocol
//! guarantees a blank always precedes its samples, so each sample gets the
//! blank with the latest timestamp strictly before its own. A later blank
//! is never used, even when it is closer in time.

use crate::error::BlankAssignmentError;
use crate::spectrum::RawSpectrum;

/// Map each sample to the index (into `blanks`) of its assigned blank.
///
/// Both slices must already be classified; this function never inspects
/// filenames. Two blanks sharing an identical timestamp are ordered by file
/// name, and the later name wins, so assignment stays deterministic.
///
/// Fails for the batch as a whole when any sample has no preceding blank;
/// the error lists every unassignable sample so the batch can be fixed and
/// rerun in one go.
pub fn assign_blanks(
    samples: &[RawSpectrum],
    blanks: &[RawSpectrum],
) -> Result<Vec<usize>, BlankAssignmentError> {
    // (timestamp, path)-sorted view over the blanks; original indices kept.
    let mut order: Vec<usize> = (0..blanks.len()).collect();
    order.sort_by(|&a, &b| blanks[a].cmp(&blanks[b]));

    let mut assignments = Vec::with_capacity(samples.len());
    let mut unassigned = Vec::new();
    for sample in samples {
        let preceding = order
            .iter()
            .copied()
            .filter(|&i| blanks[i].timestamp < sample.timestamp)
            .last();
        match preceding {
            Some(i) => assignments.push(i),
            None => unassigned.push(sample.source_path.clone()),
        }
    }

    if unassigned.is_empty() {
        log::debug!(
            "Assigned {} samples across {} blanks",
            assignments.len(),
            blanks.len()
        );
        Ok(assignments)
    } else {
        Err(BlankAssignmentError { unassigned })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{FileKind, RawSpectrum, SpectrumPoint};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::{Path, PathBuf};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 6, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn spectrum(name: &str, kind: FileKind, timestamp: NaiveDateTime) -> RawSpectrum {
        RawSpectrum {
            source_path: PathBuf::from(name),
            timestamp,
            serial_no: Path::new(name)
                .file_stem()
                .unwrap()
                .to_str()
                .unwrap()
                .to_string(),
            kind,
            points: vec![SpectrumPoint {
                wavelength: 200,
                absorbance: 0.0,
            }],
        }
    }

    #[test]
    fn each_sample_gets_the_latest_preceding_blank() {
        // BLANK.SP 09:00, 00001.SP 09:10, BL.SP 09:30, 00002.SP 09:40
        let blanks = vec![
            spectrum("BLANK.SP", FileKind::Blank, at(9, 0)),
            spectrum("BL.SP", FileKind::Blank, at(9, 30)),
        ];
        let samples = vec![
            spectrum("00001.SP", FileKind::Sample, at(9, 10)),
            spectrum("00002.SP", FileKind::Sample, at(9, 40)),
        ];

        let assignments = assign_blanks(&samples, &blanks).unwrap();
        assert_eq!(blanks[assignments[0]].serial_no, "BLANK");
        assert_eq!(blanks[assignments[1]].serial_no, "BL");
    }

    #[test]
    fn a_later_blank_is_never_used_even_when_closer() {
        let blanks = vec![
            spectrum("BLANK.SP", FileKind::Blank, at(8, 0)),
            spectrum("BL.SP", FileKind::Blank, at(9, 11)),
        ];
        // 09:10 is one minute before BL.SP but an hour after BLANK.SP
        let samples = vec![spectrum("00001.SP", FileKind::Sample, at(9, 10))];

        let assignments = assign_blanks(&samples, &blanks).unwrap();
        assert_eq!(blanks[assignments[0]].serial_no, "BLANK");
    }

    #[test]
    fn sample_before_every_blank_fails_the_whole_batch() {
        let blanks = vec![spectrum("BLANK.SP", FileKind::Blank, at(9, 0))];
        let samples = vec![
            spectrum("00001.SP", FileKind::Sample, at(8, 30)),
            spectrum("00002.SP", FileKind::Sample, at(9, 40)),
        ];

        let err = assign_blanks(&samples, &blanks).unwrap_err();
        assert_eq!(err.unassigned, vec![PathBuf::from("00001.SP")]);
        assert!(err.to_string().starts_with("Cannot assign blanks for all files"));
    }

    #[test]
    fn sample_exactly_at_blank_time_has_no_preceding_blank() {
        // Strictly-less comparison: a blank stamped at the same instant
        // does not precede the sample.
        let blanks = vec![spectrum("BLANK.SP", FileKind::Blank, at(9, 0))];
        let samples = vec![spectrum("00001.SP", FileKind::Sample, at(9, 0))];

        assert!(assign_blanks(&samples, &blanks).is_err());
    }

    #[test]
    fn identical_blank_timestamps_resolve_by_file_name() {
        // Two blanks at the same instant: the later file name wins.
        let blanks = vec![
            spectrum("BL2.SP", FileKind::Blank, at(9, 0)),
            spectrum("BL1.SP", FileKind::Blank, at(9, 0)),
        ];
        let samples = vec![spectrum("00001.SP", FileKind::Sample, at(9, 10))];

        let assignments = assign_blanks(&samples, &blanks).unwrap();
        assert_eq!(blanks[assignments[0]].serial_no, "BL2");
    }

    #[test]
    fn empty_sample_set_assigns_nothing() {
        let blanks = vec![spectrum("BLANK.SP", FileKind::Blank, at(9, 0))];
        let assignments = assign_blanks(&[], &blanks).unwrap();
        assert!(assignments.is_empty());
    }
}

//! SPK type 2 segments: position-only Chebyshev records of fixed length.
//!
//! A segment stores `n_records` records of `rsize` words, followed by a four-word
//! directory `(init, intlen, rsize, n_records)`. Each record holds
//!
//! 1. `mid`, the center of the record interval (TDB seconds past J2000),
//! 2. `radius`, the half-length of the interval (seconds),
//! 3. `ncoeff` Chebyshev coefficients for X, then Y, then Z (km),
//!
//! with `rsize = 2 + 3·ncoeff`. Positions are evaluated at `t = (et − mid) / radius`;
//! velocities use the derivative series scaled by `1 / radius`.

use std::io::{Read, Seek, SeekFrom};

use nalgebra::Vector3;

use super::daf::{read_failure, Summary};
use crate::skyward_errors::SkywardError;

/// SPK data type of position-only Chebyshev segments.
pub const CHEBYSHEV_POSITION: i32 = 2;

/// Trailing directory of a type 2 segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDirectory {
    /// Start of the first record, TDB seconds past J2000
    pub init: f64,
    /// Length of a record interval, in seconds
    pub intlen: f64,
    /// Words per record
    pub rsize: usize,
    pub n_records: usize,
}

/// One record: interval and Chebyshev coefficients of the three axes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChebyshevRecord {
    pub mid: f64,
    pub radius: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl ChebyshevRecord {
    fn from_words(words: &[f64]) -> Self {
        let ncoeff = (words.len() - 2) / 3;
        let coefficients = &words[2..];
        ChebyshevRecord {
            mid: words[0],
            radius: words[1],
            x: coefficients[..ncoeff].to_vec(),
            y: coefficients[ncoeff..2 * ncoeff].to_vec(),
            z: coefficients[2 * ncoeff..3 * ncoeff].to_vec(),
        }
    }

    /// Position (km) and velocity (km/s) at `et`, TDB seconds past J2000.
    ///
    /// The normalized time is clamped to `[-1, 1]`.
    pub fn interpolate(&self, et: f64) -> (Vector3<f64>, Vector3<f64>) {
        let t = ((et - self.mid) / self.radius).clamp(-1.0, 1.0);
        let n = self.x.len();

        // T_0 = 1, T_1 = t, T_k = 2t·T_{k-1} − T_{k-2}
        let mut polynomials = vec![0.0; n];
        // T'_0 = 0, T'_1 = 1, T'_k = 2·T_{k-1} + 2t·T'_{k-1} − T'_{k-2}
        let mut derivatives = vec![0.0; n];
        if n > 0 {
            polynomials[0] = 1.0;
        }
        if n > 1 {
            polynomials[1] = t;
            derivatives[1] = 1.0;
        }
        for k in 2..n {
            polynomials[k] = 2.0 * t * polynomials[k - 1] - polynomials[k - 2];
            derivatives[k] =
                2.0 * polynomials[k - 1] + 2.0 * t * derivatives[k - 1] - derivatives[k - 2];
        }

        let series = |coefficients: &[f64], basis: &[f64]| -> f64 {
            coefficients.iter().zip(basis).map(|(c, b)| c * b).sum()
        };

        let position = Vector3::new(
            series(&self.x, &polynomials),
            series(&self.y, &polynomials),
            series(&self.z, &polynomials),
        );
        let velocity = Vector3::new(
            series(&self.x, &derivatives),
            series(&self.y, &derivatives),
            series(&self.z, &derivatives),
        ) / self.radius;

        (position, velocity)
    }
}

/// A type 2 segment loaded in memory.
#[derive(Debug, Clone)]
pub struct ChebyshevSegment {
    pub summary: Summary,
    pub directory: SegmentDirectory,
    pub records: Vec<ChebyshevRecord>,
}

impl ChebyshevSegment {
    /// Read the array described by `summary`.
    ///
    /// Return
    /// ------
    /// * the segment with all its records decoded
    /// * [`SkywardError::EphemerisError`] if the array is not of type 2, is truncated, or
    ///   its directory disagrees with its length
    pub fn read<R: Read + Seek>(reader: &mut R, summary: Summary) -> Result<Self, SkywardError> {
        if summary.data_type != CHEBYSHEV_POSITION {
            return Err(SkywardError::EphemerisError(format!(
                "segment {} wrt {} has SPK type {}, only type {CHEBYSHEV_POSITION} is read",
                summary.target, summary.center, summary.data_type
            )));
        }
        if summary.initial_addr < 1 || summary.final_addr < summary.initial_addr + 4 {
            return Err(SkywardError::EphemerisError(format!(
                "segment {} wrt {} has invalid addresses {}..{}",
                summary.target, summary.center, summary.initial_addr, summary.final_addr
            )));
        }

        let n_words = (summary.final_addr - summary.initial_addr + 1) as usize;
        let mut bytes = vec![0u8; n_words * 8];
        reader
            .seek(SeekFrom::Start((summary.initial_addr as u64 - 1) * 8))
            .and_then(|_| reader.read_exact(&mut bytes))
            .map_err(|e| read_failure(&format!("segment of body {}", summary.target), e))?;

        let words: Vec<f64> = bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut word = [0u8; 8];
                word.copy_from_slice(chunk);
                f64::from_le_bytes(word)
            })
            .collect();

        let tail = &words[n_words - 4..];
        let directory = SegmentDirectory {
            init: tail[0],
            intlen: tail[1],
            rsize: tail[2] as usize,
            n_records: tail[3] as usize,
        };

        let consistent = directory.intlen > 0.0
            && directory.rsize >= 5
            && (directory.rsize - 2) % 3 == 0
            && directory.n_records > 0
            && directory.n_records * directory.rsize + 4 == n_words;
        if !consistent {
            return Err(SkywardError::EphemerisError(format!(
                "segment {} wrt {}: directory {directory:?} does not match its {n_words} words",
                summary.target, summary.center
            )));
        }

        let records = words[..n_words - 4]
            .chunks_exact(directory.rsize)
            .map(ChebyshevRecord::from_words)
            .collect();

        Ok(ChebyshevSegment {
            summary,
            directory,
            records,
        })
    }

    pub fn covers(&self, et: f64) -> bool {
        self.summary.covers(et)
    }

    /// Position (km) and velocity (km/s) of the target relative to the center.
    ///
    /// Return
    /// ------
    /// * the state at `et`, TDB seconds past J2000
    /// * [`SkywardError::InvalidValue`] if `et` is outside the segment coverage
    pub fn state(&self, et: f64) -> Result<(Vector3<f64>, Vector3<f64>), SkywardError> {
        if !self.covers(et) {
            return Err(SkywardError::InvalidValue(format!(
                "epoch {et} s past J2000 TDB is outside the coverage of body {} ({} - {})",
                self.summary.target, self.summary.start_epoch, self.summary.end_epoch
            )));
        }

        let index = ((et - self.directory.init) / self.directory.intlen).floor();
        let index = (index.max(0.0) as usize).min(self.records.len() - 1);
        Ok(self.records[index].interpolate(et))
    }
}

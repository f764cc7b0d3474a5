//! # JPL planetary kernels
//!
//! A [`PlanetaryTheory`] backed by a binary SPK kernel of the DE4xx family, as
//! distributed by NAIF (`de440s.bsp`, `de440.bsp`, `de442.bsp`, ...).
//!
//! The kernel is a DAF container ([`daf`]) holding position-only Chebyshev segments
//! ([`chebyshev_segment`]). Each segment gives a body relative to a center, so the
//! barycentric state of a body is the sum of the segments along its center chain:
//!
//! ```text
//! 399 (Earth) → 3 (Earth–Moon barycenter) → 0 (solar system barycenter)
//! 4 (Mars barycenter) → 0
//! 10 (Sun) → 0
//! ```
//!
//! States are read in km and km/s, ICRF axes, and returned in AU and AU/day.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use skyward::eop::EopConfig;
//! use skyward::jpl_ephem::EphemFileSource;
//! use skyward::skyward::Skyward;
//!
//! let sky = Skyward::new(EopConfig::default())
//!     .with_jpl_ephemeris(&EphemFileSource::Naif("de440s".into()))
//!     .unwrap();
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};

use camino::{Utf8Path, Utf8PathBuf};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{AU, J2000_JD, SECONDS_PER_DAY};
use crate::download_file::{cache_root, open_or_fetch};
use crate::planets::catalog::PlanetId;
use crate::planets::planetary_theory::{EarthStates, PlanetaryTheory};
use crate::planets::StateVector;
use crate::skyward_errors::SkywardError;
use crate::time::time_scales::JulianPair;

pub mod chebyshev_segment;
pub mod daf;

use chebyshev_segment::{ChebyshevSegment, CHEBYSHEV_POSITION};
use daf::{read_summaries, DafHeader};

/// NAIF id of the solar system barycenter.
pub const SOLAR_SYSTEM_BARYCENTER: i32 = 0;
/// NAIF id of the Sun.
pub const SUN: i32 = 10;
/// Kernel fetched when none is specified.
pub const DEFAULT_KERNEL: &str = "de440s";

/// Longest center chain followed before giving up.
const MAX_CHAIN_DEPTH: usize = 8;

/// Where to find a kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EphemFileSource {
    /// A kernel already on disk, never downloaded
    Local(Utf8PathBuf),
    /// A NAIF kernel version such as `"de440s"`, cached under
    /// `<cache>/skyward_cache/jpl_ephem/` and downloaded on first use
    Naif(String),
}

impl Default for EphemFileSource {
    fn default() -> Self {
        EphemFileSource::Naif(DEFAULT_KERNEL.into())
    }
}

impl EphemFileSource {
    /// Path of the kernel on disk.
    pub fn local_path(&self) -> Result<Utf8PathBuf, SkywardError> {
        match self {
            EphemFileSource::Local(path) => Ok(path.clone()),
            EphemFileSource::Naif(version) => {
                Ok(cache_root()?.join("jpl_ephem").join(format!("{version}.bsp")))
            }
        }
    }

    /// Download location, for NAIF kernels.
    pub fn url(&self) -> Option<String> {
        match self {
            EphemFileSource::Local(_) => None,
            EphemFileSource::Naif(version) => Some(format!(
                "https://naif.jpl.nasa.gov/pub/naif/generic_kernels/spk/planets/{version}.bsp"
            )),
        }
    }
}

/// NAIF id of a catalog planet.
///
/// Planets other than the Earth map to their system barycenter, as in the DE kernels.
pub fn naif_id(planet: PlanetId) -> i32 {
    match planet {
        PlanetId::Mercury => 1,
        PlanetId::Venus => 2,
        PlanetId::EarthMoonBarycenter => 3,
        PlanetId::Mars => 4,
        PlanetId::Jupiter => 5,
        PlanetId::Saturn => 6,
        PlanetId::Uranus => 7,
        PlanetId::Neptune => 8,
        PlanetId::Pluto => 9,
        PlanetId::Earth => 399,
    }
}

/// TDB seconds past J2000.
fn ephemeris_time(tdb: JulianPair) -> f64 {
    ((tdb.day - J2000_JD) + tdb.fraction) * SECONDS_PER_DAY
}

/// km, km/s to AU, AU/day.
fn to_au(position: Vector3<f64>, velocity: Vector3<f64>) -> StateVector {
    StateVector::new(position / AU, velocity * (SECONDS_PER_DAY / AU))
}

/// The segments of an SPK kernel, indexed by target.
#[derive(Debug, Clone)]
pub struct JplEphemeris {
    header: DafHeader,
    segments: HashMap<i32, Vec<ChebyshevSegment>>,
}

impl JplEphemeris {
    /// Decode every position-only Chebyshev segment of a kernel.
    ///
    /// Segments of other SPK types are skipped with a warning.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self, SkywardError> {
        let header = DafHeader::read(reader)?;
        let mut segments: HashMap<i32, Vec<ChebyshevSegment>> = HashMap::new();

        for summary in read_summaries(reader, &header)? {
            if summary.data_type != CHEBYSHEV_POSITION {
                log::warn!(
                    "{}: skipping segment {} wrt {} of SPK type {}",
                    header.internal_filename,
                    summary.target,
                    summary.center,
                    summary.data_type
                );
                continue;
            }
            let segment = ChebyshevSegment::read(reader, summary)?;
            segments.entry(summary.target).or_default().push(segment);
        }

        if segments.is_empty() {
            return Err(SkywardError::EphemerisError(format!(
                "{}: no readable segment",
                header.internal_filename
            )));
        }

        log::debug!(
            "{}: {} bodies read",
            header.internal_filename,
            segments.len()
        );
        Ok(JplEphemeris { header, segments })
    }

    pub fn from_file(path: &Utf8Path) -> Result<Self, SkywardError> {
        let file = File::open(path)
            .map_err(|e| SkywardError::EphemerisError(format!("unable to open {path}: {e}")))?;
        Self::from_reader(&mut BufReader::new(file))
    }

    /// Open a kernel, downloading NAIF kernels missing from the cache.
    ///
    /// Return
    /// ------
    /// * the decoded kernel
    /// * [`SkywardError::EphemerisError`] if the kernel can be neither found nor fetched,
    ///   or is not a readable SPK file
    pub fn load(source: &EphemFileSource) -> Result<Self, SkywardError> {
        let path = source.local_path()?;
        match source.url() {
            None => Self::from_file(&path),
            Some(url) => {
                let mut reader = open_or_fetch(&path, &url, SkywardError::EphemerisError)?;
                Self::from_reader(&mut reader)
            }
        }
    }

    pub fn header(&self) -> &DafHeader {
        &self.header
    }

    /// NAIF ids of the bodies with at least one segment.
    pub fn targets(&self) -> Vec<i32> {
        let mut targets: Vec<i32> = self.segments.keys().copied().collect();
        targets.sort_unstable();
        targets
    }

    fn segment(&self, target: i32, et: f64) -> Result<&ChebyshevSegment, SkywardError> {
        let candidates = self.segments.get(&target).ok_or_else(|| {
            SkywardError::EphemerisError(format!(
                "{}: no segment for body {target}",
                self.header.internal_filename
            ))
        })?;
        // Later segments take precedence, as in the SPK conventions
        candidates
            .iter()
            .rev()
            .find(|segment| segment.covers(et))
            .ok_or_else(|| {
                SkywardError::InvalidValue(format!(
                    "epoch {et} s past J2000 TDB is outside the coverage of body {target}"
                ))
            })
    }

    /// Whether the center chain of `target` ends at the solar system barycenter.
    fn reaches_barycenter(&self, target: i32) -> bool {
        let mut body = target;
        for _ in 0..MAX_CHAIN_DEPTH {
            if body == SOLAR_SYSTEM_BARYCENTER {
                return true;
            }
            match self.segments.get(&body).and_then(|s| s.first()) {
                Some(segment) => body = segment.summary.center,
                None => return false,
            }
        }
        false
    }

    /// State of a NAIF body relative to the solar system barycenter, in km and km/s.
    ///
    /// Arguments
    /// ---------
    /// * `target`: NAIF id of the body
    /// * `et`: TDB seconds past J2000
    pub fn barycentric_km(
        &self,
        target: i32,
        et: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), SkywardError> {
        let mut position = Vector3::zeros();
        let mut velocity = Vector3::zeros();
        let mut body = target;

        for _ in 0..MAX_CHAIN_DEPTH {
            if body == SOLAR_SYSTEM_BARYCENTER {
                return Ok((position, velocity));
            }
            let segment = self.segment(body, et)?;
            let (p, v) = segment.state(et)?;
            position += p;
            velocity += v;
            body = segment.summary.center;
        }

        Err(SkywardError::EphemerisError(format!(
            "center chain of body {target} does not reach the solar system barycenter"
        )))
    }

    fn barycentric_au(&self, target: i32, tdb: JulianPair) -> Result<StateVector, SkywardError> {
        let (position, velocity) = self.barycentric_km(target, ephemeris_time(tdb))?;
        Ok(to_au(position, velocity))
    }
}

impl PlanetaryTheory for JplEphemeris {
    fn supports(&self, planet: PlanetId) -> bool {
        self.reaches_barycenter(naif_id(planet)) && self.reaches_barycenter(SUN)
    }

    fn heliocentric(&self, planet: PlanetId, tdb: JulianPair) -> Result<StateVector, SkywardError> {
        let body = self.barycentric_au(naif_id(planet), tdb)?;
        let sun = self.barycentric_au(SUN, tdb)?;
        Ok(body.relative_to(&sun))
    }

    fn earth(&self, tdb: JulianPair) -> Result<EarthStates, SkywardError> {
        let barycentric = self.barycentric_au(naif_id(PlanetId::Earth), tdb)?;
        let sun = self.barycentric_au(SUN, tdb)?;
        Ok(EarthStates {
            heliocentric: barycentric.relative_to(&sun),
            barycentric,
        })
    }

    fn barycentric(&self, planet: PlanetId, tdb: JulianPair) -> Result<StateVector, SkywardError> {
        self.barycentric_au(naif_id(planet), tdb)
    }
}

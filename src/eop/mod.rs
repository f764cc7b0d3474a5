//! # Earth orientation parameter cache
//!
//! This module provides [`EopCache`], the shared store of Earth orientation parameters
//! (UT1 − UTC, polar motion, celestial pole offsets) and of the TT − UT1 time offset.
//!
//! ## Data sources
//!
//! | Table                | Default source                                        | Content                         |
//! |----------------------|-------------------------------------------------------|---------------------------------|
//! | `finals2000A.all`    | IERS rapid service, standard EOP series               | dUT1, xp, yp, dpsi, deps        |
//! | `deltat.data`        | USNO, historical ΔT                                   | TT − UT1, monthly               |
//! | `deltat.preds`       | USNO, predicted ΔT                                    | TT − UT1, appended after history|
//!
//! Each table is looked for in the cache directory of the [`EopConfig`]; a missing file is
//! downloaded once (feature `download`) and kept for the next runs.
//!
//! ## Loading and lookup
//!
//! - Tables are loaded lazily, at most once, on the first query that needs them
//!   ([`OnceCell::get_or_init`]). A failed load is kept as well: later queries report
//!   the same [`SkywardError::CorrectionsLoadError`] without touching the file system
//!   or the network, until [`EopCache::reset`] re-arms the load.
//! - A query returns the values of the greatest tabulated day not after the requested
//!   MJD (floor mode) or the linear interpolation toward the next day
//!   ([`EopCache::set_interpolate`]). Dates outside the table raise
//!   [`SkywardError::InvalidValue`] naming the supported range.
//! - The last looked-up date and its values are memoized per table; changing the
//!   interpolation mode clears the memo.
//!
//! ## Concurrency
//!
//! [`EopCache`] is `Send + Sync` and is meant to be shared behind an [`Arc`](std::sync::Arc).
//! The tables are immutable once loaded; the memo and the interpolation flag sit behind
//! a single [`Mutex`].
//!
//! ## Example
//!
//! ```rust
//! use skyward::eop::{EopCache, eop_record::{EopValues, TableEntry}};
//!
//! let eop = vec![
//!     TableEntry::new(60000, EopValues { dut1: -0.01, ..Default::default() }),
//!     TableEntry::new(60001, EopValues { dut1: -0.02, ..Default::default() }),
//! ];
//! let delta_t = vec![TableEntry::new(59990, 69.2), TableEntry::new(60020, 69.2)];
//! let cache = EopCache::from_tables(eop, delta_t).unwrap();
//!
//! assert_eq!(cache.dut1(60000.5).unwrap(), -0.01);
//! cache.set_interpolate(true);
//! assert!((cache.dut1(60000.5).unwrap() + 0.015).abs() < 1e-12);
//! ```

pub mod eop_parser;
pub mod eop_record;

use std::sync::{Mutex, MutexGuard, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::constants::{Radian, Seconds, MJD};
use crate::download_file::{cache_root, open_or_fetch};
use crate::skyward_errors::SkywardError;
use eop_parser::{append_delta_t_predictions, parse_delta_t_history, parse_finals};
use eop_record::{check_table, lookup, DeltaTRecord, EopRecord, EopValues};

pub const DEFAULT_FINALS_URL: &str =
    "https://datacenter.iers.org/products/eop/rapid/standard/finals2000A.all";
pub const DEFAULT_DELTA_T_HISTORY_URL: &str = "https://maia.usno.navy.mil/ser7/deltat.data";
pub const DEFAULT_DELTA_T_PREDICTIONS_URL: &str = "https://maia.usno.navy.mil/ser7/deltat.preds";

/// Location and sources of the correction tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EopConfig {
    /// Directory holding the local copies of the tables
    pub cache_dir: Utf8PathBuf,
    pub finals_file: String,
    pub finals_url: String,
    pub delta_t_history_file: String,
    pub delta_t_history_url: String,
    pub delta_t_predictions_file: String,
    pub delta_t_predictions_url: String,
    /// Initial interpolation mode of the cache
    pub interpolate: bool,
}

impl Default for EopConfig {
    fn default() -> Self {
        EopConfig {
            cache_dir: Self::default_cache_dir()
                .unwrap_or_else(|_| Utf8PathBuf::from("skyward_cache").join("eop")),
            finals_file: "finals2000A.all".into(),
            finals_url: DEFAULT_FINALS_URL.into(),
            delta_t_history_file: "deltat.data".into(),
            delta_t_history_url: DEFAULT_DELTA_T_HISTORY_URL.into(),
            delta_t_predictions_file: "deltat.preds".into(),
            delta_t_predictions_url: DEFAULT_DELTA_T_PREDICTIONS_URL.into(),
            interpolate: false,
        }
    }
}

impl EopConfig {
    /// `<user cache dir>/skyward_cache/eop`
    pub fn default_cache_dir() -> Result<Utf8PathBuf, SkywardError> {
        Ok(cache_root()?.join("eop"))
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<Utf8PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_interpolate(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    pub fn finals_path(&self) -> Utf8PathBuf {
        self.cache_dir.join(&self.finals_file)
    }

    pub fn delta_t_history_path(&self) -> Utf8PathBuf {
        self.cache_dir.join(&self.delta_t_history_file)
    }

    pub fn delta_t_predictions_path(&self) -> Utf8PathBuf {
        self.cache_dir.join(&self.delta_t_predictions_file)
    }
}

/// Any failure while reading a table becomes a load error naming the file.
fn unreadable(path: &Utf8Path) -> impl Fn(SkywardError) -> SkywardError + '_ {
    move |err| match err {
        loaded @ SkywardError::CorrectionsLoadError(_) => loaded,
        other => SkywardError::CorrectionsLoadError(format!("unable to read {path}: {other}")),
    }
}

fn load_finals(config: &EopConfig) -> Result<Vec<EopRecord>, SkywardError> {
    let path = config.finals_path();
    let reader = open_or_fetch(&path, &config.finals_url, SkywardError::CorrectionsLoadError)?;
    let records = parse_finals(reader).map_err(unreadable(&path))?;
    check_table(&records, path.as_str())?;
    log::debug!("Loaded {} EOP records from {path}", records.len());
    Ok(records)
}

fn load_delta_t(config: &EopConfig) -> Result<Vec<DeltaTRecord>, SkywardError> {
    let history_path = config.delta_t_history_path();
    let reader = open_or_fetch(
        &history_path,
        &config.delta_t_history_url,
        SkywardError::CorrectionsLoadError,
    )?;
    let mut records = parse_delta_t_history(reader).map_err(unreadable(&history_path))?;
    check_table(&records, history_path.as_str())?;

    let predictions_path = config.delta_t_predictions_path();
    let reader = open_or_fetch(
        &predictions_path,
        &config.delta_t_predictions_url,
        SkywardError::CorrectionsLoadError,
    )?;
    let appended = append_delta_t_predictions(reader, &mut records)
        .map_err(unreadable(&predictions_path))?;
    check_table(&records, predictions_path.as_str())?;

    log::debug!(
        "Loaded {} TT-UT1 records from {history_path} ({appended} predicted)",
        records.len()
    );
    Ok(records)
}

/// Outcome of a table load, the error message when it failed.
type Loaded<T> = Result<Vec<T>, String>;

fn settle<T>(loaded: Result<Vec<T>, SkywardError>) -> Loaded<T> {
    loaded.map_err(|err| {
        log::error!("{err}");
        match err {
            SkywardError::CorrectionsLoadError(msg) => msg,
            other => other.to_string(),
        }
    })
}

fn loaded_slice<T>(loaded: &Loaded<T>) -> Result<&[T], SkywardError> {
    loaded
        .as_ref()
        .map(Vec::as_slice)
        .map_err(|msg| SkywardError::CorrectionsLoadError(msg.clone()))
}

#[derive(Debug, Default)]
struct LookupState {
    interpolate: bool,
    eop_memo: Option<(MJD, EopValues)>,
    delta_t_memo: Option<(MJD, Seconds)>,
}

impl LookupState {
    fn invalidate(&mut self) {
        self.eop_memo = None;
        self.delta_t_memo = None;
    }
}

/// Lazily loaded Earth orientation parameters and TT − UT1 values.
#[derive(Debug)]
pub struct EopCache {
    config: EopConfig,
    eop_table: OnceCell<Loaded<EopRecord>>,
    delta_t_table: OnceCell<Loaded<DeltaTRecord>>,
    state: Mutex<LookupState>,
}

impl Default for EopCache {
    fn default() -> Self {
        Self::new(EopConfig::default())
    }
}

impl EopCache {
    /// Create an empty cache; nothing is read until the first query.
    pub fn new(config: EopConfig) -> Self {
        let state = LookupState {
            interpolate: config.interpolate,
            ..Default::default()
        };
        EopCache {
            config,
            eop_table: OnceCell::new(),
            delta_t_table: OnceCell::new(),
            state: Mutex::new(state),
        }
    }

    /// Create a cache over already populated tables.
    ///
    /// Arguments
    /// ---------
    /// * `eop`: Earth orientation records, strictly increasing MJD
    /// * `delta_t`: TT − UT1 records, strictly increasing MJD
    ///
    /// Return
    /// ------
    /// * the cache, which never touches the file system
    /// * [`SkywardError::CorrectionsLoadError`] if a table is empty or unsorted
    pub fn from_tables(
        eop: Vec<EopRecord>,
        delta_t: Vec<DeltaTRecord>,
    ) -> Result<Self, SkywardError> {
        check_table(&eop, "EOP table")?;
        check_table(&delta_t, "TT-UT1 table")?;

        let cache = Self::new(EopConfig::default());
        cache.eop_table.get_or_init(|| Ok(eop));
        cache.delta_t_table.get_or_init(|| Ok(delta_t));
        Ok(cache)
    }

    pub fn config(&self) -> &EopConfig {
        &self.config
    }

    fn lock_state(&self) -> MutexGuard<'_, LookupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn eop_table(&self) -> Result<&[EopRecord], SkywardError> {
        let loaded = self.eop_table.get_or_init(|| settle(load_finals(&self.config)));
        loaded_slice(loaded)
    }

    fn delta_t_table(&self) -> Result<&[DeltaTRecord], SkywardError> {
        let loaded = self
            .delta_t_table
            .get_or_init(|| settle(load_delta_t(&self.config)));
        loaded_slice(loaded)
    }

    /// Load both tables if they are not loaded yet.
    pub fn ensure_loaded(&self) -> Result<(), SkywardError> {
        self.eop_table()?;
        self.delta_t_table()?;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.eop_table.get(), Some(Ok(_)))
            && matches!(self.delta_t_table.get(), Some(Ok(_)))
    }

    /// Drop the loaded tables, a recorded load failure and the memo; the next query
    /// loads again.
    pub fn reset(&mut self) {
        self.eop_table = OnceCell::new();
        self.delta_t_table = OnceCell::new();
        self.lock_state().invalidate();
    }

    /// First and last tabulated days of the Earth orientation table.
    pub fn mjd_range(&self) -> Result<(i64, i64), SkywardError> {
        let table = self.eop_table()?;
        match (table.first(), table.last()) {
            (Some(first), Some(last)) => Ok((first.mjd, last.mjd)),
            _ => Err(SkywardError::CorrectionsLoadError("EOP table is empty".into())),
        }
    }

    pub fn interpolate(&self) -> bool {
        self.lock_state().interpolate
    }

    /// Switch between floor and linear interpolation lookup.
    ///
    /// A change of mode clears the memoized values of both tables.
    pub fn set_interpolate(&self, interpolate: bool) {
        let mut state = self.lock_state();
        if state.interpolate != interpolate {
            state.interpolate = interpolate;
            state.invalidate();
        }
    }

    /// All Earth orientation values at `mjd` (UTC).
    ///
    /// Return
    /// ------
    /// * the values, from the memo when `mjd` repeats the previous query
    /// * [`SkywardError::CorrectionsLoadError`] if the table cannot be loaded
    /// * [`SkywardError::InvalidValue`] if `mjd` is outside the table
    pub fn eop_values(&self, mjd: MJD) -> Result<EopValues, SkywardError> {
        let table = self.eop_table()?;
        let mut state = self.lock_state();
        if let Some((memo_mjd, values)) = state.eop_memo {
            if memo_mjd == mjd {
                return Ok(values);
            }
        }

        let values = lookup(table, mjd, state.interpolate)?;
        state.eop_memo = Some((mjd, values));
        Ok(values)
    }

    /// UT1 − UTC in seconds.
    pub fn dut1(&self, mjd: MJD) -> Result<Seconds, SkywardError> {
        Ok(self.eop_values(mjd)?.dut1)
    }

    /// Polar motion x in radians.
    pub fn xpolar(&self, mjd: MJD) -> Result<Radian, SkywardError> {
        Ok(self.eop_values(mjd)?.xp)
    }

    /// Polar motion y in radians.
    pub fn ypolar(&self, mjd: MJD) -> Result<Radian, SkywardError> {
        Ok(self.eop_values(mjd)?.yp)
    }

    pub fn dpsi(&self, mjd: MJD) -> Result<Radian, SkywardError> {
        Ok(self.eop_values(mjd)?.dpsi)
    }

    pub fn deps(&self, mjd: MJD) -> Result<Radian, SkywardError> {
        Ok(self.eop_values(mjd)?.deps)
    }

    /// TT − UT1 in seconds.
    pub fn tt_minus_ut1(&self, mjd: MJD) -> Result<Seconds, SkywardError> {
        let table = self.delta_t_table()?;
        let mut state = self.lock_state();
        if let Some((memo_mjd, value)) = state.delta_t_memo {
            if memo_mjd == mjd {
                return Ok(value);
            }
        }

        let value = lookup(table, mjd, state.interpolate)?;
        state.delta_t_memo = Some((mjd, value));
        Ok(value)
    }
}

#[cfg(test)]
mod eop_cache_test {
    use super::*;
    use eop_record::TableEntry;

    fn values(dut1: f64) -> EopValues {
        EopValues {
            dut1,
            xp: dut1 * 1e-6,
            yp: -dut1 * 1e-6,
            dpsi: 0.0,
            deps: 0.0,
        }
    }

    fn cache() -> EopCache {
        EopCache::from_tables(
            vec![
                TableEntry::new(100, values(0.1)),
                TableEntry::new(101, values(0.2)),
                TableEntry::new(102, values(0.4)),
            ],
            vec![TableEntry::new(90, 60.0), TableEntry::new(110, 62.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_memo_invalidated_on_mode_change() {
        let cache = cache();
        assert_eq!(cache.dut1(100.5).unwrap(), 0.1);
        assert_eq!(cache.dut1(100.5).unwrap(), 0.1);

        cache.set_interpolate(true);
        assert!((cache.dut1(100.5).unwrap() - 0.15).abs() < 1e-12);

        cache.set_interpolate(false);
        assert_eq!(cache.dut1(100.5).unwrap(), 0.1);
    }

    #[test]
    fn test_memo_does_not_leak_between_tables() {
        let cache = cache();
        assert_eq!(cache.dut1(101.0).unwrap(), 0.2);
        assert_eq!(cache.tt_minus_ut1(101.0).unwrap(), 60.0);
        cache.set_interpolate(true);
        assert!((cache.tt_minus_ut1(100.0).unwrap() - 61.0).abs() < 1e-12);
        assert_eq!(cache.xpolar(101.0).unwrap(), values(0.2).xp);
        assert_eq!(cache.ypolar(101.0).unwrap(), values(0.2).yp);
    }

    #[test]
    fn test_range() {
        let cache = cache();
        assert_eq!(cache.mjd_range().unwrap(), (100, 102));
        assert_eq!(
            cache.dut1(102.0).unwrap_err(),
            SkywardError::InvalidValue("Invalid mjd: 102. Accepted range is 100 - 102".into())
        );
    }

    #[test]
    fn test_from_tables_rejects_empty() {
        let err = EopCache::from_tables(vec![], vec![TableEntry::new(1, 1.0)]).unwrap_err();
        assert_eq!(
            err,
            SkywardError::CorrectionsLoadError("EOP table holds no usable rows".into())
        );
    }

    #[test]
    fn test_config_paths() {
        let config = EopConfig::default().with_cache_dir("/tmp/skyward");
        assert_eq!(config.finals_path(), "/tmp/skyward/finals2000A.all");
        assert_eq!(config.delta_t_history_path(), "/tmp/skyward/deltat.data");
        assert_eq!(config.delta_t_predictions_path(), "/tmp/skyward/deltat.preds");
        assert!(!config.interpolate);
    }

    #[test]
    fn test_config_deserialize_with_defaults() {
        let config: EopConfig =
            serde_json::from_str(r#"{"cache_dir": "/data/eop", "interpolate": true}"#).unwrap();
        assert_eq!(config.cache_dir, "/data/eop");
        assert!(config.interpolate);
        assert_eq!(config.finals_url, DEFAULT_FINALS_URL);

        let cache = EopCache::new(config);
        assert!(cache.interpolate());
        assert!(!cache.is_loaded());
    }

    #[test]
    fn test_cache_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EopCache>();
    }
}

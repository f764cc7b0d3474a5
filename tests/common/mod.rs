#![allow(dead_code)]

use std::fs;

use approx::assert_abs_diff_eq;
use camino::{Utf8Path, Utf8PathBuf};
use skyward::eop::EopConfig;
use skyward::ref_system::SkyPosition;

/// Never reachable, so a test that falls through to a download fails fast.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Place `value` at column `start`, padding the line with blanks.
fn put(line: &mut Vec<u8>, start: usize, value: &str) {
    if line.len() < start + value.len() {
        line.resize(start + value.len(), b' ');
    }
    line[start..start + value.len()].copy_from_slice(value.as_bytes());
}

/// A `finals2000A.all` line carrying Bulletin A values only.
pub fn finals_line(mjd: i64, dut1: f64, xp_arcsec: f64, yp_arcsec: f64) -> String {
    let mut line = Vec::new();
    put(&mut line, 0, "000101");
    put(&mut line, 7, &format!("{mjd:5}.00"));
    put(&mut line, 18, &format!("{xp_arcsec:9.6}"));
    put(&mut line, 37, &format!("{yp_arcsec:9.6}"));
    put(&mut line, 58, &format!("{dut1:10.7}"));
    put(&mut line, 97, &format!("{:9.3}", 0.0));
    put(&mut line, 116, &format!("{:9.3}", 0.0));
    String::from_utf8(line).unwrap()
}

/// A `deltat.data` line.
pub fn delta_t_line(year: i32, month: u32, day: u32, delta_t: f64) -> String {
    format!(" {year:4} {month:2} {day:2} {delta_t:8.4}")
}

/// A `deltat.preds` line.
pub fn delta_t_prediction_line(mjd: f64, delta_t: f64) -> String {
    let mut line = Vec::new();
    put(&mut line, 3, &format!("{mjd:9.3}"));
    put(&mut line, 14, "2000.00");
    put(&mut line, 24, &format!("{delta_t:5.2}"));
    String::from_utf8(line).unwrap()
}

/// Write the three correction tables in `dir`.
///
/// * EOP: one row per day of `mjds` with a constant `dut1`
/// * ΔT history: monthly rows of 2000 with a constant `delta_t`
/// * ΔT predictions: quarterly rows after the history
pub fn write_tables(dir: &Utf8Path, mjds: std::ops::Range<i64>, dut1: f64, delta_t: f64) {
    let finals: Vec<String> = mjds
        .map(|mjd| finals_line(mjd, dut1, 0.05, 0.35))
        .collect();
    fs::write(dir.join("finals2000A.all"), finals.join("\n") + "\n").unwrap();

    let history: Vec<String> = (1..=12)
        .map(|month| delta_t_line(2000, month, 1, delta_t))
        .collect();
    fs::write(dir.join("deltat.data"), history.join("\n") + "\n").unwrap();

    let predictions = [
        "    MJD        YEAR    TT-UT Pred  UT1-UTC Pred  ERROR".to_string(),
        delta_t_prediction_line(51879.0, delta_t),
        delta_t_prediction_line(51970.0, delta_t),
        delta_t_prediction_line(52060.0, delta_t),
    ];
    fs::write(dir.join("deltat.preds"), predictions.join("\n") + "\n").unwrap();
}

/// Configuration pointing at `dir`, with unreachable sources.
pub fn fixture_config(dir: &Utf8Path) -> EopConfig {
    EopConfig {
        cache_dir: dir.to_path_buf(),
        finals_url: format!("{UNREACHABLE}/finals2000A.all"),
        delta_t_history_url: format!("{UNREACHABLE}/deltat.data"),
        delta_t_predictions_url: format!("{UNREACHABLE}/deltat.preds"),
        ..EopConfig::default()
    }
}

pub fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

pub fn assert_sky_close(actual: &SkyPosition, ra_deg: f64, dec_deg: f64, epsilon: f64) {
    assert_abs_diff_eq!(actual.ra_deg(), ra_deg, epsilon = epsilon);
    assert_abs_diff_eq!(actual.dec_deg(), dec_deg, epsilon = epsilon);
}

/// One body of a synthetic SPK kernel: `position_km(et)` relative to `center`.
pub struct SpkBody<'a> {
    pub target: i32,
    pub center: i32,
    pub position_km: &'a dyn Fn(f64) -> [f64; 3],
}

/// Chebyshev interpolant of `f` on `[mid − radius, mid + radius]`, sampled at the
/// `ncoeff` Chebyshev nodes.
fn chebyshev_fit(
    f: &dyn Fn(f64) -> [f64; 3],
    mid: f64,
    radius: f64,
    ncoeff: usize,
) -> [Vec<f64>; 3] {
    let n = ncoeff as f64;
    let mut coefficients = [vec![0.0; ncoeff], vec![0.0; ncoeff], vec![0.0; ncoeff]];
    for j in 0..ncoeff {
        let theta = std::f64::consts::PI * (j as f64 + 0.5) / n;
        let sample = f(mid + radius * theta.cos());
        for k in 0..ncoeff {
            let basis = (k as f64 * theta).cos();
            for axis in 0..3 {
                coefficients[axis][k] += 2.0 / n * sample[axis] * basis;
            }
        }
    }
    for axis in coefficients.iter_mut() {
        axis[0] /= 2.0;
    }
    coefficients
}

/// Write a little-endian SPK kernel of type 2 segments.
///
/// Every body is fitted over `n_records` records of `intlen` seconds starting at
/// `start_et`, with `ncoeff` coefficients per axis.
pub fn write_spk(
    path: &Utf8Path,
    bodies: &[SpkBody],
    start_et: f64,
    n_records: usize,
    intlen: f64,
    ncoeff: usize,
) {
    const RECORD: usize = 1024;
    let end_et = start_et + n_records as f64 * intlen;

    let mut summaries = Vec::new();
    for word in [0.0f64, 0.0, bodies.len() as f64] {
        summaries.extend(word.to_le_bytes());
    }

    let mut data = Vec::new();
    let mut address = (3 * RECORD / 8 + 1) as i32;
    for body in bodies {
        let mut words = Vec::new();
        for index in 0..n_records {
            let radius = intlen / 2.0;
            let mid = start_et + index as f64 * intlen + radius;
            words.extend([mid, radius]);
            for axis in chebyshev_fit(body.position_km, mid, radius, ncoeff) {
                words.extend(axis);
            }
        }
        let rsize = 2 + 3 * ncoeff;
        words.extend([start_et, intlen, rsize as f64, n_records as f64]);

        let last = address + words.len() as i32 - 1;
        summaries.extend(start_et.to_le_bytes());
        summaries.extend(end_et.to_le_bytes());
        for value in [body.target, body.center, 1, 2, address, last] {
            summaries.extend(value.to_le_bytes());
        }
        address = last + 1;
        data.extend(words.iter().flat_map(|w| w.to_le_bytes()));
    }
    summaries.resize(RECORD, 0);

    let mut bytes = vec![0u8; RECORD];
    bytes[..8].copy_from_slice(b"DAF/SPK ");
    bytes[8..12].copy_from_slice(&2i32.to_le_bytes());
    bytes[12..16].copy_from_slice(&6i32.to_le_bytes());
    bytes[16..76].copy_from_slice(format!("{:<60}", "SYNTHETIC ANALYTIC KERNEL").as_bytes());
    bytes[76..80].copy_from_slice(&2i32.to_le_bytes());
    bytes[80..84].copy_from_slice(&2i32.to_le_bytes());
    bytes[84..88].copy_from_slice(&address.to_le_bytes());
    bytes[88..96].copy_from_slice(b"LTL-IEEE");

    bytes.extend(summaries);
    bytes.extend(vec![b' '; RECORD]);
    bytes.extend(data);
    fs::write(path, bytes).unwrap();
}

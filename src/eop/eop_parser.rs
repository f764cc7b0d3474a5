//! Fixed-column readers for the IERS and USNO correction tables.
//!
//! Column positions are zero-based byte offsets. A slice that runs past the end of a
//! line is truncated, and a blank or non-numeric slice counts as a missing value.
//!
//! * `finals2000A.all`: MJD in `[7, 15)`, then the Bulletin B values
//!   (xp `[134,144)`, yp `[144,154)`, dUT1 `[154,165)`, dpsi `[165,175)`, deps `[175,185)`)
//!   or, when those are missing, the Bulletin A values
//!   (xp `[18,27)`, yp `[37,46)`, dUT1 `[58,68)`, dpsi `[97,106)`, deps `[116,125)`).
//! * `deltat.data`: year `[1,5)`, month `[6,8)`, day `[9,11)`, ΔT `[13,20)`.
//! * `deltat.preds`: one header line, then MJD `[3,12)` and ΔT `[24,29)`.
//!
//! In every file the first line lacking the expected values ends the usable data.

use std::io::BufRead;
use std::str::FromStr;

use super::eop_record::{DeltaTRecord, EopRecord, EopValues, TableEntry};
use crate::constants::{RADMAS, RADSEC};
use crate::skyward_errors::SkywardError;
use crate::time::calendar::calendar_to_mjd;

/// Column layout of the five values of a `finals2000A` line.
struct FinalsLayout {
    dut1: (usize, usize),
    xp: (usize, usize),
    yp: (usize, usize),
    dpsi: (usize, usize),
    deps: (usize, usize),
}

const BULLETIN_B: FinalsLayout = FinalsLayout {
    dut1: (154, 11),
    xp: (134, 10),
    yp: (144, 10),
    dpsi: (165, 10),
    deps: (175, 10),
};

const BULLETIN_A: FinalsLayout = FinalsLayout {
    dut1: (58, 10),
    xp: (18, 9),
    yp: (37, 9),
    dpsi: (97, 9),
    deps: (116, 9),
};

const FINALS_MJD: (usize, usize) = (7, 8);

/// Substring `[start, start + len)` clamped to the line length.
fn column(line: &str, start: usize, len: usize) -> Option<&str> {
    line.get(start..(start + len).min(line.len()))
}

fn parse_column<T: FromStr>(line: &str, (start, len): (usize, usize)) -> Option<T> {
    column(line, start, len)?.trim().parse().ok()
}

/// Integer day of a column holding either `51544` or `51544.00`.
fn parse_day(line: &str, field: (usize, usize)) -> Option<i64> {
    let value: f64 = parse_column(line, field)?;
    value.is_finite().then(|| value.trunc() as i64)
}

impl FinalsLayout {
    fn read(&self, line: &str) -> Option<EopValues> {
        let dut1 = parse_column::<f64>(line, self.dut1)?;
        let xp = parse_column::<f64>(line, self.xp)?;
        let yp = parse_column::<f64>(line, self.yp)?;
        let dpsi = parse_column::<f64>(line, self.dpsi)?;
        let deps = parse_column::<f64>(line, self.deps)?;

        Some(EopValues {
            dut1,
            xp: xp * RADSEC,
            yp: yp * RADSEC,
            dpsi: dpsi * RADMAS,
            deps: deps * RADMAS,
        })
    }
}

/// Parse one `finals2000A` line, Bulletin B first then Bulletin A.
pub fn parse_finals_line(line: &str) -> Option<EopRecord> {
    let mjd = parse_day(line, FINALS_MJD)?;
    let values = BULLETIN_B.read(line).or_else(|| BULLETIN_A.read(line))?;
    Some(TableEntry::new(mjd, values))
}

/// Read a whole `finals2000A.all` table.
///
/// Return
/// ------
/// * the records up to the first line without usable values
/// * an I/O error from the reader
pub fn parse_finals<R: BufRead>(reader: R) -> Result<Vec<EopRecord>, SkywardError> {
    let mut records = Vec::with_capacity(20_000);
    for line in reader.lines() {
        match parse_finals_line(&line?) {
            Some(record) => records.push(record),
            None => break,
        }
    }
    records.shrink_to_fit();
    Ok(records)
}

/// Parse one `deltat.data` line.
pub fn parse_delta_t_history_line(line: &str) -> Option<DeltaTRecord> {
    let year: i32 = parse_column(line, (1, 4))?;
    let month: i32 = parse_column(line, (6, 2))?;
    let day: i32 = parse_column(line, (9, 2))?;
    let delta_t: f64 = parse_column(line, (13, 7))?;

    let conv = calendar_to_mjd(year, month, day).ok()?;
    Some(TableEntry::new(conv.mjd as i64, delta_t))
}

/// Read the historical ΔT (TT − UT1) table.
pub fn parse_delta_t_history<R: BufRead>(reader: R) -> Result<Vec<DeltaTRecord>, SkywardError> {
    let mut records = Vec::with_capacity(5_000);
    for line in reader.lines() {
        match parse_delta_t_history_line(&line?) {
            Some(record) => records.push(record),
            None => break,
        }
    }
    Ok(records)
}

/// Append the predicted ΔT rows that come after the last stored day.
///
/// The first line of `reader` is a header. Predicted rows dated on or before the
/// last entry of `records` are skipped, so predictions never replace or precede
/// the historical values.
///
/// Return
/// ------
/// * the number of rows appended
pub fn append_delta_t_predictions<R: BufRead>(
    reader: R,
    records: &mut Vec<DeltaTRecord>,
) -> Result<usize, SkywardError> {
    let mut appended = 0;
    for line in reader.lines().skip(1) {
        let line = line?;
        let Some(mjd) = parse_day(&line, (3, 9)) else {
            break;
        };

        let last = records.last().map_or(i64::MIN, |entry| entry.mjd);
        if mjd <= last {
            continue;
        }

        let Some(delta_t) = parse_column::<f64>(&line, (24, 5)) else {
            break;
        };
        records.push(TableEntry::new(mjd, delta_t));
        appended += 1;
    }
    Ok(appended)
}

#[cfg(test)]
mod eop_parser_test {
    use super::*;
    use approx::assert_relative_eq;

    /// Place `value` at column `start`, padding the line with blanks.
    fn put(line: &mut Vec<u8>, start: usize, value: &str) {
        if line.len() < start + value.len() {
            line.resize(start + value.len(), b' ');
        }
        line[start..start + value.len()].copy_from_slice(value.as_bytes());
    }

    fn finals_line(mjd: &str, a: Option<[&str; 5]>, b: Option<[&str; 5]>) -> String {
        let mut line = vec![b' '; 70];
        put(&mut line, 0, "000101");
        put(&mut line, 7, mjd);
        if let Some([xp, yp, dut1, dpsi, deps]) = a {
            put(&mut line, 18, xp);
            put(&mut line, 37, yp);
            put(&mut line, 58, dut1);
            put(&mut line, 97, dpsi);
            put(&mut line, 116, deps);
        }
        if let Some([xp, yp, dut1, dpsi, deps]) = b {
            put(&mut line, 134, xp);
            put(&mut line, 144, yp);
            put(&mut line, 154, dut1);
            put(&mut line, 165, dpsi);
            put(&mut line, 175, deps);
        }
        String::from_utf8(line).unwrap()
    }

    fn preds_line(mjd: &str, delta_t: &str) -> String {
        let mut line = Vec::new();
        put(&mut line, 3, mjd);
        put(&mut line, 14, "2000.00");
        put(&mut line, 24, delta_t);
        String::from_utf8(line).unwrap()
    }

    #[test]
    fn test_bulletin_b_preferred() {
        let line = finals_line(
            "51544.00",
            Some([" 0.043242", " 0.377915", " 0.3554797", "  -50.397", "   -2.530"]),
            Some([" 0.043190", " 0.377790", " 0.3551057", "  -50.393", "   -2.547"]),
        );
        let record = parse_finals_line(&line).unwrap();
        assert_eq!(record.mjd, 51544);
        assert_eq!(record.values.dut1, 0.3551057);
        assert_relative_eq!(record.values.xp, 0.043190 * RADSEC);
        assert_relative_eq!(record.values.yp, 0.377790 * RADSEC);
        assert_relative_eq!(record.values.dpsi, -50.393 * RADMAS);
        assert_relative_eq!(record.values.deps, -2.547 * RADMAS);
    }

    #[test]
    fn test_bulletin_a_fallback() {
        let line = finals_line(
            "60700.00",
            Some([" 0.123456", " 0.234567", "-0.0456789", "   -0.123", "    0.456"]),
            None,
        );
        let record = parse_finals_line(&line).unwrap();
        assert_eq!(record.mjd, 60700);
        assert_eq!(record.values.dut1, -0.0456789);
        assert_relative_eq!(record.values.xp, 0.123456 * RADSEC);
        assert_relative_eq!(record.values.deps, 0.456 * RADMAS);
    }

    #[test]
    fn test_parse_finals_stops_at_unusable_line() {
        let rows = [
            finals_line(
                "51544.00",
                Some([" 0.1", " 0.2", " 0.3", " 0.4", " 0.5"]),
                None,
            ),
            finals_line(
                "51545.00",
                Some([" 0.1", " 0.2", " 0.31", " 0.4", " 0.5"]),
                None,
            ),
            finals_line("51546.00", None, None),
            finals_line(
                "51547.00",
                Some([" 0.1", " 0.2", " 0.33", " 0.4", " 0.5"]),
                None,
            ),
        ];
        let text = rows.join("\n");
        let records = parse_finals(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].mjd, 51545);
        assert_eq!(records[1].values.dut1, 0.31);
    }

    #[test]
    fn test_delta_t_history_line() {
        let record = parse_delta_t_history_line(" 2000  1  1  63.8285").unwrap();
        assert_eq!(record.mjd, 51544);
        assert_eq!(record.values, 63.8285);

        assert!(parse_delta_t_history_line("").is_none());
        assert!(parse_delta_t_history_line(" 2000 13  1  63.8285").is_none());
    }

    #[test]
    fn test_delta_t_predictions_never_precede_history() {
        let history = " 2000  1  1  63.8285\n 2000  2  1  63.8557\n";
        let mut records = parse_delta_t_history(history.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].mjd, 51575);

        let preds = [
            "   MJD        YEAR    TT-UT".to_string(),
            preds_line("51560.000", "99.99"),
            preds_line("51575.000", "99.99"),
            preds_line("51666.000", "64.09"),
            preds_line("51757.000", "64.30"),
        ]
        .join("\n");
        let appended = append_delta_t_predictions(preds.as_bytes(), &mut records).unwrap();
        assert_eq!(appended, 2);
        assert_eq!(
            records.iter().map(|r| r.mjd).collect::<Vec<_>>(),
            vec![51544, 51575, 51666, 51757]
        );
        assert_eq!(records[1].values, 63.8557);
        assert_eq!(records[2].values, 64.09);
    }
}

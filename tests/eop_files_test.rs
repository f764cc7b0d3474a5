mod common;

use std::fs;

use approx::assert_abs_diff_eq;
use skyward::constants::RADSEC;
use skyward::eop::EopCache;
use skyward::skyward_errors::SkywardError;

use common::{fixture_config, utf8_tempdir, write_tables};

#[test]
fn test_load_tables_from_cache_dir() {
    let (_guard, dir) = utf8_tempdir();
    write_tables(&dir, 51540..51560, 0.355, 63.8285);

    let cache = EopCache::new(fixture_config(&dir));
    assert!(!cache.is_loaded());

    assert_eq!(cache.dut1(51544.5).unwrap(), 0.355);
    assert_abs_diff_eq!(cache.xpolar(51544.5).unwrap(), 0.05 * RADSEC, epsilon = 1e-18);
    assert_abs_diff_eq!(cache.ypolar(51544.5).unwrap(), 0.35 * RADSEC, epsilon = 1e-18);
    assert_eq!(cache.tt_minus_ut1(51544.5).unwrap(), 63.8285);

    assert!(cache.is_loaded());
    assert_eq!(cache.mjd_range().unwrap(), (51540, 51559));
}

#[test]
fn test_predictions_extend_history() {
    let (_guard, dir) = utf8_tempdir();
    write_tables(&dir, 51540..51560, 0.355, 63.8285);

    let cache = EopCache::new(fixture_config(&dir));
    // Past the last monthly row (2000-12-01), inside the predicted rows
    assert_eq!(cache.tt_minus_ut1(52000.0).unwrap(), 63.83);
    assert!(matches!(
        cache.tt_minus_ut1(52100.0),
        Err(SkywardError::InvalidValue(_))
    ));
}

#[test]
fn test_out_of_range_names_the_range() {
    let (_guard, dir) = utf8_tempdir();
    write_tables(&dir, 51540..51560, 0.355, 63.8285);

    let cache = EopCache::new(fixture_config(&dir));
    assert_eq!(
        cache.dut1(51600.0).unwrap_err(),
        SkywardError::InvalidValue("Invalid mjd: 51600. Accepted range is 51540 - 51559".into())
    );
}

#[test]
fn test_missing_table_then_reset() {
    let (_guard, dir) = utf8_tempdir();
    let mut cache = EopCache::new(fixture_config(&dir));

    let err = cache.dut1(51544.5).unwrap_err();
    assert!(matches!(err, SkywardError::CorrectionsLoadError(_)));
    assert!(!cache.is_loaded());

    // The failure sticks until the load is re-armed, even once the files exist
    write_tables(&dir, 51540..51560, -0.125, 64.0);
    assert_eq!(cache.dut1(51544.5).unwrap_err(), err);
    assert!(cache.ensure_loaded().is_err());
    assert!(!cache.is_loaded());

    cache.reset();
    assert_eq!(cache.dut1(51544.5).unwrap(), -0.125);
}

#[test]
fn test_interpolation_between_days() {
    let (_guard, dir) = utf8_tempdir();
    let finals = [
        common::finals_line(51544, 0.30, 0.0, 0.0),
        common::finals_line(51545, 0.40, 0.0, 0.0),
        common::finals_line(51546, 0.60, 0.0, 0.0),
    ];
    write_tables(&dir, 0..0, 0.0, 64.0);
    fs::write(dir.join("finals2000A.all"), finals.join("\n") + "\n").unwrap();

    let cache = EopCache::new(fixture_config(&dir).with_interpolate(true));
    assert!(cache.interpolate());
    assert_abs_diff_eq!(cache.dut1(51544.25).unwrap(), 0.325, epsilon = 1e-12);
    assert_eq!(cache.dut1(51545.0).unwrap(), 0.40);

    cache.set_interpolate(false);
    assert_eq!(cache.dut1(51544.25).unwrap(), 0.30);
}

#[test]
fn test_unsorted_table_is_rejected() {
    let (_guard, dir) = utf8_tempdir();
    let finals = [
        common::finals_line(51545, 0.30, 0.0, 0.0),
        common::finals_line(51544, 0.40, 0.0, 0.0),
    ];
    write_tables(&dir, 0..0, 0.0, 64.0);
    fs::write(dir.join("finals2000A.all"), finals.join("\n") + "\n").unwrap();

    let cache = EopCache::new(fixture_config(&dir));
    assert!(matches!(
        cache.dut1(51544.5),
        Err(SkywardError::CorrectionsLoadError(_))
    ));
}

#[test]
fn test_corrupt_table_is_a_load_error() {
    let (_guard, dir) = utf8_tempdir();
    write_tables(&dir, 51540..51560, 0.355, 63.8285);
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend_from_slice(common::finals_line(51540, 0.355, 0.0, 0.0).as_bytes());
    fs::write(dir.join("finals2000A.all"), bytes).unwrap();

    let cache = EopCache::new(fixture_config(&dir));
    match cache.dut1(51544.5) {
        Err(SkywardError::CorrectionsLoadError(msg)) => {
            assert!(msg.contains("finals2000A.all"), "{msg}");
        }
        other => panic!("expected a load error, got {other:?}"),
    }

    // ΔT tables are untouched by the broken EOP file
    assert_eq!(cache.tt_minus_ut1(51544.5).unwrap(), 63.8285);

    fs::write(dir.join("deltat.data"), [0xC3, 0x28, b'\n']).unwrap();
    let cache = EopCache::new(fixture_config(&dir));
    assert!(matches!(
        cache.tt_minus_ut1(51544.5),
        Err(SkywardError::CorrectionsLoadError(_))
    ));
}

mod common;

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use skyward::constants::VLIGHT_AU;
use skyward::planets::catalog::PlanetId;
use skyward::planets::planetary_theory::{Algorithm, EarthStates, FallbackReason, PlanetaryTheory};
use skyward::planets::StateVector;
use skyward::ref_system::CoordinateFrame;
use skyward::skyward::Skyward;
use skyward::skyward_errors::SkywardError;
use skyward::time::time_scales::JulianPair;
use skyward::time::TimeInstant;

use common::{assert_sky_close, fixture_config, utf8_tempdir, write_tables};

fn j2000_context() -> (tempfile::TempDir, Skyward) {
    let (guard, dir) = utf8_tempdir();
    write_tables(&dir, 51540..51560, 0.355, 63.8285);
    (guard, Skyward::new(fixture_config(&dir)))
}

fn j2000_noon() -> TimeInstant {
    TimeInstant::from_gregorian(2000, 1, 1, 0.5).unwrap()
}

#[test]
fn test_mercury_apparent_direction() {
    let (_guard, sky) = j2000_context();
    let scales = sky.time_scales();
    let mut mercury = sky.planet(PlanetId::Mercury);

    let position = mercury.apparent_direction(&j2000_noon(), &scales).unwrap();
    assert_eq!(position.frame, CoordinateFrame::Icrs);
    assert_sky_close(&position, 272.082894383576, -24.420038500399112, 1e-5);
    assert!(position.distance > 0.6 && position.distance < 1.5);

    // Astrometric place from a numerical ephemeris: 18h08m29s, -24°25'
    assert_sky_close(&position, 272.12, -24.42, 0.5);
}

#[test]
fn test_outer_planets_apparent_direction() {
    let (_guard, sky) = j2000_context();
    let scales = sky.time_scales();
    let t = j2000_noon();

    let mars = sky
        .planet(PlanetId::Mars)
        .apparent_direction(&t, &scales)
        .unwrap();
    assert_sky_close(&mars, 330.50977325660824, -13.189615088287974, 1e-5);

    let jupiter = sky
        .planet(PlanetId::Jupiter)
        .apparent_direction(&t, &scales)
        .unwrap();
    assert_sky_close(&jupiter, 24.00565981814449, 8.65771293764704, 1e-5);
}

#[test]
fn test_light_time_shift_matches_velocity() {
    let (_guard, sky) = j2000_context();
    let scales = sky.time_scales();
    let t = j2000_noon();

    for id in [PlanetId::Mercury, PlanetId::Mars, PlanetId::Jupiter] {
        let mut body = sky.planet(id);
        let geometric = body.earth_relative_at(&t, &scales).unwrap();
        let apparent = body.apparent_state(&t, &scales).unwrap();

        let delay = geometric.position.norm() / VLIGHT_AU;
        let predicted = geometric.position - geometric.velocity * delay;

        assert_abs_diff_eq!(apparent.position, predicted, epsilon = 5e-7);
        assert!((apparent.position - geometric.position).norm() > 1e-4);
    }
}

#[test]
fn test_instant_outside_tables() {
    let (_guard, sky) = j2000_context();
    let scales = sky.time_scales();
    let t = TimeInstant::from_gregorian(2010, 1, 1, 0.0).unwrap();

    let mut venus = sky.planet(PlanetId::Venus);
    assert!(matches!(
        venus.apparent_direction(&t, &scales),
        Err(SkywardError::InvalidValue(_))
    ));
    assert!(venus.cached_state().is_none());
}

/// Circular heliocentric orbits in the equatorial plane, the Sun at the barycenter.
#[derive(Debug)]
struct CircularTheory;

impl CircularTheory {
    fn circle(radius: f64, tdb: JulianPair) -> StateVector {
        let omega = 0.0172 / radius.powf(1.5);
        let angle = omega * (tdb.jd() - 2451545.0);
        StateVector::new(
            Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.0),
            Vector3::new(-radius * omega * angle.sin(), radius * omega * angle.cos(), 0.0),
        )
    }
}

impl PlanetaryTheory for CircularTheory {
    fn heliocentric(
        &self,
        planet: PlanetId,
        tdb: JulianPair,
    ) -> Result<StateVector, SkywardError> {
        let radius = match planet {
            PlanetId::Mercury => 0.4,
            PlanetId::Venus => 0.7,
            PlanetId::Mars => 1.5,
            _ => 5.2,
        };
        Ok(Self::circle(radius, tdb))
    }

    fn earth(&self, tdb: JulianPair) -> Result<EarthStates, SkywardError> {
        let earth = Self::circle(1.0, tdb);
        Ok(EarthStates {
            heliocentric: earth,
            barycentric: earth,
        })
    }
}

#[test]
fn test_high_precision_theory_and_pluto_fallback() {
    let (_guard, dir) = utf8_tempdir();
    write_tables(&dir, 51540..51560, 0.355, 63.8285);
    let sky = Skyward::new(fixture_config(&dir)).with_theory(Arc::new(CircularTheory));
    let scales = sky.time_scales();
    let t = j2000_noon();

    let mut mars = sky.planet(PlanetId::Mars);
    assert_eq!(mars.algorithm(), Algorithm::HighPrecision);
    let relative = mars.earth_relative_at(&t, &scales).unwrap();
    let tdb = scales.utc_to_tdb(&t).unwrap();
    let expected =
        CircularTheory::circle(1.5, tdb).position - CircularTheory::circle(1.0, tdb).position;
    assert_abs_diff_eq!(relative.position, expected, epsilon = 1e-12);
    let sky_mars = mars.apparent_direction(&t, &scales).unwrap();
    assert_abs_diff_eq!(sky_mars.dec, 0.0, epsilon = 1e-12);

    let mut pluto = sky.planet(PlanetId::Pluto);
    assert_eq!(pluto.selection().requested, Algorithm::HighPrecision);
    assert_eq!(pluto.algorithm(), Algorithm::Analytic);
    assert_eq!(
        pluto.selection().fallback,
        Some(FallbackReason::Unsupported(PlanetId::Pluto))
    );

    let analytic = Skyward::new(fixture_config(&dir))
        .planet(PlanetId::Pluto)
        .apparent_direction(&t, &scales)
        .unwrap();
    let fallback = pluto.apparent_direction(&t, &scales).unwrap();
    assert_eq!(fallback, analytic);
}

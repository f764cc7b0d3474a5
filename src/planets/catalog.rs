//! Built-in planets with their J2000 mean elements and physical properties.
//!
//! Elements are the approximate Keplerian set fitted over 3000 BC to 3000 AD, with the
//! additional mean-anomaly terms `b`, `c`, `s`, `f` for Jupiter through Pluto.

use std::fmt;

use super::orbital_elements::{Element, MeanAnomalyTerms, OrbitalElementSet};

/// A planet known to the built-in catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanetId {
    Mercury,
    Venus,
    Earth,
    EarthMoonBarycenter,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

/// Size, reflectivity and mass of a catalog body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicalProperties {
    pub mean_radius_m: f64,
    pub albedo: f64,
    pub mass_kg: f64,
}

const fn el(value: f64, rate_per_century: f64) -> Element {
    Element::new(value, rate_per_century)
}

impl PlanetId {
    pub const ALL: [PlanetId; 10] = [
        PlanetId::Mercury,
        PlanetId::Venus,
        PlanetId::Earth,
        PlanetId::EarthMoonBarycenter,
        PlanetId::Mars,
        PlanetId::Jupiter,
        PlanetId::Saturn,
        PlanetId::Uranus,
        PlanetId::Neptune,
        PlanetId::Pluto,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlanetId::Mercury => "Mercury",
            PlanetId::Venus => "Venus",
            PlanetId::Earth => "Earth",
            PlanetId::EarthMoonBarycenter => "EMBarycenter",
            PlanetId::Mars => "Mars",
            PlanetId::Jupiter => "Jupiter",
            PlanetId::Saturn => "Saturn",
            PlanetId::Uranus => "Uranus",
            PlanetId::Neptune => "Neptune",
            PlanetId::Pluto => "Pluto",
        }
    }

    /// Index of the body in the high-precision planetary theory (1 = Mercury … 8 = Neptune).
    ///
    /// The Earth itself has no index: the theory provides it through a dedicated call.
    /// Pluto is not covered.
    pub fn theory_index(&self) -> Option<u8> {
        match self {
            PlanetId::Mercury => Some(1),
            PlanetId::Venus => Some(2),
            PlanetId::EarthMoonBarycenter => Some(3),
            PlanetId::Mars => Some(4),
            PlanetId::Jupiter => Some(5),
            PlanetId::Saturn => Some(6),
            PlanetId::Uranus => Some(7),
            PlanetId::Neptune => Some(8),
            PlanetId::Earth | PlanetId::Pluto => None,
        }
    }

    /// Whether the high-precision theory can position this body.
    pub fn has_high_precision(&self) -> bool {
        matches!(self, PlanetId::Earth) || self.theory_index().is_some()
    }

    pub fn physical_properties(&self) -> PhysicalProperties {
        let (mean_radius_m, albedo, mass_kg) = match self {
            PlanetId::Mercury => (2_440_000.0, 0.106, 3.302e23),
            PlanetId::Venus => (6_051_800.0, 0.65, 48.685e23),
            PlanetId::Earth | PlanetId::EarthMoonBarycenter => (0.0, 0.0, 0.0),
            PlanetId::Mars => (3_389_900.0, 0.150, 6.4185e23),
            PlanetId::Jupiter => (69_911_000.0, 0.52, 1.89813e27),
            PlanetId::Saturn => (58_232_000.0, 0.47, 5.68319e26),
            PlanetId::Uranus => (25_362_000.0, 0.51, 8.68103e25),
            PlanetId::Neptune => (24_624_000.0, 0.41, 1.0241e26),
            PlanetId::Pluto => (1_195_000.0, 0.3, 1.307e22),
        };
        PhysicalProperties {
            mean_radius_m,
            albedo,
            mass_kg,
        }
    }

    /// J2000 mean elements and their rates.
    pub fn elements(&self) -> OrbitalElementSet {
        // (a, e, I, L, ϖ, Ω) and optional (b, c, s, f)
        let (a, e, i, l, w, o, terms) = match self {
            PlanetId::Mercury => (
                el(0.38709843, 0.0),
                el(0.20563661, 0.00002123),
                el(7.00559432, -0.00590158),
                el(252.25166724, 149472.67486623),
                el(77.45771895, 0.15940013),
                el(48.33961819, -0.12214182),
                None,
            ),
            PlanetId::Venus => (
                el(0.72332102, -0.00000026),
                el(0.00676399, -0.00005107),
                el(3.39777545, 0.00043494),
                el(181.97970850, 58517.81560260),
                el(131.76755713, 0.05679648),
                el(76.67261496, -0.27274174),
                None,
            ),
            PlanetId::Earth | PlanetId::EarthMoonBarycenter => (
                el(1.00000018, -0.00000003),
                el(0.01673163, -0.00003661),
                el(-0.00054346, -0.01337178),
                el(100.46691572, 35999.37306329),
                el(102.93005885, 0.31795260),
                el(-5.11260389, -0.24123856),
                None,
            ),
            PlanetId::Mars => (
                el(1.52371243, 0.00000097),
                el(0.09336511, 0.00009149),
                el(1.85181869, -0.00724757),
                el(-4.56813164, 19140.29934243),
                el(-23.91744784, 0.45223625),
                el(49.71320984, -0.26852431),
                None,
            ),
            PlanetId::Jupiter => (
                el(5.20248019, -0.00002864),
                el(0.04853590, -0.00005107),
                el(1.29861416, -0.00322699),
                el(34.33479152, 3034.90371757),
                el(14.27495244, 0.18199196),
                el(100.29282654, 0.13024619),
                Some(MeanAnomalyTerms::new(-0.00012452, 0.06064060, -0.35635438, 38.35125)),
            ),
            PlanetId::Saturn => (
                el(9.54149883, -0.00003065),
                el(0.05550825, -0.00032044),
                el(2.49424102, 0.00451969),
                el(50.07571329, 1222.11494724),
                el(92.86136063, 0.54179478),
                el(113.63998702, -0.25015002),
                Some(MeanAnomalyTerms::new(0.00025899, -0.13434469, 0.87320147, 38.35125)),
            ),
            PlanetId::Uranus => (
                el(19.18797948, -0.00020455),
                el(0.04685740, -0.00001550),
                el(0.77298127, -0.00180155),
                el(314.20276625, 428.49512595),
                el(172.43404441, 0.09266985),
                el(73.96250215, 0.05739699),
                Some(MeanAnomalyTerms::new(0.00058331, -0.97731848, 0.17689245, 7.67025)),
            ),
            PlanetId::Neptune => (
                el(30.06952752, 0.00006447),
                el(0.00895439, 0.00000818),
                el(1.77005520, 0.00022400),
                el(304.22289287, 218.46515314),
                el(46.68158724, 0.01009938),
                el(131.78635853, -0.00606302),
                Some(MeanAnomalyTerms::new(-0.00041348, 0.68346318, -0.10162547, 7.67025)),
            ),
            PlanetId::Pluto => (
                el(39.48686035, 0.00449751),
                el(0.24885238, 0.00006016),
                el(17.14104260, 0.00000501),
                el(238.96535011, 145.18042903),
                el(224.09702598, -0.00968827),
                el(110.30167986, -0.00809981),
                Some(MeanAnomalyTerms::new(-0.01262724, 0.0, 0.0, 0.0)),
            ),
        };

        let set = OrbitalElementSet {
            semi_major_axis: a,
            eccentricity: e,
            inclination: i,
            mean_longitude: l,
            perihelion_longitude: w,
            ascending_node_longitude: o,
            extra_terms: None,
        };
        match terms {
            Some(terms) => set.with_extra_terms(terms),
            None => set,
        }
    }
}

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

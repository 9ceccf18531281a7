use super::config::ScalingMethod;
use crate::core::kinematics::FourMomentum;
use crate::core::library::{EventLibrary, OutgoingKinematics};
use crate::core::particle::DarkPhoton;
use crate::core::units::GEV;
use nalgebra::Vector3;
use rand::Rng;
use std::f64::consts::TAU;
use tracing::warn;

/// Recoil lepton produced by [`ScalingEngine::scale`], in MeV, expressed
/// relative to an incident lepton travelling along +z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledRecoil {
    pub energy: f64,
    pub momentum: Vector3<f64>,
}

/// Maps library samples onto the actual incident energy of a lepton.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingEngine {
    method: ScalingMethod,
    /// A' mass [GeV].
    dark_photon_mass: f64,
    max_iterations: usize,
}

/// Energy [GeV], transverse momentum [GeV] and momentum magnitude [GeV] of a
/// recoil before it is given a direction.
struct Recoil {
    energy: f64,
    pt: f64,
    p: f64,
}

impl ScalingEngine {
    pub fn new(method: ScalingMethod, dark_photon: &DarkPhoton, max_iterations: usize) -> Self {
        Self {
            method,
            dark_photon_mass: dark_photon.mass_gev(),
            max_iterations,
        }
    }

    pub fn method(&self) -> ScalingMethod {
        self.method
    }

    /// Draws the next sample for `incident_energy` [GeV] from `library` and
    /// rescales it to that energy for a lepton of mass `lepton_mass` [GeV].
    ///
    /// The scaled policies draw the azimuth of the returned momentum uniformly
    /// in `[0, 2π)` and give it a magnitude of `sqrt(E² - m²)` for the returned
    /// energy `E`. [`ScalingMethod::Undefined`] hands back the stored recoil
    /// unmodified.
    pub fn scale(
        &self,
        library: &mut EventLibrary,
        incident_energy: f64,
        lepton_mass: f64,
        rng: &mut impl Rng,
    ) -> ScaledRecoil {
        let sample = library.next_sample(incident_energy);
        let recoil = match self.method {
            ScalingMethod::ForwardOnly => {
                self.forward_only(library, sample, incident_energy, lepton_mass)
            }
            ScalingMethod::CmScaling => self.cm_scaling(&sample, incident_energy, lepton_mass),
            ScalingMethod::Undefined => {
                return ScaledRecoil {
                    energy: sample.lepton.e * GEV,
                    momentum: sample.lepton.p * GEV,
                };
            }
        };

        let phi = rng.random::<f64>() * TAU;
        let magnitude = (recoil.energy.powi(2) - lepton_mass.powi(2)).max(0.0).sqrt();
        // an exhausted forward-only search leaves pt > p; clamp to a transverse recoil
        let sin_theta = if recoil.p > 0.0 {
            (recoil.pt / recoil.p).min(1.0)
        } else {
            0.0
        };
        let cos_theta = (1.0 - sin_theta * sin_theta).sqrt();
        let direction = Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);

        ScaledRecoil {
            energy: recoil.energy * GEV,
            momentum: direction * (magnitude * GEV),
        }
    }

    /// Linear scaling of the recoil kinetic energy by the kinetic energy
    /// available after producing the A'.
    fn scaled_energy(&self, sample: &OutgoingKinematics, incident_energy: f64, lepton_mass: f64) -> f64 {
        let available = incident_energy - lepton_mass - self.dark_photon_mass;
        let reference = sample.incident_energy - lepton_mass - self.dark_photon_mass;
        (sample.lepton.e - lepton_mass) * (available / reference) + lepton_mass
    }

    fn forward_only(
        &self,
        library: &mut EventLibrary,
        mut sample: OutgoingKinematics,
        incident_energy: f64,
        lepton_mass: f64,
    ) -> Recoil {
        let bound = self.max_iterations.min(library.max_resample_iterations());
        let mut energy = self.scaled_energy(&sample, incident_energy, lepton_mass);
        let mut pt = sample.lepton.perp();
        let mut attempts = 0;

        while pt * pt + lepton_mass * lepton_mass > energy * energy {
            if attempts >= bound {
                warn!(
                    library_energy = sample.incident_energy,
                    incident_energy,
                    attempts,
                    "Could not produce a realistic vertex; consider a library with a beam energy closer to the incident energy."
                );
                break;
            }
            attempts += 1;
            sample = library.next_sample(incident_energy);
            energy = self.scaled_energy(&sample, incident_energy, lepton_mass);
            pt = sample.lepton.perp();
        }

        Recoil {
            energy,
            pt,
            p: (energy * energy - lepton_mass * lepton_mass).max(0.0).sqrt(),
        }
    }

    fn cm_scaling(&self, sample: &OutgoingKinematics, incident_energy: f64, lepton_mass: f64) -> Recoil {
        let energy_shift = sample.incident_energy - incident_energy;
        let cm = sample.center_momentum;
        let shifted_cm = FourMomentum::new(
            cm.e - energy_shift,
            cm.px(),
            cm.py(),
            cm.pz() - energy_shift,
        );

        let mut lepton = sample.lepton.boosted(&(-cm.boost_vector()));
        lepton.boost(&shifted_cm.boost_vector());
        let energy = self.scaled_energy(sample, incident_energy, lepton_mass);
        lepton.set_e(energy);

        if lepton.is_finite() {
            Recoil {
                energy,
                pt: lepton.perp(),
                p: lepton.mag(),
            }
        } else {
            Recoil {
                energy,
                pt: sample.lepton.perp(),
                p: sample.lepton.mag(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::LeptonSpecies;
    use crate::core::units::MEV;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const AP_MASS: f64 = 0.01;
    const E0: f64 = 4.0;
    const RECOIL_E: f64 = 1.5;
    const RECOIL_PT: f64 = 0.05;

    fn electron_mass() -> f64 {
        LeptonSpecies::Electron.mass_gev()
    }

    fn dark_photon() -> DarkPhoton {
        DarkPhoton::with_mass(AP_MASS * GEV).unwrap()
    }

    /// A sample at `incident` whose recoil lepton has energy `e` and
    /// transverse momentum `pt`, with the A' carrying the remaining energy.
    fn sample(incident: f64, e: f64, pt: f64) -> OutgoingKinematics {
        let m = electron_mass();
        let lepton = FourMomentum::new(e, pt, 0.0, (e * e - m * m - pt * pt).sqrt());
        let ap_e = incident - e;
        let ap = FourMomentum::new(ap_e, -pt, 0.0, (ap_e * ap_e - AP_MASS * AP_MASS - pt * pt).sqrt());
        OutgoingKinematics::from_products(lepton, ap, incident)
    }

    fn single_energy_library(rng: &mut StdRng) -> EventLibrary {
        EventLibrary::new(vec![sample(E0, RECOIL_E, RECOIL_PT); 16], rng).unwrap()
    }

    fn mixed_library(rng: &mut StdRng) -> EventLibrary {
        let mut samples = Vec::new();
        for (incident, fractions) in [(2.0, [0.2, 0.5, 0.8]), (4.0, [0.3, 0.6, 0.9]), (8.0, [0.1, 0.4, 0.7])] {
            for f in fractions {
                samples.push(sample(incident, f * incident, 0.02));
            }
        }
        EventLibrary::new(samples, rng).unwrap()
    }

    fn engine(method: ScalingMethod) -> ScalingEngine {
        ScalingEngine::new(method, &dark_photon(), 10_000)
    }

    fn assert_on_shell(recoil: &ScaledRecoil) {
        let m = electron_mass() * GEV;
        let expected = (recoil.energy.powi(2) - m * m).sqrt();
        let magnitude = recoil.momentum.norm();
        assert!(
            (magnitude - expected).abs() <= 1e-9 * expected.max(1.0),
            "|p| = {magnitude} but sqrt(E^2 - m^2) = {expected}"
        );
    }

    #[test]
    fn unscaled_sample_at_reference_energy_is_returned_exactly() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut library = single_energy_library(&mut rng);
        let recoil = engine(ScalingMethod::Undefined).scale(&mut library, E0, electron_mass(), &mut rng);

        let stored = sample(E0, RECOIL_E, RECOIL_PT).lepton;
        assert_eq!(recoil.energy, stored.e * GEV);
        assert_eq!(recoil.momentum, stored.p * GEV);
    }

    #[test]
    fn unscaled_samples_keep_their_recorded_azimuth() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut library = single_energy_library(&mut rng);
        let engine = engine(ScalingMethod::Undefined);
        for _ in 0..8 {
            let recoil = engine.scale(&mut library, E0, electron_mass(), &mut rng);
            assert_eq!(recoil.momentum.x, RECOIL_PT * GEV);
            assert_eq!(recoil.momentum.y, 0.0);
        }
    }

    #[test]
    fn forward_only_at_reference_energy_keeps_energy_fraction() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut library = single_energy_library(&mut rng);
        let recoil = engine(ScalingMethod::ForwardOnly).scale(&mut library, E0, electron_mass(), &mut rng);

        let fraction = recoil.energy / (E0 * GEV);
        assert!((fraction - RECOIL_E / E0).abs() < 1e-12);
        let perp = recoil.momentum.x.hypot(recoil.momentum.y);
        assert!((perp - RECOIL_PT * GEV).abs() < 1e-9 * GEV);
    }

    #[test]
    fn cm_scaling_at_reference_energy_is_an_identity_boost() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut library = single_energy_library(&mut rng);
        let recoil = engine(ScalingMethod::CmScaling).scale(&mut library, E0, electron_mass(), &mut rng);

        assert!((recoil.energy - RECOIL_E * GEV).abs() < 1e-9 * GEV);
        let perp = recoil.momentum.x.hypot(recoil.momentum.y);
        assert!((perp - RECOIL_PT * GEV).abs() < 1e-6 * GEV);
    }

    #[test]
    fn every_method_returns_an_on_shell_recoil() {
        let mut rng = StdRng::seed_from_u64(4);
        let methods = [ScalingMethod::ForwardOnly, ScalingMethod::CmScaling, ScalingMethod::Undefined];
        for method in methods {
            let mut library = mixed_library(&mut rng);
            let engine = engine(method);
            for incident in [1.0, 2.0, 3.1, 4.0, 5.5, 8.0, 12.0] {
                let recoil = engine.scale(&mut library, incident, electron_mass(), &mut rng);
                assert!(recoil.momentum.iter().all(|c| c.is_finite()), "{method}: non-finite");
                assert_on_shell(&recoil);
            }
        }
    }

    #[test]
    fn forward_only_scales_energy_down_from_next_bucket() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut library = single_energy_library(&mut rng);
        let m = electron_mass();
        let recoil = engine(ScalingMethod::ForwardOnly).scale(&mut library, 3.0, m, &mut rng);

        let expected = (RECOIL_E - m) * (3.0 - m - AP_MASS) / (E0 - m - AP_MASS) + m;
        assert!((recoil.energy - expected * GEV).abs() < 1e-9 * GEV);
    }

    #[test]
    fn forward_only_skips_kinematically_forbidden_samples() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut samples = vec![sample(E0, 2.5, 1.0); 4];
        samples.push(sample(E0, 2.5, 0.01));
        let mut library = EventLibrary::new(samples, &mut rng).unwrap();

        // At 1 GeV the 1 GeV pt samples are forbidden; only the last one fits.
        let recoil = engine(ScalingMethod::ForwardOnly).scale(&mut library, 1.0, electron_mass(), &mut rng);
        let perp = recoil.momentum.x.hypot(recoil.momentum.y);
        assert!((perp - 0.01 * GEV).abs() < 1e-9 * GEV);
        assert_on_shell(&recoil);
    }

    #[test]
    fn exhausted_forward_only_search_degrades_to_transverse_recoil() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut library = EventLibrary::new(vec![sample(E0, 3.0, 0.5); 3], &mut rng).unwrap();
        let recoil = engine(ScalingMethod::ForwardOnly).scale(&mut library, 0.3, electron_mass(), &mut rng);

        assert!(recoil.momentum.iter().all(|c| c.is_finite()));
        assert!(recoil.momentum.z.abs() < 1e-9 * recoil.momentum.norm());
        assert_on_shell(&recoil);
    }

    #[test]
    fn azimuth_is_randomized_between_draws() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut library = single_energy_library(&mut rng);
        let engine = engine(ScalingMethod::ForwardOnly);
        let first = engine.scale(&mut library, E0, electron_mass(), &mut rng);
        let second = engine.scale(&mut library, E0, electron_mass(), &mut rng);

        assert_eq!(first.energy, second.energy);
        assert_ne!(first.momentum.x, second.momentum.x);
    }

    #[test]
    fn muon_recoil_uses_supplied_mass() {
        let mut rng = StdRng::seed_from_u64(9);
        let m = LeptonSpecies::Muon.mass_gev();
        let lepton = FourMomentum::new(20.0, 0.3, 0.0, (400.0 - m * m - 0.09_f64).sqrt());
        let ap = FourMomentum::new(30.0, -0.3, 0.0, (900.0 - AP_MASS * AP_MASS - 0.09_f64).sqrt());
        let mut library =
            EventLibrary::new(vec![OutgoingKinematics::from_products(lepton, ap, 50.0)], &mut rng).unwrap();
        let recoil = engine(ScalingMethod::ForwardOnly).scale(&mut library, 40.0, m, &mut rng);

        let expected = (recoil.energy.powi(2) - (m * GEV).powi(2)).sqrt();
        assert!((recoil.momentum.norm() - expected).abs() < 1e-9 * expected);
        assert!(recoil.energy > 100.0 * MEV);
    }
}

use crate::core::kinematics::FourMomentum;
use serde::{Deserialize, Serialize};

/// One recorded dark brem vertex from the event library.
///
/// All quantities are in GeV and were recorded with the incident lepton
/// travelling along the z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutgoingKinematics {
    /// Four-momentum of the recoil lepton.
    pub lepton: FourMomentum,
    /// Four-momentum of the lepton + A' system, i.e. the velocity of its
    /// center-of-momentum frame relative to the lab.
    pub center_momentum: FourMomentum,
    /// Total energy of the incident lepton the sample was generated at.
    pub incident_energy: f64,
}

impl OutgoingKinematics {
    pub fn new(lepton: FourMomentum, center_momentum: FourMomentum, incident_energy: f64) -> Self {
        Self {
            lepton,
            center_momentum,
            incident_energy,
        }
    }

    /// Builds a record from the recoil lepton and A' four-momenta.
    pub fn from_products(lepton: FourMomentum, dark_photon: FourMomentum, incident_energy: f64) -> Self {
        Self::new(lepton, lepton + dark_photon, incident_energy)
    }

    /// Four-momentum of the emitted A'.
    pub fn dark_photon(&self) -> FourMomentum {
        self.center_momentum - self.lepton
    }

    fn is_finite(&self) -> bool {
        self.lepton.is_finite() && self.center_momentum.is_finite() && self.incident_energy.is_finite()
    }
}

/// Flat CSV representation of an [`OutgoingKinematics`] record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LibraryRow {
    pub incident_energy: f64,
    pub lepton_e: f64,
    pub lepton_px: f64,
    pub lepton_py: f64,
    pub lepton_pz: f64,
    pub cm_e: f64,
    pub cm_px: f64,
    pub cm_py: f64,
    pub cm_pz: f64,
}

impl From<&OutgoingKinematics> for LibraryRow {
    fn from(k: &OutgoingKinematics) -> Self {
        Self {
            incident_energy: k.incident_energy,
            lepton_e: k.lepton.e,
            lepton_px: k.lepton.px(),
            lepton_py: k.lepton.py(),
            lepton_pz: k.lepton.pz(),
            cm_e: k.center_momentum.e,
            cm_px: k.center_momentum.px(),
            cm_py: k.center_momentum.py(),
            cm_pz: k.center_momentum.pz(),
        }
    }
}

impl LibraryRow {
    /// Converts the row back into a record, rejecting non-finite values.
    pub fn into_kinematics(self) -> Option<OutgoingKinematics> {
        let kinematics = OutgoingKinematics::new(
            FourMomentum::new(self.lepton_e, self.lepton_px, self.lepton_py, self.lepton_pz),
            FourMomentum::new(self.cm_e, self.cm_px, self.cm_py, self.cm_pz),
            self.incident_energy,
        );
        kinematics.is_finite().then_some(kinematics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_photon_is_recovered_from_center_momentum() {
        let lepton = FourMomentum::new(2.0, 0.1, 0.0, 1.99);
        let ap = FourMomentum::new(1.9, -0.1, 0.0, 1.89);
        let record = OutgoingKinematics::from_products(lepton, ap, 4.0);
        let recovered = record.dark_photon();
        assert!((recovered.e - ap.e).abs() < 1e-12);
        assert!((recovered.p - ap.p).norm() < 1e-12);
    }

    #[test]
    fn row_conversion_rejects_non_finite_values() {
        let record = OutgoingKinematics::new(
            FourMomentum::new(2.0, 0.1, 0.0, 1.99),
            FourMomentum::new(4.0, 0.0, 0.0, 3.9),
            4.0,
        );
        let mut row = LibraryRow::from(&record);
        assert_eq!(row.into_kinematics(), Some(record));

        row.lepton_px = f64::NAN;
        assert_eq!(row.into_kinematics(), None);
    }
}

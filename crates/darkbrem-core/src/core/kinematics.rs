use nalgebra::Vector3;

/// A four-momentum `(E, p)` with the Minkowski metric `(+, -, -, -)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FourMomentum {
    pub e: f64,
    pub p: Vector3<f64>,
}

impl FourMomentum {
    pub fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self {
            e,
            p: Vector3::new(px, py, pz),
        }
    }

    pub fn from_parts(e: f64, p: Vector3<f64>) -> Self {
        Self { e, p }
    }

    pub fn px(&self) -> f64 {
        self.p.x
    }

    pub fn py(&self) -> f64 {
        self.p.y
    }

    pub fn pz(&self) -> f64 {
        self.p.z
    }

    /// Magnitude of the momentum transverse to the z axis.
    pub fn perp(&self) -> f64 {
        self.p.x.hypot(self.p.y)
    }

    /// Magnitude of the three-momentum.
    pub fn mag(&self) -> f64 {
        self.p.norm()
    }

    /// Invariant mass squared, `E² - |p|²`.
    pub fn m2(&self) -> f64 {
        self.e * self.e - self.p.norm_squared()
    }

    /// Invariant mass; negative for space-like vectors.
    pub fn m(&self) -> f64 {
        let m2 = self.m2();
        if m2 < 0.0 { -(-m2).sqrt() } else { m2.sqrt() }
    }

    pub fn set_e(&mut self, e: f64) {
        self.e = e;
    }

    /// Velocity of the frame in which this four-momentum is at rest.
    pub fn boost_vector(&self) -> Vector3<f64> {
        if self.e == 0.0 {
            Vector3::zeros()
        } else {
            self.p / self.e
        }
    }

    /// Applies a pure Lorentz boost with velocity `beta`.
    ///
    /// A velocity at or beyond the speed of light produces non-finite
    /// components; callers check [`FourMomentum::is_finite`] when that can occur.
    pub fn boost(&mut self, beta: &Vector3<f64>) {
        let b2 = beta.norm_squared();
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let bp = beta.dot(&self.p);
        let gamma2 = if b2 > 0.0 { (gamma - 1.0) / b2 } else { 0.0 };

        self.p += beta * (gamma2 * bp + gamma * self.e);
        self.e = gamma * (self.e + bp);
    }

    pub fn boosted(mut self, beta: &Vector3<f64>) -> Self {
        self.boost(beta);
        self
    }

    pub fn is_finite(&self) -> bool {
        self.e.is_finite() && self.p.iter().all(|c| c.is_finite())
    }
}

impl std::ops::Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: Self) -> Self::Output {
        FourMomentum::from_parts(self.e + rhs.e, self.p + rhs.p)
    }
}

impl std::ops::Sub for FourMomentum {
    type Output = FourMomentum;

    fn sub(self, rhs: Self) -> Self::Output {
        FourMomentum::from_parts(self.e - rhs.e, self.p - rhs.p)
    }
}

/// Rotates `v`, expressed relative to the z axis, into the frame whose z axis
/// points along `direction`.
///
/// The azimuthal convention matches the one used by the host engine so that
/// scaled library samples land in the same orientation it would produce.
pub fn rotate_uz(v: &Vector3<f64>, direction: &Vector3<f64>) -> Vector3<f64> {
    let norm = direction.norm();
    if norm == 0.0 || !norm.is_finite() {
        return *v;
    }
    let u = direction / norm;
    let up2 = u.x * u.x + u.y * u.y;

    if up2 > 0.0 {
        let up = up2.sqrt();
        Vector3::new(
            (u.x * u.z * v.x - u.y * v.y) / up + u.x * v.z,
            (u.y * u.z * v.x + u.x * v.y) / up + u.y * v.z,
            -up * v.x + u.z * v.z,
        )
    } else if u.z < 0.0 {
        Vector3::new(-v.x, v.y, -v.z)
    } else {
        *v
    }
}

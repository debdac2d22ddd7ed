use super::*;
use serde::Deserialize;
use serde::Serialize;

/// Native range of one heuristic knob.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub lo: f64,
    pub hi: f64,
    /// Round the native value to the nearest integer (e.g. sample counts).
    #[serde(default)]
    pub integral: bool,
}

impl Bound {
    pub const fn real(lo: f64, hi: f64) -> Self {
        Self {
            lo,
            hi,
            integral: false,
        }
    }
    pub const fn integer(lo: f64, hi: f64) -> Self {
        Self {
            lo,
            hi,
            integral: true,
        }
    }
    fn map(&self, x: f64) -> f64 {
        let y = self.lo + x * (self.hi - self.lo);
        match self.integral {
            true => y.round(),
            false => y,
        }
    }
}

/// A parameterized heuristic family evaluated inside the simulator.
///
/// The family owns the conversion from the unit box to the simulator's
/// native parameter ranges. Nothing upstream of the simulator boundary
/// ever sees native values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub name: String,
    pub role: Role,
    pub bounds: Vec<Bound>,
}

impl Family {
    pub fn arity(&self) -> usize {
        self.bounds.len()
    }
    /// Map a point of [0,1]^k into the simulator's parameter ranges.
    pub fn native(&self, params: &Params) -> crate::Result<Vec<f64>> {
        if params.len() != self.arity() {
            return Err(crate::Error::InvalidStrategy(format!(
                "{} takes {} parameters, got {}",
                self.name,
                self.arity(),
                params.len()
            )));
        }
        Ok(self
            .bounds
            .iter()
            .zip(params.iter())
            .map(|(bound, x)| bound.map(*x))
            .collect())
    }
    pub fn validate(&self) -> crate::Result<()> {
        if self.bounds.is_empty() {
            return Err(crate::Error::Config(format!("{} has no parameters", self.name)));
        }
        match self.bounds.iter().all(|b| b.lo.is_finite() && b.hi.is_finite() && b.lo <= b.hi) {
            true => Ok(()),
            false => Err(crate::Error::Config(format!("{} has an empty range", self.name))),
        }
    }

    /// Attacker random-walk sampler: candidate count, logit precision, discount.
    pub fn attacker_random_walk() -> Self {
        Self {
            name: String::from("att_random_walk"),
            role: Role::Attacker,
            bounds: vec![
                Bound::integer(1., 200.),
                Bound::real(0.1, 10.),
                Bound::real(0.5, 1.),
            ],
        }
    }
    /// Defender random-walk sampler: candidate count, logit precision, discount.
    pub fn defender_random_walk() -> Self {
        Self {
            name: String::from("def_random_walk"),
            role: Role::Defender,
            bounds: vec![
                Bound::integer(1., 200.),
                Bound::real(0.1, 10.),
                Bound::real(0.5, 1.),
            ],
        }
    }
    /// Defender min-cut sampler: cut size fraction, logit precision, threshold.
    pub fn defender_min_cut() -> Self {
        Self {
            name: String::from("def_min_cut"),
            role: Role::Defender,
            bounds: vec![
                Bound::real(0., 1.),
                Bound::real(0.1, 10.),
                Bound::real(0., 1.),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners() {
        let family = Family::attacker_random_walk();
        let lo = family.native(&Params::clipped(vec![0., 0., 0.])).unwrap();
        let hi = family.native(&Params::clipped(vec![1., 1., 1.])).unwrap();
        assert_eq!(lo, vec![1., 0.1, 0.5]);
        assert_eq!(hi, vec![200., 10., 1.]);
    }

    #[test]
    fn rounding() {
        let family = Family::defender_random_walk();
        let native = family.native(&Params::clipped(vec![0.5, 0.5, 0.5])).unwrap();
        assert_eq!(native[0], native[0].round());
        assert!((native[1] - 5.05).abs() < 1e-12);
    }

    #[test]
    fn arity() {
        let family = Family::defender_min_cut();
        assert!(family.native(&Params::clipped(vec![0.5])).is_err());
    }

    #[test]
    fn degenerate() {
        let family = Family {
            name: String::from("broken"),
            role: Role::Defender,
            bounds: vec![Bound::real(1., 0.)],
        };
        assert!(family.validate().is_err());
        assert!(Family::defender_min_cut().validate().is_ok());
    }
}

use crate::strategy::*;
use crate::*;

/// Sample means and standard errors of both roles' payoffs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub def_mean: Utility,
    pub att_mean: Utility,
    pub def_stderr: Utility,
    pub att_stderr: Utility,
    pub samples: usize,
}

impl Estimate {
    pub fn mean(&self, role: Role) -> Utility {
        match role {
            Role::Defender => self.def_mean,
            Role::Attacker => self.att_mean,
        }
    }
}

impl TryFrom<&[(Utility, Utility)]> for Estimate {
    type Error = Error;
    fn try_from(samples: &[(Utility, Utility)]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::InvariantViolation(String::from("estimate from zero episodes")));
        }
        let defs = samples.iter().map(|(d, _)| *d).collect::<Vec<_>>();
        let atts = samples.iter().map(|(_, a)| *a).collect::<Vec<_>>();
        let (def_mean, def_stderr) = moments(&defs);
        let (att_mean, att_stderr) = moments(&atts);
        Ok(Self {
            def_mean,
            att_mean,
            def_stderr,
            att_stderr,
            samples: samples.len(),
        })
    }
}

/// Mean and standard error (sample standard deviation over sqrt(n)).
fn moments(xs: &[Utility]) -> (Utility, Utility) {
    let n = xs.len() as Utility;
    let mean = xs.iter().sum::<Utility>() / n;
    if xs.len() < 2 {
        return (mean, 0.);
    }
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<Utility>() / (n - 1.);
    (mean, var.sqrt() / n.sqrt())
}

impl std::fmt::Display for Estimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "def {:+.4} ± {:.4} │ att {:+.4} ± {:.4} │ n {}",
            self.def_mean, self.def_stderr, self.att_mean, self.att_stderr, self.samples
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton() {
        let e = Estimate::try_from(&[(3., -2.)][..]).unwrap();
        assert_eq!(e.def_mean, 3.);
        assert_eq!(e.att_mean, -2.);
        assert_eq!(e.def_stderr, 0.);
        assert_eq!(e.att_stderr, 0.);
    }

    #[test]
    fn spread() {
        let e = Estimate::try_from(&[(1., 0.), (3., 0.), (5., 0.), (7., 0.)][..]).unwrap();
        assert!((e.def_mean - 4.).abs() < 1e-12);
        // sample sd = sqrt(20/3), over sqrt(4)
        assert!((e.def_stderr - (20f64 / 3.).sqrt() / 2.).abs() < 1e-12);
        assert_eq!(e.att_stderr, 0.);
        assert_eq!(e.samples, 4);
    }

    #[test]
    fn empty() {
        let none: &[(Utility, Utility)] = &[];
        assert!(Estimate::try_from(none).is_err());
    }
}

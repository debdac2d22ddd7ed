use rand::Rng;
use rand_distr::Distribution;
use rand_distr::Normal;
use serde::Deserialize;
use serde::Serialize;

/// A point in the unit box [0,1]^k.
///
/// Search always happens in this normalized space; [`super::Family::native`]
/// maps a point to the simulator's own parameter ranges at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Params(Vec<f64>);

impl Params {
    /// Uniform random point in [0,1]^k.
    pub fn random<R: Rng>(k: usize, rng: &mut R) -> Self {
        Self((0..k).map(|_| rng.random::<f64>()).collect())
    }
    /// Gaussian perturbation of every coordinate, clipped back into the box.
    pub fn neighbor<R: Rng>(&self, noise: &Normal<f64>, rng: &mut R) -> Self {
        Self::clipped(self.0.iter().map(|x| x + noise.sample(rng)).collect())
    }
    /// Clamp every coordinate into [0,1]. NaN coordinates land on 0.
    pub fn clipped(xs: Vec<f64>) -> Self {
        Self(
            xs.into_iter()
                .map(|x| if x.is_nan() { 0. } else { x.clamp(0., 1.) })
                .collect(),
        )
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }
    pub fn bounded(&self) -> bool {
        self.0.iter().all(|x| (0. ..=1.).contains(x))
    }
}

impl std::ops::Index<usize> for Params {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl TryFrom<Vec<f64>> for Params {
    type Error = crate::Error;
    fn try_from(xs: Vec<f64>) -> Result<Self, Self::Error> {
        match xs.iter().all(|x| (0. ..=1.).contains(x)) {
            true => Ok(Self(xs)),
            false => Err(crate::Error::InvalidStrategy(format!(
                "parameters {:?} leave the unit box",
                xs
            ))),
        }
    }
}

impl From<Params> for Vec<f64> {
    fn from(params: Params) -> Self {
        params.0
    }
}

impl std::fmt::Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}]",
            self.0
                .iter()
                .map(|x| format!("{:.4}", x))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

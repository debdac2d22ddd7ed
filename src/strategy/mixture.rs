use crate::*;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// A probability distribution over named strategies of one role.
///
/// Every weight lies in (0,1] and the weights sum to one within
/// [`WEIGHT_TOLERANCE`]. Construction goes through [`Mixture::try_from`]
/// or [`Mixture::pruned`], both of which enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Probability>", into = "BTreeMap<String, Probability>")]
pub struct Mixture(BTreeMap<String, Probability>);

impl Mixture {
    /// All weight on a single strategy.
    pub fn pure(name: &str) -> Self {
        Self(BTreeMap::from([(name.to_string(), 1.)]))
    }
    pub fn uniform<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let n = names.len() as Probability;
        names
            .iter()
            .map(|s| (s.as_ref().to_string(), 1. / n))
            .collect::<BTreeMap<_, _>>()
            .pipe(Self::try_from)
    }
    /// Drop weights below [`WEIGHT_CUTOFF`], renormalize, then validate.
    pub fn pruned<I>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Probability)>,
    {
        let kept = weights
            .into_iter()
            .inspect(|(_, w)| debug_assert!(!w.is_nan()))
            .filter(|(_, w)| *w >= WEIGHT_CUTOFF)
            .collect::<BTreeMap<_, _>>();
        let total = kept.values().sum::<Probability>();
        if !(total > 0.) || !total.is_finite() {
            return Err(Error::InvalidMixture(String::from("no weight above cutoff")));
        }
        kept.into_iter()
            .map(|(s, w)| (s, w / total))
            .collect::<BTreeMap<_, _>>()
            .pipe(Self::try_from)
    }

    pub fn weight(&self, name: &str) -> Probability {
        self.0.get(name).copied().unwrap_or(0.)
    }
    pub fn support(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Probability)> {
        self.0.iter()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn total(&self) -> Probability {
        self.0.values().sum()
    }

    /// Draw one component name proportional to its weight.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> &str {
        let mut sum = 0.;
        let roll = rng.random::<Probability>() * self.total();
        for (name, weight) in self.0.iter() {
            sum += weight;
            if roll < sum {
                return name;
            }
        }
        self.0
            .keys()
            .next_back()
            .map(String::as_str)
            .expect("mixture is never empty")
    }

    /// Every component must be one of `names`.
    pub fn within<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        match self
            .0
            .keys()
            .find(|k| !names.iter().any(|n| n.as_ref() == k.as_str()))
        {
            Some(stray) => Err(Error::InvalidMixture(format!("unknown strategy {}", stray))),
            None => Ok(()),
        }
    }

    /// Tab-separated `<name>\t<weight>` lines, LF terminated.
    pub fn to_tsv(&self) -> String {
        self.0
            .iter()
            .map(|(name, weight)| format!("{}\t{}\n", name, weight))
            .collect()
    }
    pub fn from_tsv(text: &str) -> Result<Self> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let (name, weight) = line
                    .rsplit_once('\t')
                    .ok_or_else(|| Error::InvalidMixture(format!("missing tab in {:?}", line)))?;
                let weight = weight
                    .trim()
                    .parse::<Probability>()
                    .map_err(|e| Error::InvalidMixture(format!("{:?}: {}", line, e)))?;
                Ok((name.to_string(), weight))
            })
            .collect::<Result<BTreeMap<_, _>>>()?
            .pipe(Self::try_from)
    }
}

impl TryFrom<BTreeMap<String, Probability>> for Mixture {
    type Error = Error;
    fn try_from(weights: BTreeMap<String, Probability>) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidMixture(String::from("empty mixture")));
        }
        if let Some((name, w)) = weights.iter().find(|(_, w)| !(**w > 0. && **w <= 1.)) {
            return Err(Error::InvalidMixture(format!("weight {} on {}", w, name)));
        }
        let total = weights.values().sum::<Probability>();
        if (total - 1.).abs() > WEIGHT_TOLERANCE {
            return Err(Error::InvalidMixture(format!("weights sum to {}", total)));
        }
        Ok(Self(weights))
    }
}

impl From<Mixture> for BTreeMap<String, Probability> {
    fn from(mixture: Mixture) -> Self {
        mixture.0
    }
}

impl std::fmt::Display for Mixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .iter()
                .map(|(name, weight)| format!("{}:{:.3}", name, weight))
                .collect::<Vec<_>>()
                .join(" ")
        )
    }
}

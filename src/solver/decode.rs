use crate::game::*;
use crate::strategy::*;
use crate::*;

/// Decode the first `NE,` line of solver output into an equilibrium.
///
/// The line carries the defender's weights followed by the attacker's,
/// in snapshot order, as decimals or rationals `a/b`. Tiny weights are
/// pruned and the rest renormalized.
pub fn decode(output: &str, snapshot: &Snapshot) -> Result<Equilibrium> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("NE,"))
        .ok_or_else(|| Error::NoEquilibrium(String::from("solver reported no equilibrium")))?;
    let weights = line["NE,".len()..]
        .split(',')
        .map(probability)
        .collect::<Result<Vec<_>>>()?;
    let (rows, cols) = snapshot.shape();
    if weights.len() != rows + cols {
        return Err(Error::SolverFormat(format!(
            "expected {} weights for a {}x{} game, found {}",
            rows + cols,
            rows,
            cols,
            weights.len()
        )));
    }
    let (defender, attacker) = weights.split_at(rows);
    let mixture = |role: Role, weights: &[Probability]| {
        let total = weights.iter().sum::<Probability>();
        if (total - 1.).abs() > WEIGHT_TOLERANCE {
            return Err(Error::SolverFormat(format!("{} weights sum to {}", role, total)));
        }
        snapshot
            .strategies(role)
            .iter()
            .cloned()
            .zip(weights.iter().copied())
            .pipe(Mixture::pruned)
            .map_err(|e| Error::SolverFormat(format!("{} weights: {}", role, e)))
    };
    let equilibrium = Equilibrium {
        defender: mixture(Role::Defender, defender)?,
        attacker: mixture(Role::Attacker, attacker)?,
        version: snapshot.version(),
    };
    equilibrium.validate(snapshot)?;
    Ok(equilibrium)
}

fn probability(token: &str) -> Result<Probability> {
    let token = token.trim();
    let value = match token.split_once('/') {
        Some((num, den)) => number(num)? / number(den)?,
        None => number(token)?,
    };
    if value.is_finite() && (0. ..=1. + WEIGHT_TOLERANCE).contains(&value) {
        Ok(value)
    } else {
        Err(Error::SolverFormat(format!("weight {:?} out of range", token)))
    }
}

fn number(token: &str) -> Result<f64> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::SolverFormat(format!("not a number: {:?}", token)))
}

use crate::game::*;
use crate::strategy::*;

/// Gambit strategic-form encoding of a snapshot, outcome version.
///
/// Player 1 is the defender. Outcomes are listed with the defender's
/// strategy index varying fastest, and the trailing line maps each
/// contingency to its outcome in that same order.
pub fn nfg(snapshot: &Snapshot) -> String {
    let (rows, cols) = snapshot.shape();
    let names = |role: Role| {
        snapshot
            .strategies(role)
            .iter()
            .map(|s| quoted(s))
            .collect::<Vec<_>>()
            .join(" ")
    };
    let mut text = String::new();
    text.push_str(&format!(
        "NFG 1 R \"empirical game v{}\" {{ \"defender\" \"attacker\" }}\n\n",
        snapshot.version()
    ));
    text.push_str(&format!("{{ {{ {} }}\n", names(Role::Defender)));
    text.push_str(&format!("{{ {} }}\n}}\n\"\"\n\n{{\n", names(Role::Attacker)));
    for j in 0..cols {
        for i in 0..rows {
            let cell = snapshot.cell(i, j);
            text.push_str(&format!("{{ \"\" {}, {} }}\n", cell.defender, cell.attacker));
        }
    }
    text.push_str("}\n");
    text.push_str(
        &(1..=rows * cols)
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(" "),
    );
    text.push('\n');
    text
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lopsided() -> Snapshot {
        let mut g = EmpiricalGame::new();
        g.add_strategy(Role::Defender, "d0");
        g.add_strategy(Role::Defender, "d1");
        g.add_strategy(Role::Attacker, "a0");
        g.add_strategy(Role::Attacker, "a1");
        g.add_strategy(Role::Attacker, "a\"2");
        for (i, d) in ["d0", "d1"].iter().enumerate() {
            for (j, a) in ["a0", "a1", "a\"2"].iter().enumerate() {
                g.record(d, a, (10 * i + j) as f64, -0.5, 1).unwrap();
            }
        }
        g.snapshot().unwrap()
    }

    #[test]
    fn header() {
        let text = nfg(&lopsided());
        assert!(text.starts_with("NFG 1 R \""));
        assert!(text.contains("{ { \"d0\" \"d1\" }\n{ \"a0\" \"a1\" \"a\\\"2\" }\n}"));
    }

    #[test]
    fn ordering() {
        let text = nfg(&lopsided());
        let outcomes = text
            .lines()
            .filter(|l| l.starts_with("{ \"\""))
            .collect::<Vec<_>>();
        assert_eq!(
            outcomes,
            vec![
                "{ \"\" 0, -0.5 }",
                "{ \"\" 10, -0.5 }",
                "{ \"\" 1, -0.5 }",
                "{ \"\" 11, -0.5 }",
                "{ \"\" 2, -0.5 }",
                "{ \"\" 12, -0.5 }",
            ]
        );
        assert_eq!(text.lines().last(), Some("1 2 3 4 5 6"));
    }
}

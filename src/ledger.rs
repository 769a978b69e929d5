use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::Display,
    ops::{Deref, DerefMut},
};

/// Player name to score. Names are the only identity a player has.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger(BTreeMap<String, u32>);

impl Deref for ScoreLedger {
    type Target = BTreeMap<String, u32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ScoreLedger {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for ScoreLedger {
    fn from_iter<T: IntoIterator<Item = (S, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(name, score)| (name.into(), score)).collect())
    }
}

impl ScoreLedger {
    /// Add a player with 0 points. Returns false if the name was already known.
    pub fn register(&mut self, name: &str) -> bool {
        if self.0.contains_key(name) {
            return false;
        }
        self.0.insert(name.to_string(), 0);
        true
    }

    /// Overwrite everything with a ledger received from the host.
    pub fn replace(&mut self, other: ScoreLedger) {
        self.0 = other.0;
    }

    /// Add points to a player, registering them first if needed.
    pub fn credit(&mut self, name: &str, points: u32) -> u32 {
        let score = self.0.entry(name.to_string()).or_insert(0);
        *score = score.saturating_add(points);
        *score
    }

    pub fn score(&self, name: &str) -> Option<u32> {
        self.0.get(name).copied()
    }

    pub fn names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Highest score first, ties broken by name.
    pub fn standings(&self) -> Vec<(&str, u32)> {
        let mut standings: Vec<_> = self.0.iter().map(|(n, s)| (n.as_str(), *s)).collect();
        standings.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        standings
    }
}

impl Display for ScoreLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, score) in self.standings() {
            writeln!(f, "{name}: {score} pts")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_keeps_existing_score() {
        let mut ledger = ScoreLedger::default();
        assert!(ledger.register("A"));
        ledger.credit("A", 10);
        assert!(!ledger.register("A"));
        assert_eq!(ledger.score("A"), Some(10));
    }

    #[test]
    fn credit_unknown_player_registers_them() {
        let mut ledger = ScoreLedger::default();
        assert_eq!(ledger.credit("B", 10), 10);
        assert_eq!(ledger.credit("B", 10), 20);
    }

    #[test]
    fn replace_drops_names_missing_from_the_snapshot() {
        let mut ledger: ScoreLedger = [("H", 0), ("A", 10), ("B", 20)].into_iter().collect();
        ledger.replace([("H", 5), ("A", 0)].into_iter().collect());
        assert_eq!(ledger.names(), vec!["A".to_string(), "H".to_string()]);
        assert_eq!(ledger.score("H"), Some(5));
    }

    #[test]
    fn standings_are_best_first() {
        let ledger: ScoreLedger = [("c", 10), ("a", 0), ("b", 10)].into_iter().collect();
        assert_eq!(ledger.standings(), vec![("b", 10), ("c", 10), ("a", 0)]);
        assert_eq!(ledger.to_string(), "b: 10 pts\nc: 10 pts\na: 0 pts\n");
    }
}

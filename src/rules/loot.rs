use derive_more::{Add, Display, From, Into};
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    From,
    Into,
    Add,
    Display,
    Serialize,
    Deserialize,
)]
#[display("Cr{_0}")]
pub struct Credits(pub u64);

/// Splits a haul between crew members by share count, with an optional
/// number of shares held back for the ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootSplit {
    total: Credits,
    ship_shares: u32,
    members: Vec<(String, u32)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootShares {
    pub share: Credits,
    pub payouts: Vec<(String, Credits)>,
    /// The ship's own shares plus the remainder.
    pub ship: Credits,
    /// What could not be divided evenly; already counted in `ship`.
    pub remainder: Credits,
}

impl LootSplit {
    pub fn new(total: impl Into<Credits>) -> Self {
        Self {
            total: total.into(),
            ship_shares: 0,
            members: Vec::new(),
        }
    }

    pub fn member(mut self, name: &str, shares: u32) -> Self {
        self.members.push((name.to_string(), shares));
        self
    }

    pub fn ship_shares(mut self, shares: u32) -> Self {
        self.ship_shares = shares;
        self
    }

    pub fn total_shares(&self) -> u64 {
        self.members
            .iter()
            .map(|(_, shares)| u64::from(*shares))
            .sum::<u64>()
            + u64::from(self.ship_shares)
    }

    pub fn split(&self) -> anyhow::Result<LootShares> {
        let total_shares = self.total_shares();
        if total_shares == 0 {
            anyhow::bail!("Cannot split {} between zero shares", self.total);
        }
        let share = self.total.0 / total_shares;
        let remainder = self.total.0 - share * total_shares;
        let payouts = self
            .members
            .iter()
            .map(|(name, shares)| (name.clone(), Credits(share * u64::from(*shares))))
            .collect();
        Ok(LootShares {
            share: Credits(share),
            payouts,
            ship: Credits(share * u64::from(self.ship_shares) + remainder),
            remainder: Credits(remainder),
        })
    }
}

impl LootShares {
    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        writeln!(f, "One share is {}", self.share)?;
        for (name, payout) in &self.payouts {
            writeln!(f, "  {}: {}", name, payout)?;
        }
        write!(f, "  Ship: {} ({} left over)", self.ship, self.remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let shares = LootSplit::new(1000u64)
            .member("Alice", 1)
            .member("Bob", 1)
            .split()
            .unwrap();
        assert_eq!(shares.share, Credits(500));
        assert_eq!(
            shares.payouts,
            vec![
                ("Alice".to_string(), Credits(500)),
                ("Bob".to_string(), Credits(500))
            ]
        );
        assert_eq!(shares.ship, Credits(0));
        assert_eq!(shares.remainder, Credits(0));
    }

    #[test]
    fn test_split_with_ship_and_remainder() {
        let split = LootSplit::new(Credits(10_001))
            .member("Captain", 2)
            .member("Pilot", 1)
            .member("Gunner", 1)
            .ship_shares(1);
        assert_eq!(split.total_shares(), 5);
        let shares = split.split().unwrap();
        assert_eq!(shares.share, Credits(2000));
        assert_eq!(shares.payouts[0].1, Credits(4000));
        assert_eq!(shares.ship, Credits(2001));
        assert_eq!(shares.remainder, Credits(1));

        let paid = shares
            .payouts
            .iter()
            .fold(shares.ship, |acc, (_, payout)| acc + *payout);
        assert_eq!(paid, Credits(10_001));
    }

    #[test]
    fn test_zero_shares_is_an_error() {
        assert!(LootSplit::new(500u64).split().is_err());
        assert!(LootSplit::new(500u64).member("Nobody", 0).split().is_err());
    }

    #[test]
    fn test_credits_display() {
        assert_eq!(Credits(250).to_string(), "Cr250");
    }
}

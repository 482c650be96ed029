use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::dicepool::Dicepool;

/// Digits used for characteristic values in a UPP; I and O are skipped.
const EHEX: &[u8] = b"0123456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Highest value a single UPP digit can hold (`Z`).
pub const MAX_CHARACTERISTIC: u32 = EHEX.len() as u32 - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Characteristic {
    Strength,
    Dexterity,
    Endurance,
    Intelligence,
    Education,
    SocialStanding,
}

impl Characteristic {
    /// All characteristics in UPP order.
    pub fn all() -> Vec<Characteristic> {
        vec![
            Characteristic::Strength,
            Characteristic::Dexterity,
            Characteristic::Endurance,
            Characteristic::Intelligence,
            Characteristic::Education,
            Characteristic::SocialStanding,
        ]
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Characteristic::Strength => "STR",
            Characteristic::Dexterity => "DEX",
            Characteristic::Endurance => "END",
            Characteristic::Intelligence => "INT",
            Characteristic::Education => "EDU",
            Characteristic::SocialStanding => "SOC",
        }
    }
}

pub fn ehex_digit(value: u32) -> Option<char> {
    EHEX.get(value as usize).map(|&b| char::from(b))
}

pub fn ehex_value(digit: char) -> Option<u32> {
    let digit = digit.to_ascii_uppercase();
    EHEX.iter()
        .position(|&b| char::from(b) == digit)
        .map(|p| p as u32)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    values: FxHashMap<Characteristic, u32>,
}

impl Default for Characteristics {
    fn default() -> Self {
        let mut values = FxHashMap::default();
        for characteristic in Characteristic::all() {
            values.insert(characteristic, 7);
        }
        Characteristics { values }
    }
}

impl Characteristics {
    /// Rolls 2d6 for each characteristic, in UPP order.
    pub fn roll(pool: &mut Dicepool) -> crate::error::Result<Self> {
        let mut characteristics = Characteristics::default();
        for characteristic in Characteristic::all() {
            let value = pool.roll_safe("2d6")?;
            characteristics.set(characteristic, u32::try_from(value).unwrap_or(0));
        }
        Ok(characteristics)
    }

    pub fn with(mut self, characteristic: Characteristic, value: u32) -> Self {
        self.set(characteristic, value);
        self
    }

    pub fn get(&self, characteristic: Characteristic) -> u32 {
        self.values.get(&characteristic).copied().unwrap_or(7)
    }

    /// Values above [`MAX_CHARACTERISTIC`] are capped so the UPP stays readable.
    pub fn set(&mut self, characteristic: Characteristic, value: u32) {
        self.values
            .insert(characteristic, value.min(MAX_CHARACTERISTIC));
    }

    pub fn modifier(&self, characteristic: Characteristic) -> i32 {
        match self.get(characteristic) {
            0 => -3,
            1..=2 => -2,
            3..=5 => -1,
            6..=8 => 0,
            9..=11 => 1,
            12..=14 => 2,
            _ => 3,
        }
    }

    /// Universal Personality Profile, e.g. `"789A87"`.
    pub fn upp(&self) -> String {
        Characteristic::all()
            .into_iter()
            .map(|c| ehex_digit(self.get(c)).unwrap_or('?'))
            .collect()
    }

    pub fn from_upp(upp: &str) -> anyhow::Result<Self> {
        let digits: Vec<char> = upp.trim().chars().collect();
        if digits.len() != Characteristic::all().len() {
            anyhow::bail!("UPP {:?} must have exactly six digits", upp);
        }
        let mut characteristics = Characteristics::default();
        for (characteristic, digit) in Characteristic::all().into_iter().zip(digits) {
            let value = ehex_value(digit)
                .ok_or_else(|| anyhow::anyhow!("invalid UPP digit {:?} in {:?}", digit, upp))?;
            characteristics.set(characteristic, value);
        }
        Ok(characteristics)
    }
}

pub struct StatBlockBuilder {
    block: StatBlock,
}

impl StatBlockBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            block: StatBlock {
                name: name.to_string(),
                age: 18,
                characteristics: Characteristics::default(),
                skills: FxHashMap::default(),
                credits: 0,
            },
        }
    }

    pub fn age(mut self, age: u32) -> Self {
        self.block.age = age;
        self
    }

    pub fn characteristics(mut self, characteristics: Characteristics) -> Self {
        self.block.characteristics = characteristics;
        self
    }

    pub fn characteristic(mut self, characteristic: Characteristic, value: u32) -> Self {
        self.block.characteristics.set(characteristic, value);
        self
    }

    pub fn skill(mut self, skill: &str, level: u32) -> Self {
        self.block.skills.insert(skill.to_string(), level);
        self
    }

    pub fn credits(mut self, credits: u64) -> Self {
        self.block.credits = credits;
        self
    }

    pub fn build(self) -> StatBlock {
        self.block
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub name: String,
    pub age: u32,
    pub characteristics: Characteristics,
    pub skills: FxHashMap<String, u32>,
    pub credits: u64,
}

impl StatBlock {
    /// Skill level, or `None` if the character is untrained.
    pub fn skill(&self, skill: &str) -> Option<u32> {
        self.skills.get(skill).copied()
    }

    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        writeln!(f, "{} {} Age {}", self.name, self.characteristics.upp(), self.age)?;
        let mut skills: Vec<_> = self.skills.iter().collect();
        skills.sort();
        for (i, (skill, level)) in skills.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}-{}", skill, level)?;
        }
        if !self.skills.is_empty() {
            writeln!(f)?;
        }
        write!(f, "Cr{}", self.credits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_characteristics_default() {
        let characteristics = Characteristics::default();
        for characteristic in Characteristic::all() {
            assert_eq!(characteristics.get(characteristic), 7);
            assert_eq!(characteristics.modifier(characteristic), 0);
        }
        assert_eq!(characteristics.upp(), "777777");
    }

    #[test]
    fn test_characteristic_modifier_table() {
        let expected = [
            (0, -3),
            (1, -2),
            (2, -2),
            (3, -1),
            (5, -1),
            (6, 0),
            (8, 0),
            (9, 1),
            (11, 1),
            (12, 2),
            (14, 2),
            (15, 3),
            (20, 3),
        ];
        for (value, modifier) in expected {
            let characteristics = Characteristics::default().with(Characteristic::Strength, value);
            assert_eq!(characteristics.modifier(Characteristic::Strength), modifier);
        }
    }

    #[test]
    fn test_upp_round_trip() {
        let characteristics = Characteristics::from_upp("789AFJ").unwrap();
        assert_eq!(characteristics.get(Characteristic::Intelligence), 10);
        assert_eq!(characteristics.get(Characteristic::Education), 15);
        assert_eq!(characteristics.get(Characteristic::SocialStanding), 18);
        assert_eq!(characteristics.upp(), "789AFJ");
    }

    #[test]
    fn test_large_values_are_capped() {
        let characteristics = Characteristics::default()
            .with(Characteristic::Strength, 40)
            .with(Characteristic::SocialStanding, MAX_CHARACTERISTIC);
        assert_eq!(characteristics.get(Characteristic::Strength), 33);
        assert_eq!(characteristics.upp(), "Z7777Z");
        assert_eq!(
            Characteristics::from_upp(&characteristics.upp()).unwrap(),
            characteristics
        );
    }

    #[test]
    fn test_upp_rejects_bad_input() {
        assert!(Characteristics::from_upp("789A8").is_err());
        assert!(Characteristics::from_upp("789AI7").is_err());
    }

    #[test]
    fn test_rolled_characteristics_in_range() {
        let mut pool = Dicepool::new("chargen");
        for _ in 0..100 {
            let characteristics = Characteristics::roll(&mut pool).unwrap();
            for characteristic in Characteristic::all() {
                assert!((2..=12).contains(&characteristics.get(characteristic)));
            }
        }
    }

    #[test]
    fn test_stat_block_builder() {
        let block = StatBlockBuilder::new("Jamison")
            .age(34)
            .characteristic(Characteristic::Dexterity, 9)
            .skill("Pilot", 2)
            .skill("Vacc Suit", 0)
            .credits(1200)
            .build();
        assert_eq!(block.skill("Pilot"), Some(2));
        assert_eq!(block.skill("Gun Combat"), None);

        let mut out = String::new();
        block.pretty_print(&mut out).unwrap();
        assert_eq!(out, "Jamison 797777 Age 34\nPilot-2, Vacc Suit-0\nCr1200");
    }
}

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    error::{DiceError, EvaluationError, ValidationError},
    roller::Roller,
};

/// Draws allowed for a single die before a reroll is declared impossible.
pub const MAX_REROLL_ATTEMPTS: u32 = 1000;

/// Largest number of dice a single expression may roll.
pub const MAX_DICE: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SumModifier {
    Additive,
    Multiplicative,
    /// Integer division of the sum.
    Deletive,
    /// Added to every die before drops are chosen.
    Individual,
    DropLow,
    DropHigh,
    SumMinimum,
    SumMaximum,
}

impl SumModifier {
    /// The value that leaves a roll unchanged, if there is one.
    pub fn neutral(self) -> Option<i64> {
        match self {
            SumModifier::Additive
            | SumModifier::Individual
            | SumModifier::DropLow
            | SumModifier::DropHigh => Some(0),
            SumModifier::Multiplicative | SumModifier::Deletive => Some(1),
            SumModifier::SumMinimum | SumModifier::SumMaximum => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            SumModifier::Additive => "+",
            SumModifier::Multiplicative => "x",
            SumModifier::Deletive => "/",
            SumModifier::Individual => "i",
            SumModifier::DropLow => "dl",
            SumModifier::DropHigh => "dh",
            SumModifier::SumMinimum => "min",
            SumModifier::SumMaximum => "max",
        }
    }
}

/// A parsed `NdF...` expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumDirectives {
    pub num: u32,
    pub faces: u32,
    pub sum_mods: BTreeMap<SumModifier, i64>,
    pub replace: BTreeMap<i64, i64>,
    pub reroll: BTreeSet<i64>,
}

impl SumDirectives {
    pub fn new(num: u32, faces: u32) -> Self {
        Self {
            num,
            faces,
            sum_mods: BTreeMap::new(),
            replace: BTreeMap::new(),
            reroll: BTreeSet::new(),
        }
    }

    pub fn with_modifier(mut self, kind: SumModifier, value: i64) -> Self {
        self.sum_mods.insert(kind, value);
        self
    }

    pub fn with_replace(mut self, from: i64, to: i64) -> Self {
        self.replace.insert(from, to);
        self
    }

    pub fn with_reroll(mut self, value: i64) -> Self {
        self.reroll.insert(value);
        self
    }

    pub fn modifier(&self, kind: SumModifier) -> Option<i64> {
        self.sum_mods.get(&kind).copied()
    }

    fn modifier_or_neutral(&self, kind: SumModifier) -> i64 {
        self.modifier(kind)
            .or_else(|| kind.neutral())
            .unwrap_or_default()
    }

    fn drop_count(&self, kind: SumModifier) -> usize {
        usize::try_from(self.modifier_or_neutral(kind).max(0)).unwrap_or(usize::MAX)
    }

    /// Checks the dice themselves, leaving drop counts to the evaluator.
    pub fn validate_dice(&self) -> Result<(), ValidationError> {
        if self.num == 0 || self.num > MAX_DICE {
            return Err(ValidationError::InvalidDiceCount(self.num));
        }
        if self.faces == 0 {
            return Err(ValidationError::InvalidFaceCount(self.faces));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_dice()?;
        let dropped = self
            .drop_count(SumModifier::DropLow)
            .saturating_add(self.drop_count(SumModifier::DropHigh));
        if dropped >= self.num as usize {
            return Err(ValidationError::InvalidDropCount {
                dropped: u32::try_from(dropped).unwrap_or(u32::MAX),
                num: self.num,
            });
        }
        Ok(())
    }

    /// Rolls the directives. Drop counts are not validated up front; dropping
    /// every die fails with [`EvaluationError::AllDiceDropped`].
    pub fn roll(&self, roller: &mut Roller) -> Result<SumRoll, DiceError> {
        self.validate_dice()?;

        let individual = self.modifier_or_neutral(SumModifier::Individual);
        let mut dice = Vec::with_capacity(self.num as usize);
        for _ in 0..self.num {
            let value = self.reroll_die(roller)?;
            let value = self.replace.get(&value).copied().unwrap_or(value);
            dice.push(value.saturating_add(individual));
        }
        dice.sort_unstable();

        let drop_low = self.drop_count(SumModifier::DropLow);
        if drop_low > 0 {
            if drop_low >= dice.len() {
                return Err(EvaluationError::AllDiceDropped {
                    dropped: u32::try_from(drop_low).unwrap_or(u32::MAX),
                    remaining: dice.len(),
                }
                .into());
            }
            dice.drain(..drop_low);
        }
        let drop_high = self.drop_count(SumModifier::DropHigh);
        if drop_high > 0 {
            if drop_high >= dice.len() {
                return Err(EvaluationError::AllDiceDropped {
                    dropped: u32::try_from(drop_high).unwrap_or(u32::MAX),
                    remaining: dice.len(),
                }
                .into());
            }
            dice.truncate(dice.len() - drop_high);
        }

        let mut total = dice.iter().fold(0i64, |acc, &die| acc.saturating_add(die));
        total = total.saturating_add(self.modifier_or_neutral(SumModifier::Additive));
        total = total.saturating_mul(self.modifier_or_neutral(SumModifier::Multiplicative));
        let divisor = self.modifier_or_neutral(SumModifier::Deletive);
        if divisor != 0 {
            total = total.saturating_div(divisor);
        }
        if let Some(minimum) = self.modifier(SumModifier::SumMinimum) {
            total = total.max(minimum);
        }
        if let Some(maximum) = self.modifier(SumModifier::SumMaximum) {
            total = total.min(maximum);
        }

        Ok(SumRoll { total, dice })
    }

    fn reroll_die(&self, roller: &mut Roller) -> Result<i64, EvaluationError> {
        let mut value = i64::from(roller.d(self.faces));
        let mut attempts = 0;
        while self.reroll.contains(&value) {
            if attempts == MAX_REROLL_ATTEMPTS {
                return Err(EvaluationError::ImpossibleReroll {
                    faces: self.faces,
                    attempts,
                });
            }
            attempts += 1;
            log::trace!("rerolling {} on d{}", value, self.faces);
            value = i64::from(roller.d(self.faces));
        }
        Ok(value)
    }

    /// Writes the expression back out in canonical form.
    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(f, "{}d{}", self.num, self.faces)?;
        if !self.reroll.is_empty() {
            write!(f, "rr")?;
            write_list(f, self.reroll.iter())?;
        }
        let mut targets: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for (&from, &to) in &self.replace {
            targets.entry(to).or_default().push(from);
        }
        for (to, sources) in targets {
            write!(f, "r")?;
            write_list(f, sources.iter())?;
            write!(f, ":{}", to)?;
        }
        for (&kind, &value) in &self.sum_mods {
            match kind {
                SumModifier::Additive if value >= 0 => write!(f, "+{}", value)?,
                SumModifier::Additive => write!(f, "{}", value)?,
                _ => write!(f, "{}{}", kind.token(), value)?,
            }
        }
        Ok(())
    }
}

fn write_list<'a>(
    f: &mut impl std::fmt::Write,
    values: impl Iterator<Item = &'a i64>,
) -> std::fmt::Result {
    for (i, value) in values.enumerate() {
        if i > 0 {
            write!(f, ";")?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

impl std::str::FromStr for SumDirectives {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::roll_parser::parse_sum(s)
    }
}

/// Outcome of a sum-mode roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumRoll {
    pub total: i64,
    /// Surviving dice, ascending, after per-die transforms and drops.
    pub dice: Vec<i64>,
}

impl SumRoll {
    pub fn dice_sum(&self) -> i64 {
        self.dice.iter().sum()
    }

    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, die) in self.dice.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", die)?;
        }
        write!(f, "] = {}", self.total)
    }
}

/// A parsed `dDIGITS` expression: one die per digit position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcatDirectives {
    pub faces: Vec<u32>,
    pub mods: Vec<i64>,
}

impl ConcatDirectives {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.faces.is_empty() {
            return Err(ValidationError::InvalidDiceCount(0));
        }
        match self.faces.iter().find(|&&faces| faces == 0) {
            Some(&faces) => Err(ValidationError::InvalidFaceCount(faces)),
            None => Ok(()),
        }
    }

    pub fn roll(&self, roller: &mut Roller) -> Result<ConcatRoll, DiceError> {
        self.validate()?;
        let digits = self
            .faces
            .iter()
            .enumerate()
            .map(|(i, &faces)| {
                let value = i64::from(roller.d(faces))
                    .saturating_add(self.mods.get(i).copied().unwrap_or(0))
                    .clamp(0, 9);
                char::from(b'0' + value as u8)
            })
            .collect();
        Ok(ConcatRoll { digits })
    }

    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(f, "d")?;
        for faces in &self.faces {
            write!(f, "{}", faces)?;
        }
        for modifier in &self.mods {
            write!(f, "{:+}", modifier)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ConcatDirectives {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::roll_parser::parse_concat(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcatRoll {
    pub digits: String,
}

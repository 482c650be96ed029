use crate::{
    error::Result,
    roll_parser::{parse_concat, parse_sum},
    roller::Roller,
    rules::dice::{ConcatRoll, SumRoll},
};

/// A dice pool owning its own random source.
///
/// Every successful roll replaces the retained results; failed rolls leave
/// them untouched. Share a pool between threads only behind a lock, since
/// draws have to happen in order for a seed to be reproducible.
#[derive(Debug)]
pub struct Dicepool {
    roller: Roller,
    last_result: Vec<i64>,
    last_modified_sum: i64,
    last_concat_roll: String,
}

impl Dicepool {
    pub fn new(seed: &str) -> Self {
        Self::from_roller(Roller::from_seed_str(seed))
    }

    pub fn from_entropy() -> Self {
        Self::from_roller(Roller::new())
    }

    pub fn from_roller(roller: Roller) -> Self {
        Self {
            roller,
            last_result: Vec::new(),
            last_modified_sum: 0,
            last_concat_roll: String::new(),
        }
    }

    /// Rolls a sum-mode expression and returns the full outcome.
    pub fn evaluate(&mut self, expression: &str) -> Result<SumRoll> {
        let directives = parse_sum(expression)?;
        let roll = directives.roll(&mut self.roller)?;
        log::debug!("{} -> {:?}", expression, roll);
        self.last_result.clone_from(&roll.dice);
        self.last_modified_sum = roll.total;
        Ok(roll)
    }

    /// Rolls a concatenation expression and returns the full outcome.
    pub fn evaluate_concat(&mut self, expression: &str) -> Result<ConcatRoll> {
        let directives = parse_concat(expression)?;
        let roll = directives.roll(&mut self.roller)?;
        log::debug!("{} -> {}", expression, roll.digits);
        self.last_concat_roll.clone_from(&roll.digits);
        Ok(roll)
    }

    pub fn roll_safe(&mut self, expression: &str) -> Result<i64> {
        self.evaluate(expression).map(|roll| roll.total)
    }

    pub fn concat_roll_safe(&mut self, expression: &str) -> Result<String> {
        self.evaluate_concat(expression).map(|roll| roll.digits)
    }

    /// Like [`Dicepool::roll_safe`], for expressions known to be valid.
    ///
    /// # Panics
    /// Panics if the expression fails to parse or roll.
    pub fn roll(&mut self, expression: &str) -> i64 {
        self.roll_safe(expression)
            .unwrap_or_else(|e| panic!("failed to roll {:?}: {}", expression, e))
    }

    /// Like [`Dicepool::concat_roll_safe`], for expressions known to be valid.
    ///
    /// # Panics
    /// Panics if the expression fails to parse or roll.
    pub fn concat_roll(&mut self, expression: &str) -> String {
        self.concat_roll_safe(expression)
            .unwrap_or_else(|e| panic!("failed to roll {:?}: {}", expression, e))
    }

    pub fn last_roll(&self) -> i64 {
        self.last_modified_sum
    }

    pub fn last_concat_roll(&self) -> &str {
        &self.last_concat_roll
    }

    /// Surviving dice of the last sum-mode roll, ascending.
    pub fn result(&self) -> &[i64] {
        &self.last_result
    }
}

fn pool(seed: Option<&str>) -> Dicepool {
    match seed {
        Some(seed) => Dicepool::new(seed),
        None => Dicepool::from_entropy(),
    }
}

pub fn roll_safe(expression: &str, seed: Option<&str>) -> Result<i64> {
    pool(seed).roll_safe(expression)
}

pub fn concat_roll_safe(expression: &str, seed: Option<&str>) -> Result<String> {
    pool(seed).concat_roll_safe(expression)
}

/// # Panics
/// Panics if the expression fails to parse or roll.
pub fn roll(expression: &str, seed: Option<&str>) -> i64 {
    pool(seed).roll(expression)
}

/// # Panics
/// Panics if the expression fails to parse or roll.
pub fn concat_roll(expression: &str, seed: Option<&str>) -> String {
    pool(seed).concat_roll(expression)
}

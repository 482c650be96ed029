use thiserror::Error;

/// Structural problems found while reading a dice expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing base clause in {0:?} (expected `NdF` or `dDIGITS`)")]
    MissingBase(String),

    #[error("malformed number {0:?}")]
    MalformedNumber(String),

    #[error("directive `{0}` may only be given once")]
    DuplicateDirective(&'static str),

    #[error("replacement for {0} is specified more than once")]
    DuplicateReplace(i64),

    #[error("{given} modifiers given for {positions} digit positions")]
    TooManyModifiers { given: usize, positions: usize },

    #[error("unrecognized tokens: {0:?}")]
    UnrecognizedTokens(String),
}

/// A parsed expression that cannot describe a legal roll.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid dice count {0}: must roll between 1 and {max} dice", max = crate::rules::dice::MAX_DICE)]
    InvalidDiceCount(u32),

    #[error("invalid face count {0}: dice need at least one face")]
    InvalidFaceCount(u32),

    #[error("cannot drop {dropped} of {num} dice")]
    InvalidDropCount { dropped: u32, num: u32 },
}

/// Failures that only show up while the dice are being rolled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("gave up rerolling a d{faces} after {attempts} attempts")]
    ImpossibleReroll { faces: u32, attempts: u32 },

    #[error("dropping {dropped} dice would leave none of {remaining}")]
    AllDiceDropped { dropped: u32, remaining: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid roll: {0}")]
    Validation(#[from] ValidationError),

    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

pub type Result<T> = std::result::Result<T, DiceError>;

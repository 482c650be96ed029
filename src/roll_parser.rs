use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, one_of},
    combinator::{map, opt, recognize},
    multi::separated_list1,
    sequence::{preceded, separated_pair},
};

use crate::{
    error::{DiceError, ParseError},
    rules::dice::{ConcatDirectives, SumDirectives, SumModifier},
};

/// One modifier lexeme, with its numbers still as text.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Reroll(Vec<&'a str>),
    Replace(Vec<&'a str>, &'a str),
    DropLow(&'a str),
    DropHigh(&'a str),
    Individual(&'a str),
    Minimum(&'a str),
    Maximum(&'a str),
    Multiply(&'a str),
    Divide(&'a str),
    Add(&'a str),
}

/// Parses a sum-mode expression such as `3d6+2` or `2d6r1:2dh1x2`.
pub fn parse_sum(expression: &str) -> Result<SumDirectives, DiceError> {
    let normalized = expression.trim().to_lowercase();
    let (rest, (num, faces)) = sum_base(&normalized)
        .map_err(|_| ParseError::MissingBase(normalized.clone()))?;
    let mut directives = SumDirectives::new(count(num)?, count(faces)?);

    let (tokens, leftover) = scan(rest, modifier);

    let mut additive = 0i64;
    let mut individual = 0i64;
    let mut multiplicative = 1i64;
    let mut deletive = 1i64;
    for token in tokens {
        match token {
            Token::Reroll(values) => {
                for v in values {
                    directives.reroll.insert(value(v)?);
                }
            }
            Token::Replace(sources, target) => {
                let target = value(target)?;
                for source in sources {
                    let source = value(source)?;
                    if directives.replace.insert(source, target).is_some() {
                        return Err(ParseError::DuplicateReplace(source).into());
                    }
                }
            }
            Token::DropLow(v) => set_once(&mut directives, SumModifier::DropLow, value(v)?)?,
            Token::DropHigh(v) => set_once(&mut directives, SumModifier::DropHigh, value(v)?)?,
            Token::Minimum(v) => set_once(&mut directives, SumModifier::SumMinimum, value(v)?)?,
            Token::Maximum(v) => set_once(&mut directives, SumModifier::SumMaximum, value(v)?)?,
            Token::Individual(v) => individual = individual.saturating_add(value(v)?),
            Token::Multiply(v) => multiplicative = multiplicative.saturating_mul(value(v)?),
            Token::Divide(v) => deletive = deletive.saturating_mul(value(v)?),
            Token::Add(v) => additive = additive.saturating_add(value(v)?),
        }
    }

    if !leftover.is_empty() {
        return Err(ParseError::UnrecognizedTokens(leftover).into());
    }

    for (kind, total) in [
        (SumModifier::Additive, additive),
        (SumModifier::Individual, individual),
        (SumModifier::Multiplicative, multiplicative),
        (SumModifier::Deletive, deletive),
    ] {
        if Some(total) != kind.neutral() {
            directives.sum_mods.insert(kind, total);
        }
    }

    directives.validate()?;
    log::debug!("parsed {:?} into {:?}", expression, directives);
    Ok(directives)
}

/// Parses a concatenation expression such as `d66` or `d69+1-1`.
///
/// Each digit after the `d` is one die; the n-th signed number that follows
/// is added to the n-th die.
pub fn parse_concat(expression: &str) -> Result<ConcatDirectives, DiceError> {
    let normalized = expression.trim().to_lowercase();
    let (rest, digits) = concat_base(&normalized)
        .map_err(|_| ParseError::MissingBase(normalized.clone()))?;
    let faces: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    let (tokens, leftover) = scan(rest, additive);
    if tokens.len() > faces.len() {
        return Err(ParseError::TooManyModifiers {
            given: tokens.len(),
            positions: faces.len(),
        }
        .into());
    }
    if !leftover.is_empty() {
        return Err(ParseError::UnrecognizedTokens(leftover).into());
    }

    let mut mods = tokens
        .into_iter()
        .map(value)
        .collect::<Result<Vec<_>, _>>()?;
    mods.resize(faces.len(), 0);

    let directives = ConcatDirectives { faces, mods };
    directives.validate()?;
    log::debug!("parsed {:?} into {:?}", expression, directives);
    Ok(directives)
}

fn set_once(
    directives: &mut SumDirectives,
    kind: SumModifier,
    value: i64,
) -> Result<(), ParseError> {
    match directives.sum_mods.insert(kind, value) {
        Some(_) => Err(ParseError::DuplicateDirective(kind.token())),
        None => Ok(()),
    }
}

/// Runs `token` over the input until it is used up.
///
/// Characters where no token starts are collected in order and returned as
/// the leftover text; whitespace between tokens is ignored.
fn scan<'a, T>(
    input: &'a str,
    mut token: impl FnMut(&'a str) -> IResult<&'a str, T>,
) -> (Vec<T>, String) {
    let mut tokens = Vec::new();
    let mut leftover = String::new();
    let mut rest = input;
    loop {
        rest = rest.trim_start();
        let Some(first) = rest.chars().next() else {
            break;
        };
        match token(rest) {
            Ok((remaining, parsed)) => {
                tokens.push(parsed);
                rest = remaining;
            }
            Err(_) => {
                leftover.push(first);
                rest = &rest[first.len_utf8()..];
            }
        }
    }
    (tokens, leftover)
}

fn count(digits: &str) -> Result<u32, ParseError> {
    digits
        .parse()
        .map_err(|_| ParseError::MalformedNumber(digits.to_string()))
}

fn value(digits: &str) -> Result<i64, ParseError> {
    digits
        .parse()
        .map_err(|_| ParseError::MalformedNumber(digits.to_string()))
}

fn sum_base(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(digit1, char('d'), digit1).parse(input)
}

fn concat_base(input: &str) -> IResult<&str, &str> {
    preceded(char('d'), digit1).parse(input)
}

fn signed(input: &str) -> IResult<&str, &str> {
    recognize((opt(one_of("+-")), digit1)).parse(input)
}

fn additive(input: &str) -> IResult<&str, &str> {
    recognize((one_of("+-"), digit1)).parse(input)
}

fn value_list(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(';'), signed).parse(input)
}

fn modifier(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        map(preceded(tag("rr"), value_list), Token::Reroll),
        map(
            preceded(char('r'), separated_pair(value_list, char(':'), signed)),
            |(sources, target)| Token::Replace(sources, target),
        ),
        map(preceded(tag("dl"), digit1), Token::DropLow),
        map(preceded(tag("dh"), digit1), Token::DropHigh),
        map(preceded(char('i'), signed), Token::Individual),
        map(preceded(tag("min"), signed), Token::Minimum),
        map(preceded(tag("max"), signed), Token::Maximum),
        map(preceded(char('x'), signed), Token::Multiply),
        map(preceded(char('/'), signed), Token::Divide),
        map(additive, Token::Add),
    ))
    .parse(input)
}

use chrono::TimeDelta;
use nom::{
    IResult, Parser,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res},
    sequence::separated_pair,
};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_DAY: u64 = 86_400;
pub const DAYS_PER_YEAR: u64 = 365;
pub const SECONDS_PER_YEAR: u64 = SECONDS_PER_DAY * DAYS_PER_YEAR;

/// A date in the Imperial calendar: `DDD-YYYY`, days numbered 1 to 365.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImperialDate {
    pub year: u32,
    pub day: u16,
}

impl ImperialDate {
    pub fn new(day: u16, year: u32) -> anyhow::Result<Self> {
        if day == 0 || u64::from(day) > DAYS_PER_YEAR {
            anyhow::bail!("Day {} is outside 001-{}", day, DAYS_PER_YEAR);
        }
        Ok(Self { year, day })
    }
}

impl std::fmt::Display for ImperialDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}-{}", self.day, self.year)
    }
}

impl std::str::FromStr for ImperialDate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match all_consuming(imperial_date).parse(s.trim()) {
            Ok((_, (day, year))) => ImperialDate::new(day, year),
            Err(_) => Err(anyhow::anyhow!("Failed to parse Imperial date {:?}", s)),
        }
    }
}

fn imperial_date(input: &str) -> IResult<&str, (u16, u32)> {
    separated_pair(
        map_res(digit1, |s: &str| s.parse::<u16>()),
        char('-'),
        map_res(digit1, |s: &str| s.parse::<u32>()),
    )
    .parse(input)
}

/// Game time as a tick counter, one tick per second since 001-0000 00:00.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImperialClock {
    ticks: u64,
}

impl ImperialClock {
    pub fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Midnight at the start of `date`.
    pub fn at(date: ImperialDate) -> Self {
        let ticks = u64::from(date.year) * SECONDS_PER_YEAR
            + (u64::from(date.day) - 1) * SECONDS_PER_DAY;
        Self { ticks }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn date(&self) -> ImperialDate {
        let year = self.ticks / SECONDS_PER_YEAR;
        let day = (self.ticks % SECONDS_PER_YEAR) / SECONDS_PER_DAY + 1;
        ImperialDate {
            year: u32::try_from(year).unwrap_or(u32::MAX),
            day: day as u16,
        }
    }

    /// Hours, minutes and seconds since midnight.
    pub fn time_of_day(&self) -> (u8, u8, u8) {
        let seconds = self.ticks % SECONDS_PER_DAY;
        (
            (seconds / 3600) as u8,
            (seconds % 3600 / 60) as u8,
            (seconds % 60) as u8,
        )
    }

    /// Moves the clock; going back past the epoch stops at zero.
    pub fn advance(&mut self, by: TimeDelta) {
        let seconds = by.num_seconds();
        self.ticks = if seconds >= 0 {
            self.ticks.saturating_add(seconds.unsigned_abs())
        } else {
            self.ticks.saturating_sub(seconds.unsigned_abs())
        };
    }

    /// Whole days from now until midnight of `date`; negative if it has passed.
    pub fn days_until(&self, date: ImperialDate) -> i64 {
        let target = Self::at(date).ticks as i128;
        let now = self.ticks as i128;
        ((target - now).div_euclid(SECONDS_PER_DAY as i128)) as i64
    }
}

impl std::fmt::Display for ImperialClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hours, minutes, _) = self.time_of_day();
        write!(f, "{} {:02}:{:02}", self.date(), hours, minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date: ImperialDate = "001-1105".parse().unwrap();
        assert_eq!(date, ImperialDate { year: 1105, day: 1 });
        assert_eq!(date.to_string(), "001-1105");

        let date: ImperialDate = " 365-1106 ".parse().unwrap();
        assert_eq!(date.day, 365);
    }

    #[test]
    fn test_parse_date_rejects_bad_days() {
        assert!("000-1105".parse::<ImperialDate>().is_err());
        assert!("366-1105".parse::<ImperialDate>().is_err());
        assert!("12/1105".parse::<ImperialDate>().is_err());
        assert!("123-1105x".parse::<ImperialDate>().is_err());
    }

    #[test]
    fn test_clock_round_trip() {
        let date = ImperialDate::new(187, 1105).unwrap();
        let clock = ImperialClock::at(date);
        assert_eq!(clock.date(), date);
        assert_eq!(clock.time_of_day(), (0, 0, 0));
    }

    #[test]
    fn test_clock_advance_across_year() {
        let mut clock = ImperialClock::at(ImperialDate::new(365, 1105).unwrap());
        clock.advance(TimeDelta::hours(25) + TimeDelta::minutes(30));
        assert_eq!(clock.date(), ImperialDate::new(2, 1106).unwrap());
        assert_eq!(clock.time_of_day(), (1, 30, 0));
        assert_eq!(clock.to_string(), "002-1106 01:30");
    }

    #[test]
    fn test_clock_advance_backwards_saturates() {
        let mut clock = ImperialClock::from_ticks(100);
        clock.advance(TimeDelta::seconds(-50));
        assert_eq!(clock.ticks(), 50);
        clock.advance(TimeDelta::days(-1));
        assert_eq!(clock.ticks(), 0);
    }

    #[test]
    fn test_days_until() {
        let mut clock = ImperialClock::at(ImperialDate::new(100, 1105).unwrap());
        assert_eq!(clock.days_until(ImperialDate::new(107, 1105).unwrap()), 7);
        assert_eq!(clock.days_until(ImperialDate::new(100, 1106).unwrap()), 365);
        clock.advance(TimeDelta::hours(12));
        assert_eq!(clock.days_until(ImperialDate::new(101, 1105).unwrap()), 0);
        assert_eq!(clock.days_until(ImperialDate::new(99, 1105).unwrap()), -2);
    }
}

pub mod calendar;
pub mod dicepool;
pub mod error;
pub mod roll_parser;
pub mod roller;
pub mod rules;
pub mod worlds;

pub mod prelude {
    pub use crate::{
        calendar::{ImperialClock, ImperialDate},
        dicepool::{Dicepool, concat_roll, concat_roll_safe, roll, roll_safe},
        error::{DiceError, EvaluationError, ParseError, ValidationError},
        roll_parser::{parse_concat, parse_sum},
        roller::Roller,
        rules::{
            characteristics::{Characteristic, Characteristics, StatBlock, StatBlockBuilder},
            dice::{ConcatDirectives, ConcatRoll, SumDirectives, SumModifier, SumRoll},
            loot::{Credits, LootShares, LootSplit},
        },
        worlds::{Coordinates, MapService, World, decode_worlds, import_worlds, store::JsonStore},
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_session() -> anyhow::Result<()> {
        let mut pool = Dicepool::new("session");

        let characteristics = Characteristics::roll(&mut pool)?;
        let pilot = StatBlockBuilder::new("Pilot")
            .characteristics(characteristics)
            .skill("Pilot", 1)
            .build();
        assert_eq!(pilot.characteristics.upp().len(), 6);

        let dm = i64::from(pilot.characteristics.modifier(Characteristic::Dexterity));
        let check = pool.roll_safe(&format!("2d6{:+}", dm + 1))?;
        assert_eq!(check, pool.result().iter().sum::<i64>() + dm + 1);

        let haul = pool.roll_safe("3d6x1000")?;
        let shares = LootSplit::new(Credits(haul as u64))
            .member("Pilot", 2)
            .member("Gunner", 1)
            .ship_shares(1)
            .split()?;
        let paid = shares
            .payouts
            .iter()
            .fold(shares.ship, |acc, (_, payout)| acc + *payout);
        assert_eq!(paid, Credits(haul as u64));

        let mut clock = ImperialClock::at("001-1105".parse()?);
        let jump_days = pool.roll_safe("1d6+167")? / 24;
        clock.advance(chrono::TimeDelta::days(jump_days));
        assert_eq!(clock.date().day as i64, 1 + jump_days);

        let table_entry = pool.concat_roll_safe("d66")?;
        assert_eq!(table_entry.len(), 2);
        Ok(())
    }
}

pub mod characteristics;
pub mod dice;
pub mod loot;

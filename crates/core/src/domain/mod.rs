pub mod contract;
pub mod deck;
pub mod loadout;

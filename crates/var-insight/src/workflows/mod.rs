pub mod acquisition;
pub mod roster;

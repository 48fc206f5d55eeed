pub mod dice;
pub mod record;

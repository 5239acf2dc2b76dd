pub mod journey;
pub mod palette;

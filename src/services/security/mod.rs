pub mod antinuke;
pub mod raid;

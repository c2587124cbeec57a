mod fuzzy;

pub use fuzzy::CommandSearch;

pub mod match_updates;
pub mod matches;

pub mod matches;
pub mod media;
pub mod overlay;

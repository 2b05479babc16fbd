pub mod camera_feed;
pub mod editable_field;
pub mod match_state;
pub mod match_store;
pub mod matches;
pub mod scoreboard;

//! State module for tracking crawl progress
//!
//! `ItemState` tracks each identifier from the moment it is read until it reaches
//! a terminal outcome. The checkpoint store persists these states between runs.

mod item_state;

pub use item_state::ItemState;

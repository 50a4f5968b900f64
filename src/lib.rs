pub mod ai;
pub mod bookmarks;
pub mod capabilities;
pub mod config;
pub mod dictionary;
pub mod entry;
pub mod storage;
pub mod theme;
pub mod types;

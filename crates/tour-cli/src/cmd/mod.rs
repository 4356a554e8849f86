pub mod complete;
pub mod config;
pub mod init;
pub mod list;
pub mod play;
pub mod prefs;
pub mod progress;
pub mod reset;
pub mod show;
pub mod status;
pub mod visit;

pub mod assets;
pub mod messages;

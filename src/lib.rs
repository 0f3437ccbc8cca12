pub mod analyzers;
pub mod config;
pub mod density;
pub mod lamps;
pub mod length;
pub mod output;
pub mod segment;
pub mod stream;

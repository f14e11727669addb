pub mod add;
pub mod aggregate;
pub mod browse;
pub mod export;
pub mod filter;
pub mod format;
pub mod import;
pub mod render;

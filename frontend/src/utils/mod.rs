pub mod browser;
pub mod state;

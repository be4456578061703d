pub mod resolve;
pub mod settings;

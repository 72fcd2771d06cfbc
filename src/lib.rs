pub mod analysis;
pub mod centrality;
pub mod community;
pub mod core;
pub mod layout;
#[cfg(feature = "logging")]
mod settings;

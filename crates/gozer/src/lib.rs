pub mod assets;
pub mod build;
pub mod config;
pub mod content;
pub mod error;
pub mod feeds;
pub mod parsing;
pub mod paths;
pub mod site;
pub mod sitemap;
pub mod templates;
pub mod types;
pub mod xml;

pub use build::*;
pub use config::*;
pub use content::*;
pub use error::*;
pub use site::*;
pub use templates::*;
pub use types::*;

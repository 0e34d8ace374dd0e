pub mod content;
pub mod settings;
pub mod vote;

pub use content::*;
pub use settings::*;
pub use vote::*;

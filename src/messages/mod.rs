pub mod history;
pub mod types;

pub use history::ChatHistory;
pub use types::{Message, Role};

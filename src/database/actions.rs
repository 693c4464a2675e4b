pub mod favorites;
pub mod metadata;
pub mod recipes;
pub mod users;

pub use favorites::*;
pub use metadata::*;
pub use recipes::*;
pub use users::*;

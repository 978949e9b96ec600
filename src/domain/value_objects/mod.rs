//! Value objects - Immutable objects defined by their attributes

mod category;
mod gender;

pub use category::EntityCategory;
pub use gender::{GenderSignal, GenderTally};

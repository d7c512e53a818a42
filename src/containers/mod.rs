mod array;
mod map;

pub use array::{ArrayIter, ArrayView};
pub use map::{MapIter, MapView};

//! Adapters for the generation, image and storage collaborators.

pub mod http;
pub mod mock;

pub use http::{HttpCharacterGenerator, HttpImageGenerator, HttpObjectStorage};
pub use mock::{MockCharacterGenerator, MockImageGenerator, MockObjectStorage};

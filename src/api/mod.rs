pub mod hal;
pub mod representations;

pub use hal::{rels, uris, HalModel, Links};

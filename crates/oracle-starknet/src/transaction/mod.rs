pub mod call;

pub use call::{AsCalldata, Calls};

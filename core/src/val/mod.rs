mod value;

pub use value::{STR_TAG, Value};

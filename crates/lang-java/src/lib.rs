//! JVM class file support: reads compiled `.class` entries into the
//! descriptors the scanning engine works from.

pub mod parser;
pub mod types;

pub use parser::ClassFileParser;
pub use types::JavaTypeConverter;

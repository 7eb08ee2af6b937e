//! Scanning engine and index for compiled JVM artifacts.
//!
//! Locations (archives, directories) are opened through [`vfs`], entries are
//! parsed by an injected [`ArtifactParser`](classdex_plugin::ArtifactParser),
//! [`scanner`]s turn descriptors into index pairs and the [`Store`] answers
//! closure queries over them.

pub mod collect;
pub mod config;
pub mod error;
pub mod filter;
pub mod index;
pub mod logging;
pub mod member_key;
pub mod pipeline;
pub mod scanner;
pub mod serialize;
pub mod store;
pub mod vfs;

pub use config::{Configuration, ConfigurationBuilder, Executor, ScanProfile};
pub use error::{ClassdexError, Result};
pub use filter::{Filter, FilterBuilder, IncludeExcludeChain};
pub use index::ClassIndex;
pub use member_key::MemberKey;
pub use pipeline::{FailureKind, ScanFailure, ScanReport, scan};
pub use serialize::{BinarySerializer, JsonSerializer, Serializer};
pub use store::{Partition, Store, StoreSnapshot};
pub use vfs::{Dir, Entry, Location, UrlType, UrlTypes};

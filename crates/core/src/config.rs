//! Scan configuration: what to scan, with which scanners, and how.

use crate::error::{ClassdexError, Result};
use crate::filter::{Filter, IncludeExcludeChain};
use crate::scanner::{self, ResultFilter, Scanner};
use crate::serialize::{JsonSerializer, Serializer};
use crate::vfs::{Location, UrlTypes};
use classdex_plugin::ArtifactParser;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// How scan tasks are executed
#[derive(Clone, Default)]
pub enum Executor {
    /// Everything on the calling thread
    #[default]
    Sequential,
    /// Tasks go to a worker pool; the caller blocks until they drain
    Pool(Arc<rayon::ThreadPool>),
}

impl Executor {
    /// Pool with `threads` workers; `0` means one per available core.
    pub fn pool(threads: usize) -> Result<Self> {
        let threads = if threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("classdex-scan-{}", i))
            .build()?;
        Ok(Executor::Pool(Arc::new(pool)))
    }

    pub fn workers(&self) -> usize {
        match self {
            Executor::Sequential => 1,
            Executor::Pool(pool) => pool.current_num_threads(),
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Executor::Sequential => f.write_str("Sequential"),
            Executor::Pool(pool) => write!(f, "Pool({})", pool.current_num_threads()),
        }
    }
}

/// Everything a scan needs.
#[derive(Clone)]
pub struct Configuration {
    pub locations: Vec<Location>,
    pub scanners: Vec<Arc<dyn Scanner>>,
    /// Applied to the dotted relative path of every entry; `None` accepts all
    pub input_filter: Option<Arc<dyn Filter>>,
    pub parser: Arc<dyn ArtifactParser>,
    pub executor: Executor,
    pub url_types: UrlTypes,
    pub serializer: Arc<dyn Serializer>,
}

enum PendingExecutor {
    Ready(Executor),
    Threads(usize),
}

/// Fluent construction of a [`Configuration`].
pub struct ConfigurationBuilder {
    locations: Vec<Location>,
    scanners: Vec<Arc<dyn Scanner>>,
    input_filter: Option<Arc<dyn Filter>>,
    parser: Arc<dyn ArtifactParser>,
    executor: PendingExecutor,
    url_types: UrlTypes,
    serializer: Arc<dyn Serializer>,
}

impl ConfigurationBuilder {
    /// Default scanners, no locations, sequential execution, JSON persistence.
    pub fn new(parser: Arc<dyn ArtifactParser>) -> Self {
        Self {
            locations: Vec::new(),
            scanners: scanner::default_scanners(),
            input_filter: None,
            parser,
            executor: PendingExecutor::Ready(Executor::Sequential),
            url_types: UrlTypes::default(),
            serializer: Arc::new(JsonSerializer::new()),
        }
    }

    pub fn add_location(mut self, location: impl Into<Location>) -> Self {
        self.locations.push(location.into());
        self
    }

    pub fn add_locations<L: Into<Location>>(mut self, locations: impl IntoIterator<Item = L>) -> Self {
        self.locations.extend(locations.into_iter().map(Into::into));
        self
    }

    pub fn set_locations<L: Into<Location>>(mut self, locations: impl IntoIterator<Item = L>) -> Self {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_scanners(mut self, scanners: impl IntoIterator<Item = Arc<dyn Scanner>>) -> Self {
        self.scanners = scanners.into_iter().collect();
        self
    }

    pub fn add_scanner(mut self, scanner: Arc<dyn Scanner>) -> Self {
        self.scanners.push(scanner);
        self
    }

    pub fn filter_inputs_by(mut self, filter: impl Filter + 'static) -> Self {
        self.input_filter = Some(Arc::new(filter));
        self
    }

    /// Worker pool sized to the available parallelism
    pub fn use_parallel_executor(self) -> Self {
        self.use_parallel_executor_with(0)
    }

    pub fn use_parallel_executor_with(mut self, threads: usize) -> Self {
        self.executor = PendingExecutor::Threads(threads);
        self
    }

    /// Run tasks on a caller-owned pool
    pub fn with_thread_pool(mut self, pool: Arc<rayon::ThreadPool>) -> Self {
        self.executor = PendingExecutor::Ready(Executor::Pool(pool));
        self
    }

    pub fn url_types(mut self, url_types: UrlTypes) -> Self {
        self.url_types = url_types;
        self
    }

    pub fn serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn build(self) -> Result<Configuration> {
        let executor = match self.executor {
            PendingExecutor::Ready(executor) => executor,
            PendingExecutor::Threads(threads) => Executor::pool(threads)?,
        };
        Ok(Configuration {
            locations: self.locations,
            scanners: self.scanners,
            input_filter: self.input_filter,
            parser: self.parser,
            executor,
            url_types: self.url_types,
            serializer: self.serializer,
        })
    }
}

/// Scan settings read from a JSON document.
///
/// ```json
/// {
///   "locations": ["/opt/app/lib/app.jar", "/opt/app/classes"],
///   "filter": "+com.acme, -com.acme.internal",
///   "result_filter": "+com.acme",
///   "threads": 4,
///   "scanners": ["SubTypes", "TypeAnnotations", "Resources"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanProfile {
    pub locations: Vec<Location>,
    /// Include/exclude rule chain over dotted entry paths
    pub filter: Option<String>,
    /// Include/exclude rule chain over recorded type names
    pub result_filter: Option<String>,
    /// Worker count; absent means sequential, `0` means one per core
    pub threads: Option<usize>,
    /// Partition names of the scanners to run; empty means the defaults
    pub scanners: Vec<String>,
}

impl ScanProfile {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn into_builder(self, parser: Arc<dyn ArtifactParser>) -> Result<ConfigurationBuilder> {
        let result_filter = match &self.result_filter {
            Some(rules) => ResultFilter::new(IncludeExcludeChain::parse(rules)?),
            None => ResultFilter::default(),
        };

        let scanner_names: Vec<String> = if self.scanners.is_empty() {
            scanner::default_scanners()
                .iter()
                .map(|s| s.name().to_string())
                .collect()
        } else {
            self.scanners
        };

        let scanners = scanner_names
            .iter()
            .map(|name| {
                scanner::scanner_by_name(name, result_filter.clone())
                    .ok_or_else(|| ClassdexError::UnknownScanner(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut builder = ConfigurationBuilder::new(parser)
            .set_locations(self.locations)
            .set_scanners(scanners);

        if let Some(rules) = &self.filter {
            builder = builder.filter_inputs_by(IncludeExcludeChain::parse(rules)?);
        }
        if let Some(threads) = self.threads {
            builder = builder.use_parallel_executor_with(threads);
        }

        Ok(builder)
    }
}

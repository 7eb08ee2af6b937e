use crate::Format;
use classdex_core::{ClassIndex, ClassdexError, Location, ScanProfile};
use classdex_java::ClassFileParser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct ScanArgs {
    pub locations: Vec<String>,
    pub filter: Option<String>,
    pub result_filter: Option<String>,
    pub scanners: Vec<String>,
    pub threads: Option<usize>,
    pub profile: Option<PathBuf>,
    pub format: Format,
    pub output: PathBuf,
}

impl ScanArgs {
    /// Profile values, with every option given on the command line taking precedence
    pub fn into_profile(self) -> classdex_core::Result<(ScanProfile, Format, PathBuf)> {
        let mut profile = match &self.profile {
            Some(path) => ScanProfile::load(path)?,
            None => ScanProfile::default(),
        };
        if !self.locations.is_empty() {
            profile.locations = self.locations.into_iter().map(Location::from).collect();
        }
        if self.filter.is_some() {
            profile.filter = self.filter;
        }
        if self.result_filter.is_some() {
            profile.result_filter = self.result_filter;
        }
        if !self.scanners.is_empty() {
            profile.scanners = self.scanners;
        }
        if self.threads.is_some() {
            profile.threads = self.threads;
        }
        Ok((profile, self.format, self.output))
    }
}

pub fn run(args: ScanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (profile, format, output) = args.into_profile()?;
    if profile.locations.is_empty() {
        return Err(ClassdexError::EmptyLocationSet.into());
    }

    info!("Scanning {} location(s)...", profile.locations.len());

    let config = profile
        .into_builder(Arc::new(ClassFileParser::new()))?
        .serializer(format.serializer())
        .build()?;
    let index = ClassIndex::new(config);
    index.save(&output)?;

    let report = index.report();
    println!(
        "Scanned {}/{} location(s), {} entries in {} ms using {} worker(s)",
        report.scanned_locations,
        report.locations,
        report.dispatched_entries,
        report.elapsed.as_millis(),
        report.workers
    );
    println!(
        "Index: {} keys, {} values -> {}",
        index.store().keys_count(),
        index.store().values_count(),
        output.display()
    );
    if !report.is_clean() {
        println!("{} failure(s):", report.failures.len());
        for failure in &report.failures {
            println!("  {}", failure);
        }
    }

    Ok(())
}

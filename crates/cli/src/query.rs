use clap::ValueEnum;
use classdex_core::ClassIndex;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryKind {
    /// Transitive subtypes of a type
    Subtypes,
    /// Types carrying a tag, closure chosen by the tag
    Tagged,
    /// Types carrying a propagating tag, following subtypes only
    TaggedInherited,
    /// Types carrying a tag, following tags-on-tags and subtypes
    TaggedAll,
    /// Methods carrying a tag
    Methods,
    /// Fields carrying a tag
    Fields,
    /// Resource paths with a given file name
    Resources,
}

impl QueryKind {
    pub fn execute(self, index: &ClassIndex, name: &str) -> HashSet<String> {
        let store = index.store();
        match self {
            QueryKind::Subtypes => index.subtypes_of(name),
            QueryKind::Tagged => index.types_tagged_with(name),
            QueryKind::TaggedInherited => store.types_tagged_with_inherited(name),
            QueryKind::TaggedAll => store.all_types_tagged_with(name),
            QueryKind::Methods => index.methods_tagged_with(name),
            QueryKind::Fields => index.fields_tagged_with(name),
            QueryKind::Resources => index.resources(name),
        }
    }
}

pub fn run(index_path: &Path, kind: QueryKind, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let index = crate::load_index(index_path)?;

    let mut results: Vec<String> = kind.execute(&index, name).into_iter().collect();
    results.sort();

    for result in &results {
        println!("{}", result);
    }
    tracing::debug!("{:?} {} -> {} result(s)", kind, name, results.len());

    Ok(())
}

use classdex_core::Store;
use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct PartitionRow {
    #[tabled(rename = "Partition")]
    name: String,
    #[tabled(rename = "Keys")]
    keys: usize,
    #[tabled(rename = "Values")]
    values: usize,
}

fn rows(store: &Store) -> Vec<PartitionRow> {
    store
        .partition_names()
        .into_iter()
        .filter_map(|name| {
            let partition = store.find_partition(&name)?;
            Some(PartitionRow {
                name,
                keys: partition.keys_count(),
                values: partition.values_count(),
            })
        })
        .collect()
}

pub fn run(index_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let index = crate::load_index(index_path)?;
    let store = index.store();

    println!("Index:  {}", index_path.display());
    println!("Keys:   {}", store.keys_count());
    println!("Values: {}", store.values_count());

    let rows = rows(store);
    if !rows.is_empty() {
        println!("{}", Table::new(rows));
    }
    Ok(())
}

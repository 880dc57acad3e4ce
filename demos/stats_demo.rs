use std::hash::BuildHasher;

use clap::Parser;
use clap::ValueEnum;
use robin_hash::HashTable;
use robin_hash::config::Deletion;
use robin_hash::config::Growth;
use robin_hash::config::TableConfig;
use robin_hash::hash::FnvMixBuilder;
use robin_hash::hash_table::Entry;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DeletionArg {
    Shift,
    Tombstone,
}

#[derive(Parser, Debug)]
struct Args {
    /// Number of records the table should hold without resizing.
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Load limit in percent.
    #[arg(short = 'l', long = "load", default_value_t = 70)]
    max_load_percent: u8,

    /// Fraction of records to remove after filling, in percent.
    #[arg(short = 'r', long = "remove", default_value_t = 0)]
    remove_percent: u8,

    #[arg(short = 'd', long = "deletion", value_enum, default_value_t = DeletionArg::Shift)]
    deletion: DeletionArg,
}

fn main() {
    let args = Args::parse();

    let config = TableConfig::default()
        .with_max_load_percent(args.max_load_percent)
        .with_growth(Growth::Fixed)
        .with_deletion(match args.deletion {
            DeletionArg::Shift => Deletion::BackwardShift,
            DeletionArg::Tombstone => Deletion::Tombstone,
        });

    let mut table: HashTable<u64> =
        match HashTable::try_with_capacity_and_config(args.target_capacity, config) {
            Ok(table) => table,
            Err(err) => {
                eprintln!("cannot build table: {err}");
                std::process::exit(1);
            }
        };

    println!(
        "Created table for {} records: {} slots, load limit {}",
        args.target_capacity,
        table.capacity(),
        table.max_load()
    );

    let hasher = FnvMixBuilder;
    let num_values = table.max_load() as u64;
    for value in 0..num_values {
        let hash = hasher.hash_one(value);
        match table.entry(hash, |&v| v == value) {
            Entry::Vacant(entry) => {
                if let Err(err) = entry.try_insert(value) {
                    eprintln!("insert of {value} failed: {err}");
                    break;
                }
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }
    }

    println!("Inserted {} values into table", table.len());
    println!("Final load factor: {:.2}%", table.load_factor() * 100.0);

    let to_remove = num_values * args.remove_percent.min(100) as u64 / 100;
    if to_remove > 0 {
        for value in 0..to_remove {
            table.remove(hasher.hash_one(value), |&v| v == value);
        }
        println!(
            "Removed {} values, {} tombstones left",
            to_remove,
            table.tombstones()
        );
    }

    table.probe_histogram().print();
    table.debug_stats().print();
}

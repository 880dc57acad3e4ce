use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::distr;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use robin_hash::HashMap;
use robin_hash::HashTable as RobinHashTable;
use robin_hash::StaticTable;
use robin_hash::config::Deletion;
use robin_hash::config::TableConfig;
use robin_hash::hash::FnvMixBuilder;
use robin_hash::hash_table::Entry as RobinEntry;
use siphasher::sip::SipHasher;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct SmallTestItem {
    key: u64,
}

impl KeyValuePair for SmallTestItem {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct SymbolItem {
    name: String,
    _address: u64,
}

impl KeyValuePair for SymbolItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            name: format!("sym_{key:016X}"),
            _address: key,
        })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.name.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

const SIZES: &[usize] = &[
    (1 << 8),
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Find,
    Remove,
}

fn items<T: KeyValuePair>(keys: impl Iterator<Item = u64>) -> Vec<(u64, T)> {
    keys.map(|key| {
        let item = T::new(key);
        (item.hash_key(), item)
    })
    .collect()
}

fn robin_insert<T: KeyValuePair>(table: &mut RobinHashTable<T>, hash: u64, item: T) {
    match table.entry(hash, |v| v.eq_key(&item)) {
        RobinEntry::Vacant(entry) => {
            black_box(entry.insert(item));
        }
        RobinEntry::Occupied(mut entry) => *entry.get_mut() = item,
    }
}

fn hashbrown_insert<T: KeyValuePair>(table: &mut HashbrownHashTable<T>, hash: u64, item: T) {
    match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
        HashbrownEntry::Vacant(entry) => {
            black_box(entry.insert(item));
        }
        HashbrownEntry::Occupied(mut entry) => *entry.get_mut() = item,
    }
}

fn bench_insert_random<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("insert_random_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let mut rng = SmallRng::from_os_rng();
        let hash_and_item = items::<T>((0..size).map(|_| rng.random()));

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("robin_hash/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    let mut table = RobinHashTable::<T>::new();
                    for (hash, item) in hash_and_item {
                        robin_insert(&mut table, hash, item);
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    let mut table = HashbrownHashTable::<T>::with_capacity(0);
                    for (hash, item) in hash_and_item {
                        hashbrown_insert(&mut table, hash, item);
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_hit_miss_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        // Even keys are stored, odd keys miss.
        let stored = items::<T>((0..size as u64).map(|k| k * 2));
        let mut probes = items::<T>(0..size as u64 * 2);
        probes.shuffle(&mut SmallRng::from_os_rng());

        let mut robin_table = RobinHashTable::<T>::with_capacity(size);
        let mut hashbrown_table = HashbrownHashTable::<T>::with_capacity(size);
        for (hash, item) in stored.iter().cloned() {
            robin_insert(&mut robin_table, hash, item.clone());
            hashbrown_insert(&mut hashbrown_table, hash, item);
        }

        group.throughput(Throughput::Elements(probes.len() as u64));
        group.bench_function(format!("robin_hash/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in &probes {
                    black_box(robin_table.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in &probes {
                    black_box(hashbrown_table.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item = items::<T>(0..size as u64);

        for (name, deletion) in [
            ("robin_hash_shift", Deletion::BackwardShift),
            ("robin_hash_tombstone", Deletion::Tombstone),
        ] {
            let config = TableConfig::default().with_deletion(deletion);
            group.throughput(Throughput::Elements(size as u64));
            group.bench_function(format!("{name}/{size}"), |b| {
                b.iter_batched(
                    || {
                        let mut hash_and_item = hash_and_item.clone();
                        let mut table = RobinHashTable::<T>::with_config(config);
                        for (hash, item) in hash_and_item.iter().cloned() {
                            robin_insert(&mut table, hash, item);
                        }
                        hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                        (table, hash_and_item)
                    },
                    |(mut table, hash_and_item)| {
                        for (hash, item) in &hash_and_item {
                            black_box(table.remove(*hash, |v| v.eq_key(item)));
                        }
                        black_box(table)
                    },
                    BatchSize::SmallInput,
                )
            });
        }

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    let mut table = HashbrownHashTable::<T>::with_capacity(0);
                    for (hash, item) in hash_and_item.iter().cloned() {
                        hashbrown_insert(&mut table, hash, item);
                    }
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    (table, hash_and_item)
                },
                |(mut table, hash_and_item)| {
                    for (hash, item) in &hash_and_item {
                        let result = match table.find_entry(*hash, |v| v.eq_key(item)) {
                            Ok(entry) => Some(entry.remove().0),
                            Err(_) => None,
                        };
                        black_box(result);
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_mixed_zipf<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("mixed_zipf_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    const KEY_SPACE_MULTIPLIER: f32 = 2.0;

    for &size in SIZES[..=MAX_SIZE].iter() {
        let mut rng = SmallRng::from_os_rng();
        let op_count = size * 3;
        let find_remove_distr = Zipf::new(size as f32 * KEY_SPACE_MULTIPLIER - 1.0, 1.0).unwrap();
        let insert_distr = Zipf::new(size as f32 - 1.0, 1.0).unwrap();

        let operations = (0..op_count)
            .map(|_| {
                let choice: f64 = rng.sample(distr::Uniform::new(0.0, 1.0).unwrap());
                let (operation, key) = if choice < 0.5 {
                    (Operation::Find, rng.sample(find_remove_distr))
                } else if choice < 0.75 {
                    (Operation::Insert, rng.sample(insert_distr))
                } else {
                    (Operation::Remove, rng.sample(find_remove_distr))
                };
                let item = T::new(key as u64);
                (operation, item.hash_key(), item)
            })
            .collect::<Vec<(Operation, u64, T)>>();

        group.throughput(Throughput::Elements(op_count as u64));
        group.bench_function(format!("robin_hash/{size}"), |b| {
            b.iter_batched(
                || operations.clone(),
                |operations| {
                    let mut table = RobinHashTable::<T>::new();
                    for (operation, hash, item) in operations {
                        match operation {
                            Operation::Insert => robin_insert(&mut table, hash, item),
                            Operation::Find => {
                                black_box(table.find(hash, |v| v.eq_key(&item)));
                            }
                            Operation::Remove => {
                                black_box(table.remove(hash, |v| v.eq_key(&item)));
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || operations.clone(),
                |operations| {
                    let mut table = HashbrownHashTable::<T>::with_capacity(0);
                    for (operation, hash, item) in operations {
                        match operation {
                            Operation::Insert => hashbrown_insert(&mut table, hash, item),
                            Operation::Find => {
                                black_box(table.find(hash, |v| v.eq_key(&item)));
                            }
                            Operation::Remove => {
                                if let Ok(entry) = table.find_entry(hash, |v| v.eq_key(&item)) {
                                    black_box(entry.remove().0);
                                }
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_churn<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        // Every key appears twice: the first sighting inserts, the second
        // removes.
        let insertions_and_removals = items::<T>((0..size as u64).flat_map(|k| [k, k]));

        group.throughput(Throughput::Elements(insertions_and_removals.len() as u64));
        group.bench_function(format!("robin_hash/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = insertions_and_removals.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    let mut table = RobinHashTable::<T>::new();
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v| v.eq_key(&item)) {
                            RobinEntry::Vacant(entry) => {
                                entry.insert(item);
                            }
                            RobinEntry::Occupied(entry) => {
                                black_box(entry.remove());
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = insertions_and_removals.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    let mut table = HashbrownHashTable::<T>::with_capacity(0);
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
                            HashbrownEntry::Vacant(entry) => {
                                black_box(entry.insert(item));
                            }
                            HashbrownEntry::Occupied(entry) => {
                                black_box(entry.remove().0);
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_static_lookup<const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group("static_lookup");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let names: Vec<String> = (0..size).map(|k| format!("cmd_{k:08x}")).collect();
        let mut probes = names.clone();
        probes.shuffle(&mut SmallRng::from_os_rng());

        let dynamic: HashMap<String, usize, FnvMixBuilder> =
            names.iter().cloned().zip(0..).collect();
        let frozen = StaticTable::try_from_map(dynamic.clone()).unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("dynamic/{size}"), |b| {
            b.iter(|| {
                for name in &probes {
                    black_box(dynamic.get(name.as_str()));
                }
            })
        });

        group.bench_function(format!("static/{size}"), |b| {
            b.iter(|| {
                for name in &probes {
                    black_box(frozen.get(name.as_str()));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallTestItem, 5>,
    bench_insert_random::<SymbolItem, 4>,
    bench_find_hit_miss::<SmallTestItem, 5>,
    bench_find_hit_miss::<SymbolItem, 4>,
    bench_remove::<SmallTestItem, 5>,
    bench_remove::<SymbolItem, 4>,
    bench_mixed_zipf::<SmallTestItem, 5>,
    bench_mixed_zipf::<SymbolItem, 4>,
    bench_churn::<SmallTestItem, 5>,
    bench_churn::<SymbolItem, 4>,
    bench_static_lookup::<4>,
);

criterion_main!(benches);

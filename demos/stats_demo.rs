use chain_hash::HashMap;
use chain_hash::key::DefaultHashBuilder;
use chain_hash::key::KeyHasher;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "initial_capacity", default_value_t = 16)]
    initial_capacity: usize,

    #[arg(short = 'n', long = "count", default_value_t = 1000)]
    count: u64,

    /// Remove every n-th key after filling, to show free-slot reuse.
    #[arg(short = 'r', long = "remove_every", default_value_t = 4)]
    remove_every: u64,
}

fn fill<H: KeyHasher<String>>(label: &str, mut map: HashMap<String, u64, H>, args: &Args) {
    println!("--- {label} ---");
    println!("Initial capacity: {}", map.capacity());

    for i in 0..args.count {
        if let Err(err) = map.add(format!("key_{i}"), i) {
            panic!("failed to add key_{i}: {err}");
        }
    }
    println!(
        "Inserted {} values, capacity now {} ({:.2}% load factor)",
        map.len(),
        map.capacity(),
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    if args.remove_every > 0 {
        let mut removed = 0;
        for i in (0..args.count).step_by(args.remove_every as usize) {
            if map.remove(&format!("key_{i}")) == Ok(true) {
                removed += 1;
            }
        }
        println!("Removed {removed} values");
        for i in 0..removed {
            if let Err(err) = map.add(format!("refill_{i}"), i) {
                panic!("failed to refill: {err}");
            }
        }
        println!(
            "Refilled {removed} values, capacity still {}",
            map.capacity()
        );
    }

    map.raw_table().chain_histogram().print();
    map.raw_table().debug_stats().print();
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match HashMap::try_new(args.initial_capacity) {
        Ok(map) => fill("character-sum hash", map, &args),
        Err(err) => {
            eprintln!("cannot create table: {err}");
            std::process::exit(1);
        }
    }

    match HashMap::try_with_hasher(args.initial_capacity, DefaultHashBuilder::default()) {
        Ok(map) => fill("randomly seeded hash", map, &args),
        Err(err) => {
            eprintln!("cannot create table: {err}");
            std::process::exit(1);
        }
    }
}

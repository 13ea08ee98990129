use clap::Parser;
use rhh::HashMap;
use rhh::Options;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "capacity", default_value_t = 256)]
    capacity: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 90)]
    load_factor: u8,

    #[arg(short = 'n', long = "series", default_value_t = 100_000)]
    series: usize,
}

fn series_key(id: usize) -> Vec<u8> {
    format!("cpu,host=server{:05},region=us-west-{}", id, id % 7).into_bytes()
}

fn main() {
    let args = Args::parse();

    let options = Options {
        capacity: args.capacity,
        load_factor: args.load_factor,
    };
    let mut map = match HashMap::try_with_options(options) {
        Ok(map) => map,
        Err(err) => {
            eprintln!("invalid options: {err}");
            std::process::exit(2);
        }
    };

    println!(
        "Created map with {} slots, threshold {} ({}% load factor)",
        map.cap(),
        map.threshold(),
        map.load_factor()
    );
    println!("Indexing {} series keys...", args.series);

    let mut growths = 0;
    for id in 0..args.series {
        let cap = map.cap();
        map.put(series_key(id), id as u64);
        if map.cap() != cap {
            growths += 1;
        }
    }

    println!("Inserted {} keys into {} slots", map.len(), map.cap());
    println!("Grew {growths} times");
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.cap() as f64) * 100.0
    );
    println!("Average probe count: {:.3}", map.average_probe_count());

    map.probe_histogram().print();
    map.debug_stats().print();
}

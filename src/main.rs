use ply_reader::PlyReader;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-ply-file> [--verbose]", args[0]);
        std::process::exit(1);
    }

    let ply_path = &args[1];
    let verbose = args.iter().skip(2).any(|arg| arg == "--verbose" || arg == "-v");

    println!("Reading PLY file: {}", ply_path);
    println!("{}", "=".repeat(60));

    let reader = match PlyReader::open(ply_path, false) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("\nERROR: Failed to read PLY header");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let header = reader.header();
    if verbose {
        for comment in &header.comments {
            println!("comment:   {}", comment);
        }
        println!("format:    {} {}", header.format, header.version);
        for element in &header.elements {
            println!("{}", element);
        }
        println!("{}", "=".repeat(60));
    }

    match reader.read_data() {
        Ok(data) => {
            println!("\nElements:");
            for (name, records) in data.iter() {
                let properties: Vec<&str> = data
                    .properties(name)
                    .map(|names| names.collect())
                    .unwrap_or_default();
                println!("  {} {} {:?}", name, records.len(), properties);
            }
            println!("\nPayload bytes decoded: {}", data.bytes_consumed());
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to decode PLY data");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

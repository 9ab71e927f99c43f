use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use primer::Stdout;

fn main() {
    primer::init_tracing();

    let args: Vec<String> = env::args().collect();

    let source = if args.len() > 1 {
        let path = PathBuf::from(&args[1]);
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error reading '{}': {}", path.display(), e);
                process::exit(1);
            }
        }
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            eprintln!("Error reading stdin: {}", e);
            process::exit(1);
        }
        buf
    };

    if source.trim().is_empty() {
        eprintln!("Error: program is empty");
        process::exit(1);
    }

    if let Err(e) = primer::run(&source, Stdout) {
        eprintln!("{}", e.render(&source));
        process::exit(1);
    }
}

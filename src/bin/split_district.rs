//! Split a merged district extraction into the two fixture files the map
//! consumes: polygon styling data and measurement points.
//!
//! Run with: cargo run --bin split_district <merged.json> <output-dir>

use std::path::PathBuf;
use std::process;

use soundmap::fixtures::{load_district_document, split_district_document, write_json_pretty};

fn main() {
    let mut args = std::env::args().skip(1);
    let (input, out_dir) = match (args.next(), args.next()) {
        (Some(input), Some(out_dir)) => (PathBuf::from(input), PathBuf::from(out_dir)),
        _ => {
            eprintln!("usage: split_district <merged.json> <output-dir>");
            process::exit(1);
        }
    };

    let doc = match load_district_document(&input) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = std::fs::create_dir_all(&out_dir) {
        eprintln!("error: failed to create {}: {}", out_dir.display(), err);
        process::exit(1);
    }

    let (sectors_doc, points_doc) = split_district_document(&doc);

    let sectors_path = out_dir.join(format!("{}_sectors.json", doc.district.to_lowercase()));
    let points_path = out_dir.join(format!("{}_points.json", doc.district.to_lowercase()));

    if let Err(err) =
        write_json_pretty(&sectors_path, &sectors_doc).and_then(|_| write_json_pretty(&points_path, &points_doc))
    {
        eprintln!("error: {}", err);
        process::exit(1);
    }

    println!("Data successfully separated:");
    println!("- Sectors (polygons): {}", sectors_path.display());
    println!("- Points (measurements): {}", points_path.display());
    println!("- Total sectors: {}", sectors_doc.sectors.len());
    println!("- Total points: {}", points_doc.points.len());
}

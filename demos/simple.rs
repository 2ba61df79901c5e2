//! Writing a small grid in both encodings and reading it back.
//!
//! Run with: cargo run --example simple

use roffio::{from_slice, to_vec, Format};
use serde::Serialize;
use std::error::Error;

#[derive(Serialize)]
struct Dimensions {
    #[serde(rename = "nX")]
    nx: i32,
    #[serde(rename = "nY")]
    ny: i32,
    #[serde(rename = "nZ")]
    nz: i32,
}

#[derive(Serialize)]
struct Active {
    data: Vec<bool>,
}

#[derive(Serialize)]
struct Grid {
    dimensions: Dimensions,
    active: Active,
}

fn main() -> Result<(), Box<dyn Error>> {
    let grid = Grid {
        dimensions: Dimensions { nx: 2, ny: 2, nz: 1 },
        active: Active {
            data: vec![true, true, false, true],
        },
    };

    let ascii = to_vec(&grid, Format::Ascii)?;
    println!("ASCII output:\n{}", String::from_utf8_lossy(&ascii));

    let binary = to_vec(&grid, Format::Binary)?;
    println!("Binary output: {} bytes\n", binary.len());

    let from_ascii = from_slice(&ascii)?;
    let from_binary = from_slice(&binary)?;
    assert_eq!(from_ascii.get("active"), from_binary.get("active"));
    assert_eq!(from_ascii.get("dimensions"), from_binary.get("dimensions"));

    for (name, tags) in &from_binary {
        for tag in tags {
            let keys: Vec<&String> = tag.keys().collect();
            println!("tag {:<12} keys {:?}", name, keys);
        }
    }
    println!("✓ Both encodings read back the same");

    Ok(())
}

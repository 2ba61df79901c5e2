//! Pulling one tag out of a file without decoding the arrays of the others.
//!
//! Run with: cargo run --example lazy_read

use roffio::{lazy_read_path, roff, write_path, Format, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::temp_dir().join("roffio_lazy_read_demo.roff");

    let cells = 64 * 64 * 16;
    let data = roff! {
        "dimensions" => { "nX" => 64, "nY" => 64, "nZ" => 16 },
        "zvalues" => { "data" => vec![0.0f32; cells * 4] },
        "parameter" => { "name" => "porosity", "data" => vec![0.25f64; cells] },
    };
    write_path(&path, &data, Format::Binary)?;

    let mut reader = lazy_read_path(&path)?;
    while let Some(tag) = reader.next_tag()? {
        if tag.name() != "dimensions" {
            continue;
        }
        for key in tag {
            let (name, value) = key?;
            if let Value::Int(n) = value {
                println!("{} = {}", name, n);
            }
        }
    }
    for warning in reader.warnings() {
        println!("warning: {}", warning);
    }
    drop(reader);

    std::fs::remove_file(&path)?;
    Ok(())
}

mod config;
mod font;
mod icon;
mod utils;

use anyhow::Context;
use config::{LABEL, SIZES};
use icon::{create_icon, IconSpec};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Creating Proof of Art extension icons...");
    println!("{}", "-".repeat(40));

    for size in SIZES {
        let path = create_icon(&IconSpec::new(size, LABEL), Path::new("."))
            .with_context(|| format!("creating {}x{} icon", size, size))?;
        println!("✓ Created {}", path.file_name().unwrap_or_default().to_string_lossy());
    }

    println!("{}", "-".repeat(40));
    println!("✓ All icons created successfully!");
    println!("\nNote: These are placeholder icons.");
    println!("For production, create professional icons using a design tool.");
    Ok(())
}

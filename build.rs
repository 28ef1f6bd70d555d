use anyhow::Result;
use std::env;
use std::fs;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

/// Concatenate every YAML file in `dir` into a single file under `OUT_DIR`.
/// Each content file holds a YAML list, so the concatenation is itself a
/// valid list. Files are visited in sorted order to keep the result stable.
fn bundle(dir: &str, out_dir: &str, dest_name: &str) -> Result<()> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    paths.sort();

    let mut bundled = String::new();
    for path in paths {
        bundled.push_str(&fs::read_to_string(&path)?);
        bundled.push('\n');
    }

    let mut file = File::create(Path::new(out_dir).join(dest_name))?;
    file.write_all(bundled.as_bytes())?;
    Ok(())
}

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=content/");

    let out_dir = env::var("OUT_DIR")?;
    bundle("./content/lessons", &out_dir, "all-lessons.yaml")?;
    bundle("./content/scenarios", &out_dir, "all-scenarios.yaml")?;

    Ok(())
}

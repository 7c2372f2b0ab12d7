//! Installs the `.env.example` template into `<data_local_dir>/spotsample/`,
//! the directory the application reads its `.env` from and keeps its
//! credential database in. A missing template only produces a cargo warning.

use std::{env, fs, path::PathBuf};

const TEMPLATE: &str = ".env.example";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed={}", TEMPLATE);

    let template = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?).join(TEMPLATE);
    if !template.is_file() {
        println!("cargo:warning={} not found at {}", TEMPLATE, template.display());
        return Ok(());
    }

    let data_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spotsample");
    fs::create_dir_all(&data_dir)?;

    let target = data_dir.join(TEMPLATE);
    let contents = fs::read_to_string(&template)?;
    // Leave the installed copy alone when nothing changed.
    if fs::read_to_string(&target).ok().as_deref() != Some(contents.as_str()) {
        fs::write(&target, contents)?;
    }

    Ok(())
}

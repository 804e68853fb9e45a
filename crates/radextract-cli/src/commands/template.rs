use radextract_core::error::RadExtractError;
use radextract_core::export;
use std::path::PathBuf;

pub fn run(out: Option<PathBuf>) -> Result<(), RadExtractError> {
    let template = export::template();
    match out {
        Some(path) => {
            std::fs::write(&path, template)?;
            eprintln!("Template written to {}", path.display());
        }
        None => print!("{template}"),
    }
    Ok(())
}

use radextract_core::error::RadExtractError;
use radextract_core::export;
use radextract_core::pipeline::extract_manual;
use std::io::Read;
use std::path::PathBuf;

use crate::output;
use crate::ServiceArgs;

pub fn run(
    service: &ServiceArgs,
    key_id: &str,
    order_id: &str,
    input_file: Option<PathBuf>,
    output_format: &str,
    export_file: Option<PathBuf>,
) -> Result<(), RadExtractError> {
    let text = match input_file {
        Some(path) => std::fs::read_to_string(&path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let extractor = super::build_extractor(service)?;
    let record = extract_manual(key_id, order_id, &text, &extractor)?;

    match output_format {
        "json" => output::json::print(&record)?,
        _ => print!("{}", output::table::format_review(&record)),
    }

    if let Some(path) = export_file {
        std::fs::write(&path, export::render(std::slice::from_ref(&record))?)?;
        eprintln!("Export written to {}", path.display());
    }

    Ok(())
}

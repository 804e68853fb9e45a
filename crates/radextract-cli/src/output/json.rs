use radextract_core::error::RadExtractError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), RadExtractError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

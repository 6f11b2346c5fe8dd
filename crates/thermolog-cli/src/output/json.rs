use serde::Serialize;
use thermolog_core::error::ThermologError;

pub fn print<T: Serialize>(value: &T) -> Result<(), ThermologError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    for schema in ["schemas/geo.wbs", "schemas/archive.wbs"] {
        wirebuf_idl::Builder::new().compile(schema)?;
    }
    Ok(())
}

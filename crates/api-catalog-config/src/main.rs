use std::io::Write;

/// Print the JSON Schema for `api-catalog.toml` to stdout.
fn main() -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &api_catalog_config::schema())?;
    writeln!(out)?;
    Ok(())
}

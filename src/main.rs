//! `byml2yaml`: dump a BYML document as YAML or JSON.

use anyhow::{Context, Result};
use byml_view::{Byml, BymlDocument, EmitterConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "byml2yaml", version, about = "Convert a BYML document to YAML")]
struct Args {
    /// BYML file, either byte order.
    input: PathBuf,

    /// Write here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit JSON instead of YAML.
    #[arg(long)]
    json: bool,

    /// JSON file with emitter settings (`indent_width`, `inline_container_max_count`).
    #[arg(long, env = "BYML2YAML_CONFIG")]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<EmitterConfig> {
    let Some(path) = path else {
        return Ok(EmitterConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// JSON goes through `Byml` so duplicate map keys survive as repeated members.
fn render(doc: &BymlDocument<'_>, json: bool, config: EmitterConfig) -> Result<String> {
    if json {
        let value: Byml = doc.to_value()?;
        Ok(serde_json::to_string_pretty(&value)?)
    } else {
        Ok(doc.to_yaml_with(config)?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    let mut data = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let doc = BymlDocument::from_bytes_mut(&mut data)
        .with_context(|| format!("opening {}", args.input.display()))?;
    tracing::info!(
        input = %args.input.display(),
        version = doc.version(),
        bytes = doc.data().len(),
        "document loaded"
    );

    let mut text = render(&doc, args.json, config)?;
    text.push('\n');

    match &args.output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// `{x: 1, x: 2}` laid out by hand: header, root map, key table.
    fn duplicate_key_doc() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"YB");
        buf.extend_from_slice(&7u16.to_le_bytes());
        buf.extend_from_slice(&36u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&16u32.to_le_bytes());

        buf.extend_from_slice(&[0xC1, 2, 0, 0]);
        for v in [1u32, 2] {
            buf.extend_from_slice(&[0, 0, 0, 0xD1]);
            buf.extend_from_slice(&v.to_le_bytes());
        }

        buf.extend_from_slice(&[0xC2, 1, 0, 0]);
        buf.extend_from_slice(&12u32.to_le_bytes());
        buf.extend_from_slice(&14u32.to_le_bytes());
        buf.extend_from_slice(b"x\0");
        buf
    }

    #[test]
    fn test_json_keeps_duplicate_keys() {
        let buf = duplicate_key_doc();
        let doc = BymlDocument::new(&buf).unwrap();
        let text = render(&doc, true, EmitterConfig::default()).unwrap();
        assert_eq!(text, "{\n  \"x\": 1,\n  \"x\": 2\n}");
    }

    #[test]
    fn test_yaml_keeps_duplicate_keys() {
        let buf = duplicate_key_doc();
        let doc = BymlDocument::new(&buf).unwrap();
        let text = render(&doc, false, EmitterConfig::default()).unwrap();
        assert_eq!(text, "{x: 1, x: 2}");
    }
}

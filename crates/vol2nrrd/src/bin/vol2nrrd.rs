use std::path::Path;
use std::process;

use vol2nrrd::convert::{convert, OutputKind};
use vol2nrrd::metadata::format_angle;

const USAGE: &str = "\
Usage: vol2nrrd [options] <input.vol>

Convert a Morita .vol dental CT volume to NRRD.

Options:
  --output-extension <auto|nrrd|nhdr>
      auto (default): self-contained .nrrd when the scan carries a rotation
      angle, detached .nhdr otherwise. nrrd/nhdr force one strategy.

  --extract-header
      Also write the embedded metadata, pretty-printed, to
      <input.vol>.header.xml.";

fn run(args: &[String]) -> Result<String, String> {
    let mut kind = OutputKind::Auto;
    let mut extract_header = false;
    let mut input: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg == "--output-extension" {
            i += 1;
            let value = args
                .get(i)
                .ok_or("--output-extension requires a value (auto, nrrd, or nhdr)")?;
            kind = OutputKind::parse(value)
                .ok_or_else(|| format!("Invalid output extension: '{value}'"))?;
        } else if let Some(value) = arg.strip_prefix("--output-extension=") {
            kind = OutputKind::parse(value)
                .ok_or_else(|| format!("Invalid output extension: '{value}'"))?;
        } else if arg == "--extract-header" {
            extract_header = true;
        } else if arg.starts_with('-') {
            return Err(format!("Unknown option: '{arg}'\n\n{USAGE}"));
        } else if input.is_some() {
            return Err(format!("Unexpected extra argument: '{arg}'\n\n{USAGE}"));
        } else {
            input = Some(arg);
        }
        i += 1;
    }

    let input = input.ok_or_else(|| USAGE.to_string())?;
    let conversion = convert(Path::new(input), kind, extract_header)
        .map_err(|e| format!("Error converting '{input}': {e}"))?;

    let mut out = String::new();
    if let Some(angle) = conversion.applied_rotation_deg {
        out.push_str(&format!("rotated by {}°\n", format_angle(angle)));
    }
    out.push_str(&format!("wrote {}\n", conversion.output.display()));
    if let Some(side) = &conversion.side_artifact {
        out.push_str(&format!("wrote {}\n", side.display()));
    }
    Ok(out)
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(output) => print!("{output}"),
        Err(msg) => {
            eprintln!("{msg}");
            process::exit(1);
        }
    }
}

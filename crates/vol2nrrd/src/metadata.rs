//! Extraction of scan geometry from the embedded metadata XML.
//!
//! The metadata block carries many vendor attributes; only four scalars are
//! read, each stored in a `value` attribute of an element nested under an
//! `Attribute` element: the per-axis physical grid spacings and the
//! anti-aliasing rotation angle. Everything else is ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// Physical grid spacing and rotation angle parsed from the metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanGeometry {
    /// Physical spacing per voxel along X, units as stored.
    pub spacing_x: f64,
    /// Physical spacing per voxel along Y, units as stored.
    pub spacing_y: f64,
    /// Physical spacing per voxel along Z, units as stored.
    pub spacing_z: f64,
    /// Anti-aliasing rotation angle in degrees; `0` disables rotation.
    pub rotation_angle_deg: f64,
}

impl ScanGeometry {
    /// Returns `true` if the scan requests an in-plane rotation.
    pub fn has_rotation(&self) -> bool {
        self.rotation_angle_deg != 0.0
    }
}

/// Render an angle for diagnostics, dropping the fractional part when it is
/// exactly zero (`15`, not `15.0`). Cosmetic only.
pub fn format_angle(deg: f64) -> String {
    if deg.fract() == 0.0 && deg.abs() < i64::MAX as f64 {
        format!("{}", deg as i64)
    } else {
        format!("{deg}")
    }
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| String::from_utf8(a.value.to_vec()).ok())
}

/// Names of the required elements, paired with capture slots by index.
const FIELDS: [&str; 4] = [
    "tfXGridSize",
    "tfYGridSize",
    "tfZGridSize",
    "tfAntiAliasAngleInDegree",
];

/// Parse the four required scalar fields out of the metadata text.
///
/// Fails with [`Error::MissingField`] if an element is absent, lacks a
/// `value` attribute, or its value does not parse as a number.
pub fn parse_scan_geometry(xml: &str) -> Result<ScanGeometry> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut captured: [Option<f64>; 4] = [None; 4];
    // Track hierarchy with a stack; fields count only under an Attribute parent.
    let mut stack: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if stack.last().map(String::as_str) == Some("Attribute") {
                    capture(&e, &name, &mut captured);
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if stack.last().map(String::as_str) == Some("Attribute") {
                    capture(&e, &name, &mut captured);
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut values = [0.0f64; 4];
    for (i, slot) in captured.into_iter().enumerate() {
        values[i] = slot.ok_or(Error::MissingField(FIELDS[i]))?;
    }

    Ok(ScanGeometry {
        spacing_x: values[0],
        spacing_y: values[1],
        spacing_z: values[2],
        rotation_angle_deg: values[3],
    })
}

fn capture(e: &BytesStart, name: &str, captured: &mut [Option<f64>; 4]) {
    if let Some(i) = FIELDS.iter().position(|f| *f == name) {
        captured[i] = attr_value(e, b"value").and_then(|v| v.trim().parse().ok());
    }
}

/// Re-serialize the metadata text with two-space indentation.
///
/// Used for the optional side artifact; the parsed geometry never goes
/// through this path.
pub fn pretty_print(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            ev => writer.write_event(ev)?,
        }
    }

    let mut out = writer.into_inner();
    out.push(b'\n');
    String::from_utf8(out).map_err(|_| Error::BadTextEncoding)
}

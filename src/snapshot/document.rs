//! SharedPreferences XML document
//!
//! ```text
//! <?xml version='1.0' encoding='utf-8' standalone='yes' ?>
//! <map>
//!     <float name="x" value="1.000000" />
//!     <float name="y" value="2.500000" />
//!     <float name="z" value="-3.250000" />
//!     <int name="socket_port" value="16384" />
//! </map>
//! ```
//!
//! Floats are written with 6 decimals. Parsing accepts any decimal form,
//! ignores entry order, and skips entries it does not know, since the
//! target app may store its own preferences in the same file.

use super::Snapshot;
use crate::types::Vector3;
use roxmltree::{Document, Node};

const ROOT_TAG: &str = "map";
const FLOAT_TAG: &str = "float";
const INT_TAG: &str = "int";

/// Render a snapshot as a complete document
pub fn render_document(snapshot: &Snapshot) -> String {
    let v = &snapshot.vector;
    format!(
        "<?xml version='1.0' encoding='utf-8' standalone='yes' ?>\n\
         <map>\n    \
         <float name=\"x\" value=\"{:.6}\" />\n    \
         <float name=\"y\" value=\"{:.6}\" />\n    \
         <float name=\"z\" value=\"{:.6}\" />\n    \
         <int name=\"socket_port\" value=\"{}\" />\n\
         </map>\n",
        v.x, v.y, v.z, snapshot.socket_port
    )
}

/// Parse a document. All four entries must be present and well-typed;
/// nothing is returned otherwise.
pub fn parse_document(xml: &str) -> Result<Snapshot, String> {
    let doc = Document::parse(xml).map_err(|e| format!("invalid XML: {}", e))?;
    let root = doc.root_element();
    if root.tag_name().name() != ROOT_TAG {
        return Err(format!(
            "expected <{}> root, found <{}>",
            ROOT_TAG,
            root.tag_name().name()
        ));
    }

    let mut x = None;
    let mut y = None;
    let mut z = None;
    let mut socket_port = None;

    for node in root.children().filter(|n| n.is_element()) {
        let Some(name) = node.attribute("name") else {
            continue;
        };
        match name {
            "x" => x = Some(float_entry(&node, name)?),
            "y" => y = Some(float_entry(&node, name)?),
            "z" => z = Some(float_entry(&node, name)?),
            "socket_port" => socket_port = Some(port_entry(&node, name)?),
            _ => {}
        }
    }

    let missing = |field: &str| format!("missing entry '{}'", field);
    Ok(Snapshot {
        vector: Vector3::new(
            x.ok_or_else(|| missing("x"))?,
            y.ok_or_else(|| missing("y"))?,
            z.ok_or_else(|| missing("z"))?,
        ),
        socket_port: socket_port.ok_or_else(|| missing("socket_port"))?,
    })
}

fn entry_value<'a>(node: &Node<'a, '_>, name: &str, tag: &str) -> Result<&'a str, String> {
    let found = node.tag_name().name();
    if found != tag {
        return Err(format!(
            "entry '{}' should be <{}>, found <{}>",
            name, tag, found
        ));
    }
    node.attribute("value")
        .map(str::trim)
        .ok_or_else(|| format!("entry '{}' has no value", name))
}

fn float_entry(node: &Node, name: &str) -> Result<f64, String> {
    let raw = entry_value(node, name, FLOAT_TAG)?;
    raw.parse::<f64>()
        .map_err(|e| format!("entry '{}' value {:?}: {}", name, raw, e))
}

fn port_entry(node: &Node, name: &str) -> Result<u16, String> {
    let raw = entry_value(node, name, INT_TAG)?;
    let value = raw
        .parse::<i64>()
        .map_err(|e| format!("entry '{}' value {:?}: {}", name, raw, e))?;
    u16::try_from(value).map_err(|_| format!("entry '{}' out of port range: {}", name, value))
}

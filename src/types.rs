//! Sample types

use std::fmt;
use std::str::FromStr;

/// One gyroscope sample (rad/s per axis)
///
/// No bounds or normalization: any real value is a valid reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Create a new sample
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Formats as the wire record body `x,y,z` with full `f64` precision.
impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Parses a wire record body, with or without the trailing newline.
impl FromStr for Vector3 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end_matches(['\n', '\r']);
        let mut parts = line.split(',');
        let mut next = |axis: &str| -> Result<f64, String> {
            let field = parts
                .next()
                .ok_or_else(|| format!("missing {} in record {:?}", axis, line))?;
            field
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("bad {} value {:?}: {}", axis, field, e))
        };
        let v = Vector3::new(next("x")?, next("y")?, next("z")?);
        if parts.next().is_some() {
            return Err(format!("trailing fields in record {:?}", line));
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_full_precision() {
        let v = Vector3::new(0.1 + 0.2, -3.25, 1.0);
        assert_eq!(v.to_string(), "0.30000000000000004,-3.25,1");
    }

    #[test]
    fn test_parse_record() {
        let v: Vector3 = "1,2.5,-3.25\n".parse().unwrap();
        assert_eq!(v, Vector3::new(1.0, 2.5, -3.25));

        let v: Vector3 = "1e-3, 2 ,3\r\n".parse().unwrap();
        assert_eq!(v, Vector3::new(0.001, 2.0, 3.0));
    }

    #[test]
    fn test_parse_rejects_bad_records() {
        assert!("1,2".parse::<Vector3>().is_err());
        assert!("1,2,3,4".parse::<Vector3>().is_err());
        assert!("1,abc,3".parse::<Vector3>().is_err());
        assert!("".parse::<Vector3>().is_err());
    }
}

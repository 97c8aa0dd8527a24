//! Simple TOML parser for delta machine configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the delta configuration. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - Key = value pairs (float, integer, boolean)
//! - [section] headers
//! - Flat arrays of three numbers: endstop_adj = [0.0, -0.2, 0.1]
//! - Comments (# ...)
//!
//! NOT supported:
//! - Strings, datetimes, inline tables
//! - Dotted keys
//! - Multi-line arrays

use super::delta::DeltaConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Array with the wrong number of elements
    InvalidArrayLength,
    /// Values parsed but the resulting geometry is implausible
    InvalidGeometry,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Delta,
    Probe,
}

/// Parse TOML configuration into a DeltaConfig
///
/// Missing keys keep their defaults; unknown keys are ignored.
pub fn parse_config(input: &str) -> Result<DeltaConfig, ParseError> {
    let mut config = DeltaConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    if !config.is_valid() {
        return Err(ParseError::InvalidGeometry);
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "delta" => Ok(Section::Delta),
        "probe" => Ok(Section::Probe),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = match value.find('#') {
        Some(hash_pos) => value[..hash_pos].trim(),
        None => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_float(value: &str) -> Result<f32, ParseError> {
    let parsed: f32 = value.parse().map_err(|_| ParseError::InvalidValue)?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(ParseError::InvalidValue)
    }
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse `[a, b, c]`
fn parse_triple(value: &str) -> Result<[f32; 3], ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut out = [0.0f32; 3];
    let mut count = 0;
    for item in inner.split(',') {
        let item = item.trim();
        if item.is_empty() {
            // Trailing comma
            continue;
        }
        if count == out.len() {
            return Err(ParseError::InvalidArrayLength);
        }
        out[count] = parse_float(item)?;
        count += 1;
    }

    if count != out.len() {
        return Err(ParseError::InvalidArrayLength);
    }
    Ok(out)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DeltaConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {}
        Section::Delta => match key {
            "radius" => config.radius = parse_float(value)?,
            "diagonal_rod" => config.diagonal_rod = parse_float(value)?,
            "height" => config.height = parse_float(value)?,
            "printable_radius" => config.printable_radius = parse_float(value)?,
            "endstop_adj" => config.endstop_adj = parse_triple(value)?,
            "tower_angle_adj" => config.tower_angle_adj = parse_triple(value)?,
            "clip_start_height" => config.clip_start_height = parse_float(value)?,
            "home_to_safe_zone" => config.home_to_safe_zone = parse_bool(value)?,
            _ => {}
        },
        Section::Probe => match key {
            "radius" => config.probe.radius = parse_float(value)?,
            "x_offset" => config.probe.x_offset = parse_float(value)?,
            "y_offset" => config.probe.y_offset = parse_float(value)?,
            "manual" => config.probe.manual = parse_bool(value)?,
            _ => {}
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Kossel mini
[delta]
radius = 102.5
diagonal_rod = 218.0   # carbon rods
height = 295.3
printable_radius = 85
endstop_adj = [0.0, -0.42, -0.15]
tower_angle_adj = [0.1, -0.05, -0.05]
home_to_safe_zone = false

[probe]
radius = 75.0
x_offset = 0.0
y_offset = -18.5
manual = true
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.radius, 102.5);
        assert_eq!(config.diagonal_rod, 218.0);
        assert_eq!(config.height, 295.3);
        assert_eq!(config.printable_radius, 85.0);
        assert_eq!(config.endstop_adj, [0.0, -0.42, -0.15]);
        assert_eq!(config.tower_angle_adj[0], 0.1);
        assert!(!config.home_to_safe_zone);
        // Not given, default kept
        assert_eq!(config.clip_start_height, 25.0);

        assert_eq!(config.probe.radius, 75.0);
        assert_eq!(config.probe.y_offset, -18.5);
        assert!(config.probe.manual);
    }

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), DeltaConfig::default());
    }

    #[test]
    fn test_parse_triple() {
        assert_eq!(parse_triple("[1, 2.5, -3]").unwrap(), [1.0, 2.5, -3.0]);
        assert_eq!(parse_triple("[1, 2, 3,]").unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(parse_triple("[1, 2]"), Err(ParseError::InvalidArrayLength));
        assert_eq!(
            parse_triple("[1, 2, 3, 4]"),
            Err(ParseError::InvalidArrayLength)
        );
        assert_eq!(parse_triple("1, 2, 3"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = parse_config("[extruder]\nrotation_distance = 22.6");
        assert_eq!(result, Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_eq!(
            parse_config("[delta]\nradius = wide"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[probe]\nmanual = yes"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[delta]\nradius = inf"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_implausible_geometry_rejected() {
        // Rods shorter than the radius cannot reach the center
        let result = parse_config("[delta]\nradius = 150\ndiagonal_rod = 100");
        assert_eq!(result, Err(ParseError::InvalidGeometry));
    }
}

//! New-map parameters parsed from user text fields

use std::fmt;

/// Largest accepted map side or tile size
pub const MAX_DIMENSION: u32 = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSettingsError {
    /// A field is not an integer
    NotANumber { field: &'static str, value: String },
    /// A field is zero or above `MAX_DIMENSION`
    OutOfRange { field: &'static str, value: i64 },
}

impl fmt::Display for MapSettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapSettingsError::NotANumber { field, value } => {
                write!(f, "{} must be a number, got '{}'", field, value)
            }
            MapSettingsError::OutOfRange { field, value } => {
                write!(f, "{} must be between 1 and {}, got {}", field, MAX_DIMENSION, value)
            }
        }
    }
}

impl std::error::Error for MapSettingsError {}

/// Validated dimensions for a fresh map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapSettings {
    pub tile_size: u32,
    pub width: u32,
    pub height: u32,
}

impl MapSettings {
    pub fn new(tile_size: u32, width: u32, height: u32) -> Result<Self, MapSettingsError> {
        Ok(Self {
            tile_size: check_range("tile size", tile_size as i64)?,
            width: check_range("width", width as i64)?,
            height: check_range("height", height as i64)?,
        })
    }

    /// Parse the three fields of the new-map dialog.
    ///
    /// Nothing is allocated unless all three are valid.
    pub fn parse(tile_size: &str, width: &str, height: &str) -> Result<Self, MapSettingsError> {
        Ok(Self {
            tile_size: parse_field("tile size", tile_size)?,
            width: parse_field("width", width)?,
            height: parse_field("height", height)?,
        })
    }
}

fn parse_field(field: &'static str, text: &str) -> Result<u32, MapSettingsError> {
    let trimmed = text.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| MapSettingsError::NotANumber {
            field,
            value: trimmed.to_string(),
        })?;
    check_range(field, value)
}

fn check_range(field: &'static str, value: i64) -> Result<u32, MapSettingsError> {
    if value < 1 || value > MAX_DIMENSION as i64 {
        return Err(MapSettingsError::OutOfRange { field, value });
    }
    Ok(value as u32)
}

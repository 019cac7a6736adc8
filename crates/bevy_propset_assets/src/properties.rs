//! Custom properties attached to tilesets and tiles.
//!
//! `tiled` keeps properties in an unordered map of its own value type. They are
//! converted into a sorted [`Properties`] map here so that definitions compare
//! and serialize deterministically.

use std::collections::BTreeMap;

/// Sorted custom property map.
pub type Properties = BTreeMap<String, PropertyValue>;

/// 8-bit RGBA color as stored by Tiled (`#AARRGGBB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    /// Tiled's hex notation, alpha first.
    pub fn to_hex(self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.alpha, self.red, self.green, self.blue
        )
    }
}

/// A typed custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
    /// Path, as authored (relative to the file that declares it).
    File(String),
    Color(Rgba),
    /// Id of another object in the same map; `0` means none.
    Object(u32),
    Class {
        property_type: String,
        properties: Properties,
    },
}

impl PropertyValue {
    /// The `type` attribute Tiled writes for this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
            PropertyValue::File(_) => "file",
            PropertyValue::Color(_) => "color",
            PropertyValue::Object(_) => "object",
            PropertyValue::Class { .. } => "class",
        }
    }

    /// The `value` attribute Tiled writes for this value, if it has one.
    ///
    /// Class values carry nested properties instead.
    pub fn value_string(&self) -> Option<String> {
        match self {
            PropertyValue::Bool(v) => Some(v.to_string()),
            PropertyValue::Int(v) => Some(v.to_string()),
            PropertyValue::Float(v) => Some(v.to_string()),
            PropertyValue::String(v) | PropertyValue::File(v) => Some(v.clone()),
            PropertyValue::Color(c) => Some(c.to_hex()),
            PropertyValue::Object(id) => Some(id.to_string()),
            PropertyValue::Class { .. } => None,
        }
    }
}

impl From<&tiled::PropertyValue> for PropertyValue {
    fn from(value: &tiled::PropertyValue) -> Self {
        match value {
            tiled::PropertyValue::BoolValue(v) => PropertyValue::Bool(*v),
            tiled::PropertyValue::IntValue(v) => PropertyValue::Int(*v),
            tiled::PropertyValue::FloatValue(v) => PropertyValue::Float(*v),
            tiled::PropertyValue::StringValue(v) => PropertyValue::String(v.clone()),
            tiled::PropertyValue::FileValue(v) => PropertyValue::File(v.clone()),
            tiled::PropertyValue::ColorValue(c) => PropertyValue::Color(Rgba {
                red: c.red,
                green: c.green,
                blue: c.blue,
                alpha: c.alpha,
            }),
            tiled::PropertyValue::ObjectValue(id) => PropertyValue::Object(*id),
            tiled::PropertyValue::ClassValue {
                property_type,
                properties,
            } => PropertyValue::Class {
                property_type: property_type.clone(),
                properties: convert_properties(properties),
            },
        }
    }
}

/// Convert `tiled` properties into the sorted representation.
pub fn convert_properties(properties: &tiled::Properties) -> Properties {
    properties
        .iter()
        .map(|(name, value)| (name.clone(), PropertyValue::from(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_is_alpha_first() {
        let color = Rgba {
            red: 0x12,
            green: 0x34,
            blue: 0x56,
            alpha: 0xff,
        };
        assert_eq!(color.to_hex(), "#ff123456");
    }

    #[test]
    fn test_class_value_has_no_value_attribute() {
        let value = PropertyValue::Class {
            property_type: "Loot".to_string(),
            properties: Properties::new(),
        };
        assert_eq!(value.type_name(), "class");
        assert_eq!(value.value_string(), None);
    }

    #[test]
    fn test_convert_sorts_by_name() {
        let mut raw = tiled::Properties::new();
        raw.insert("zeta".to_string(), tiled::PropertyValue::IntValue(3));
        raw.insert("alpha".to_string(), tiled::PropertyValue::BoolValue(true));

        let converted = convert_properties(&raw);
        let names: Vec<&str> = converted.keys().map(String::as_str).collect();
        assert_eq!(names, ["alpha", "zeta"]);
        assert_eq!(converted["zeta"], PropertyValue::Int(3));
    }
}

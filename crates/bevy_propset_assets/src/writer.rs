//! TSX serialization.
//!
//! Output is what Tiled itself writes for the same data, so a written file
//! can be opened in the editor and parsed back into an identical
//! [`TilesetDefinition`].

use std::io::Write;
use std::path::Path;

use xml::common::XmlVersion;
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

use crate::error::TilesetError;
use crate::properties::Properties;
use crate::tileset::{AxisAlignedRect, TileDefinition, TileImage, TilesetDefinition, TilesetKind};

type Result<T> = std::result::Result<T, TilesetError>;

/// Serialize a tileset as TSX into `sink`.
pub fn write_tileset<W: Write>(definition: &TilesetDefinition, sink: W) -> Result<()> {
    let mut writer = EmitterConfig::new()
        .perform_indent(true)
        .indent_string(" ")
        .create_writer(sink);

    writer.write(XmlEvent::StartDocument {
        version: XmlVersion::Version10,
        encoding: Some("UTF-8"),
        standalone: None,
    })?;

    let tile_width = definition.tile_size.x.to_string();
    let tile_height = definition.tile_size.y.to_string();
    let spacing = definition.spacing.to_string();
    let margin = definition.margin.to_string();
    let tile_count = definition.tile_count.to_string();
    let columns = definition.columns.to_string();

    let mut root = XmlEvent::start_element("tileset");
    if let Some(version) = &definition.format_version {
        root = root.attr("version", version);
    }
    if let Some(tiled_version) = &definition.tiled_version {
        root = root.attr("tiledversion", tiled_version);
    }
    root = root
        .attr("name", &definition.name)
        .attr("tilewidth", &tile_width)
        .attr("tileheight", &tile_height);
    // Tiled omits zero spacing and margin
    if definition.spacing != 0 {
        root = root.attr("spacing", &spacing);
    }
    if definition.margin != 0 {
        root = root.attr("margin", &margin);
    }
    writer.write(
        root.attr("tilecount", &tile_count)
            .attr("columns", &columns),
    )?;

    if let Some(grid) = &definition.grid {
        let width = grid.width.to_string();
        let height = grid.height.to_string();
        writer.write(
            XmlEvent::start_element("grid")
                .attr("orientation", &grid.orientation)
                .attr("width", &width)
                .attr("height", &height),
        )?;
        writer.write(XmlEvent::end_element())?;
    }

    write_properties(&mut writer, &definition.properties)?;

    if let TilesetKind::Atlas(sheet) = &definition.kind {
        write_image(&mut writer, sheet)?;
    }

    for tile in &definition.tiles {
        write_tile(&mut writer, tile)?;
    }

    writer.write(XmlEvent::end_element())?;
    Ok(())
}

/// Serialize a tileset to a TSX string.
pub fn to_tsx_string(definition: &TilesetDefinition) -> Result<String> {
    let mut buffer = Vec::new();
    write_tileset(definition, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write a tileset to `path`, replacing any existing file.
pub fn save_tileset(definition: &TilesetDefinition, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let io_error = |source| TilesetError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = std::io::BufWriter::new(std::fs::File::create(path).map_err(io_error)?);
    write_tileset(definition, &mut file)?;
    file.flush().map_err(io_error)
}

fn write_tile<W: Write>(writer: &mut EventWriter<W>, tile: &TileDefinition) -> Result<()> {
    let id = tile.id.to_string();
    writer.write(XmlEvent::start_element("tile").attr("id", &id))?;

    write_properties(writer, &tile.properties)?;

    if let Some(image) = &tile.image {
        write_image(writer, image)?;
    }

    if !tile.collision_boxes.is_empty() {
        writer.write(
            XmlEvent::start_element("objectgroup")
                .attr("draworder", "index")
                .attr("id", "2"),
        )?;
        for (index, rect) in tile.collision_boxes.iter().enumerate() {
            write_rect(writer, index as u32 + 1, rect)?;
        }
        writer.write(XmlEvent::end_element())?;
    }

    writer.write(XmlEvent::end_element())?;
    Ok(())
}

fn write_image<W: Write>(writer: &mut EventWriter<W>, image: &TileImage) -> Result<()> {
    let width = image.width.to_string();
    let height = image.height.to_string();
    // Tiled always writes forward slashes
    let source = image.source.to_string_lossy().replace('\\', "/");

    writer.write(
        XmlEvent::start_element("image")
            .attr("width", &width)
            .attr("height", &height)
            .attr("source", &source),
    )?;
    writer.write(XmlEvent::end_element())?;
    Ok(())
}

fn write_rect<W: Write>(
    writer: &mut EventWriter<W>,
    object_id: u32,
    rect: &AxisAlignedRect,
) -> Result<()> {
    let id = object_id.to_string();
    let x = rect.x.to_string();
    let y = rect.y.to_string();
    let width = rect.width.to_string();
    let height = rect.height.to_string();

    writer.write(
        XmlEvent::start_element("object")
            .attr("id", &id)
            .attr("x", &x)
            .attr("y", &y)
            .attr("width", &width)
            .attr("height", &height),
    )?;
    writer.write(XmlEvent::end_element())?;
    Ok(())
}

fn write_properties<W: Write>(writer: &mut EventWriter<W>, properties: &Properties) -> Result<()> {
    if properties.is_empty() {
        return Ok(());
    }

    writer.write(XmlEvent::start_element("properties"))?;
    for (name, value) in properties {
        let mut element = XmlEvent::start_element("property").attr("name", name);
        // Untyped properties are strings
        if !matches!(value, crate::properties::PropertyValue::String(_)) {
            element = element.attr("type", value.type_name());
        }

        match value {
            crate::properties::PropertyValue::Class {
                property_type,
                properties,
            } => {
                writer.write(element.attr("propertytype", property_type))?;
                write_properties(writer, properties)?;
            }
            other => {
                let text = other.value_string().unwrap_or_default();
                writer.write(element.attr("value", &text))?;
            }
        }
        writer.write(XmlEvent::end_element())?;
    }
    writer.write(XmlEvent::end_element())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::tileset::{fixture_path, load_tileset, parse_tileset};
    use crate::properties::{PropertyValue, Rgba};

    #[test]
    fn test_fixture_round_trip_is_identical() {
        let original = load_tileset(fixture_path()).unwrap();
        let text = to_tsx_string(&original).unwrap();

        let reparsed = parse_tileset(&original.source, text.as_bytes()).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_save_then_load_from_disk() {
        let original = load_tileset(fixture_path()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TX Prop Objects.tsx");
        save_tileset(&original, &path).unwrap();

        let reloaded = load_tileset(&path).unwrap();
        assert_eq!(reloaded.source, path);
        assert_eq!(reloaded.tiles, original.tiles);
        assert_eq!(reloaded.name, original.name);
        assert_eq!(reloaded.grid, original.grid);
    }

    #[test]
    fn test_properties_round_trip() {
        let mut original = load_tileset(fixture_path()).unwrap();

        let mut loot = Properties::new();
        loot.insert("gold".to_string(), PropertyValue::Int(12));
        original
            .properties
            .insert("biome".to_string(), PropertyValue::String("ruins".to_string()));
        let barrel = &mut original.tiles[3].properties;
        barrel.insert("breakable".to_string(), PropertyValue::Bool(true));
        barrel.insert("weight".to_string(), PropertyValue::Float(2.5));
        barrel.insert(
            "tint".to_string(),
            PropertyValue::Color(Rgba {
                red: 200,
                green: 120,
                blue: 40,
                alpha: 255,
            }),
        );
        barrel.insert(
            "script".to_string(),
            PropertyValue::File("../scripts/barrel.nut".to_string()),
        );
        barrel.insert("owner".to_string(), PropertyValue::Object(7));
        barrel.insert(
            "loot".to_string(),
            PropertyValue::Class {
                property_type: "Loot".to_string(),
                properties: loot,
            },
        );

        let text = to_tsx_string(&original).unwrap();
        let reparsed = parse_tileset(&original.source, text.as_bytes()).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_output_matches_tiled_layout() {
        let original = load_tileset(fixture_path()).unwrap();
        let text = to_tsx_string(&original).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains(
            "<tileset version=\"1.8\" tiledversion=\"1.8.5\" name=\"TX Prop Objects\" \
             tilewidth=\"56\" tileheight=\"72\" tilecount=\"6\" columns=\"0\">"
        ));
        assert!(text.contains(
            "<image width=\"32\" height=\"64\" source=\"../graphics/sprites/player_placeholder.png\""
        ));
        assert!(text.contains("<object id=\"1\" x=\"6\" y=\"43\" width=\"21\" height=\"15\""));
    }
}

use std::io::Cursor;
use std::path::{Path, PathBuf};

use bevy::asset::LoadContext;
use normalize_path::NormalizePath;
use xml::reader::{EventReader, XmlEvent};

use crate::error::TilesetError;
use crate::tileset::TileGrid;

pub mod map;
pub mod tileset;

/// `tiled::ResourceReader` that serves a single document from memory.
///
/// Used when the bytes have already been read (by Bevy's asset reader, or by
/// [`tileset::load_tileset`]) so the document is not read from disk twice.
pub(crate) struct MemoryReader {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl MemoryReader {
    pub(crate) fn new(path: &Path, bytes: &[u8]) -> Self {
        Self {
            path: path.to_path_buf(),
            bytes: bytes.to_vec(),
        }
    }
}

impl tiled::ResourceReader for MemoryReader {
    type Resource = Cursor<Vec<u8>>;
    type Error = std::io::Error;

    fn read_from(&mut self, path: &Path) -> Result<Self::Resource, Self::Error> {
        if path == self.path {
            Ok(Cursor::new(self.bytes.clone()))
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{path:?} is not available in memory"),
            ))
        }
    }
}

/// Largest `tilecount` accepted before handing a document to `tiled`.
///
/// `tiled` allocates storage for every tile up front, so the declared count
/// has to be bounded before parsing. 65536 tiles is a 4096x4096 sheet of
/// 16px tiles.
pub const MAX_TILE_COUNT: u32 = 1 << 16;

/// Facts about a `.tsx` that `tiled` does not keep.
///
/// `tiled` stores tiles in a map keyed by id, so a repeated `<tile id>` is
/// silently overwritten. The outline records every id in authored order so
/// duplicates can be reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsxOutline {
    pub format_version: Option<String>,
    pub tiled_version: Option<String>,
    /// Declared `tilecount`, if present.
    pub tile_count: Option<u32>,
    pub grid: Option<TileGrid>,
    pub tile_ids: Vec<u32>,
}

/// Stream the document once with `xml-rs`, rejecting anything that is not a
/// well-formed `<tileset>` or that declares more than [`MAX_TILE_COUNT`]
/// tiles.
pub fn scan_tsx_outline(path: &Path, bytes: &[u8]) -> Result<TsxOutline, TilesetError> {
    let mut outline = TsxOutline::default();
    let mut depth = 0usize;
    let mut saw_root = false;

    for event in EventReader::new(bytes) {
        let event = event.map_err(|source| TilesetError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        match event {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                depth += 1;
                let attr = |key: &str| {
                    attributes
                        .iter()
                        .find(|a| a.name.local_name == key)
                        .map(|a| a.value.clone())
                };

                match (depth, name.local_name.as_str()) {
                    (1, "tileset") => {
                        saw_root = true;
                        outline.format_version = attr("version");
                        outline.tiled_version = attr("tiledversion");
                        if let Some(value) = attr("tilecount") {
                            let count =
                                parse_u32_attr(path, "tileset", "tilecount", Some(value))?;
                            if count > MAX_TILE_COUNT {
                                return Err(TilesetError::Layout {
                                    path: path.to_path_buf(),
                                    reason: format!(
                                        "tilecount {count} exceeds the supported maximum of {MAX_TILE_COUNT}"
                                    ),
                                });
                            }
                            outline.tile_count = Some(count);
                        }
                    }
                    (1, other) => {
                        return Err(TilesetError::Layout {
                            path: path.to_path_buf(),
                            reason: format!("root element is <{other}>, expected <tileset>"),
                        });
                    }
                    (2, "grid") => {
                        outline.grid = Some(TileGrid {
                            orientation: attr("orientation")
                                .unwrap_or_else(|| "orthogonal".to_string()),
                            width: parse_u32_attr(path, "grid", "width", attr("width"))?,
                            height: parse_u32_attr(path, "grid", "height", attr("height"))?,
                        });
                    }
                    (2, "tile") => {
                        outline
                            .tile_ids
                            .push(parse_u32_attr(path, "tile", "id", attr("id"))?);
                    }
                    _ => {}
                }
            }
            XmlEvent::EndElement { .. } => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    if !saw_root {
        return Err(TilesetError::Layout {
            path: path.to_path_buf(),
            reason: "document has no <tileset> element".to_string(),
        });
    }

    Ok(outline)
}

fn parse_u32_attr(
    path: &Path,
    element: &str,
    key: &str,
    value: Option<String>,
) -> Result<u32, TilesetError> {
    let layout = |reason: String| TilesetError::Layout {
        path: path.to_path_buf(),
        reason,
    };
    let value = value.ok_or_else(|| layout(format!("<{element}> is missing `{key}`")))?;
    value
        .trim()
        .parse()
        .map_err(|_| layout(format!("<{element} {key}=\"{value}\"> is not a non-negative integer")))
}

/// Resolve relative path from a Tiled file to a Bevy asset path
///
/// Tiled uses relative paths like `../path/to/image.png`, but Bevy's asset system
/// expects asset-root-relative paths like `path/to/image.png`.
///
/// This function:
/// 1. Gets the parent directory of the current asset
/// 2. Joins the relative path to the parent
/// 3. Normalizes path separators (Windows `\` → Unix `/`)
pub(crate) fn resolve_relative_path(
    load_context: &LoadContext,
    relative_path: &Path,
) -> Result<String, TilesetError> {
    let parent = load_context.asset_path().path().parent().ok_or_else(|| {
        TilesetError::InvalidPath(format!(
            "No parent directory for asset: {:?}",
            load_context.asset_path().path()
        ))
    })?;

    asset_path_string(&parent.join(relative_path))
}

/// Normalize a joined path into Bevy's forward-slash form.
pub(crate) fn asset_path_string(path: &Path) -> Result<String, TilesetError> {
    // Path::join does NOT resolve `..`
    let normalized = path.normalize();

    // If the path already starts with "assets/", it came from a filesystem
    // load - strip the prefix
    let normalized = normalized
        .strip_prefix("assets")
        .map(Path::to_path_buf)
        .unwrap_or(normalized);

    Ok(normalized
        .to_str()
        .ok_or_else(|| {
            TilesetError::InvalidPath(format!("Invalid UTF-8 in path: {:?}", normalized))
        })?
        .replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.8" tiledversion="1.8.5" name="t" tilewidth="8" tileheight="8" tilecount="2" columns="0">
 <grid orientation="orthogonal" width="1" height="1"/>
 <tile id="1"><image width="8" height="8" source="b.png"/></tile>
 <tile id="0"><image width="8" height="8" source="a.png"/></tile>
</tileset>"#;

    #[test]
    fn test_outline_keeps_authored_order() {
        let outline = scan_tsx_outline(Path::new("t.tsx"), TSX.as_bytes()).unwrap();
        assert_eq!(outline.tile_ids, vec![1, 0]);
        assert_eq!(outline.format_version.as_deref(), Some("1.8"));
        assert_eq!(outline.tiled_version.as_deref(), Some("1.8.5"));
        assert_eq!(outline.tile_count, Some(2));
        assert_eq!(
            outline.grid,
            Some(TileGrid {
                orientation: "orthogonal".to_string(),
                width: 1,
                height: 1,
            })
        );
    }

    #[test]
    fn test_outline_rejects_truncated_document() {
        let cut = &TSX.as_bytes()[..TSX.len() / 2];
        let err = scan_tsx_outline(Path::new("t.tsx"), cut).unwrap_err();
        assert!(matches!(err, TilesetError::Malformed { .. }), "{err}");
    }

    #[test]
    fn test_outline_rejects_other_roots() {
        let err = scan_tsx_outline(Path::new("m.tmx"), b"<map width=\"1\"/>").unwrap_err();
        assert!(matches!(err, TilesetError::Layout { .. }), "{err}");
    }

    #[test]
    fn test_outline_rejects_bad_tile_id() {
        let doc = r#"<tileset name="t"><tile id="-3"/></tileset>"#;
        let err = scan_tsx_outline(Path::new("t.tsx"), doc.as_bytes()).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_outline_rejects_huge_tile_count() {
        let doc = r#"<tileset name="t" tilewidth="8" tileheight="8" tilecount="50000000" columns="0">
 <tile id="0"><image width="8" height="8" source="a.png"/></tile>
</tileset>"#;
        let err = scan_tsx_outline(Path::new("t.tsx"), doc.as_bytes()).unwrap_err();
        assert!(matches!(err, TilesetError::Layout { .. }), "{err}");

        let at_limit = doc.replace("50000000", &MAX_TILE_COUNT.to_string());
        let outline = scan_tsx_outline(Path::new("t.tsx"), at_limit.as_bytes()).unwrap();
        assert_eq!(outline.tile_count, Some(MAX_TILE_COUNT));
    }

    #[test]
    fn test_asset_path_string_strips_assets_root() {
        let path = Path::new("assets/tilesets/../graphics/sprites/statue.png");
        assert_eq!(
            asset_path_string(path).unwrap(),
            "graphics/sprites/statue.png"
        );
    }

    #[test]
    fn test_memory_reader_only_serves_its_own_path() {
        use tiled::ResourceReader;

        let mut reader = MemoryReader::new(Path::new("t.tsx"), b"abc");
        assert!(reader.read_from(Path::new("t.tsx")).is_ok());
        assert!(reader.read_from(Path::new("other.tsx")).is_err());
    }
}

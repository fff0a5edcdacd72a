use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response to `GET /api/files?recursive=true`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FileListing {
    /// Top level files and folders.
    pub files: Vec<FileEntry>,

    /// Free space on the storage, in bytes.
    #[serde(default)]
    pub free: Option<u64>,

    /// Total size of the storage, in bytes.
    #[serde(default)]
    pub total: Option<u64>,
}

impl FileListing {
    /// Every entry in the listing, depth first, folders before their
    /// children.
    pub fn walk(&self) -> Vec<&FileEntry> {
        fn visit<'a>(entries: &'a [FileEntry], out: &mut Vec<&'a FileEntry>) {
            for entry in entries {
                out.push(entry);
                if let FileEntry::Folder(folder) = entry {
                    visit(&folder.children, out);
                }
            }
        }

        let mut out = vec![];
        visit(&self.files, &mut out);
        out
    }

    /// Find an entry by its full path on the server.
    pub fn find(&self, path: &str) -> Option<&FileEntry> {
        let path = path.trim_matches('/');
        self.walk().into_iter().find(|entry| entry.path() == path)
    }
}

/// A file or folder on the OctoPrint server, tagged by its `type`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileEntry {
    /// A folder, possibly holding more entries.
    Folder(Folder),

    /// Sliced gcode ready to print.
    Machinecode(MachineCode),

    /// A model (STL) that can be sliced server side.
    Model(Model),
}

impl FileEntry {
    /// Name of the entry, without its folder.
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(f) => &f.name,
            Self::Machinecode(f) => &f.name,
            Self::Model(f) => &f.name,
        }
    }

    /// Full path of the entry on the server.
    pub fn path(&self) -> &str {
        match self {
            Self::Folder(f) => &f.path,
            Self::Machinecode(f) => &f.path,
            Self::Model(f) => &f.path,
        }
    }

    /// Links to the entry.
    pub fn refs(&self) -> &Refs {
        match self {
            Self::Folder(f) => &f.refs,
            Self::Machinecode(f) => &f.refs,
            Self::Model(f) => &f.refs,
        }
    }

    /// Value of the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Folder(_) => "folder",
            Self::Machinecode(_) => "machinecode",
            Self::Model(_) => "model",
        }
    }
}

/// Links returned alongside each entry.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Refs {
    /// Api resource of the entry.
    pub resource: String,

    /// Download link, absent for folders.
    #[serde(default)]
    pub download: Option<String>,
}

/// A folder entry.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Folder name.
    pub name: String,
    /// Display name.
    #[serde(default)]
    pub display: Option<String>,
    /// Full path.
    pub path: String,
    /// `local` or `sdcard`.
    pub origin: String,
    /// Links to the folder.
    pub refs: Refs,
    /// Size of everything inside, in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Type hierarchy, always `["folder"]`.
    #[serde(default)]
    pub type_path: Vec<String>,
    /// Entries inside the folder.
    #[serde(default)]
    pub children: Vec<FileEntry>,
}

/// A gcode entry.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineCode {
    /// File name.
    pub name: String,
    /// Display name.
    #[serde(default)]
    pub display: Option<String>,
    /// Full path.
    pub path: String,
    /// `local` or `sdcard`.
    pub origin: String,
    /// Links to the file.
    pub refs: Refs,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Upload time.
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub date: Option<DateTime<Utc>>,
    /// SHA1 of the file contents.
    #[serde(default)]
    pub hash: Option<String>,
    /// Type hierarchy, e.g. `["machinecode", "gcode"]`.
    #[serde(default)]
    pub type_path: Vec<String>,
    /// Results of the server's gcode analysis, once it has run.
    #[serde(default)]
    pub gcode_analysis: Option<GcodeAnalysis>,
}

/// A model entry.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// File name.
    pub name: String,
    /// Display name.
    #[serde(default)]
    pub display: Option<String>,
    /// Full path.
    pub path: String,
    /// `local` or `sdcard`.
    pub origin: String,
    /// Links to the file.
    pub refs: Refs,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Upload time.
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub date: Option<DateTime<Utc>>,
    /// SHA1 of the file contents.
    #[serde(default)]
    pub hash: Option<String>,
    /// Type hierarchy, e.g. `["model", "stl"]`.
    #[serde(default)]
    pub type_path: Vec<String>,
}

/// Server side analysis of a gcode file.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GcodeAnalysis {
    /// Estimated print time, in seconds.
    #[serde(default)]
    pub estimated_print_time: Option<f64>,

    /// Filament use, keyed by tool (`tool0`, `tool1`, ...).
    #[serde(default)]
    pub filament: BTreeMap<String, Filament>,

    /// Extent of the printed object.
    #[serde(default)]
    pub dimensions: Option<Dimensions>,

    /// Bounding box of all moves.
    #[serde(default)]
    pub printing_area: Option<PrintingArea>,
}

/// Filament used by one tool.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Filament {
    /// Length in millimeters.
    pub length: f64,
    /// Volume in cubic centimeters.
    pub volume: f64,
}

/// Size of the printed object, in millimeters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Dimensions {
    /// Front to back.
    pub depth: f64,
    /// Up and down.
    pub height: f64,
    /// Left and right.
    pub width: f64,
}

/// Bounding box of the print moves, in millimeters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintingArea {
    /// Smallest X.
    pub min_x: f64,
    /// Largest X.
    pub max_x: f64,
    /// Smallest Y.
    pub min_y: f64,
    /// Largest Y.
    pub max_y: f64,
    /// Smallest Z.
    pub min_z: f64,
    /// Largest Z.
    pub max_z: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    const LISTING: &str = r#"{
  "files": [
    {
      "name": "prints",
      "display": "prints",
      "path": "prints",
      "origin": "local",
      "type": "folder",
      "typePath": ["folder"],
      "size": 1468987,
      "refs": { "resource": "http://octopi/api/files/local/prints" },
      "children": [
        {
          "name": "cube.gcode",
          "display": "cube.gcode",
          "path": "prints/cube.gcode",
          "origin": "local",
          "type": "machinecode",
          "typePath": ["machinecode", "gcode"],
          "size": 1468987,
          "date": 1378847754,
          "hash": "abc",
          "refs": {
            "resource": "http://octopi/api/files/local/prints/cube.gcode",
            "download": "http://octopi/downloads/files/local/prints/cube.gcode"
          },
          "gcodeAnalysis": {
            "estimatedPrintTime": 1188.0,
            "filament": { "tool0": { "length": 810.0, "volume": 5.36 } },
            "dimensions": { "depth": 20.0, "height": 20.0, "width": 20.0 },
            "printingArea": {
              "minX": 90.0, "maxX": 110.0,
              "minY": 90.0, "maxY": 110.0,
              "minZ": 0.2, "maxZ": 20.0
            }
          }
        },
        {
          "name": "cube.stl",
          "path": "prints/cube.stl",
          "origin": "local",
          "type": "model",
          "typePath": ["model", "stl"],
          "size": 684,
          "date": 1378847754,
          "hash": "def",
          "refs": {
            "resource": "http://octopi/api/files/local/prints/cube.stl",
            "download": "http://octopi/downloads/files/local/prints/cube.stl"
          }
        }
      ]
    }
  ],
  "free": 3060653056
}"#;

    #[test]
    fn test_parse_listing() -> TestResult {
        let listing: FileListing = serde_json::from_str(LISTING)?;
        assert_eq!(listing.free, Some(3060653056));

        let kinds: Vec<&str> = listing.walk().into_iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["folder", "machinecode", "model"]);

        let Some(FileEntry::Machinecode(gcode)) = listing.find("/prints/cube.gcode") else {
            panic!("gcode entry missing");
        };
        let analysis = gcode.gcode_analysis.as_ref().expect("analysis");
        assert_eq!(analysis.estimated_print_time, Some(1188.0));
        assert_eq!(analysis.filament["tool0"].length, 810.0);
        assert_eq!(analysis.printing_area.expect("printing area").max_z, 20.0);
        assert_eq!(gcode.date.expect("date").timestamp(), 1378847754);

        let model = listing.find("prints/cube.stl").expect("model entry");
        assert_eq!(model.name(), "cube.stl");
        assert_eq!(
            model.refs().download.as_deref(),
            Some("http://octopi/downloads/files/local/prints/cube.stl")
        );
        Ok(())
    }

    #[test]
    fn test_parse_empty_folder() -> TestResult {
        let listing: FileListing = serde_json::from_str(
            r#"{"files": [{"name": "empty", "path": "empty", "origin": "local", "type": "folder",
                "refs": {"resource": "http://octopi/api/files/local/empty"}}]}"#,
        )?;
        assert_eq!(listing.walk().len(), 1);
        assert_eq!(listing.free, None);
        Ok(())
    }
}

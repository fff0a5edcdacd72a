//! Code for the configuration of an action.
//!
//! Every setting has a default, so an empty file (or no file at all) is a
//! valid configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{curl::Credentials, Axis, ExportMode, LocalSlicer, LogLevel, Placement, PrintServerKind, SplitMode};

/// The configuration of one action. Read-only once the action starts.
#[derive(Default, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// STL export options.
    pub export: ExportConfig,
    /// OBJ import options, used when reimporting repaired meshes.
    pub import: ImportConfig,
    /// Slic3r executable and slicing options.
    pub slic3r: Slic3rConfig,
    /// CuraEngine executable and slicing options.
    pub curaengine: CuraEngineConfig,
    /// curl executable.
    pub curl: CurlConfig,
    /// OctoPrint server.
    pub octoprint: OctoPrintConfig,
    /// Repetier server.
    pub repetier: RepetierConfig,
    /// Everything else.
    pub misc: MiscConfig,
    /// OctoPrint webcam preview.
    pub octoprint_webcam: WebcamConfig,
    /// Repetier webcam preview.
    pub repetier_webcam: WebcamConfig,
}

impl Config {
    /// Parse a configuration from a toml file.
    pub fn from_file(file: &Path) -> Result<Self> {
        let config = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        Self::from_str(&config)
    }

    /// Parse a configuration from a toml string.
    pub fn from_str(config: &str) -> Result<Self> {
        Ok(toml::from_str(config)?)
    }

    /// Webcam settings for the given print server.
    pub fn webcam(&self, server: PrintServerKind) -> &WebcamConfig {
        match server {
            PrintServerKind::OctoPrint => &self.octoprint_webcam,
            PrintServerKind::Repetier => &self.repetier_webcam,
        }
    }
}

fn temp_dir() -> PathBuf {
    std::env::temp_dir()
}

/// STL export options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// How the selection is grouped.
    pub mode: ExportMode,
    /// Axis that points forward in the exported file.
    pub axis_forward: Axis,
    /// Axis that points up in the exported file.
    pub axis_up: Axis,
    /// Write ASCII instead of binary STL.
    pub ascii: bool,
    /// Scale applied to every vertex.
    pub global_scale: f32,
    /// Also apply the scene's unit scale.
    pub use_scene_unit: bool,
    /// Warn before replacing a file that already exists.
    pub check_existing: bool,
    /// Where exported STL files are written.
    pub temp_stl_directory: PathBuf,
    /// Remove exported STL files once the action ends.
    pub clean_temp_stl_files: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            mode: ExportMode::Individual,
            axis_forward: Axis::Y,
            axis_up: Axis::Z,
            ascii: false,
            global_scale: 1.0,
            use_scene_unit: false,
            check_existing: true,
            temp_stl_directory: temp_dir(),
            clean_temp_stl_files: true,
        }
    }
}

/// OBJ import options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Axis that points forward in the imported file.
    pub axis_forward: Axis,
    /// Axis that points up in the imported file.
    pub axis_up: Axis,
    /// Import lines and two-vertex faces as edges.
    pub use_edges: bool,
    /// Honour smoothing groups.
    pub use_smooth_groups: bool,
    /// Split on `o` records.
    pub use_split_objects: bool,
    /// Split on `g` records.
    pub use_split_groups: bool,
    /// Import groups as vertex groups.
    pub use_groups_as_vgroups: bool,
    /// Search for referenced images.
    pub use_image_search: bool,
    /// Whether to split at all.
    pub split_mode: SplitMode,
    /// Scale the imported mesh down to fit this size, 0 to disable.
    pub global_clamp_size: f32,
    /// Where repaired OBJ files are kept.
    pub temp_obj_directory: PathBuf,
    /// Remove repaired OBJ files once the action ends.
    pub clean_temp_obj_files: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            axis_forward: Axis::Y,
            axis_up: Axis::Z,
            use_edges: true,
            use_smooth_groups: true,
            use_split_objects: true,
            use_split_groups: true,
            use_groups_as_vgroups: false,
            use_image_search: true,
            split_mode: SplitMode::On,
            global_clamp_size: 0.0,
            temp_obj_directory: temp_dir(),
            clean_temp_obj_files: true,
        }
    }
}

/// Slic3r executable and slicing options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Slic3rConfig {
    /// Directory holding the executable, `PATH` is searched when it does
    /// not exist.
    pub exec_dir: PathBuf,
    /// Executable name.
    pub exec_name: String,
    /// `.ini` passed with `--load` when it exists.
    pub config_path: PathBuf,
    /// Script passed with `--post-process` when it exists.
    pub post_script: PathBuf,
    /// Extra arguments, split on whitespace.
    pub extra_args: String,
    /// Empty that repaired meshes are parented to.
    pub repaired_parent_name: String,
}

impl Default for Slic3rConfig {
    fn default() -> Self {
        Self {
            exec_dir: PathBuf::new(),
            exec_name: if cfg!(target_os = "windows") {
                "slic3r-console.exe".to_owned()
            } else {
                "slic3r".to_owned()
            },
            config_path: PathBuf::new(),
            post_script: PathBuf::new(),
            extra_args: String::new(),
            repaired_parent_name: "Slic3r-Fixed-Meshes".to_owned(),
        }
    }
}

/// CuraEngine executable and slicing options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CuraEngineConfig {
    /// Directory holding the executable.
    pub exec_dir: PathBuf,
    /// Executable name.
    pub exec_name: String,
    /// Settings passed with `-j` when it exists.
    pub config_path: PathBuf,
    /// Extra arguments, split on whitespace.
    pub extra_args: String,
}

impl Default for CuraEngineConfig {
    fn default() -> Self {
        Self {
            exec_dir: PathBuf::new(),
            exec_name: "CuraEngine".to_owned(),
            config_path: PathBuf::new(),
            extra_args: String::new(),
        }
    }
}

/// curl executable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CurlConfig {
    /// Directory holding the executable.
    pub exec_dir: PathBuf,
    /// Executable name.
    pub exec_name: String,
    /// Arguments for the connectivity test, separated by `", "`.
    pub test_args: String,
}

impl Default for CurlConfig {
    fn default() -> Self {
        Self {
            exec_dir: PathBuf::new(),
            exec_name: "curl".to_owned(),
            test_args: String::new(),
        }
    }
}

/// How to reach and authenticate against a print server.
pub trait ServerEndpoint {
    /// Host or url, e.g. `http://localhost`.
    fn host(&self) -> &str;
    /// Port, empty when the host already implies one.
    fn port(&self) -> &str;
    /// Api key and basic auth, whichever are configured.
    fn credentials(&self) -> Credentials;

    /// `host:port`, or just the host when no port is set.
    fn base_url(&self) -> String {
        join_port(self.host(), self.port())
    }
}

pub(crate) fn join_port(host: &str, port: &str) -> String {
    let host = host.trim_end_matches('/');
    if port.is_empty() {
        host.to_owned()
    } else {
        format!("{}:{}", host, port)
    }
}

/// OctoPrint server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OctoPrintConfig {
    /// Upload gcode produced by the local slicers.
    pub auto_upload_from_slicers: bool,
    /// Host or url.
    pub host: String,
    /// Listening port.
    pub port: String,
    /// Basic auth user for a reverse proxy.
    pub user: String,
    /// Basic auth password for a reverse proxy.
    pub password: String,
    /// `X-Api-Key` sent with every request.
    pub api_key: String,
    /// `/api/files/local` or `/api/files/sdcard`.
    pub api_path: String,
    /// Remote folder gcode uploads land in.
    pub gcode_directory: String,
    /// Remote folder STL uploads land in, also where server side slicing
    /// writes its gcode.
    pub stl_directory: String,
    /// Folder created by the `mkdir` action.
    pub new_dir: String,
    /// Ask the server to slice uploaded STL files.
    pub slice_uploaded_stl: bool,
    /// Server side slicer.
    pub slicer: String,
    /// Printer profile for server side slicing.
    pub printer_profile: String,
    /// Slicing profile for server side slicing.
    pub slice_profile: String,
    /// Profile overrides, `key:value, key:value`.
    pub profile_overrides: String,
    /// X position the sliced model is centered on.
    pub position_x: i64,
    /// Y position the sliced model is centered on.
    pub position_y: i64,
}

impl Default for OctoPrintConfig {
    fn default() -> Self {
        Self {
            auto_upload_from_slicers: false,
            host: "http://localhost".to_owned(),
            port: "5000".to_owned(),
            user: String::new(),
            password: String::new(),
            api_key: String::new(),
            api_path: octoprint_api::FILES_LOCAL.to_owned(),
            gcode_directory: String::new(),
            stl_directory: String::new(),
            new_dir: String::new(),
            slice_uploaded_stl: false,
            slicer: "cura".to_owned(),
            printer_profile: String::new(),
            slice_profile: String::new(),
            profile_overrides: String::new(),
            position_x: 0,
            position_y: 0,
        }
    }
}

impl ServerEndpoint for OctoPrintConfig {
    fn host(&self) -> &str {
        &self.host
    }
    fn port(&self) -> &str {
        &self.port
    }
    fn credentials(&self) -> Credentials {
        Credentials::new(&self.api_key, &self.user, &self.password)
    }
}

/// Repetier server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RepetierConfig {
    /// Upload gcode produced by the local slicers.
    pub auto_upload_from_slicers: bool,
    /// Host or url.
    pub host: String,
    /// Listening port.
    pub port: String,
    /// Basic auth user for a reverse proxy.
    pub user: String,
    /// Basic auth password for a reverse proxy.
    pub password: String,
    /// `x-api-key` sent with every request.
    pub api_key: String,
    /// Upload endpoint.
    pub api_path: String,
    /// Printer slug the gcode is uploaded to.
    pub gcode_directory: String,
}

impl Default for RepetierConfig {
    fn default() -> Self {
        Self {
            auto_upload_from_slicers: false,
            host: "http://localhost".to_owned(),
            port: "3344".to_owned(),
            user: String::new(),
            password: String::new(),
            api_key: String::new(),
            api_path: "/printer/model".to_owned(),
            gcode_directory: String::new(),
        }
    }
}

impl ServerEndpoint for RepetierConfig {
    fn host(&self) -> &str {
        &self.host
    }
    fn port(&self) -> &str {
        &self.port
    }
    fn credentials(&self) -> Credentials {
        Credentials::new(&self.api_key, &self.user, &self.password)
    }
}

/// Everything else.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MiscConfig {
    /// How much of each external command is logged.
    pub log_level: LogLevel,
    /// Open the print server's web ui after uploading.
    pub open_browser_after_upload: bool,
    /// Open sliced gcode in the text editor.
    pub preview_gcode: bool,
    /// Where local slicers write gcode.
    pub gcode_directory: PathBuf,
    /// Slicer used when none is named.
    pub preferred_local_slicer: LocalSlicer,
    /// Print server used when none is named.
    pub preferred_print_server: PrintServerKind,
    /// Color of on-screen button labels, RGBA.
    pub button_text_color: [f32; 4],
    /// Color of on-screen button backgrounds, RGBA.
    pub button_background_color: [f32; 4],
}

impl Default for MiscConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Scrubbed,
            open_browser_after_upload: false,
            preview_gcode: false,
            gcode_directory: temp_dir(),
            preferred_local_slicer: LocalSlicer::Slic3r,
            preferred_print_server: PrintServerKind::OctoPrint,
            button_text_color: [0.1, 0.75, 0.75, 1.0],
            button_background_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Webcam preview settings for one print server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebcamConfig {
    /// Where snapshots (and the file listing) are downloaded.
    pub snapshot_dir: PathBuf,
    /// Base name for the snapshot and every scene object built around it.
    /// Defaults to `OctoPrint_Preview` or `Repetier_Preview`.
    pub snapshot_name: Option<String>,
    /// Webcam port, empty to use the host as is.
    pub camera_port: String,
    /// Pixels per scene unit of the preview plane.
    pub xy_scale: u32,
    /// Appended to the camera url to request a still image.
    pub snapshot_action: String,
    /// Appended to the camera url to request the stream.
    pub stream_action: String,
    /// Where the preview plane is placed.
    pub placement: Placement,
    /// Scene layer the preview lives on, 0 to 19.
    pub layer: u8,
    /// Screen whose 3D views are switched to the preview.
    pub target_screen: String,
    /// Index of the 3D view to switch, 0 to 9.
    pub target_3dview: u8,
}

impl Default for WebcamConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: temp_dir(),
            snapshot_name: None,
            camera_port: "8080".to_owned(),
            xy_scale: 10,
            snapshot_action: "?action=snapshot".to_owned(),
            stream_action: "?action=stream".to_owned(),
            placement: Placement::Center,
            layer: 0,
            target_screen: "Default".to_owned(),
            target_3dview: 0,
        }
    }
}

impl WebcamConfig {
    /// Base name for the snapshot and the objects built around it.
    pub fn snapshot_name(&self, server: PrintServerKind) -> &str {
        match (&self.snapshot_name, server) {
            (Some(name), _) => name,
            (None, PrintServerKind::OctoPrint) => "OctoPrint_Preview",
            (None, PrintServerKind::Repetier) => "Repetier_Preview",
        }
    }
}

//! The scene the pipeline works against.
//!
//! Every operation on the 3D document (selection, mesh export and import,
//! preview objects, game logic, viewport) goes through [Host], which is
//! passed explicitly to each driver rather than read from global state.

use std::{
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    config::{ExportConfig, ImportConfig},
    Axis, SplitMode,
};

/// Options for writing selected objects to an STL file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Axis that points forward in the file.
    pub axis_forward: Axis,
    /// Axis that points up in the file.
    pub axis_up: Axis,
    /// ASCII instead of binary.
    pub ascii: bool,
    /// Scale applied to every vertex.
    pub global_scale: f32,
    /// Also apply the scene's unit scale.
    pub use_scene_unit: bool,
    /// Warn before replacing an existing file.
    pub check_existing: bool,
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            axis_forward: config.axis_forward,
            axis_up: config.axis_up,
            ascii: config.ascii,
            global_scale: config.global_scale,
            use_scene_unit: config.use_scene_unit,
            check_existing: config.check_existing,
        }
    }
}

/// Options for reading an OBJ file into the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Axis that points forward in the file.
    pub axis_forward: Axis,
    /// Axis that points up in the file.
    pub axis_up: Axis,
    /// Keep `l` records as loose edges.
    pub use_edges: bool,
    /// Honour smoothing groups.
    pub use_smooth_groups: bool,
    /// Start a new object at each `o` record.
    pub use_split_objects: bool,
    /// Start a new object at each `g` record.
    pub use_split_groups: bool,
    /// Keep groups as vertex groups.
    pub use_groups_as_vgroups: bool,
    /// Search for referenced images.
    pub use_image_search: bool,
    /// Split at all.
    pub split_mode: SplitMode,
    /// Shrink by powers of ten until the mesh fits this size, 0 to disable.
    pub global_clamp_size: f32,
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            axis_forward: config.axis_forward,
            axis_up: config.axis_up,
            use_edges: config.use_edges,
            use_smooth_groups: config.use_smooth_groups,
            use_split_objects: config.use_split_objects,
            use_split_groups: config.use_split_groups,
            use_groups_as_vgroups: config.use_groups_as_vgroups,
            use_image_search: config.use_image_search,
            split_mode: config.split_mode,
            global_clamp_size: config.global_clamp_size,
        }
    }
}

/// A textured plane showing the webcam image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneSpec {
    /// Object name.
    pub name: String,
    /// Material holding the texture.
    pub material: String,
    /// Image texture.
    pub texture: String,
    /// Image shown on the plane.
    pub image: PathBuf,
    /// Size along X.
    pub width: f32,
    /// Size along Y.
    pub height: f32,
    /// Center of the plane.
    pub location: [f32; 3],
    /// Scene layer.
    pub layer: u8,
}

/// Mouse events a sensor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MouseEvent {
    /// Left button pressed over anything.
    LeftClick,
    /// Pointer over the object.
    MouseOver,
}

/// What triggers a logic graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Fires every logic tick.
    Always {
        /// Keep firing while true instead of once.
        pulse: bool,
    },
    /// Fires on a mouse event.
    Mouse(MouseEvent),
}

/// Named sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    /// Sensor name.
    pub name: String,
    /// Trigger.
    pub kind: SensorKind,
}

/// How sensor pulses are combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// Run the named text block as a script.
    Python {
        /// Text block holding the script.
        script: String,
    },
    /// Pass when every sensor is positive.
    LogicAnd,
}

/// Named controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    /// Controller name.
    pub name: String,
    /// Combination rule.
    pub kind: ControllerKind,
}

/// Effects an actuator can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    /// Leave game playback.
    GameQuit,
}

/// Named actuator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actuator {
    /// Actuator name.
    pub name: String,
    /// Effect.
    pub kind: ActuatorKind,
}

/// Sensors linked to one controller, optionally driving one actuator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicGraph {
    /// Triggers.
    pub sensors: Vec<Sensor>,
    /// Controller every sensor is linked to.
    pub controller: Controller,
    /// Effect of the controller, if any.
    pub actuator: Option<Actuator>,
}

/// A text label on a backing plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSpec {
    /// Text object name; the backing plane is `<name>_Plane`.
    pub name: String,
    /// Label.
    pub body: String,
    /// Where the label's center sits.
    pub location: [f32; 3],
    /// Scene layer.
    pub layer: u8,
    /// Label color, RGBA.
    pub text_color: [f32; 4],
    /// Plane color, RGBA.
    pub background_color: [f32; 4],
}

impl ButtonSpec {
    /// Name of the backing plane.
    pub fn plane_name(&self) -> String {
        format!("{}_Plane", self.name)
    }
}

/// How a 3D view should be switched to show the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSpec {
    /// Screen holding the 3D views.
    pub screen: String,
    /// Index of the 3D view to change.
    pub view_index: u8,
    /// Only layer left visible.
    pub layer: u8,
    /// Render engine, `BLENDER_GAME`.
    pub render_engine: String,
    /// Game material mode, `GLSL`.
    pub material_mode: String,
    /// Viewport shading, `TEXTURED`.
    pub shading: String,
    /// Start game playback once configured.
    pub play: bool,
}

/// The 3D document an action runs against.
pub trait Host {
    /// Names of the selected objects, in selection order.
    fn selection(&self) -> Vec<String>;

    /// Path of the document, `None` when it has never been saved.
    fn document_path(&self) -> Option<PathBuf>;

    /// Write `objects` together into one STL file at `path`.
    fn export_stl(&mut self, objects: &[String], path: &Path, options: &ExportOptions) -> Result<()>;

    /// Read an OBJ file into the scene, returning the new objects.
    fn import_obj(&mut self, path: &Path, options: &ImportOptions) -> impl Future<Output = Result<Vec<String>>>;

    /// Hide an object.
    fn hide(&mut self, object: &str) -> Result<()>;

    /// Parent `children` to the empty named `empty`, creating it if it does
    /// not exist yet.
    fn parent_to_named_empty(&mut self, empty: &str, children: &[String]) -> Result<()>;

    /// Open a file in the text editor, replacing an earlier copy.
    fn open_text(&mut self, path: &Path) -> impl Future<Output = Result<()>>;

    /// Open a url in the user's browser.
    fn open_url(&mut self, url: &str) -> Result<()>;

    /// Load (or reload) an image, returning its size in pixels.
    fn load_image(&mut self, path: &Path) -> Result<(u32, u32)>;

    /// Create the plane, or update it if one with the same name exists.
    fn upsert_plane(&mut self, plane: &PlaneSpec) -> Result<()>;

    /// Create or overwrite a text block.
    fn write_text_block(&mut self, name: &str, body: &str) -> Result<()>;

    /// Attach game logic to an existing object, replacing bricks with the
    /// same names.
    fn attach_logic(&mut self, object: &str, logic: &LogicGraph) -> Result<()>;

    /// Create the button, or update it if it exists.
    fn upsert_button(&mut self, button: &ButtonSpec) -> Result<()>;

    /// Switch a 3D view over to the preview.
    fn configure_viewport(&mut self, viewport: &ViewportSpec) -> Result<()>;
}

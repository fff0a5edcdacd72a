//! A [Host] that keeps its scene in memory and reads and writes mesh files
//! on disk, so actions can run without a 3D editor.

pub mod mesh;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use self::mesh::{Mesh, ObjSplit};
use crate::{
    axis::AxisConversion,
    error::Error,
    naming,
    traits::{ButtonSpec, ExportOptions, Host, ImportOptions, LogicGraph, PlaneSpec, ViewportSpec},
};

/// Width of one label character, in scene units.
const GLYPH_WIDTH: f32 = 0.6;

/// What a scene object is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    /// Geometry.
    Mesh(Mesh),

    /// An object with no data, used as a parent.
    Empty,

    /// A textured rectangle.
    Plane {
        /// Size along X.
        width: f32,
        /// Size along Y.
        height: f32,
        /// Image texture name.
        texture: Option<String>,
        /// Image shown on the plane.
        image: Option<PathBuf>,
        /// RGBA color.
        color: [f32; 4],
    },

    /// A text label.
    Text {
        /// Label.
        body: String,
        /// RGBA color.
        color: [f32; 4],
    },
}

/// One object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Unique name.
    pub name: String,
    /// Data.
    pub kind: ObjectKind,
    /// Hidden in the viewport.
    #[serde(default)]
    pub hidden: bool,
    /// Parent object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Location.
    #[serde(default)]
    pub location: [f32; 3],
    /// Scene layer.
    #[serde(default)]
    pub layer: u8,
    /// Materials, in slot order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<String>,
    /// Game logic attached to this object.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logic: Vec<LogicGraph>,
}

impl SceneObject {
    fn new(name: &str, kind: ObjectKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            hidden: false,
            parent: None,
            location: [0.0; 3],
            layer: 0,
            materials: vec![],
            logic: vec![],
        }
    }
}

/// A text block in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Name.
    pub name: String,
    /// Contents.
    pub body: String,
}

/// Everything a [HeadlessHost] knows about its document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Objects, in creation order.
    pub objects: Vec<SceneObject>,
    /// Selected object names, in selection order.
    pub selection: Vec<String>,
    /// Text blocks, in creation order.
    pub texts: Vec<TextBlock>,
    /// Loaded images and their pixel sizes.
    pub images: Vec<(PathBuf, (u32, u32))>,
    /// Urls handed to the browser.
    pub opened_urls: Vec<String>,
    /// Last viewport switch.
    pub viewport: Option<ViewportSpec>,
}

impl Scene {
    /// Object by name.
    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn object_mut(&mut self, name: &str) -> Result<&mut SceneObject> {
        self.objects
            .iter_mut()
            .find(|o| o.name == name)
            .with_context(|| format!("no object named {}", name))
    }

    /// Text block by name.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.iter().find(|t| t.name == name).map(|t| t.body.as_str())
    }

    /// Objects whose parent is `name`.
    pub fn children(&self, name: &str) -> impl Iterator<Item = &SceneObject> {
        let name = name.to_owned();
        self.objects.iter().filter(move |o| o.parent.as_deref() == Some(&name))
    }

    /// A name not used by any object: `name`, then `name.001`, `name.002`…
    pub fn unique_name(&self, name: &str) -> String {
        if self.object(name).is_none() {
            return name.to_owned();
        }
        (1..)
            .map(|i| format!("{}.{:03}", name, i))
            .find(|candidate| self.object(candidate).is_none())
            .unwrap_or_else(|| name.to_owned())
    }

    fn add(&mut self, object: SceneObject) -> String {
        let name = object.name.clone();
        self.objects.push(object);
        name
    }

    fn upsert(&mut self, name: &str, kind: ObjectKind) -> &mut SceneObject {
        let index = match self.objects.iter().position(|o| o.name == name) {
            Some(index) => {
                self.objects[index].kind = kind;
                index
            }
            None => {
                self.objects.push(SceneObject::new(name, kind));
                self.objects.len() - 1
            }
        };
        &mut self.objects[index]
    }
}

/// [Host] backed by an in-memory [Scene].
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    scene: Scene,
    document: Option<PathBuf>,
    unit_scale: f32,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self {
            scene: Scene::default(),
            document: None,
            unit_scale: 1.0,
        }
    }
}

impl HeadlessHost {
    /// An unsaved, empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the document is saved at `path`.
    pub fn with_document(mut self, path: impl Into<PathBuf>) -> Self {
        self.document = Some(path.into());
        self
    }

    /// Scene unit scale, applied on export when asked for.
    pub fn with_unit_scale(mut self, unit_scale: f32) -> Self {
        self.unit_scale = unit_scale;
        self
    }

    /// The scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Add a mesh object, returning its (possibly suffixed) name.
    pub fn add_mesh(&mut self, name: &str, mesh: Mesh) -> String {
        let name = self.scene.unique_name(name);
        self.scene.add(SceneObject::new(&name, ObjectKind::Mesh(mesh)))
    }

    /// Load an STL or OBJ file as objects named after the file (or after
    /// the OBJ's own objects) and select them.
    pub fn load_mesh(&mut self, path: &Path) -> Result<Vec<String>> {
        let stem = naming::file_stem(path);
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let meshes = match extension.as_str() {
            "stl" => vec![(stem, Mesh::read_stl(path)?)],
            "obj" => {
                let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
                mesh::parse_obj(&text, &stem, ObjSplit::new(crate::SplitMode::On, true, false, false))?
            }
            _ => bail!("cannot load {}: expected an .stl or .obj file", path.display()),
        };

        let mut names = vec![];
        for (name, mesh) in meshes {
            let name = self.add_mesh(&name, mesh);
            self.scene.selection.push(name.clone());
            names.push(name);
        }
        Ok(names)
    }

    /// Replace the selection.
    pub fn select(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            if self.scene.object(name).is_none() {
                bail!("no object named {}", name);
            }
        }
        self.scene.selection = names.to_vec();
        Ok(())
    }

    /// The scene as pretty printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.scene)?)
    }
}

impl Host for HeadlessHost {
    fn selection(&self) -> Vec<String> {
        self.scene.selection.clone()
    }

    fn document_path(&self) -> Option<PathBuf> {
        self.document.clone()
    }

    fn export_stl(&mut self, objects: &[String], path: &Path, options: &ExportOptions) -> Result<()> {
        if objects.is_empty() {
            return Err(Error::EmptySelection.into());
        }
        let conversion = AxisConversion::new(options.axis_forward, options.axis_up)?;
        let scale = if options.use_scene_unit {
            options.global_scale * self.unit_scale
        } else {
            options.global_scale
        };

        let mut triangles = vec![];
        for name in objects {
            let object = self
                .scene
                .object(name)
                .with_context(|| format!("no object named {}", name))?;
            let ObjectKind::Mesh(mesh) = &object.kind else {
                bail!("{} is not a mesh", name);
            };
            let place = |v: [f32; 3]| {
                let v = [
                    v[0] + object.location[0],
                    v[1] + object.location[1],
                    v[2] + object.location[2],
                ];
                let [x, y, z] = conversion.apply(v);
                [x * scale, y * scale, z * scale]
            };
            triangles.extend(mesh.triangle_corners().map(|[a, b, c]| [place(a), place(b), place(c)]));
        }

        if options.check_existing && path.exists() {
            tracing::warn!(path = format!("{:?}", path), "overwriting existing file");
        }

        mesh::write_stl(path, &naming::file_stem(path), &triangles, options.ascii)?;
        tracing::debug!(
            path = format!("{:?}", path),
            objects = objects.len(),
            triangles = triangles.len(),
            "exported STL"
        );
        Ok(())
    }

    async fn import_obj(&mut self, path: &Path, options: &ImportOptions) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(Error::MissingInput {
                what: "OBJ file",
                path: path.to_owned(),
            }
            .into());
        }
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let split = ObjSplit::new(
            options.split_mode,
            options.use_split_objects,
            options.use_split_groups,
            options.use_edges,
        );
        let mut meshes = mesh::parse_obj(&text, &naming::file_stem(path), split)?;

        let conversion = AxisConversion::new(options.axis_forward, options.axis_up)?;
        for (_, mesh) in meshes.iter_mut() {
            mesh.map_vertices(|v| conversion.invert(v));
        }

        if options.global_clamp_size > 0.0 {
            let extent = meshes.iter().map(|(_, m)| m.max_extent()).fold(0.0, f32::max);
            let mut factor = 1.0f32;
            while extent * factor > options.global_clamp_size {
                factor /= 10.0;
            }
            if factor != 1.0 {
                for (_, mesh) in meshes.iter_mut() {
                    mesh.map_vertices(|[x, y, z]| [x * factor, y * factor, z * factor]);
                }
            }
        }

        let names: Vec<String> = meshes.into_iter().map(|(name, mesh)| self.add_mesh(&name, mesh)).collect();
        tracing::debug!(path = format!("{:?}", path), objects = format!("{:?}", names), "imported OBJ");
        Ok(names)
    }

    fn hide(&mut self, object: &str) -> Result<()> {
        self.scene.object_mut(object)?.hidden = true;
        Ok(())
    }

    fn parent_to_named_empty(&mut self, empty: &str, children: &[String]) -> Result<()> {
        match self.scene.object(empty) {
            Some(existing) if existing.kind != ObjectKind::Empty => {
                bail!("{} exists and is not an empty", empty);
            }
            Some(_) => {}
            None => {
                self.scene.add(SceneObject::new(empty, ObjectKind::Empty));
            }
        }
        for child in children {
            self.scene.object_mut(child)?.parent = Some(empty.to_owned());
        }
        Ok(())
    }

    async fn open_text(&mut self, path: &Path) -> Result<()> {
        let body = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        self.write_text_block(&naming::file_name(path), &body)
    }

    fn open_url(&mut self, url: &str) -> Result<()> {
        tracing::info!(url = url, "open in browser");
        self.scene.opened_urls.push(url.to_owned());
        Ok(())
    }

    fn load_image(&mut self, path: &Path) -> Result<(u32, u32)> {
        let size = image::image_dimensions(path).map_err(|e| Error::InvalidImage {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        self.scene.images.retain(|(p, _)| p != path);
        self.scene.images.push((path.to_owned(), size));
        Ok(size)
    }

    fn upsert_plane(&mut self, plane: &PlaneSpec) -> Result<()> {
        let object = self.scene.upsert(
            &plane.name,
            ObjectKind::Plane {
                width: plane.width,
                height: plane.height,
                texture: Some(plane.texture.clone()),
                image: Some(plane.image.clone()),
                color: [1.0; 4],
            },
        );
        object.location = plane.location;
        object.layer = plane.layer;
        object.materials = vec![plane.material.clone()];
        Ok(())
    }

    fn write_text_block(&mut self, name: &str, body: &str) -> Result<()> {
        match self.scene.texts.iter_mut().find(|t| t.name == name) {
            Some(text) => text.body = body.to_owned(),
            None => self.scene.texts.push(TextBlock {
                name: name.to_owned(),
                body: body.to_owned(),
            }),
        }
        Ok(())
    }

    fn attach_logic(&mut self, object: &str, logic: &LogicGraph) -> Result<()> {
        let object = self.scene.object_mut(object)?;
        object
            .logic
            .retain(|existing| existing.controller.name != logic.controller.name);
        object.logic.push(logic.clone());
        Ok(())
    }

    fn upsert_button(&mut self, button: &ButtonSpec) -> Result<()> {
        let [x, y, z] = button.location;
        let width = button.body.chars().count() as f32 * GLYPH_WIDTH;
        let plane_name = button.plane_name();

        let plane = self.scene.upsert(
            &plane_name,
            ObjectKind::Plane {
                width,
                height: 1.0,
                texture: None,
                image: None,
                color: button.background_color,
            },
        );
        plane.location = [x, y, z / 2.0];
        plane.layer = button.layer;
        plane.materials = vec![format!("{}_Plane_Material", button.name)];

        // The label sits on its plane, slightly raised.
        let text = self.scene.upsert(
            &button.name,
            ObjectKind::Text {
                body: button.body.clone(),
                color: button.text_color,
            },
        );
        text.location = [0.0, 0.0, z + 0.5];
        text.layer = button.layer;
        text.parent = Some(plane_name);
        text.materials = vec![format!("{}_Text_Material", button.name)];
        Ok(())
    }

    fn configure_viewport(&mut self, viewport: &ViewportSpec) -> Result<()> {
        tracing::debug!(
            screen = viewport.screen,
            view = viewport.view_index,
            layer = viewport.layer,
            play = viewport.play,
            "configured viewport"
        );
        self.scene.viewport = Some(viewport.clone());
        Ok(())
    }
}

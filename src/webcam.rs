//! Webcam preview of a print server's build plate.
//!
//! A snapshot is downloaded and shown on a textured plane in the scene.
//! The plane also carries a game script that swaps the snapshot for the
//! live stream once playback starts.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::{
    config::{join_port, CurlConfig, WebcamConfig},
    curl::{Credentials, Curl},
    error::Error,
    process::{self, Runner},
    traits::{
        Actuator, ActuatorKind, ButtonSpec, Controller, ControllerKind, Host, LogicGraph, MouseEvent, PlaneSpec,
        Sensor, SensorKind, ViewportSpec,
    },
    LogLevel, PrintServerKind,
};

/// Render engine that can play game logic in the viewport.
pub const RENDER_ENGINE: &str = "BLENDER_GAME";

/// Material mode able to show video textures.
pub const MATERIAL_MODE: &str = "GLSL";

/// Viewport shading that shows textures.
pub const VIEWPORT_SHADING: &str = "TEXTURED";

/// Name of the exit button shown while streaming.
pub const EXIT_BUTTON: &str = "Exit_Button";

/// Label of the exit button.
pub const EXIT_BUTTON_LABEL: &str = "[ESC]";

/// Scene objects built around one snapshot, all named after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewNames {
    /// Base name.
    pub base: String,
}

impl PreviewNames {
    /// Names derived from `base`.
    pub fn new(base: &str) -> Self {
        Self { base: base.to_owned() }
    }

    /// `<base>.jpg`
    pub fn image_file(&self) -> String {
        format!("{}.jpg", self.base)
    }

    /// `<base>_Plane`
    pub fn plane(&self) -> String {
        format!("{}_Plane", self.base)
    }

    /// `<base>_Material`
    pub fn material(&self) -> String {
        format!("{}_Material", self.base)
    }

    /// `<base>_Texture`
    pub fn texture(&self) -> String {
        format!("{}_Texture", self.base)
    }

    /// `<base>_Sensor`
    pub fn sensor(&self) -> String {
        format!("{}_Sensor", self.base)
    }

    /// `<base>_Controller`
    pub fn controller(&self) -> String {
        format!("{}_Controller", self.base)
    }

    /// `<base>_Script.py`
    pub fn script(&self) -> String {
        format!("{}_Script.py", self.base)
    }
}

/// The webcam of one print server.
#[derive(Debug, Clone)]
pub struct Camera<'a> {
    config: &'a WebcamConfig,
    curl: &'a CurlConfig,
    host: String,
    credentials: Credentials,
    names: PreviewNames,
    level: LogLevel,
}

impl<'a> Camera<'a> {
    /// The camera served from `host`, which is the print server's host.
    pub fn new(
        server: PrintServerKind,
        config: &'a WebcamConfig,
        curl: &'a CurlConfig,
        host: &str,
        credentials: Credentials,
        level: LogLevel,
    ) -> Self {
        Self {
            names: PreviewNames::new(config.snapshot_name(server)),
            config,
            curl,
            host: host.to_owned(),
            credentials,
            level,
        }
    }

    /// Names of the objects built around the snapshot.
    pub fn names(&self) -> &PreviewNames {
        &self.names
    }

    /// `<host>[:<camera_port>]/<action>`.
    pub fn url(&self, action: &str) -> String {
        format!("{}/{}", join_port(&self.host, &self.config.camera_port), action)
    }

    /// Where the snapshot is downloaded.
    pub fn snapshot_path(&self) -> PathBuf {
        self.config.snapshot_dir.join(self.names.image_file())
    }

    /// Download a still image from the camera.
    pub async fn snapshot<R: Runner>(&self, runner: &R) -> Result<PathBuf> {
        let path = self.snapshot_path();

        let mut curl = Curl::new(self.curl);
        curl.basic_auth(&self.credentials)
            .arg("-o")
            .secret(path.display().to_string(), "DOWNLOAD_PATH")
            .secret(self.url(&self.config.snapshot_action), "URL");
        process::check(runner, &curl.build(), self.level).await?;

        if !path.exists() {
            return Err(Error::MissingOutput {
                step: "webcam snapshot",
                path,
            }
            .into());
        }
        Ok(path)
    }

    /// Size and place a plane for `image` and texture it with the image.
    pub fn build_preview_plane<H: Host>(&self, host: &mut H, image: &Path) -> Result<PlaneSpec> {
        let (pixels_x, pixels_y) = host.load_image(image)?;
        if pixels_x == 0 || pixels_y == 0 {
            return Err(Error::InvalidImage {
                path: image.to_owned(),
                reason: format!("image is {}x{} pixels", pixels_x, pixels_y),
            }
            .into());
        }
        if self.config.xy_scale == 0 {
            return Err(Error::InvalidImage {
                path: image.to_owned(),
                reason: "xy_scale must be at least 1".to_owned(),
            }
            .into());
        }

        let width = pixels_x as f32 / self.config.xy_scale as f32;
        let height = pixels_y as f32 / self.config.xy_scale as f32;
        let (x, y) = self.config.placement.offset(width, height);

        let plane = PlaneSpec {
            name: self.names.plane(),
            material: self.names.material(),
            texture: self.names.texture(),
            image: image.to_owned(),
            width,
            height,
            location: [x, y, 0.0],
            layer: self.config.layer,
        };
        host.upsert_plane(&plane)?;
        Ok(plane)
    }

    /// Install the script that replaces the snapshot with the live stream
    /// and run it every tick from the plane.
    pub fn wire_stream_control<H: Host>(&self, host: &mut H, plane: &PlaneSpec) -> Result<()> {
        let script = stream_script(&self.names.image_file(), &self.url(&self.config.stream_action));
        host.write_text_block(&self.names.script(), &script)?;
        host.attach_logic(
            &plane.name,
            &LogicGraph {
                sensors: vec![Sensor {
                    name: self.names.sensor(),
                    kind: SensorKind::Always { pulse: true },
                }],
                controller: Controller {
                    name: self.names.controller(),
                    kind: ControllerKind::Python {
                        script: self.names.script(),
                    },
                },
                actuator: None,
            },
        )
    }

    fn viewport(&self, play: bool) -> ViewportSpec {
        ViewportSpec {
            screen: self.config.target_screen.clone(),
            view_index: self.config.target_3dview,
            layer: self.config.layer,
            render_engine: RENDER_ENGINE.to_owned(),
            material_mode: MATERIAL_MODE.to_owned(),
            shading: VIEWPORT_SHADING.to_owned(),
            play,
        }
    }

    async fn prepare<R: Runner, H: Host>(&self, runner: &R, host: &mut H) -> Result<PlaneSpec> {
        let image = self.snapshot(runner).await?;
        let plane = self.build_preview_plane(host, &image)?;
        self.wire_stream_control(host, &plane)?;
        Ok(plane)
    }

    /// Show a snapshot in the viewport, ready to stream on play.
    pub async fn preview<R: Runner, H: Host>(&self, runner: &R, host: &mut H) -> Result<PlaneSpec> {
        let plane = self.prepare(runner, host).await?;
        host.configure_viewport(&self.viewport(false))?;
        Ok(plane)
    }

    /// Show the snapshot with an exit button in its upper left corner and
    /// start playback of the live stream.
    pub async fn stream<R: Runner, H: Host>(
        &self,
        runner: &R,
        host: &mut H,
        text_color: [f32; 4],
        background_color: [f32; 4],
    ) -> Result<PlaneSpec> {
        let plane = self.prepare(runner, host).await?;

        let button = ButtonSpec {
            name: EXIT_BUTTON.to_owned(),
            body: EXIT_BUTTON_LABEL.to_owned(),
            location: [
                plane.location[0] - plane.width / 2.0,
                plane.location[1] + plane.height / 2.0,
                plane.location[2] + 1.0,
            ],
            layer: self.config.layer,
            text_color,
            background_color,
        };
        host.upsert_button(&button)?;
        host.attach_logic(&button.plane_name(), &quit_on_click(&button.plane_name()))?;

        host.configure_viewport(&self.viewport(true))?;
        Ok(plane)
    }
}

/// Game logic that quits playback when `object` is clicked.
pub fn quit_on_click(object: &str) -> LogicGraph {
    LogicGraph {
        sensors: vec![
            Sensor {
                name: format!("{}_Sensor_Click", object),
                kind: SensorKind::Mouse(MouseEvent::LeftClick),
            },
            Sensor {
                name: format!("{}_Sensor_Mouse_Over", object),
                kind: SensorKind::Mouse(MouseEvent::MouseOver),
            },
        ],
        controller: Controller {
            name: format!("{}_Controller", object),
            kind: ControllerKind::LogicAnd,
        },
        actuator: Some(Actuator {
            name: format!("{}_Actuator", object),
            kind: ActuatorKind::GameQuit,
        }),
    }
}

/// Game script that plays `stream_url` on the texture showing `image`.
pub fn stream_script(image: &str, stream_url: &str) -> String {
    format!(
        r#"#!/usr/bin/env python
import bge
cont = bge.logic.getCurrentController()
obj = cont.owner
def main():
    if not hasattr(bge.logic, "video"):
        bge.render.showMouse(True)
        ID = bge.texture.materialID(obj, "IM{image}")
        bge.logic.video = bge.texture.Texture(obj, ID)
        bge.logic.video.source = bge.texture.VideoFFmpeg('{stream_url}')
        bge.logic.video.source.play()
    bge.logic.video.refresh(True)
main()
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_camera_urls() {
        let config = WebcamConfig::default();
        let curl = CurlConfig::default();
        let camera = Camera::new(
            PrintServerKind::OctoPrint,
            &config,
            &curl,
            "http://octopi.local/",
            Credentials::default(),
            LogLevel::Scrubbed,
        );
        assert_eq!(camera.url("?action=snapshot"), "http://octopi.local:8080/?action=snapshot");
        assert_eq!(camera.names().plane(), "OctoPrint_Preview_Plane");
        assert_eq!(camera.snapshot_path(), config.snapshot_dir.join("OctoPrint_Preview.jpg"));

        let no_port = WebcamConfig {
            camera_port: String::new(),
            ..Default::default()
        };
        let camera = Camera::new(
            PrintServerKind::Repetier,
            &no_port,
            &curl,
            "http://printer",
            Credentials::default(),
            LogLevel::Scrubbed,
        );
        assert_eq!(camera.url("stream"), "http://printer/stream");
        assert_eq!(camera.names().script(), "Repetier_Preview_Script.py");
    }

    #[test]
    fn test_stream_script_names_texture_and_stream() {
        let script = stream_script("OctoPrint_Preview.jpg", "http://octopi:8080/?action=stream");
        assert!(script.contains(r#"materialID(obj, "IMOctoPrint_Preview.jpg")"#));
        assert!(script.contains("VideoFFmpeg('http://octopi:8080/?action=stream')"));
    }

    #[test]
    fn test_quit_on_click() {
        let logic = quit_on_click("Exit_Button_Plane");
        let sensors: Vec<&str> = logic.sensors.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(sensors, vec!["Exit_Button_Plane_Sensor_Click", "Exit_Button_Plane_Sensor_Mouse_Over"]);
        assert_eq!(logic.controller.kind, ControllerKind::LogicAnd);
        assert_eq!(logic.actuator.map(|a| a.kind), Some(ActuatorKind::GameQuit));
    }
}

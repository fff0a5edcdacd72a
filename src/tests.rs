use std::{path::Path, sync::Mutex};

use anyhow::Result;
use pretty_assertions::assert_eq;
use test_context::{test_context, AsyncTestContext};
use testresult::TestResult;

use crate::{
    headless::{mesh::Mesh, HeadlessHost, ObjectKind},
    octoprint,
    pipeline::{self, Action, Context},
    CommandLine, Completion, Config, Error, ExportMode, LocalSlicer, LogLevel, PrintServerKind, Runner,
};

const LISTING: &str = r#"{
  "files": [
    {
      "name": "prints", "path": "prints", "type": "folder", "typePath": ["folder"], "origin": "local",
      "refs": {"resource": "http://localhost:5000/api/files/local/prints"},
      "children": [
        {
          "name": "CubeA.gcode", "path": "prints/CubeA.gcode", "type": "machinecode",
          "typePath": ["machinecode", "gcode"], "origin": "local", "size": 1234, "date": 1700000000,
          "refs": {
            "resource": "http://localhost:5000/api/files/local/prints/CubeA.gcode",
            "download": "http://localhost:5000/downloads/files/local/prints/CubeA.gcode"
          }
        }
      ]
    }
  ],
  "free": 1000,
  "total": 2000
}"#;

/// Runner that records every command and fakes what each program would
/// leave on disk.
#[derive(Debug, Default)]
struct FakeRunner {
    calls: Mutex<Vec<CommandLine>>,
    /// Remote folders that already exist.
    existing_folders: Vec<String>,
    /// Program that exits 1 instead of doing its job.
    failing: Option<String>,
    /// Any command carrying this argument exits 22, as `curl -f` does on
    /// an HTTP error.
    failing_arg: Option<String>,
}

impl FakeRunner {
    fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls()
            .iter()
            .filter(|c| c.program_name() == program)
            .map(|c| c.values().map(str::to_owned).collect())
            .collect()
    }

    fn fake(&self, command: &CommandLine) -> Result<i32> {
        let args: Vec<&str> = command.values().collect();
        let after = |flag: &str| args.iter().position(|a| *a == flag).map(|i| args[i + 1]);

        match command.program_name().as_str() {
            "slic3r" if args[0] == "--repair" => {
                let stl = Path::new(args[1]);
                let stem = crate::naming::file_stem(stl);
                std::fs::write(
                    crate::naming::fixed_obj_path(stl.parent().unwrap(), &stem),
                    format!("o {}\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n", stem),
                )?;
            }
            "slic3r" | "CuraEngine" => {
                let gcode = after("--output").or_else(|| after("-o")).unwrap();
                std::fs::write(gcode, "; sliced\nG28\n")?;
            }
            "curl" if args.contains(&"-G") && args.contains(&"/dev/null") => {
                let url = args.last().unwrap();
                let exists = self
                    .existing_folders
                    .iter()
                    .any(|folder| url.ends_with(&format!("/{}", folder)));
                return Ok(if exists { 0 } else { 22 });
            }
            "curl" => {
                if let Some(path) = after("-o") {
                    if path.ends_with(".jpg") {
                        image::RgbImage::new(64, 48).save(path)?;
                    } else if path.ends_with(octoprint::FILE_LIST_NAME) {
                        std::fs::write(path, LISTING)?;
                    }
                }
            }
            other => anyhow::bail!("unexpected program {}", other),
        }
        Ok(0)
    }
}

impl Runner for FakeRunner {
    async fn run(&self, command: &CommandLine) -> Result<Completion> {
        self.calls.lock().unwrap().push(command.clone());
        let code = if self.failing.as_deref() == Some(command.program_name().as_str()) {
            1
        } else if self
            .failing_arg
            .as_deref()
            .is_some_and(|arg| command.values().any(|v| v == arg))
        {
            22
        } else {
            self.fake(command)?
        };
        Ok(Completion {
            code: Some(code),
            stdout: b"ok".to_vec(),
            stderr: if code == 0 { vec![] } else { b"boom".to_vec() },
        })
    }
}

/// A scratch directory holding every folder an action writes to.
struct Workspace {
    dir: tempfile::TempDir,
    config: Config,
}

impl Workspace {
    fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let mut config = Config::default();
        config.export.temp_stl_directory = dir.path().join("stl");
        config.import.temp_obj_directory = dir.path().join("obj");
        config.misc.gcode_directory = dir.path().join("gcode");
        config.octoprint_webcam.snapshot_dir = dir.path().join("webcam");
        config.repetier_webcam.snapshot_dir = dir.path().join("webcam");
        Ok(Self { dir, config })
    }

    fn path(&self, relative: &str) -> std::path::PathBuf {
        self.dir.path().join(relative)
    }

    fn context(&self, objects: &[&str], runner: FakeRunner) -> Context<HeadlessHost, FakeRunner> {
        let mut host = HeadlessHost::new().with_document(self.path("benchy.blend"));
        let mut selection = vec![];
        for (i, name) in objects.iter().enumerate() {
            let offset = i as f32 * 5.0;
            selection.push(host.add_mesh(
                name,
                Mesh {
                    vertices: vec![[offset, 0.0, 0.0], [offset + 1.0, 0.0, 0.0], [offset, 1.0, 0.0]],
                    triangles: vec![[0, 1, 2]],
                    edges: vec![],
                },
            ));
        }
        host.select(&selection).unwrap();
        Context::new(host, runner, self.config.clone())
    }
}

impl AsyncTestContext for Workspace {
    async fn setup() -> Self {
        Workspace::new().unwrap()
    }

    async fn teardown(self) {
        self.dir.close().unwrap();
    }
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_individual_slice_without_upload(ws: &mut Workspace) -> TestResult {
    let mut ctx = ws.context(&["CubeA", "CubeB"], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::Slice(LocalSlicer::Slic3r)).await?;

    assert_eq!(report.exported, vec![ws.path("stl/CubeA.stl"), ws.path("stl/CubeB.stl")]);
    assert_eq!(report.gcode, vec![ws.path("gcode/CubeA.gcode"), ws.path("gcode/CubeB.gcode")]);
    assert!(report.gcode.iter().all(|gcode| gcode.exists()));

    let slices = ctx.runner.calls_to("slic3r");
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].last().map(String::as_str), ws.path("stl/CubeA.stl").to_str());
    assert!(ctx.runner.calls_to("curl").is_empty());

    // Sliced objects are hidden, temporary STL files removed.
    assert!(ctx.host.scene().objects.iter().all(|o| o.hidden));
    assert_eq!(report.removed_temporary, 2);
    assert!(!ws.path("stl/CubeA.stl").exists());
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_batch_slice_uploads_to_octoprint(ws: &mut Workspace) -> TestResult {
    ws.config.export.mode = ExportMode::Batch;
    ws.config.octoprint.auto_upload_from_slicers = true;
    let mut ctx = ws.context(&["CubeA"], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::Slice(LocalSlicer::CuraEngine)).await?;

    assert_eq!(report.exported, vec![ws.path("stl/benchy.stl")]);
    assert_eq!(ctx.runner.calls_to("CuraEngine").len(), 1);
    assert_eq!(report.uploaded, vec!["octoprint: benchy.gcode".to_owned()]);

    let uploads = ctx.runner.calls_to("curl");
    assert_eq!(uploads.len(), 1);
    let upload = &uploads[0];
    assert_eq!(upload.last().map(String::as_str), Some("http://localhost:5000/api/files/local"));
    assert!(upload.contains(&"path=".to_owned()));
    let file = format!("file=@{}", ws.path("gcode/benchy.gcode").display());
    assert!(upload.contains(&file));
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_sliced_gcode_opens_in_text_editor(ws: &mut Workspace) -> TestResult {
    ws.config.misc.preview_gcode = true;
    let mut ctx = ws.context(&["CubeA"], FakeRunner::default());
    pipeline::run(&mut ctx, Action::Slice(LocalSlicer::CuraEngine)).await?;

    assert_eq!(ctx.host.scene().text("CubeA.gcode"), Some("; sliced\nG28\n"));
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_batch_exports_and_slices_once(ws: &mut Workspace) -> TestResult {
    ws.config.export.mode = ExportMode::Batch;
    let mut ctx = ws.context(&["CubeA", "CubeB", "CubeC"], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::Slice(LocalSlicer::Slic3r)).await?;

    assert_eq!(report.exported, vec![ws.path("stl/benchy.stl")]);
    assert_eq!(report.gcode, vec![ws.path("gcode/benchy.gcode")]);

    let slices = ctx.runner.calls_to("slic3r");
    assert_eq!(slices.len(), 1);
    assert!(!slices[0].contains(&"--merge".to_owned()));
    assert_eq!(slices[0].last().map(String::as_str), ws.path("stl/benchy.stl").to_str());
    assert!(ctx.host.scene().objects.iter().all(|o| o.hidden));
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_merge_slices_once_with_every_export(ws: &mut Workspace) -> TestResult {
    ws.config.export.mode = ExportMode::Merge;
    let mut ctx = ws.context(&["CubeA", "CubeB", "CubeC"], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::Slice(LocalSlicer::Slic3r)).await?;

    assert_eq!(report.exported.len(), 3);
    assert_eq!(report.gcode, vec![ws.path("gcode/benchy.gcode")]);

    let slices = ctx.runner.calls_to("slic3r");
    assert_eq!(slices.len(), 1);
    let merged: Vec<String> = slices[0]
        .iter()
        .skip_while(|a| *a != "--merge")
        .skip(1)
        .cloned()
        .collect();
    let exported: Vec<String> = report.exported.iter().map(|p| p.display().to_string()).collect();
    assert_eq!(merged, exported);
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_merge_failure_keeps_objects_visible(ws: &mut Workspace) -> TestResult {
    ws.config.export.mode = ExportMode::Merge;
    let runner = FakeRunner {
        failing: Some("slic3r".to_owned()),
        ..Default::default()
    };
    let mut ctx = ws.context(&["CubeA", "CubeB"], runner);
    let err = pipeline::run(&mut ctx, Action::Slice(LocalSlicer::Slic3r))
        .await
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Process { .. })));
    assert!(ctx.host.scene().objects.iter().all(|o| !o.hidden));
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_scrubbed_upload_hides_api_key(ws: &mut Workspace) -> TestResult {
    ws.config.octoprint.auto_upload_from_slicers = true;
    ws.config.octoprint.api_key = "0123456789ABCDEF".to_owned();
    ws.config.misc.log_level = LogLevel::Scrubbed;
    let mut ctx = ws.context(&["CubeA"], FakeRunner::default());
    pipeline::run(&mut ctx, Action::Slice(LocalSlicer::Slic3r)).await?;

    let upload = ctx
        .runner
        .calls()
        .into_iter()
        .find(|c| c.program_name() == "curl")
        .expect("an upload");
    assert!(upload.values().any(|v| v == "X-Api-Key: 0123456789ABCDEF"));
    let logged = upload.redacted(LogLevel::Scrubbed).expect("logged");
    assert!(logged.contains("X-API-KEY"));
    assert!(!logged.contains("0123456789ABCDEF"));
    assert!(logged.ends_with("HOST/api/files/local"));
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_ensure_remote_directory_probes_then_creates(ws: &mut Workspace) -> TestResult {
    let runner = FakeRunner {
        existing_folders: vec!["a".to_owned()],
        ..Default::default()
    };
    let client = octoprint::Client::new(&ws.config.octoprint, &ws.config.curl, LogLevel::Scrubbed);
    assert_eq!(client.ensure_remote_directory(&runner, "a/b/c").await?, 2);

    let calls = runner.calls_to("curl");
    let probes: Vec<&Vec<String>> = calls.iter().filter(|c| c.contains(&"-G".to_owned())).collect();
    let creates: Vec<&Vec<String>> = calls.iter().filter(|c| !c.contains(&"-G".to_owned())).collect();
    assert_eq!(probes.len(), 2);
    assert_eq!(creates.len(), 2);
    assert!(creates[0].contains(&"foldername=b".to_owned()));
    assert!(creates[0].contains(&"path=a".to_owned()));
    assert!(creates[1].contains(&"foldername=c".to_owned()));
    assert!(creates[1].contains(&"path=a/b".to_owned()));
    assert!(!creates.iter().any(|c| c.contains(&"foldername=a".to_owned())));
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_make_directory_from_scratch(ws: &mut Workspace) -> TestResult {
    ws.config.octoprint.new_dir = "/prints//benchy/".to_owned();
    let mut ctx = ws.context(&[], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::MakeDirectory(PrintServerKind::OctoPrint)).await?;

    assert_eq!(report.folders_created, 2);
    // One probe for the root, nothing below a folder that was just created.
    assert_eq!(ctx.runner.calls_to("curl").len(), 3);
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_repair_reuses_placeholder(ws: &mut Workspace) -> TestResult {
    let mut ctx = ws.context(&["CubeA", "CubeB"], FakeRunner::default());
    ctx.host.select(&["CubeA".to_owned()])?;
    let first = pipeline::run(&mut ctx, Action::Repair).await?;
    assert_eq!(first.repaired, vec!["CubeA.001".to_owned()]);

    ctx.host.select(&["CubeB".to_owned()])?;
    let second = pipeline::run(&mut ctx, Action::Repair).await?;
    assert_eq!(second.repaired.len(), 1);

    let scene = ctx.host.scene();
    let parent = &ctx.config.slic3r.repaired_parent_name;
    let empties: Vec<_> = scene.objects.iter().filter(|o| o.kind == ObjectKind::Empty).collect();
    assert_eq!(empties.len(), 1);
    assert_eq!(&empties[0].name, parent);
    assert_eq!(scene.children(parent).count(), 2);
    assert!(scene.object("CubeA").expect("original").hidden);

    // The repaired mesh was moved into the OBJ folder, then cleaned up.
    assert!(!ws.path("obj/CubeA_fixed.obj").exists());
    assert!(!ws.path("stl/CubeA_fixed.obj").exists());
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_keeps_temporary_files_when_asked(ws: &mut Workspace) -> TestResult {
    ws.config.export.clean_temp_stl_files = false;
    ws.config.import.clean_temp_obj_files = false;
    let mut ctx = ws.context(&["CubeA"], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::Repair).await?;

    assert_eq!(report.removed_temporary, 0);
    assert!(ws.path("stl/CubeA.stl").exists());
    assert!(ws.path("obj/CubeA_fixed.obj").exists());
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_empty_selection_runs_nothing(ws: &mut Workspace) -> TestResult {
    let mut ctx = ws.context(&[], FakeRunner::default());
    let err = pipeline::run(&mut ctx, Action::Slice(LocalSlicer::Slic3r))
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptySelection)));
    assert!(ctx.runner.calls().is_empty());
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_slicer_failure_still_cleans_up(ws: &mut Workspace) -> TestResult {
    let runner = FakeRunner {
        failing: Some("slic3r".to_owned()),
        ..Default::default()
    };
    let mut ctx = ws.context(&["CubeA", "CubeB"], runner);
    let err = pipeline::run(&mut ctx, Action::Slice(LocalSlicer::Slic3r))
        .await
        .unwrap_err();

    match err.downcast_ref::<Error>() {
        Some(Error::Process { program, code, stderr }) => {
            assert_eq!(program, "slic3r");
            assert_eq!(*code, Some(1));
            assert_eq!(stderr, "boom");
        }
        other => panic!("unexpected error {:?}", other),
    }
    // The first failure stops the loop.
    assert_eq!(ctx.runner.calls_to("slic3r").len(), 1);
    assert!(!ws.path("stl/CubeA.stl").exists());
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_repetier_unsupported_actions(ws: &mut Workspace) -> TestResult {
    let mut ctx = ws.context(&["CubeA"], FakeRunner::default());
    for action in [
        Action::UploadStl(PrintServerKind::Repetier),
        Action::MakeDirectory(PrintServerKind::Repetier),
        Action::ListFiles(PrintServerKind::Repetier),
    ] {
        let err = pipeline::run(&mut ctx, action).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Unsupported { .. })));
    }
    assert!(ctx.runner.calls().is_empty());
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_repetier_auto_upload(ws: &mut Workspace) -> TestResult {
    ws.config.repetier.auto_upload_from_slicers = true;
    ws.config.repetier.gcode_directory = "prusa_mk3".to_owned();
    ws.config.repetier.api_key = "secret".to_owned();
    ws.config.misc.open_browser_after_upload = true;
    let mut ctx = ws.context(&["CubeA", "CubeB"], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::Slice(LocalSlicer::Slic3r)).await?;

    let uploads = ctx.runner.calls_to("curl");
    assert_eq!(uploads.len(), 2);
    assert_eq!(
        uploads[0].last().map(String::as_str),
        Some("http://localhost:3344/printer/model/prusa_mk3")
    );
    assert!(uploads[0].contains(&"a=upload".to_owned()));
    assert!(uploads[0].contains(&"x-api-key: secret".to_owned()));
    // The web ui is opened once per action.
    assert_eq!(report.opened_urls, vec!["http://localhost:3344".to_owned()]);
    assert_eq!(ctx.host.scene().opened_urls.len(), 1);
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_upload_stl_and_slice_on_server(ws: &mut Workspace) -> TestResult {
    ws.config.octoprint.stl_directory = "models".to_owned();
    ws.config.octoprint.slice_uploaded_stl = true;
    ws.config.octoprint.profile_overrides = "layer_height:0.2".to_owned();
    let mut ctx = ws.context(&["CubeA"], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::UploadStl(PrintServerKind::OctoPrint)).await?;

    assert_eq!(report.uploaded, vec!["octoprint: CubeA.stl".to_owned()]);
    assert_eq!(report.sliced_on_server, vec!["CubeA.stl".to_owned()]);

    let calls = ctx.runner.calls_to("curl");
    // probe, create "models", upload, slice
    assert_eq!(calls.len(), 4);
    let slice = &calls[3];
    assert_eq!(
        slice.last().map(String::as_str),
        Some("http://localhost:5000/api/files/local/models/CubeA.stl")
    );
    let body: serde_json::Value = serde_json::from_str(&slice[slice.iter().position(|a| a == "-d").unwrap() + 1])?;
    assert_eq!(body["gcode"], "CubeA.gcode");
    assert_eq!(body["profile.layer_height"], 0.2);
    assert!(ctx.host.scene().object("CubeA").expect("object").hidden);
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_upload_stl_once_per_object(ws: &mut Workspace) -> TestResult {
    let mut ctx = ws.context(&["CubeA", "CubeB"], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::UploadStl(PrintServerKind::OctoPrint)).await?;

    assert_eq!(
        report.uploaded,
        vec!["octoprint: CubeA.stl".to_owned(), "octoprint: CubeB.stl".to_owned()]
    );
    assert!(report.sliced_on_server.is_empty());

    // No folder configured, so only the uploads themselves.
    let uploads = ctx.runner.calls_to("curl");
    assert_eq!(uploads.len(), 2);
    for (upload, stl) in uploads.iter().zip(["stl/CubeA.stl", "stl/CubeB.stl"]) {
        assert!(upload.contains(&format!("file=@{}", ws.path(stl).display())));
    }
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_server_slice_failure_aborts_upload(ws: &mut Workspace) -> TestResult {
    ws.config.octoprint.slice_uploaded_stl = true;
    let runner = FakeRunner {
        failing_arg: Some("-d".to_owned()),
        ..Default::default()
    };
    let mut ctx = ws.context(&["CubeA", "CubeB"], runner);
    let err = pipeline::run(&mut ctx, Action::UploadStl(PrintServerKind::OctoPrint))
        .await
        .unwrap_err();

    match err.downcast_ref::<Error>() {
        Some(Error::Process { program, code, .. }) => {
            assert_eq!(program, "curl");
            assert_eq!(*code, Some(22));
        }
        other => panic!("unexpected error {:?}", other),
    }
    // Upload and slice request for the first object, nothing after.
    assert_eq!(ctx.runner.calls_to("curl").len(), 2);
    assert!(!ctx.host.scene().object("CubeA").expect("object").hidden);
    assert!(!ws.path("stl/CubeA.stl").exists());
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_list_files(ws: &mut Workspace) -> TestResult {
    let mut ctx = ws.context(&[], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::ListFiles(PrintServerKind::OctoPrint)).await?;

    let listing = report.listing.expect("listing");
    let paths: Vec<&str> = listing.walk().into_iter().map(|e| e.path()).collect();
    assert_eq!(paths, vec!["prints", "prints/CubeA.gcode"]);
    assert_eq!(listing.free, Some(1000));
    assert!(ws.path("webcam/file_list.json").exists());
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_stream_webcam_builds_preview(ws: &mut Workspace) -> TestResult {
    ws.config.octoprint_webcam.layer = 3;
    let mut ctx = ws.context(&[], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::StreamWebcam(PrintServerKind::OctoPrint)).await?;

    let plane = report.preview.expect("plane");
    assert_eq!(plane.name, "OctoPrint_Preview_Plane");
    assert_eq!((plane.width, plane.height), (6.4, 4.8));
    assert_eq!(plane.image, ws.path("webcam/OctoPrint_Preview.jpg"));

    let snapshot = &ctx.runner.calls_to("curl")[0];
    assert_eq!(snapshot.last().map(String::as_str), Some("http://localhost:8080/?action=snapshot"));

    let scene = ctx.host.scene();
    let script = scene.text("OctoPrint_Preview_Script.py").expect("script");
    assert!(script.contains("http://localhost:8080/?action=stream"));
    assert_eq!(scene.object("OctoPrint_Preview_Plane").expect("plane").logic.len(), 1);
    assert_eq!(scene.object("Exit_Button_Plane").expect("button").logic.len(), 1);
    let viewport = scene.viewport.as_ref().expect("viewport");
    assert!(viewport.play);
    assert_eq!(viewport.layer, 3);
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_preview_webcam_does_not_play(ws: &mut Workspace) -> TestResult {
    let mut ctx = ws.context(&[], FakeRunner::default());
    pipeline::run(&mut ctx, Action::PreviewWebcam(PrintServerKind::Repetier)).await?;

    let scene = ctx.host.scene();
    assert!(scene.object("Repetier_Preview_Plane").is_some());
    assert!(scene.object("Exit_Button").is_none());
    assert!(!scene.viewport.as_ref().expect("viewport").play);
    Ok(())
}

#[test_context(Workspace)]
#[tokio::test]
async fn test_curl_test_splits_arguments(ws: &mut Workspace) -> TestResult {
    ws.config.curl.test_args = "-I, http://localhost:5000/api/version".to_owned();
    let mut ctx = ws.context(&[], FakeRunner::default());
    let report = pipeline::run(&mut ctx, Action::CurlTest).await?;

    assert_eq!(report.curl_test, Some((Some(0), "ok".to_owned())));
    assert_eq!(
        ctx.runner.calls_to("curl"),
        vec![vec![
            "-k".to_owned(),
            "--connect-timeout".to_owned(),
            "15".to_owned(),
            "-I".to_owned(),
            "http://localhost:5000/api/version".to_owned(),
        ]]
    );
    Ok(())
}

use anyhow::Result;

use super::{create_dir, Context, Report};
use crate::{
    any_server::AnyPrintServer,
    config::{Config, ServerEndpoint},
    curl::Curl,
    process::{self, Runner},
    traits::Host,
    webcam::Camera,
    PrintServerKind,
};

/// Create `octoprint.new_dir` on the server, folder by folder.
pub(super) async fn make_directory<H: Host, R: Runner>(
    ctx: &mut Context<H, R>,
    kind: PrintServerKind,
) -> Result<Report> {
    let server = AnyPrintServer::load(&ctx.config, kind);
    let client = server.octoprint("mkdir")?;

    let new_dir = &ctx.config.octoprint.new_dir;
    if octoprint_api::folder_steps(new_dir).is_empty() {
        tracing::warn!("no folder configured to create");
        return Ok(Report::default());
    }

    let folders_created = client.ensure_remote_directory(&ctx.runner, new_dir).await?;
    tracing::info!(folder = new_dir, created = folders_created, "remote folder ready");
    Ok(Report {
        folders_created,
        ..Default::default()
    })
}

/// Download the server's file listing next to the webcam snapshots and log
/// a line per entry.
pub(super) async fn list_files<H: Host, R: Runner>(ctx: &mut Context<H, R>, kind: PrintServerKind) -> Result<Report> {
    let server = AnyPrintServer::load(&ctx.config, kind);
    let client = server.octoprint("file listing")?;

    let dir = &ctx.config.webcam(kind).snapshot_dir;
    create_dir(dir).await?;
    let listing = client.list_files(&ctx.runner, dir).await?;

    for entry in listing.walk() {
        tracing::info!(path = entry.path(), kind = entry.kind(), "remote file");
    }
    if let (Some(free), Some(total)) = (listing.free, listing.total) {
        tracing::info!(free, total, "remote storage");
    }

    Ok(Report {
        listing: Some(listing),
        ..Default::default()
    })
}

fn camera<'a>(config: &'a Config, kind: PrintServerKind) -> Camera<'a> {
    let (host, credentials) = match kind {
        PrintServerKind::OctoPrint => (config.octoprint.host(), config.octoprint.credentials()),
        PrintServerKind::Repetier => (config.repetier.host(), config.repetier.credentials()),
    };
    Camera::new(
        kind,
        config.webcam(kind),
        &config.curl,
        host,
        credentials,
        config.misc.log_level,
    )
}

/// Show the server's webcam in the viewport, streaming when `stream` is set.
pub(super) async fn preview_webcam<H: Host, R: Runner>(
    ctx: &mut Context<H, R>,
    kind: PrintServerKind,
    stream: bool,
) -> Result<Report> {
    let config = ctx.config.clone();
    let camera = camera(&config, kind);
    create_dir(&config.webcam(kind).snapshot_dir).await?;

    let plane = if stream {
        camera
            .stream(
                &ctx.runner,
                &mut ctx.host,
                config.misc.button_text_color,
                config.misc.button_background_color,
            )
            .await?
    } else {
        camera.preview(&ctx.runner, &mut ctx.host).await?
    };

    Ok(Report {
        preview: Some(plane),
        ..Default::default()
    })
}

/// Run curl with `curl.test_args`, split on `", "`.
pub(super) async fn curl_test<H: Host, R: Runner>(ctx: &mut Context<H, R>) -> Result<Report> {
    let args: Vec<&str> = ctx
        .config
        .curl
        .test_args
        .split(", ")
        .filter(|arg| !arg.is_empty())
        .collect();
    if args.is_empty() {
        tracing::warn!("no curl test arguments configured");
        return Ok(Report::default());
    }

    let mut curl = Curl::new(&ctx.config.curl);
    for arg in args {
        curl.arg(arg);
    }
    let completion = process::run(&ctx.runner, &curl.build(), ctx.config.misc.log_level).await?;
    let output = String::from_utf8_lossy(&completion.stdout).into_owned();
    tracing::info!(code = completion.code, bytes = output.len(), "curl test finished");

    Ok(Report {
        curl_test: Some((completion.code, output)),
        ..Default::default()
    })
}

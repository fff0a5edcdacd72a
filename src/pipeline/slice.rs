use std::path::Path;

use anyhow::Result;

use super::{create_dir, groups, Context, Report};
use crate::{
    any_server::{AnyPrintServer, PrintServer},
    naming,
    process::Runner,
    slicer::{self, AnySlicer, SliceInputs},
    traits::Host,
    ExportMode, LocalSlicer,
};

/// Export and slice the selection with a local slicer, then hand each
/// gcode file to the auto-upload servers and the text editor.
pub(super) async fn slice<H: Host, R: Runner>(ctx: &mut Context<H, R>, kind: LocalSlicer) -> Result<Report> {
    let selection = ctx.selection()?;
    let slicer = AnySlicer::load(&ctx.config, kind);
    let level = ctx.config.misc.log_level;
    let gcode_dir = ctx.config.misc.gcode_directory.clone();
    create_dir(&gcode_dir).await?;

    let mut report = Report::default();
    match ctx.config.export.mode {
        mode @ (ExportMode::Individual | ExportMode::Batch) => {
            for (stem, objects) in groups(mode, &selection, &ctx.document_stem()) {
                let stl = ctx.export(&objects, &stem).await?;
                report.exported.push(stl.clone());

                let gcode = naming::gcode_path(&gcode_dir, &stem);
                slicer::slice(&ctx.runner, &slicer, SliceInputs::Single(&stl), &gcode, level).await?;
                deliver(ctx, &gcode, &mut report).await?;
                ctx.hide_all(&objects)?;
            }
        }
        ExportMode::Merge => {
            let mut stls = vec![];
            for (stem, objects) in groups(ExportMode::Merge, &selection, &ctx.document_stem()) {
                stls.push(ctx.export(&objects, &stem).await?);
            }
            report.exported.extend(stls.iter().cloned());

            let gcode = naming::gcode_path(&gcode_dir, &ctx.document_stem());
            slicer::slice(&ctx.runner, &slicer, SliceInputs::Merge(&stls), &gcode, level).await?;
            deliver(ctx, &gcode, &mut report).await?;
            ctx.hide_all(&selection)?;
        }
    }

    let urls = AnyPrintServer::auto_upload_targets(&ctx.config)
        .iter()
        .map(|server| server.web_url())
        .collect();
    ctx.open_browser(urls, &mut report)?;
    Ok(report)
}

/// Upload `gcode` to every auto-upload server, then show it in the text
/// editor when configured to.
async fn deliver<H: Host, R: Runner>(ctx: &mut Context<H, R>, gcode: &Path, report: &mut Report) -> Result<()> {
    report.gcode.push(gcode.to_owned());
    tracing::info!(gcode = naming::file_name(gcode), "sliced");

    for server in AnyPrintServer::auto_upload_targets(&ctx.config) {
        server.upload_gcode(&ctx.runner, gcode).await?;
        report
            .uploaded
            .push(format!("{}: {}", server.kind(), naming::file_name(gcode)));
    }

    if ctx.config.misc.preview_gcode {
        ctx.host.open_text(gcode).await?;
    }
    Ok(())
}

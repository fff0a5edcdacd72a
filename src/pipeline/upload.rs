use anyhow::Result;

use super::{groups, Context, Report};
use crate::{
    any_server::{AnyPrintServer, PrintServer},
    naming,
    process::Runner,
    traits::Host,
    PrintServerKind,
};

/// Export the selection and upload it as STL, optionally asking the server
/// to slice each upload.
pub(super) async fn upload_stl<H: Host, R: Runner>(ctx: &mut Context<H, R>, kind: PrintServerKind) -> Result<Report> {
    let config = ctx.config.clone();
    let server = AnyPrintServer::load(&config, kind);
    let client = server.octoprint("STL upload")?;
    if config.octoprint.slice_uploaded_stl {
        tracing::debug!(slicer = config.octoprint.slicer, "uploads will be sliced on the server");
    }

    let selection = ctx.selection()?;
    let mut report = Report::default();
    for (stem, objects) in groups(config.export.mode, &selection, &ctx.document_stem()) {
        let stl = ctx.export(&objects, &stem).await?;
        report.exported.push(stl.clone());

        client.upload_stl(&ctx.runner, &stl).await?;
        let name = naming::file_name(&stl);
        report.uploaded.push(format!("{}: {}", kind, name));

        if config.octoprint.slice_uploaded_stl {
            client.trigger_server_side_slice(&ctx.runner, &name).await?;
            report.sliced_on_server.push(name);
        }
        ctx.hide_all(&objects)?;
    }

    ctx.open_browser(vec![server.web_url()], &mut report)?;
    Ok(report)
}

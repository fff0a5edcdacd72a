use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{create_dir, groups, Context, Report};
use crate::{
    file::TemporaryKind,
    naming,
    process::Runner,
    slicer::slic3r::Slic3r,
    traits::{Host, ImportOptions},
};

/// Export, repair with Slic3r and reimport each group, hiding the originals
/// and parenting the repaired objects to the configured empty.
pub(super) async fn repair<H: Host, R: Runner>(ctx: &mut Context<H, R>) -> Result<Report> {
    let selection = ctx.selection()?;
    let slic3r = Slic3r::new(&ctx.config.slic3r);
    let level = ctx.config.misc.log_level;
    let obj_dir = ctx.config.import.temp_obj_directory.clone();
    let parent = ctx.config.slic3r.repaired_parent_name.clone();
    let import = ImportOptions::from(&ctx.config.import);

    let mut report = Report::default();
    for (stem, objects) in groups(ctx.config.export.mode, &selection, &ctx.document_stem()) {
        let stl = ctx.export(&objects, &stem).await?;
        report.exported.push(stl.clone());

        let fixed = slic3r.repair(&ctx.runner, &stl, level).await?;
        ctx.temporary.track(TemporaryKind::Obj, &fixed);
        let fixed = relocate(&fixed, &obj_dir, &stem).await?;
        ctx.temporary.track(TemporaryKind::Obj, &fixed);

        let imported = ctx.host.import_obj(&fixed, &import).await?;
        ctx.hide_all(&objects)?;
        ctx.host.parent_to_named_empty(&parent, &imported)?;
        tracing::info!(
            objects = format!("{:?}", objects),
            repaired = format!("{:?}", imported),
            "repaired"
        );
        report.repaired.extend(imported);
    }
    Ok(report)
}

/// Move a repaired mesh into `dir`, unless it is already there.
async fn relocate(fixed: &Path, dir: &Path, stem: &str) -> Result<PathBuf> {
    if dir.as_os_str().is_empty() || fixed.parent() == Some(dir) {
        return Ok(fixed.to_owned());
    }
    create_dir(dir).await?;

    let target = naming::fixed_obj_path(dir, stem);
    if tokio::fs::rename(fixed, &target).await.is_err() {
        // Different file systems.
        tokio::fs::copy(fixed, &target)
            .await
            .with_context(|| format!("copying {} to {}", fixed.display(), target.display()))?;
        tokio::fs::remove_file(fixed).await?;
    }
    Ok(target)
}

use std::path::PathBuf;

use super::Cli;
use anyhow::Result;
use print_shortcuts::{
    headless::HeadlessHost,
    pipeline::{self, Action, Context},
    Config, SystemRunner,
};

/// Load `meshes` into a fresh scene, select them, run `action` and print
/// the report.
pub async fn main(cli: &Cli, config: Config, action: Action, meshes: &[PathBuf]) -> Result<()> {
    let mut host = HeadlessHost::new();
    if let Some(document) = &cli.document {
        host = host.with_document(document);
    }

    let mut selection = vec![];
    for mesh in meshes {
        selection.extend(host.load_mesh(mesh)?);
    }
    host.select(&selection)?;

    let mut ctx = Context::new(host, SystemRunner, config);
    let report = pipeline::run(&mut ctx, action).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if cli.scene {
        println!("{}", ctx.host.to_json()?);
    }
    Ok(())
}

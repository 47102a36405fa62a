//! `cmdwrap deps` command implementation.
//!
//! Prints the dependency array a file would be wrapped with.

use super::{print_json, report, ErrorJson};
use crate::project::{Context, Project};
use cmdwrap_core::{resolve_deps, resolve_id};
use miette::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct DepsResultJson {
    ok: bool,
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    include: String,
    deps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

pub fn run(ctx: &Context, file: &Path) -> Result<()> {
    let include = ctx.resolve.include.unwrap_or_default();
    let result = Project::load(ctx).and_then(|project| {
        let file = project.locate(&ctx.cwd, file)?;
        let id = resolve_id(&project.graph, file, &project.options)?;
        let deps = resolve_deps(&project.graph, file, &project.options)?;
        Ok((id, deps, project.options.include))
    });

    match result {
        Ok((id, deps, include)) => {
            if ctx.json {
                print_json(&DepsResultJson {
                    ok: true,
                    file: file.display().to_string(),
                    id: Some(id),
                    include: include.to_string(),
                    deps,
                    error: None,
                })?;
            } else {
                for dep in &deps {
                    println!("{dep}");
                }
            }
            Ok(())
        }
        Err(e) => {
            if ctx.json {
                print_json(&DepsResultJson {
                    ok: false,
                    file: file.display().to_string(),
                    id: None,
                    include: include.to_string(),
                    deps: Vec::new(),
                    error: Some(ErrorJson::from(&e)),
                })?;
            } else {
                report(&e);
            }
            std::process::exit(1);
        }
    }
}

//! `cmdwrap id` command implementation.
//!
//! Prints the module id of a single file.

use super::{print_json, report, ErrorJson};
use crate::project::{Context, Project};
use cmdwrap_core::resolve_id;
use miette::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct IdResultJson {
    ok: bool,
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

pub fn run(ctx: &Context, file: &Path) -> Result<()> {
    let result = Project::load(ctx).and_then(|project| {
        let file = project.locate(&ctx.cwd, file)?;
        resolve_id(&project.graph, file, &project.options)
    });

    match result {
        Ok(id) => {
            if ctx.json {
                print_json(&IdResultJson {
                    ok: true,
                    file: file.display().to_string(),
                    id: Some(id),
                    error: None,
                })?;
            } else {
                println!("{id}");
            }
            Ok(())
        }
        Err(e) => {
            if ctx.json {
                print_json(&IdResultJson {
                    ok: false,
                    file: file.display().to_string(),
                    id: None,
                    error: Some(ErrorJson::from(&e)),
                })?;
            } else {
                report(&e);
            }
            std::process::exit(1);
        }
    }
}

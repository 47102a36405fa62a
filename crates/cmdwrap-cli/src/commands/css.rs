//! `cmdwrap css` command implementation.
//!
//! Prints a stylesheet with its `@import`s inlined. With an output
//! directory the stylesheet is written there instead, its local `url()`
//! resources copied next to it.

use super::{print_json, report, ErrorJson};
use crate::project::{Context, Project};
use cmdwrap_core::{inline_css, inline_css_with_resources, TransportError};
use cmdwrap_util::fs::{copy_output, write_output};
use miette::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Serialize)]
struct CssResultJson {
    ok: bool,
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outfile: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

struct Written {
    outfile: PathBuf,
    resources: Vec<PathBuf>,
}

pub fn run(ctx: &Context, file: &Path, outdir: Option<&Path>) -> Result<()> {
    let result = Project::load(ctx).and_then(|project| {
        let file_ref = project.locate(&ctx.cwd, file)?;
        match outdir {
            Some(outdir) => {
                let outdir = if outdir.is_absolute() {
                    outdir.to_path_buf()
                } else {
                    ctx.cwd.join(outdir)
                };
                write_css(&project, file_ref, &outdir).map(|written| (None, Some(written)))
            }
            None => inline_css(&project.graph, file_ref, &project.options).map(|css| (Some(css), None)),
        }
    });

    match result {
        Ok((css, written)) => {
            if ctx.json {
                print_json(&CssResultJson {
                    ok: true,
                    file: file.display().to_string(),
                    css,
                    outfile: written.as_ref().map(|w| w.outfile.display().to_string()),
                    resources: written
                        .map(|w| w.resources.iter().map(|r| r.display().to_string()).collect())
                        .unwrap_or_default(),
                    error: None,
                })?;
            } else if let Some(css) = css {
                print!("{css}");
            } else if let Some(written) = written {
                println!("  {} -> {}", file.display(), written.outfile.display());
                for resource in &written.resources {
                    println!("  + {}", resource.display());
                }
            }
            Ok(())
        }
        Err(e) => {
            if ctx.json {
                print_json(&CssResultJson {
                    ok: false,
                    file: file.display().to_string(),
                    css: None,
                    outfile: None,
                    resources: Vec::new(),
                    error: Some(ErrorJson::from(&e)),
                })?;
            } else {
                report(&e);
            }
            std::process::exit(1);
        }
    }
}

fn write_css(project: &Project, file: cmdwrap_core::FileRef, outdir: &Path) -> cmdwrap_core::Result<Written> {
    let relative = project.output_relative(file);
    let inlined = inline_css_with_resources(&project.graph, file, &project.options, &relative)?;

    let outfile = outdir.join(&relative);
    write_output(&outfile, inlined.css.as_bytes()).map_err(|source| TransportError::Io {
        path: outfile.clone(),
        source,
    })?;

    let mut resources = Vec::with_capacity(inlined.resources.len());
    for resource in inlined.resources {
        let dest = outdir.join(&resource.name);
        copy_output(&resource.source, &dest).map_err(|source| TransportError::Io {
            path: resource.source.clone(),
            source,
        })?;
        debug!(from = %resource.source.display(), to = %dest.display(), "copied resource");
        resources.push(dest);
    }

    Ok(Written { outfile, resources })
}

//! `cmdwrap wrap` command implementation.
//!
//! Wraps a batch of files as `define()` modules. Files are processed in
//! parallel; a failing file is reported without aborting its siblings.
//! With `--concat` each output also carries the modules its file pulls in.

use super::{print_json, report, ErrorJson};
use crate::project::{Context, Project};
use cmdwrap_core::wrap::output_path;
use cmdwrap_core::{concat, transport, Bundle, TransportError};
use cmdwrap_util::fs::write_output;
use miette::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

#[derive(Serialize)]
struct WrapResultJson {
    ok: bool,
    files: Vec<WrappedFileJson>,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

#[derive(Serialize)]
struct WrappedFileJson {
    ok: bool,
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    deps: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    modules: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outfile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

struct Wrapped {
    module: Bundle,
    outfile: Option<PathBuf>,
}

pub fn run(ctx: &Context, files: &[PathBuf], outdir: Option<&Path>, bundle: bool) -> Result<()> {
    let start = Instant::now();

    let project = match Project::load(ctx) {
        Ok(project) => project,
        Err(e) => {
            if ctx.json {
                print_json(&WrapResultJson {
                    ok: false,
                    files: Vec::new(),
                    duration_ms: start.elapsed().as_millis() as u64,
                    error: Some(ErrorJson::from(&e)),
                })?;
            } else {
                report(&e);
            }
            std::process::exit(1);
        }
    };

    let outdir = outdir.map(|dir| {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            ctx.cwd.join(dir)
        }
    });

    // Each file owns its resolution state; results keep input order.
    let results: Vec<cmdwrap_core::Result<Wrapped>> = files
        .par_iter()
        .map(|file| wrap_file(&project, ctx, file, outdir.as_deref(), bundle))
        .collect();

    let duration_ms = start.elapsed().as_millis() as u64;
    let failed = results.iter().filter(|r| r.is_err()).count();

    if ctx.json {
        let files = files
            .iter()
            .zip(results)
            .map(|(file, result)| match result {
                Ok(wrapped) => WrappedFileJson {
                    ok: true,
                    file: file.display().to_string(),
                    id: Some(wrapped.module.id),
                    deps: wrapped.module.deps,
                    modules: if bundle { wrapped.module.modules } else { Vec::new() },
                    outfile: wrapped.outfile.map(|p| p.display().to_string()),
                    error: None,
                },
                Err(e) => WrappedFileJson {
                    ok: false,
                    file: file.display().to_string(),
                    id: None,
                    deps: Vec::new(),
                    modules: Vec::new(),
                    outfile: None,
                    error: Some(ErrorJson::from(&e)),
                },
            })
            .collect();
        print_json(&WrapResultJson {
            ok: failed == 0,
            files,
            duration_ms,
            error: None,
        })?;
    } else {
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(Wrapped {
                    module,
                    outfile: Some(outfile),
                }) => {
                    println!(
                        "  {} -> {} ({})",
                        file.display(),
                        outfile.display(),
                        module.id
                    );
                }
                Ok(Wrapped {
                    module,
                    outfile: None,
                }) => print!("{}", module.code),
                Err(e) => report(&e),
            }
        }
        if failed > 0 {
            eprintln!("{failed} of {} files failed", files.len());
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn wrap_file(
    project: &Project,
    ctx: &Context,
    file: &Path,
    outdir: Option<&Path>,
    bundle: bool,
) -> cmdwrap_core::Result<Wrapped> {
    let file_ref = project.locate(&ctx.cwd, file)?;
    let module = if bundle {
        concat(&project.graph, file_ref, &project.options)?
    } else {
        let module = transport(&project.graph, file_ref, &project.options)?;
        Bundle {
            modules: vec![module.id.clone()],
            id: module.id,
            deps: module.deps,
            code: module.code,
        }
    };

    let outfile = match outdir {
        Some(outdir) => {
            let dest = project
                .output_dir(outdir, file_ref)
                .join(output_path(&project.graph, file_ref, &project.options));
            write_output(&dest, module.code.as_bytes()).map_err(|source| TransportError::Io {
                path: dest.clone(),
                source,
            })?;
            debug!(id = %module.id, outfile = %dest.display(), "written");
            Some(dest)
        }
        None => None,
    };

    Ok(Wrapped { module, outfile })
}

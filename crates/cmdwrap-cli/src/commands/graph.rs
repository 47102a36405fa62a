//! `cmdwrap graph` command implementation.
//!
//! Dumps the loaded package graph.

use super::{print_json, report, ErrorJson};
use crate::project::{Context, Project};
use miette::Result;
use serde::Serialize;

#[derive(Serialize)]
struct GraphResultJson {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<String>,
    packages: Vec<PackageJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

#[derive(Serialize)]
struct PackageJson {
    id: String,
    name: String,
    version: String,
    main: String,
    dest: String,
    dependencies: Vec<DependencyJson>,
    files: Vec<FileJson>,
}

#[derive(Serialize)]
struct DependencyJson {
    name: String,
    id: String,
}

#[derive(Serialize)]
struct FileJson {
    path: String,
    requires: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
}

pub fn run(ctx: &Context) -> Result<()> {
    let project = match Project::load(ctx) {
        Ok(project) => project,
        Err(e) => {
            if ctx.json {
                print_json(&GraphResultJson {
                    ok: false,
                    root: None,
                    packages: Vec::new(),
                    error: Some(ErrorJson::from(&e)),
                })?;
            } else {
                report(&e);
            }
            std::process::exit(1);
        }
    };

    let graph = &project.graph;
    let packages: Vec<PackageJson> = graph
        .packages()
        .map(|(_, package)| PackageJson {
            id: package.id.clone(),
            name: package.name.clone(),
            version: package.version.clone(),
            main: package.main.clone(),
            dest: package.dest_str(),
            dependencies: package
                .dependencies()
                .iter()
                .map(|(name, key)| DependencyJson {
                    name: name.clone(),
                    id: graph.package(*key).id.clone(),
                })
                .collect(),
            files: package
                .files()
                .iter()
                .map(|file| FileJson {
                    path: file.path.clone(),
                    requires: file.requires.clone(),
                    hash: file.hash.clone(),
                })
                .collect(),
        })
        .collect();

    if ctx.json {
        print_json(&GraphResultJson {
            ok: true,
            root: Some(graph.root_package().id.clone()),
            packages,
            error: None,
        })?;
    } else {
        for package in &packages {
            println!("{} ({})", package.id, package.dest);
            for dep in &package.dependencies {
                println!("  -> {}", dep.id);
            }
            for file in &package.files {
                println!("  {}", file.path);
            }
        }
    }

    Ok(())
}

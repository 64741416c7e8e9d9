use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use mdag_core::{CoreApi, Link, NodeContext, ObjectId, PatchOp, Template};
use serde::Serialize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli, input: &mut dyn Read, out: &mut dyn Write) -> anyhow::Result<()> {
    debug!(repo = %cli.repo.display(), "opening repository");
    let ctx = NodeContext::open(&cli.repo)
        .with_context(|| format!("cannot open repository {}", cli.repo.display()))?;
    let api = CoreApi::new(Arc::new(ctx));
    let mut out = Output {
        format: cli.format,
        w: out,
    };
    match cli.command {
        Command::Object(args) => cmd_object(&api, args.action, input, &mut out),
        Command::Name(args) => cmd_name(&api, args.action, &mut out),
    }
}

fn cmd_object(
    api: &CoreApi,
    action: ObjectAction,
    input: &mut dyn Read,
    out: &mut Output<'_>,
) -> anyhow::Result<()> {
    let objects = api.object();
    match action {
        ObjectAction::New { template } => {
            let template = match template {
                TemplateArg::Empty => Template::Empty,
                TemplateArg::Dir => Template::Dir,
            };
            out.hash(objects.new_object(template)?)
        }
        ObjectAction::Get { reference } => {
            let node = objects.get(&reference)?;
            out.json(&NodeView {
                links: node.links().iter().map(LinkView::from).collect(),
                data: String::from_utf8_lossy(node.data()).into_owned(),
            })
        }
        ObjectAction::Data { reference } => {
            let data = objects.data(&reference)?;
            out.w.write_all(&data)?;
            Ok(())
        }
        ObjectAction::Links { reference } => {
            let id = api.resolve(&reference)?;
            let links = objects.links(&id.to_hex())?;
            match out.format {
                OutputFormat::Text => {
                    for link in &links {
                        writeln!(out.w, "{} {} {}", link.target, link.size, link.name)?;
                    }
                    Ok(())
                }
                OutputFormat::Json => out.json(&LinksView {
                    hash: id,
                    links: links.iter().map(LinkView::from).collect(),
                }),
            }
        }
        ObjectAction::Stat { reference } => {
            let stat = objects.stat(&reference)?;
            match out.format {
                OutputFormat::Text => {
                    writeln!(out.w, "NumLinks:       {}", stat.num_links)?;
                    writeln!(out.w, "BlockSize:      {}", stat.block_size)?;
                    writeln!(out.w, "LinksSize:      {}", stat.links_size)?;
                    writeln!(out.w, "DataSize:       {}", stat.data_size)?;
                    writeln!(out.w, "CumulativeSize: {}", stat.cumulative_size)?;
                    Ok(())
                }
                OutputFormat::Json => out.json(&stat),
            }
        }
        ObjectAction::Patch(args) => cmd_patch(api, args.action, input, out),
    }
}

fn cmd_patch(
    api: &CoreApi,
    action: PatchAction,
    input: &mut dyn Read,
    out: &mut Output<'_>,
) -> anyhow::Result<()> {
    let objects = api.object();
    let id = match action {
        PatchAction::AppendData { root, data } => {
            let reader = open_data(data.as_deref(), input)?;
            objects.patch(&root, PatchOp::AppendData(reader))?
        }
        PatchAction::SetData { root, data } => {
            let reader = open_data(data.as_deref(), input)?;
            objects.patch(&root, PatchOp::SetData(reader))?
        }
        PatchAction::RmLink { root, name } => objects.rm_link(&root, &name)?,
        PatchAction::AddLink {
            root,
            name,
            reference,
            create,
        } => objects.add_link(&root, &name, &reference, create)?,
    };
    out.hash(id)
}

fn cmd_name(api: &CoreApi, action: NameAction, out: &mut Output<'_>) -> anyhow::Result<()> {
    let names = api.name();
    match action {
        NameAction::Publish { reference, key } => {
            let record = names.publish(&reference, &key)?;
            match out.format {
                OutputFormat::Text => {
                    writeln!(out.w, "Published to {}: {}", record.name, record.value)?;
                    Ok(())
                }
                OutputFormat::Json => out.json(&PublishView {
                    name: record.name,
                    value: record.value,
                }),
            }
        }
        NameAction::Resolve { name } => {
            let path = names.resolve(&name)?.to_string();
            match out.format {
                OutputFormat::Text => {
                    writeln!(out.w, "{path}")?;
                    Ok(())
                }
                OutputFormat::Json => out.json(&PathView { path }),
            }
        }
    }
}

/// The patch data source: a file, or `input` when absent or `-`.
fn open_data<'a>(path: Option<&Path>, input: &'a mut dyn Read) -> anyhow::Result<Box<dyn Read + 'a>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("cannot open data file {}", path.display()))?;
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(input)),
    }
}

struct Output<'a> {
    format: OutputFormat,
    w: &'a mut dyn Write,
}

impl Output<'_> {
    /// The identity alone in text mode, `{"Hash": ...}` in JSON mode.
    fn hash(&mut self, id: ObjectId) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.w, "{id}")?;
                Ok(())
            }
            OutputFormat::Json => self.json(&HashView { hash: id }),
        }
    }

    fn json<T: Serialize>(&mut self, value: &T) -> anyhow::Result<()> {
        serde_json::to_writer(&mut *self.w, value)?;
        writeln!(self.w)?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct HashView {
    hash: ObjectId,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct LinkView {
    name: String,
    hash: ObjectId,
    size: u64,
}

impl From<&Link> for LinkView {
    fn from(link: &Link) -> Self {
        Self {
            name: link.name.clone(),
            hash: link.target,
            size: link.size,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct NodeView {
    links: Vec<LinkView>,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct LinksView {
    hash: ObjectId,
    links: Vec<LinkView>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PublishView {
    name: String,
    value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PathView {
    path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use mdag_core::ErrorKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Repo {
        dir: TempDir,
    }

    impl Repo {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn path(&self) -> PathBuf {
            self.dir.path().join("repo")
        }

        fn run_with_input(&self, args: &[&str], input: &[u8]) -> anyhow::Result<String> {
            let repo = self.path();
            let mut argv = vec!["mdag", "--repo", repo.to_str().unwrap()];
            argv.extend_from_slice(args);
            let cli = Cli::try_parse_from(argv).unwrap();
            let mut out = Vec::new();
            run_command(cli, &mut &input[..], &mut out)?;
            Ok(String::from_utf8(out).unwrap())
        }

        fn run(&self, args: &[&str]) -> anyhow::Result<String> {
            self.run_with_input(args, b"")
        }

        fn hash(&self, args: &[&str]) -> String {
            self.hash_with_input(args, b"")
        }

        fn hash_with_input(&self, args: &[&str], input: &[u8]) -> String {
            let out = self.run_with_input(args, input).unwrap();
            assert!(out.ends_with('\n'));
            assert_eq!(out.lines().count(), 1);
            out.trim_end().to_string()
        }
    }

    fn kind(err: &anyhow::Error) -> Option<ErrorKind> {
        err.downcast_ref::<mdag_core::ApiError>().map(|e| e.kind())
    }

    #[test]
    fn patch_commands_print_only_the_identity() {
        let repo = Repo::new();
        let root = repo.hash(&["object", "new"]);
        assert_eq!(root.len(), 64);

        let r1 = repo.hash_with_input(&["object", "patch", "append-data", &root], b"hello");
        assert_eq!(repo.run(&["object", "data", &r1]).unwrap(), "hello");

        let r2 = repo.hash_with_input(&["object", "patch", "set-data", &r1, "-"], b"world");
        assert_eq!(repo.run(&["object", "data", &r2]).unwrap(), "world");

        let r3 = repo.hash(&["object", "patch", "add-link", &r2, "foo", &root]);
        let links = repo.run(&["object", "links", &r3]).unwrap();
        assert!(links.ends_with(" foo\n"));
        assert!(links.starts_with(&root));

        let r4 = repo.hash(&["object", "patch", "rm-link", &r3, "foo"]);
        assert_eq!(r4, r2);
    }

    #[test]
    fn data_from_file_argument() {
        let repo = Repo::new();
        let file = repo.dir.path().join("payload.txt");
        std::fs::write(&file, b"from file").unwrap();
        let root = repo.hash(&["object", "new"]);
        let id = repo.hash(&[
            "object",
            "patch",
            "set-data",
            &root,
            file.to_str().unwrap(),
        ]);
        assert_eq!(repo.run(&["object", "data", &id]).unwrap(), "from file");
    }

    #[test]
    fn missing_data_file_is_an_error() {
        let repo = Repo::new();
        let root = repo.hash(&["object", "new"]);
        let err = repo
            .run(&["object", "patch", "set-data", &root, "/no/such/file"])
            .unwrap_err();
        assert!(err.to_string().contains("cannot open data file"));
    }

    #[test]
    fn json_output_uses_hash_field() {
        let repo = Repo::new();
        let out = repo.run(&["--format", "json", "object", "new", "dir"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let hash = value["Hash"].as_str().unwrap();
        assert_eq!(hash.len(), 64);

        let stat = repo.run(&["--format", "json", "object", "stat", hash]).unwrap();
        let stat: serde_json::Value = serde_json::from_str(&stat).unwrap();
        assert_eq!(stat["Hash"], hash);
        assert_eq!(stat["NumLinks"], 0);
    }

    #[test]
    fn add_link_create_flag() {
        let repo = Repo::new();
        let root = repo.hash(&["object", "new"]);
        let err = repo
            .run(&["object", "patch", "add-link", &root, "a/b", &root])
            .unwrap_err();
        assert_eq!(kind(&err), Some(ErrorKind::NotFound));

        let id = repo.hash(&["object", "patch", "add-link", &root, "a/b", &root, "-p"]);
        let get = repo.run(&["object", "get", &format!("{id}/a")]).unwrap();
        let node: serde_json::Value = serde_json::from_str(&get).unwrap();
        assert_eq!(node["Links"][0]["Name"], "b");
        assert_eq!(node["Links"][0]["Hash"], root.as_str());
    }

    #[test]
    fn errors_surface_with_kind() {
        let repo = Repo::new();
        let root = repo.hash(&["object", "new"]);
        let err = repo
            .run(&["object", "patch", "rm-link", &root, "nonexistent"])
            .unwrap_err();
        assert_eq!(kind(&err), Some(ErrorKind::NotFound));
        assert!(format!("{err:#}").contains("rm-link"));

        let err = repo.run(&["object", "get", "garbage"]).unwrap_err();
        assert_eq!(kind(&err), Some(ErrorKind::InvalidReference));
    }

    #[test]
    fn state_persists_between_invocations() {
        let repo = Repo::new();
        let root = repo.hash(&["object", "new", "dir"]);
        let stat = repo.run(&["object", "stat", &root]).unwrap();
        assert!(stat.contains("NumLinks:       0"));
        assert!(repo.path().join("objects").is_dir());
    }

    #[test]
    fn publish_and_resolve_name() {
        let repo = Repo::new();
        let root = repo.hash(&["object", "new"]);
        let out = repo
            .run(&["--format", "json", "name", "publish", &root])
            .unwrap();
        let published: serde_json::Value = serde_json::from_str(&out).unwrap();
        let name = published["Name"].as_str().unwrap().to_string();

        let resolved = repo.run(&["name", "resolve", &name]).unwrap();
        assert_eq!(resolved, format!("/dag/{root}\n"));

        let patched = repo.hash_with_input(
            &["object", "patch", "set-data", &format!("/name/{name}")],
            b"named",
        );
        assert_eq!(repo.run(&["object", "data", &patched]).unwrap(), "named");
    }
}

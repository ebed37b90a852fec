//! `ocflv inspect`: summarize an inventory and resolve paths through it.
//!
//! Resolution consumes manifest entries the same way an update verification
//! does, so resolving two aliases of one digest yields one location and one
//! miss.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use ocflv_core::{Inventory, ObjectId, ObjectStore, Verifier};

/// Inspect subcommand arguments.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Numeric object id.
    #[arg(long)]
    pub id: u64,

    /// Logical or version-qualified path to resolve. Repeatable.
    #[arg(long = "resolve", value_name = "PATH")]
    pub resolve: Vec<String>,
}

/// Execute the inspect subcommand against `store`.
pub async fn run_inspect(args: &InspectArgs, store: Arc<dyn ObjectStore>) -> Result<u8> {
    let inventory = Verifier::new(store).fetch_inventory(ObjectId(args.id)).await?;
    let mut stdout = io::stdout().lock();
    render(&mut stdout, &inventory, &args.resolve)?;
    stdout.flush()?;
    Ok(0)
}

fn render<W: Write>(out: &mut W, inventory: &Inventory, resolve: &[String]) -> io::Result<()> {
    writeln!(out, "id:                {}", inventory.id)?;
    writeln!(out, "digest algorithm:  {}", inventory.digest_algorithm)?;
    writeln!(out, "content directory: {}", inventory.content_directory)?;
    writeln!(out, "head:              {}", inventory.head)?;
    writeln!(out, "versions:          {}", inventory.versions_newest_first().join(", "))?;
    writeln!(out, "manifest entries:  {}", inventory.manifest_len())?;

    let paths = inventory.head_paths();
    writeln!(out, "head paths ({}):", paths.len())?;
    for path in paths {
        writeln!(out, "  {path}")?;
    }

    if !resolve.is_empty() {
        writeln!(out, "resolved:")?;
        for path in resolve {
            match inventory.resolve(path) {
                Some(location) => writeln!(out, "  {path} -> {location}")?,
                None => writeln!(out, "  {path} -> (not found)")?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = r#"{
        "id": "URN-3:HUL.DRS.OBJECT:7",
        "digestAlgorithm": "md5",
        "head": "v00002",
        "manifest": {
            "aaa": ["v00001/content/data/a.txt"],
            "bbb": ["v00002/content/data/b.txt"]
        },
        "versions": {
            "v00001": { "state": { "aaa": ["data/a.txt"] } },
            "v00002": { "state": { "aaa": ["data/a.txt"], "bbb": ["data/b.txt"] } }
        }
    }"#;

    fn rendered(inventory: &Inventory, resolve: &[String]) -> String {
        let mut out = Vec::new();
        render(&mut out, inventory, resolve).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn summary_lists_head_paths_and_versions() {
        let inventory = Inventory::from_slice(INVENTORY.as_bytes()).unwrap();
        let out = rendered(&inventory, &[]);
        assert!(out.contains("head:              v00002"));
        assert!(out.contains("versions:          v00002, v00001"));
        assert!(out.contains("manifest entries:  2"));
        assert!(out.contains("  data/a.txt\n  data/b.txt\n"));
        assert!(!out.contains("resolved:"));
    }

    #[test]
    fn resolution_consumes_entries() {
        let inventory = Inventory::from_slice(INVENTORY.as_bytes()).unwrap();
        let out = rendered(
            &inventory,
            &["data/b.txt".into(), "data/b.txt".into(), "data/zzz.txt".into()],
        );
        assert!(out.contains("  data/b.txt -> v00002/content/data/b.txt\n  data/b.txt -> (not found)"));
        assert!(out.contains("  data/zzz.txt -> (not found)"));
    }
}

//! `ocflv key`: print storage keys without touching the store.

use anyhow::Result;
use clap::Args;
use ocflv_core::{build_key, inventory_key, ObjectId};

/// Key subcommand arguments.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Numeric object id.
    #[arg(long)]
    pub id: u64,

    /// Path inside the object root, e.g. `v00001/content/data/file.txt`.
    /// Prints the inventory key when omitted.
    #[arg(long)]
    pub path: Option<String>,
}

/// Execute the key subcommand.
pub fn run_key(args: &KeyArgs) -> Result<u8> {
    println!("{}", render_key(args));
    Ok(0)
}

fn render_key(args: &KeyArgs) -> String {
    let id = ObjectId(args.id);
    match &args.path {
        Some(path) => build_key(id, path),
        None => inventory_key(id),
    }
}

//! `taskforge init` — seed a fresh workspace. Existing files are never
//! overwritten, so re-running is safe.

use std::path::PathBuf;

use clap::Parser;
use taskforge_store::ArtifactStore;
use taskforge_store::JsonWriteOptions;
use taskforge_store::WriteOptions;

use crate::seeds;

/// Seed a workspace with the stock schemas, templates, and blueprints.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Workspace root.
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,
}

pub(crate) fn run(args: &InitArgs) -> anyhow::Result<()> {
    // Plain store without the validation hook: seeding writes the schema
    // documents themselves, so there is nothing to validate against yet.
    let store = ArtifactStore::new(&args.root)?;
    let mut created = 0usize;

    for seed in seeds::json_seeds() {
        if store.resolve(seed.path)?.exists() {
            println!("exists  {}", seed.path);
            continue;
        }
        store.write_json(seed.path, &seed.document, &JsonWriteOptions::default())?;
        println!("created {}", seed.path);
        created += 1;
    }
    for seed in seeds::text_seeds() {
        if store.resolve(seed.path)?.exists() {
            println!("exists  {}", seed.path);
            continue;
        }
        store.write_text(seed.path, seed.content, &WriteOptions::default())?;
        println!("created {}", seed.path);
        created += 1;
    }

    println!("Seeded {created} file(s)");
    Ok(())
}

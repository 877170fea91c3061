//! Info command - shows the backend and item counts per collection.

use kindred::{CollectionKind, CollectionScope, backend::ContentBackend};

use crate::backend::{backend_label, create_backend};
use crate::cli::InfoArgs;
use crate::output::{OutputFormat, print_table};

/// Number of items per collection kind. Photos are summed over every album.
pub async fn collection_counts(
    backend: &dyn ContentBackend,
) -> kindred::Result<Vec<(CollectionKind, usize)>> {
    let mut counts = Vec::with_capacity(CollectionKind::ALL.len());
    for kind in CollectionKind::ALL {
        let count = if kind.requires_parent() {
            let mut total = 0;
            for album in backend.fetch_collection(&CollectionScope::albums()).await? {
                total += backend.count(&CollectionScope::photos(album.id)).await?;
            }
            total
        } else {
            backend.count(&CollectionScope::new(kind, None)?).await?
        };
        counts.push((kind, count));
    }
    Ok(counts)
}

/// Run the info command
pub async fn run(args: &InfoArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(&args.backend_config).await?;
    let counts = collection_counts(&*backend).await?;
    let backend_str = backend_label(&args.backend_config);

    match format {
        OutputFormat::Human => {
            println!("Backend:     {backend_str}");
            println!();
            let rows: Vec<Vec<String>> = counts
                .iter()
                .map(|(kind, count)| vec![kind.to_string(), count.to_string()])
                .collect();
            print_table(&["COLLECTION", "ITEMS"], &rows);
        }
        OutputFormat::Json => {
            let collections: serde_json::Map<String, serde_json::Value> = counts
                .iter()
                .map(|(kind, count)| (kind.to_string(), (*count).into()))
                .collect();
            let value = serde_json::json!({
                "backend": backend.kind_label(),
                "location": backend_str,
                "collections": collections,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}

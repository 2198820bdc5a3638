use futures::{stream::FuturesUnordered, StreamExt};
use serde_json::json;

use crate::api::{ListRequest, PagedResult};
use crate::cli::config::{api_client, require_account_id, require_session};
use crate::cli::utils::{output_empty_collection, output_json};
use crate::cli::OutputFormat;
use crate::error::ClientError;
use crate::grid::PaginationState;
use crate::screens::builtin_screens;

/// Record totals for every screen the role can see, fetched concurrently
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let session = require_session()?;
    let account_id = require_account_id(&session)?;
    let client = api_client(&session)?;
    let permissions = session.permissions();

    let catalog = builtin_screens();
    let screens = catalog.visible(&permissions);
    if screens.is_empty() {
        return output_empty_collection(&output_format, "counts", "No screens available for this role");
    }

    let requests: Vec<ListRequest> = screens
        .iter()
        .map(|s| ListRequest::new(s.fetch_endpoint(&account_id), s.method, PaginationState::first(1)))
        .collect();

    // Totals arrive in completion order; slots keep them in screen order
    let mut pending: FuturesUnordered<_> = requests
        .iter()
        .enumerate()
        .map(|(index, req)| {
            let client = &client;
            async move { (index, client.list(req).await) }
        })
        .collect();
    let mut slots: Vec<Option<Result<PagedResult, ClientError>>> = screens.iter().map(|_| None).collect();
    while let Some((index, result)) = pending.next().await {
        slots[index] = Some(result);
    }

    let mut counts = Vec::with_capacity(screens.len());
    for (screen, result) in screens.iter().zip(slots.into_iter().flatten()) {
        match result {
            Ok(page) => counts.push(json!({ "screen": screen.key, "title": screen.title, "total": page.total_count })),
            Err(e) => {
                tracing::warn!("Count for {} failed: {}", screen.key, e);
                counts.push(json!({ "screen": screen.key, "title": screen.title, "error": e.error_code() }));
            }
        }
    }

    match output_format {
        OutputFormat::Json => output_json(&json!({ "counts": counts })),
        OutputFormat::Text => {
            for count in &counts {
                let value = count
                    .get("total")
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| format!("unavailable ({})", count["error"].as_str().unwrap_or("")));
                println!("{:<18} {}", count["title"].as_str().unwrap_or(""), value);
            }
            Ok(())
        }
    }
}

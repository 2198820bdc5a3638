use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::SaveMode;
use crate::cli::config::{api_client, require_account_id, require_session};
use crate::cli::utils::{format_table, output_error, output_json, output_success, StdinConfirmer};
use crate::cli::OutputFormat;
use crate::config;
use crate::grid::{
    AssumeYes, Confirmer, DeleteOutcome, FetchOutcome, FilterSet, PaginationState, ServerPagedResource, SortSpec,
    TracingNotifier,
};
use crate::screens::{builtin_screens, ScreenSpec};
use crate::session::Session;
use crate::types::{Action, EntityId};

#[derive(Args)]
pub struct ListArgs {
    #[arg(help = "Screen key (see `scm screens`)")]
    pub screen: String,
    #[arg(long, default_value_t = 0, help = "0-based page index")]
    pub page: u32,
    #[arg(long, help = "Rows per page (defaults to the configured page size)")]
    pub size: Option<u32>,
    #[arg(long, help = "Free-text search")]
    pub search: Option<String>,
    #[arg(long, help = "Sort column, optionally followed by asc/desc, e.g. \"name desc\"")]
    pub sort: Option<String>,
    #[arg(long = "filter", value_name = "KEY=VALUE", help = "Filter merged into the request (repeatable)")]
    pub filters: Vec<String>,
    #[arg(long, help = "Send paging as query parameters on a GET instead of a POST body")]
    pub get: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(help = "Screen key")]
    pub screen: String,
    #[arg(help = "Record ID")]
    pub id: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(help = "Screen key")]
    pub screen: String,
    #[arg(help = "Record ID to delete")]
    pub id: String,
    #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
    pub yes: bool,
}

#[derive(Args)]
pub struct SaveArgs {
    #[arg(help = "Screen key")]
    pub screen: String,
    #[arg(long, help = "Update an existing record (PUT) instead of creating one")]
    pub update: bool,
    #[arg(help = "JSON record file; reads stdin when omitted")]
    pub file: Option<PathBuf>,
}

struct ScreenContext {
    session: Session,
    screen: ScreenSpec,
}

/// Resolve the stored session and a screen it may use for `action`
fn open_screen(key: &str, action: Action) -> anyhow::Result<ScreenContext> {
    let session = require_session()?;
    let catalog = builtin_screens();
    let screen = catalog
        .get(key)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Unknown screen '{}'", key))?;

    if !session.permissions().has_permission(&screen.entity, action) {
        anyhow::bail!("Role may not {} {}", action, screen.title);
    }

    Ok(ScreenContext { session, screen })
}

fn build_resource(
    ctx: &ScreenContext,
    filters: FilterSet,
    sort: Option<SortSpec>,
    search: Option<String>,
    use_get: bool,
    confirmer: Arc<dyn Confirmer>,
) -> anyhow::Result<ServerPagedResource> {
    let account_id = require_account_id(&ctx.session)?;
    let client = api_client(&ctx.session)?;

    let mut resource_config = ctx.screen.resource_config(&account_id, filters);
    if use_get {
        resource_config = resource_config.use_get_method(true);
    }
    if let Some(sort) = sort {
        resource_config = resource_config.sort(sort);
    }
    if let Some(search) = search {
        resource_config = resource_config.search(search);
    }

    Ok(ServerPagedResource::new(
        resource_config,
        Arc::new(client),
        confirmer,
        Arc::new(TracingNotifier),
        &config::config().grid,
    ))
}

pub async fn handle_list(args: ListArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = open_screen(&args.screen, Action::View)?;

    let filters = FilterSet::from_pairs(&args.filters).map_err(|e| anyhow::anyhow!(e))?;
    let unknown: Vec<&str> = filters
        .keys()
        .filter(|k| !ctx.screen.filter_keys.iter().any(|f| f == k))
        .collect();
    if !unknown.is_empty() {
        tracing::warn!("{} does not filter on {:?}; sending anyway", ctx.screen.key, unknown);
    }

    let sort = match args.sort.as_deref() {
        Some(spec) => Some(SortSpec::parse(spec).ok_or_else(|| anyhow::anyhow!("Invalid sort '{}'", spec))?),
        None => None,
    };

    let resource = build_resource(&ctx, filters, sort, args.search, args.get, Arc::new(AssumeYes))?;
    let page_size = args.size.unwrap_or(config::config().grid.default_page_size);

    match resource.set_pagination(PaginationState::new(args.page, page_size)).await {
        FetchOutcome::Applied { .. } => {}
        FetchOutcome::Failed(reason) => anyhow::bail!("Failed to load {}: {}", ctx.screen.title, reason),
        FetchOutcome::Superseded => anyhow::bail!("{} listing was superseded", ctx.screen.title),
    }

    let snapshot = resource.snapshot();
    let pages = snapshot.pagination.page_count(snapshot.total_count);

    match output_format {
        OutputFormat::Json => {
            let action_column = resource.action_column();
            let rows: Vec<Value> = snapshot
                .rows
                .iter()
                .map(|row| json!({ "row": row, "actions": action_column.actions_for(row) }))
                .collect();
            output_json(&json!({
                "screen": ctx.screen.key,
                "page": snapshot.pagination.page_index,
                "size": snapshot.pagination.page_size,
                "totalElements": snapshot.total_count,
                "pages": pages,
                "content": rows,
            }))
        }
        OutputFormat::Text => {
            if snapshot.rows.is_empty() {
                println!("No {} found", ctx.screen.title.to_lowercase());
            } else {
                println!("{}", format_table(&ctx.screen.columns, &snapshot.rows));
            }
            println!(
                "\nPage {} of {} ({} total, {} per page)",
                snapshot.pagination.page_index + 1,
                pages.max(1),
                snapshot.total_count,
                snapshot.pagination.page_size
            );
            Ok(())
        }
    }
}

pub async fn handle_show(args: ShowArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = open_screen(&args.screen, Action::View)?;
    let endpoint = ctx
        .screen
        .get_by_id_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("{} has no detail endpoint", ctx.screen.title))?;

    let client = api_client(&ctx.session)?;
    let record = client.get_by_id(&endpoint, &EntityId::new(args.id)).await?;

    match output_format {
        OutputFormat::Json => output_json(&record),
        OutputFormat::Text => {
            match record.as_object() {
                Some(fields) => {
                    let width = fields.keys().map(|k| k.len()).max().unwrap_or(0);
                    for (key, value) in fields {
                        let text = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        println!("{:<width$}  {}", key, text, width = width);
                    }
                }
                None => println!("{}", record),
            }
            Ok(())
        }
    }
}

pub async fn handle_delete(args: DeleteArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = open_screen(&args.screen, Action::View)?;
    let confirmer: Arc<dyn Confirmer> = if args.yes { Arc::new(AssumeYes) } else { Arc::new(StdinConfirmer) };
    let resource = build_resource(&ctx, FilterSet::new(), None, None, false, confirmer)?;
    let id = EntityId::new(args.id);

    match resource.delete_row(&id).await {
        DeleteOutcome::Deleted { refetch } => {
            let data = match refetch {
                FetchOutcome::Applied { total_count, .. } => json!({ "id": id, "totalElements": total_count }),
                _ => json!({ "id": id }),
            };
            output_success(&output_format, crate::grid::resource::DELETE_SUCCESS, Some(data))
        }
        DeleteOutcome::Declined => output_success(&output_format, "Delete cancelled", Some(json!({ "id": id }))),
        DeleteOutcome::Failed(reason) => {
            output_error(&output_format, crate::grid::resource::DELETE_FAILURE, Some("DELETE_FAILED"))?;
            Err(anyhow::anyhow!("{}", reason))
        }
        DeleteOutcome::Unavailable => anyhow::bail!("{} does not support deleting records", ctx.screen.title),
    }
}

pub async fn handle_save(args: SaveArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let (mode, action) = if args.update {
        (SaveMode::Update, Action::Edit)
    } else {
        (SaveMode::Create, Action::Add)
    };
    let ctx = open_screen(&args.screen, action)?;

    let endpoint = match mode {
        SaveMode::Create => ctx.screen.save_url.clone(),
        SaveMode::Update => ctx.screen.update_url.clone(),
    }
    .ok_or_else(|| anyhow::anyhow!("{} cannot {} records", ctx.screen.title, if args.update { "update" } else { "create" }))?;

    let content = match &args.file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let record: Value = serde_json::from_str(&content).context("record is not valid JSON")?;
    if !record.is_object() {
        anyhow::bail!("record must be a JSON object");
    }

    let client = api_client(&ctx.session)?;
    let response = client.save(&endpoint, mode, &record).await?;

    let message = match mode {
        SaveMode::Create => format!("{} record created", ctx.screen.title),
        SaveMode::Update => format!("{} record updated", ctx.screen.title),
    };
    output_success(&output_format, &message, Some(json!({ "response": response })))
}

use clap::Args;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::config::resolve_permissions;
use crate::cli::utils::{output_empty_collection, output_json};
use crate::cli::OutputFormat;
use crate::menu::{default_menu, Menu, MenuNode};
use crate::routes::{main_routes, Navigation};
use crate::screens::builtin_screens;

#[derive(Args)]
pub struct PermissionArgs {
    #[arg(long, help = "JSON permission list to use instead of the stored session")]
    pub permissions: Option<PathBuf>,
}

#[derive(Args)]
pub struct MenuArgs {
    #[command(flatten)]
    pub perms: PermissionArgs,
    #[arg(long, help = "Menu definition (.json, .yaml or .yml) replacing the built-in menu")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct RoutesArgs {
    #[command(flatten)]
    pub perms: PermissionArgs,
    #[arg(help = "Resolve this path instead of listing the table")]
    pub path: Option<String>,
}

fn print_node(node: &MenuNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node.route() {
        Some(route) => println!("{}- {} ({})", indent, node.title(), route),
        None => println!("{}+ {}", indent, node.title()),
    }
    for child in node.children() {
        print_node(child, depth + 1);
    }
}

pub async fn handle_menu(args: MenuArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let permissions = resolve_permissions(args.perms.permissions.as_deref())?;
    let menu = match &args.file {
        Some(path) => Menu::load(path)?,
        None => default_menu(),
    };
    let visible = menu.visible(&permissions);

    match output_format {
        OutputFormat::Json => output_json(&serde_json::to_value(&visible)?),
        OutputFormat::Text if visible.items.is_empty() => {
            output_empty_collection(&output_format, "items", "No menu entries for this role")
        }
        OutputFormat::Text => {
            for node in &visible.items {
                print_node(node, 0);
            }
            Ok(())
        }
    }
}

pub async fn handle_routes(args: RoutesArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let permissions = resolve_permissions(args.perms.permissions.as_deref())?;
    let nav = Navigation::build(&default_menu(), &main_routes(), &permissions);

    if let Some(path) = args.path {
        // Unauthorized and unknown paths look the same
        let matched = nav
            .routes
            .resolve(&path)
            .ok_or_else(|| anyhow::anyhow!("No route for '{}'", path))?;
        return match output_format {
            OutputFormat::Json => output_json(&json!({
                "path": matched.entry.path,
                "screen": matched.entry.screen,
                "params": matched.params,
            })),
            OutputFormat::Text => {
                println!("{} -> {}", matched.entry.path, matched.entry.screen);
                for (key, value) in &matched.params {
                    println!("  {} = {}", key, value);
                }
                Ok(())
            }
        };
    }

    match output_format {
        OutputFormat::Json => output_json(&serde_json::to_value(nav.routes.entries())?),
        OutputFormat::Text => {
            for entry in nav.routes.entries() {
                println!("{:<40} {}", entry.path, entry.screen);
            }
            Ok(())
        }
    }
}

pub async fn handle_screens(args: PermissionArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let permissions = resolve_permissions(args.permissions.as_deref())?;
    let catalog = builtin_screens();
    let visible = catalog.visible(&permissions);

    if visible.is_empty() {
        return output_empty_collection(&output_format, "screens", "No screens available for this role");
    }

    match output_format {
        OutputFormat::Json => output_json(&serde_json::to_value(&visible)?),
        OutputFormat::Text => {
            for screen in visible {
                println!("{:<16} {:<18} {}", screen.key, screen.title, screen.fetch_url);
            }
            Ok(())
        }
    }
}

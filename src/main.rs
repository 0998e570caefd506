// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use fridge_manager::config::Config;
use fridge_manager::form::format_quantity;
use fridge_manager::transfer;
use fridge_manager::view::row_ids;
use fridge_manager::{
    logging, CategoryFilter, FontSize, InventoryStore, ItemForm, ItemRow, ListView, SortKey,
    StorageZone,
};

/// Fridge Manager - track what's in the fridge, freezer and pantry
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides the config)
    #[arg(long, value_name = "FILE", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the items of one zone
    List(ListArgs),
    /// Add an item
    Add(ItemArgs),
    /// Edit an item (only the given fields change)
    Edit(EditArgs),
    /// Delete one item
    Remove {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete several items at once
    RemoveMany {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every expired item of a zone
    PurgeExpired {
        #[arg(short, long, default_value = "cold")]
        zone: StorageZone,
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every item of one category in a zone
    PurgeCategory {
        category: String,
        #[arg(short, long, default_value = "cold")]
        zone: StorageZone,
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Export all items to CSV
    Export { path: PathBuf },
    /// Import items from CSV (duplicates are skipped)
    Import { path: PathBuf },
    /// Show the change history of an item
    History { id: String },
    /// Interactive terminal UI (default)
    Tui,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(short, long, default_value = "cold")]
    zone: StorageZone,
    /// Only this category
    #[arg(short, long)]
    category: Option<String>,
    /// expiry (soonest first) or added (newest first)
    #[arg(short, long, default_value = "expiry")]
    sort: SortKey,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ItemArgs {
    #[arg(long)]
    name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    expires: String,
    #[arg(long, default_value = "1")]
    quantity: String,
    #[arg(long)]
    unit: String,
    /// Defaults to the first configured category
    #[arg(long)]
    category: Option<String>,
    #[arg(long, default_value = "cold")]
    zone: StorageZone,
}

#[derive(Args, Debug)]
struct EditArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    expires: Option<String>,
    #[arg(long)]
    quantity: Option<String>,
    #[arg(long)]
    unit: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    zone: Option<StorageZone>,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print the current settings
    Show,
    /// Flag items this many days before they expire
    ReminderDays { days: i64 },
    /// small, medium, large, xlarge or system
    FontSize { size: String },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    List,
    Add { name: String },
    Remove {
        name: String,
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let is_tui = matches!(cli.command, None | Some(Command::Tui));
    // Keep the terminal clean while the TUI owns it
    logging::init(if is_tui { "off" } else { "warn" });

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let db_path = cli.db.unwrap_or(config.storage.database_path);

    let actor = if is_tui { "tui" } else { "cli" };
    let mut store = InventoryStore::open_path(&db_path)?.with_actor(actor);

    match cli.command {
        None | Some(Command::Tui) => run_ui_mode(store),
        Some(Command::List(args)) => run_list(&store, args),
        Some(Command::Add(args)) => run_add(&mut store, args),
        Some(Command::Edit(args)) => run_edit(&mut store, args),
        Some(Command::Remove { id, yes }) => run_remove(&mut store, &id, yes),
        Some(Command::RemoveMany { ids, yes }) => run_remove_many(&mut store, ids, yes),
        Some(Command::PurgeExpired { zone, yes }) => run_purge_expired(&mut store, zone, yes),
        Some(Command::PurgeCategory { category, zone, yes }) => {
            run_purge_category(&mut store, zone, category, yes)
        }
        Some(Command::Settings(cmd)) => run_settings(&mut store, cmd),
        Some(Command::Category(cmd)) => run_category(&mut store, cmd),
        Some(Command::Export { path }) => {
            let count = transfer::export_csv_file(store.items(), &path)?;
            println!("✓ Exported {} items to {}", count, path.display());
            Ok(())
        }
        Some(Command::Import { path }) => {
            let drafts = transfer::read_csv_file(&path)?;
            let summary = store.import_items(drafts)?;
            println!("✓ Imported: {} items", summary.imported);
            println!("✓ Skipped duplicates: {}", summary.duplicates);
            for category in &summary.new_categories {
                println!("✓ New category: {}", category);
            }
            Ok(())
        }
        Some(Command::History { id }) => run_history(&store, &id),
    }
}

// ============================================================================
// ITEMS
// ============================================================================

fn visible_rows(store: &InventoryStore, view: &ListView) -> Vec<ItemRow> {
    view.rows(
        store.items(),
        store.settings().reminder_days,
        Local::now().date_naive(),
    )
}

fn run_list(store: &InventoryStore, args: ListArgs) -> Result<()> {
    let mut view = ListView::new(args.zone);
    view.set_category(CategoryFilter::from_param(args.category.as_deref()));
    view.set_sort_key(args.sort);

    let rows = visible_rows(store, &view);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{} {}  |  category: {}  |  sorted by {}",
        args.zone.icon(),
        args.zone.label(),
        view.category(),
        view.sort_key().label()
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if rows.is_empty() {
        println!("(no items)");
        return Ok(());
    }

    for row in &rows {
        let marker = if row.is_expired {
            "✗"
        } else if row.is_warning {
            "⚠"
        } else {
            " "
        };
        println!(
            "{} {:<24} {:>6} {:<8} {:<12} {}  ({})  {}",
            marker,
            truncate(&row.item.name, 24),
            format_quantity(row.item.quantity),
            truncate(&row.item.unit, 8),
            truncate(&row.item.category, 12),
            row.item.expiry_date,
            describe_days_left(row.days_left),
            row.item.id
        );
    }

    let warnings = rows.iter().filter(|r| r.is_warning).count();
    println!();
    println!(
        "{} items, {} within {} days of expiry",
        rows.len(),
        warnings,
        store.settings().reminder_days
    );

    Ok(())
}

fn run_add(store: &mut InventoryStore, args: ItemArgs) -> Result<()> {
    let mut form = ItemForm::blank(args.zone, store.settings());
    form.name = args.name;
    form.expiry_date = args.expires;
    form.quantity = args.quantity;
    form.unit = args.unit;
    if let Some(category) = args.category {
        form.category = category;
    }

    let item = form.submit(store, None)?;
    println!("✓ Added {} ({})", item.name, item.id);
    Ok(())
}

fn run_edit(store: &mut InventoryStore, args: EditArgs) -> Result<()> {
    let existing = store
        .find_item(&args.id)
        .cloned()
        .with_context(|| format!("Item not found: {}", args.id))?;

    let mut form = ItemForm::from_item(&existing);
    if let Some(name) = args.name {
        form.name = name;
    }
    if let Some(expires) = args.expires {
        form.expiry_date = expires;
    }
    if let Some(quantity) = args.quantity {
        form.quantity = quantity;
    }
    if let Some(unit) = args.unit {
        form.unit = unit;
    }
    if let Some(category) = args.category {
        form.category = category;
    }
    if let Some(zone) = args.zone {
        form.storage_zone = zone.as_str().to_string();
    }

    let item = form.submit(store, Some(&existing))?;
    println!("✓ Updated {} ({})", item.name, item.id);
    Ok(())
}

fn run_remove(store: &mut InventoryStore, id: &str, yes: bool) -> Result<()> {
    let item = store
        .find_item(id)
        .cloned()
        .with_context(|| format!("Item not found: {}", id))?;

    if !yes && !confirm(&format!("Delete {}?", item.name))? {
        println!("Cancelled");
        return Ok(());
    }

    store.delete_item(id)?;
    println!("✓ Deleted {}", item.name);
    Ok(())
}

fn run_remove_many(store: &mut InventoryStore, ids: Vec<String>, yes: bool) -> Result<()> {
    let prompt = format!(
        "Delete the {} selected items? This cannot be undone.",
        ids.len()
    );
    if !yes && !confirm(&prompt)? {
        println!("Cancelled");
        return Ok(());
    }

    let deleted = store.delete_items(&ids)?;
    println!("✓ Deleted {} of {} items", deleted, ids.len());
    Ok(())
}

fn run_purge_expired(store: &mut InventoryStore, zone: StorageZone, yes: bool) -> Result<()> {
    let view = ListView::new(zone);
    let rows = visible_rows(store, &view);
    let expired = view.expired_rows(&rows);

    if expired.is_empty() {
        println!("No expired items in {}", zone.label());
        return Ok(());
    }

    let mut prompt = format!("Found {} expired items, delete them all?\n", expired.len());
    for row in &expired {
        prompt.push_str(&format!("  • {} ({})\n", row.item.name, row.item.expiry_date));
    }
    if !yes && !confirm(&prompt)? {
        println!("Cancelled");
        return Ok(());
    }

    let deleted = store.delete_items(&row_ids(&expired))?;
    println!("✓ Deleted {} expired items", deleted);
    Ok(())
}

fn run_purge_category(
    store: &mut InventoryStore,
    zone: StorageZone,
    category: String,
    yes: bool,
) -> Result<()> {
    let mut view = ListView::new(zone);
    view.set_category(CategoryFilter::from_param(Some(&category)));
    let rows = visible_rows(store, &view);
    let matching = view.category_rows(&rows)?;

    if matching.is_empty() {
        println!("{} has no items in {}", category, zone.label());
        return Ok(());
    }

    let mut prompt = format!(
        "Delete all {} items of '{}'? This cannot be undone.\n",
        matching.len(),
        category
    );
    for row in &matching {
        prompt.push_str(&format!("  • {}\n", row.item.name));
    }
    if !yes && !confirm(&prompt)? {
        println!("Cancelled");
        return Ok(());
    }

    let deleted = store.delete_items(&row_ids(&matching))?;
    println!("✓ Deleted {} items", deleted);
    Ok(())
}

fn run_history(store: &InventoryStore, id: &str) -> Result<()> {
    let events = store.history("item", id)?;
    if events.is_empty() {
        println!("No history for {}", id);
        return Ok(());
    }

    for event in events {
        println!(
            "{}  {:<14} by {:<4} {}",
            event.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            event.event_type,
            event.actor,
            event.data
        );
    }
    Ok(())
}

// ============================================================================
// SETTINGS + CATEGORIES
// ============================================================================

fn run_settings(store: &mut InventoryStore, cmd: SettingsCommand) -> Result<()> {
    match cmd {
        SettingsCommand::Show => {
            let settings = store.settings();
            println!("Reminder window: {} days", settings.reminder_days);
            println!(
                "Font size:       {}",
                settings
                    .font_size
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "system".to_string())
            );
            println!("Categories:      {}", settings.custom_categories.join(", "));
        }
        SettingsCommand::ReminderDays { days } => {
            let stored = store.update_reminder_days(days)?;
            println!("✓ Reminder window set to {} days", stored);
        }
        SettingsCommand::FontSize { size } => {
            let font_size = if size.eq_ignore_ascii_case("system") {
                None
            } else {
                Some(size.parse::<FontSize>()?)
            };
            store.set_font_size(font_size)?;
            println!("✓ Font size set to {}", size.to_ascii_lowercase());
        }
    }
    Ok(())
}

fn run_category(store: &mut InventoryStore, cmd: CategoryCommand) -> Result<()> {
    match cmd {
        CategoryCommand::List => {
            for name in &store.settings().custom_categories {
                let note = if store.has_category_inventory(name) { "  (in use)" } else { "" };
                println!("{}{}", name, note);
            }
        }
        CategoryCommand::Add { name } => {
            if store.add_category(&name)? {
                println!("✓ Added category {}", name.trim());
            } else {
                println!("Category {} already exists", name.trim());
            }
        }
        CategoryCommand::Remove { name, yes } => {
            if !store.settings().has_category(&name) {
                bail!("Category not found: {}", name);
            }
            if !yes && !confirm(&format!("Delete category '{}'?", name))? {
                println!("Cancelled");
                return Ok(());
            }
            store.delete_category(&name)?;
            println!("✓ Deleted category {}", name);
        }
    }
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt.trim_end());
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn describe_days_left(days: i64) -> String {
    match days {
        d if d < 0 => format!("expired {}d ago", -d),
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d => format!("in {}d", d),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(store: InventoryStore) -> Result<()> {
    let mut app = ui::App::new(store);
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_store: InventoryStore) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the subcommands: fridge-manager --help");
    std::process::exit(1);
}

//! Print a user's shopping lists with line totals
//! Usage: cargo run --bin list_report -- <user_id | email>

use cartwise::config::Config;
use cartwise::db::{migrations, Database};
use cartwise::pricing::format_brl;
use cartwise::tools::{lists, users};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let who = match args.get(1) {
        Some(arg) => arg.as_str(),
        None => {
            eprintln!("Usage: list_report <user_id | email>");
            std::process::exit(2);
        }
    };

    let config = Config::from_env();
    println!("Database: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;
    database.with_conn(|conn| migrations::run_migrations(conn))?;

    let user = match who.parse::<i64>() {
        Ok(id) => users::get_user(&database, id)?,
        Err(_) => users::find_user_by_email(&database, who)?,
    };
    let user = match user {
        Some(u) => u,
        None => {
            println!("No user found for: {}", who);
            return Ok(());
        }
    };

    println!("User {}: {}", user.id, user.email);

    let overview = lists::list_lists(&database, user.id)?;
    if overview.count == 0 {
        println!("No shopping lists.");
        return Ok(());
    }

    let mut grand_total = 0.0;
    for summary in &overview.lists {
        let detail = match lists::get_list(&database, user.id, summary.id)? {
            Some(d) => d,
            None => continue,
        };

        println!("\n{} (#{})", detail.title, detail.id);
        for item in &detail.items {
            let mark = if item.purchased { "x" } else { " " };
            let price = match item.price {
                Some(p) => format!("{}/{}", format_brl(p), item.price_unit),
                None => "-".to_string(),
            };
            let total = item.line_total_display.as_deref().unwrap_or("-");
            println!(
                "  [{}] {:<24} {:>8} {:<2} {:>16} {:>14}",
                mark, item.name, item.quantity, item.unit, price, total
            );
        }
        println!(
            "  {} items, {} pending, total {}",
            detail.totals.item_count, detail.totals.pending_count, detail.total_display
        );
        grand_total += detail.totals.total_amount;
    }

    println!("\nGrand total: {}", format_brl(grand_total));
    Ok(())
}

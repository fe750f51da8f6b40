use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, MoneyCents, TransferCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "ledger_admin")]
#[command(about = "Admin utilities for the budget ledger (schema, seeding, audits)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./ledger.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Recompute balances from expenses and report drift.
    Verify,
    Category(Category),
    /// Move planned budget between two categories.
    Transfer(TransferArgs),
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create(CategoryCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct CategoryCreateArgs {
    #[arg(long)]
    name: String,
    /// Decimal amount, e.g. `1500` or `12.50`.
    #[arg(long, default_value = "0")]
    budget: MoneyCents,
}

#[derive(Args, Debug)]
struct TransferArgs {
    #[arg(long)]
    from: Uuid,
    #[arg(long)]
    to: Uuid,
    /// Decimal amount, e.g. `100` or `0.99`.
    #[arg(long)]
    amount: MoneyCents,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    if matches!(cli.command, Command::Migrate) {
        println!("schema up to date: {}", cli.database_url);
        return Ok(());
    }
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Migrate => {}
        Command::Verify => {
            let report = engine.verify_balances().await?;
            println!("checked {} categories", report.categories_checked);
            for issue in &report.issues {
                println!(
                    "{} ({}): planned {} remaining {} actual {} ledger {}",
                    issue.category.name,
                    issue.category.id,
                    issue.category.planned_budget,
                    issue.category.remaining_balance,
                    issue.category.actual_balance,
                    issue.ledger_total
                );
            }
            for expense_id in &report.orphaned_expenses {
                println!("orphaned expense: {expense_id}");
            }
            if !report.is_clean() {
                eprintln!("ledger has inconsistencies");
                std::process::exit(1);
            }
            println!("ledger is consistent");
        }
        Command::Category(Category {
            command: CategoryCommand::Create(args),
        }) => {
            let category = engine.create_category(&args.name, args.budget).await?;
            println!(
                "created category: {} ({}) budget {}",
                category.name, category.id, category.planned_budget
            );
        }
        Command::Category(Category {
            command: CategoryCommand::List,
        }) => {
            for category in engine.list_categories().await? {
                println!(
                    "{}\t{}\tplanned {}\tremaining {}\tactual {}",
                    category.id,
                    category.name,
                    category.planned_budget,
                    category.remaining_balance,
                    category.actual_balance
                );
            }
        }
        Command::Transfer(args) => {
            let outcome = engine
                .transfer(TransferCmd::new(args.from, args.to, args.amount))
                .await?;
            println!(
                "transferred {} from {} to {}",
                outcome.amount, outcome.from_category.name, outcome.to_category.name
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_budget() {
        let cli = Cli::try_parse_from([
            "ledger_admin",
            "category",
            "create",
            "--name",
            "Rent",
            "--budget",
            "1500.50",
        ])
        .unwrap();
        let Command::Category(Category {
            command: CategoryCommand::Create(args),
        }) = cli.command
        else {
            panic!("unexpected command: {:?}", cli.command);
        };
        assert_eq!(args.name, "Rent");
        assert_eq!(args.budget, MoneyCents::new(150_050));
    }

    #[test]
    fn transfer_requires_valid_ids() {
        let err = Cli::try_parse_from([
            "ledger_admin",
            "transfer",
            "--from",
            "rent",
            "--to",
            "food",
            "--amount",
            "10",
        ]);
        assert!(err.is_err());
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pgwhere::db::{
    create_client, load_table_schema, ColumnDetails, SavedConnections, TableSchema,
};
use pgwhere::filter::{FilterDocument, PgQuoter, Predicate};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Render a filter document into a PostgreSQL WHERE clause and its cache checksum
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Filter document (TOML)
    file: PathBuf,

    /// Resolve columns from a saved connection instead of the document's column list
    #[arg(long = "connect")]
    connect: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Rendered<'a> {
    schema: &'a str,
    table: &'a str,
    sql: String,
    checksum: String,
    cache_key: String,
    predicates: &'a [Predicate],
    columns: &'a [ColumnDetails],
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let document = FilterDocument::load(&cli.file)?;
    let clause = document.to_clause()?;

    let schema = match cli.connect {
        Some(ref name) => remote_schema(name, &document).await?,
        None => document.offline_schema().with_context(|| {
            format!(
                "{} has predicates but no columns; list them or use --connect",
                cli.file.display()
            )
        })?,
    };

    let sql = clause.render(&PgQuoter, &schema)?;
    let checksum = clause.checksum();
    let cache_key = clause.cache_key(schema.qualified_name());

    if cli.json {
        let rendered = Rendered {
            schema: schema.schema(),
            table: schema.table(),
            sql,
            checksum,
            cache_key,
            predicates: clause.predicates(),
            columns: schema.columns(),
        };
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        println!("{}", sql.trim_start());
        println!("-- checksum: {}", checksum);
    }

    Ok(())
}

/// Connect with a saved connection and load the document's table columns.
async fn remote_schema(name: &str, document: &FilterDocument) -> Result<TableSchema> {
    let saved = SavedConnections::load()?;
    let mut config = match saved.find(name) {
        Some(c) => c.clone(),
        None => {
            let known = saved.names().join(", ");
            anyhow::bail!("No saved connection named {:?} (saved: {})", name, known);
        }
    };
    config.resolve_password()?;

    let client = create_client(&config).await?;
    load_table_schema(&client, &document.schema, &document.table).await
}

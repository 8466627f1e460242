use facet::Facet;
use figue as args;
use schemadrift::{
    Introspect, PgIntrospector, Reporter, SchemaComparer, SchemaProvider, TracedClient,
};
use schemadrift_config::Connection;
use std::io::Write;
use tokio_postgres::NoTls;
use tracing_subscriber::EnvFilter;

mod config;

/// Compare the schemas of two Postgres databases.
#[derive(Facet, Debug)]
struct Cli {
    /// Show version information
    #[facet(args::named, args::short = 'V')]
    version: bool,

    /// Database connections configuration file (default: dbconf)
    #[facet(default, args::named, args::short = 'c')]
    config: Option<String>,

    /// Table to inspect; omit to check table presence only
    #[facet(default, args::positional)]
    table: Option<String>,
}

const DEFAULT_CONFIG: &str = "dbconf";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = args
        .first()
        .cloned()
        .unwrap_or_else(|| "schemadrift".to_string());
    let args_ref: Vec<&str> = args.iter().skip(1).map(|s| s.as_str()).collect();

    let cli: Cli = match args::from_slice(&args_ref) {
        Ok(cli) => cli,
        Err(err) if err.is_help_request() => {
            print!("{}", err.help_text().unwrap_or(""));
            return;
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    if cli.version {
        println!("schemadrift {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    init_tracing();

    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG);
    let config = match config::load(config_path) {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "loaded configuration");
            config
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = run(&config, cli.table.as_deref(), &program).await {
        tracing::error!(error = %err, "schema comparison failed");
        eprintln!("Error: {}", err);
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = std::error::Error::source(cause);
        }
        std::process::exit(2);
    }
}

/// Log to stderr so the report on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(
    config: &config::Config,
    table: Option<&str>,
    program: &str,
) -> schemadrift::Result<()> {
    let comparer = SchemaComparer::new(
        connect("DATABASE_A", &config.database_a).await?,
        connect("DATABASE_B", &config.database_b).await?,
    );

    let mut reporter = Reporter::new(std::io::stdout().lock());
    render(&comparer, table, program, &mut reporter).await?;
    reporter.into_inner().flush()?;
    Ok(())
}

/// Write the table details for `table`, or the table presence check
/// followed by a usage hint when no table is given.
///
/// A table missing from either database is reported inline; only fatal
/// errors are returned.
async fn render<S: Introspect, W: Write>(
    comparer: &SchemaComparer<S>,
    table: Option<&str>,
    program: &str,
    reporter: &mut Reporter<W>,
) -> schemadrift::Result<()> {
    match table {
        Some(table) => {
            reporter.blank_line()?;
            reporter.line(format_args!("Inspecting table {table}..."))?;
            reporter.blank_line()?;

            match comparer.compare_table(table).await {
                Ok(reports) => {
                    for report in &reports {
                        reporter.report(report)?;
                        reporter.blank_line()?;
                    }
                }
                Err(err) if !err.is_fatal() => {
                    reporter.error(&err)?;
                    reporter.blank_line()?;
                }
                Err(err) => return Err(err),
            }
        }
        None => {
            let report = comparer.compare_tables().await?;

            reporter.blank_line()?;
            reporter.report(&report)?;
            reporter.blank_line()?;
            reporter.line("To compare individual table details, run:")?;
            reporter.indent();
            reporter.line(format_args!("$ {program} <tablename>"))?;
            reporter.dedent();
            reporter.blank_line()?;
        }
    }
    Ok(())
}

/// Open a connection and wrap it in a schema provider.
async fn connect(
    name: &str,
    connection: &Connection,
) -> schemadrift::Result<SchemaProvider<PgIntrospector>> {
    tracing::info!(
        database = name,
        target = %connection.display_target(),
        schema = connection.schema(),
        "connecting"
    );

    let (client, conn) = connection.to_pg_config().connect(NoTls).await?;

    // Spawn connection handler
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::error!("database connection error: {}", e);
        }
    });

    Ok(SchemaProvider::new(PgIntrospector::new(
        TracedClient::new(client),
        connection.schema(),
    )))
}

use clap::Parser;
use igscript::{
    expansion::format_rows, expand_statement, DecoderConfig, Error, SharedInheritance,
    StatementParser,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Decodes IG Script statements into atomic rows", long_about = None)]
struct Cli {
    /// IG Script statement; read from --file when omitted
    statement: Option<String>,

    /// File holding the statement
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a JSON decoder config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep separate occurrences of a component in separate columns
    #[arg(long)]
    separate: bool,

    /// Include per-cell linkage in the output
    #[arg(short, long)]
    links: bool,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> Result<Value, Error> {
    let mut config = match &cli.config {
        Some(path) => DecoderConfig::from_file(path)?,
        None => DecoderConfig::default(),
    };
    if cli.separate {
        config = config.with_aggregation(false);
    }
    debug!("config: {:?}", config);

    let input = match (&cli.statement, &cli.file) {
        (Some(statement), _) => statement.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err(Error::internal("no statement or --file given")),
    };

    let parser = StatementParser::new(config.clone());
    let decoded = parser.decode(&input)?;
    info!("decoded {} statement(s)", decoded.statement_leaves().len());

    let mut statements = Vec::new();
    for leaf in decoded.statement_leaves() {
        let Some(statement) = decoded.arena.statement(leaf) else {
            continue;
        };
        let expansion = expand_statement(&decoded.arena, statement, &config)?;
        let mut entry = json!({
            "script": statement.to_script(&decoded.arena),
            "complexity": statement.complexity(&decoded.arena),
            "headers": expansion.headers(),
            "rows": expansion.render_rows(&decoded.arena, &config),
        });
        if cli.links {
            entry["links"] = links(&decoded.arena, &expansion, &config);
        }
        statements.push(entry);
    }

    Ok(json!({
        "pair_operator": decoded.arena.operator(decoded.root),
        "statements": statements,
    }))
}

fn links(
    arena: &igscript::Arena,
    expansion: &igscript::Expansion,
    config: &DecoderConfig,
) -> Value {
    let mode = SharedInheritance::Nothing;
    let mut rows = Vec::new();
    for row in 0..expansion.matrix.len() {
        let mut cells = Vec::new();
        for column in 0..expansion.matrix.width() {
            let linked: Vec<Value> = expansion
                .row_links(arena, row, column, config)
                .into_iter()
                .map(|link| {
                    json!({
                        "value": arena.leaf_value(link.leaf, mode),
                        "operators": link.operators,
                        "rows": format_rows(&link.rows),
                    })
                })
                .collect();
            cells.push(Value::Array(linked));
        }
        rows.push(Value::Array(cells));
    }
    Value::Array(rows)
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("igscript=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(output) => {
            let rendered = if cli.pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            };
            match rendered {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

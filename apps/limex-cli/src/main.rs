//! LIMEX CLI - evaluates a single expression against variable/collection
//! bindings given on the command line.

use anyhow::{bail, Context};
use clap::Parser;
use limex_core::{Expression, Handle};

#[derive(Parser, Debug)]
#[command(name = "limex", version, about = "Evaluate a LIMEX expression")]
struct Args {
    /// The expression to parse and evaluate.
    #[arg(short, long)]
    expr: String,

    /// A variable binding in `name=value` form. May be given more than once.
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,

    /// A collection binding in `name=v1,v2,...` form. May be given more than once.
    #[arg(long = "collection", value_name = "NAME=V1,V2,...")]
    collections: Vec<String>,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse();
    let handle = Handle::<f64>::default();

    let expression = Expression::parse(&args.expr, &handle).context("failed to parse expression")?;

    let var_bindings = parse_bindings(&args.vars)?;
    let collection_bindings = parse_collection_bindings(&args.collections)?;

    let variable_values = expression
        .variables()
        .iter()
        .map(|name| {
            var_bindings
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v)
                .with_context(|| format!("missing binding for variable '{name}'"))
        })
        .collect::<anyhow::Result<Vec<f64>>>()?;

    let collection_values = expression
        .collections()
        .iter()
        .map(|name| {
            collection_bindings
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .with_context(|| format!("missing binding for collection '{name}'"))
        })
        .collect::<anyhow::Result<Vec<Vec<f64>>>>()?;

    tracing::info!(
        variables = ?expression.variables(),
        collections = ?expression.collections(),
        target = ?expression.target(),
        ast = %expression.stringify(),
        "parsed expression"
    );

    let result = expression
        .evaluate(&variable_values, &collection_values)
        .context("failed to evaluate expression")?;

    if let Some(target) = expression.target() {
        println!("{target} := {result}");
    } else {
        println!("{result}");
    }

    Ok(())
}

fn parse_bindings(raw: &[String]) -> anyhow::Result<Vec<(String, f64)>> {
    raw.iter()
        .map(|entry| {
            let (name, value) = split_binding(entry)?;
            let value: f64 = value
                .parse()
                .with_context(|| format!("'{entry}' does not have a numeric value"))?;
            Ok((name.to_string(), value))
        })
        .collect()
}

fn parse_collection_bindings(raw: &[String]) -> anyhow::Result<Vec<(String, Vec<f64>)>> {
    raw.iter()
        .map(|entry| {
            let (name, value) = split_binding(entry)?;
            let values = value
                .split(',')
                .map(|v| v.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("'{entry}' does not have a numeric value list"))?;
            Ok((name.to_string(), values))
        })
        .collect()
}

fn split_binding(entry: &str) -> anyhow::Result<(&str, &str)> {
    match entry.split_once('=') {
        Some((name, value)) => Ok((name, value)),
        None => bail!("'{entry}' is not in NAME=VALUE form"),
    }
}

//! Save Now, Earn Later CLI
//!
//! Command-line interface for running growth projections and searching the item catalog

use anyhow::{bail, Context};
use clap::Parser;
use save_now_earn_later::catalog::load_catalog;
use save_now_earn_later::{AppConfig, Frequency, ProjectionEngine, RecurringExpense};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "save_now_earn_later",
    version,
    about = "What your everyday purchases could be worth if invested"
)]
struct Cli {
    /// Price per purchase
    #[arg(long, required_unless_present = "search")]
    price: Option<f64>,

    /// Purchase frequency: daily, weekly, monthly or yearly
    #[arg(long, conflicts_with = "frequency_days")]
    frequency: Option<String>,

    /// Days between purchases (alternative to --frequency)
    #[arg(long)]
    frequency_days: Option<f64>,

    /// Assumed annual return (defaults to the configured value, 0.10)
    #[arg(long, allow_hyphen_values = true)]
    annual_return: Option<f64>,

    /// Years to project
    #[arg(long)]
    years: Option<u32>,

    /// Milestone years to summarise, comma separated
    #[arg(long, value_delimiter = ',')]
    milestones: Option<Vec<u32>>,

    /// Write the full yearly series to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Search the catalog instead of projecting
    #[arg(long)]
    search: Option<String>,

    /// Catalog CSV used by --search
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(years) = cli.years {
        config.projection.max_years = years;
    }
    if let Some(milestones) = cli.milestones.clone() {
        config.projection.milestone_years = milestones;
    }
    if let Some(catalog) = cli.catalog.clone() {
        config.catalog_path = catalog;
    }
    config.validate()?;

    if let Some(query) = &cli.search {
        return search(&config, query);
    }

    let price = cli.price.context("--price is required")?;
    let frequency = frequency_from_args(cli.frequency.as_deref(), cli.frequency_days)?;

    let rate = cli.annual_return.unwrap_or(config.default_annual_return);
    let expense = RecurringExpense::new(price, frequency).with_annual_return(rate);

    let engine = ProjectionEngine::new(config.projection.clone());
    let result = engine.project(&expense)?;

    println!("Save Now, Earn Later");
    println!("====================\n");
    println!("  ${:.2} {} = ${:.2} per year", price, frequency, result.annual_amount);
    println!("  Assumed annual return: {:.2}%", rate * 100.0);
    println!();

    println!("{:>5} {:>16} {:>16} {:>16}", "Year", "Value", "Contributed", "Returns");
    println!("{}", "-".repeat(56));
    for point in result.rounded_series() {
        println!(
            "{:>5} {:>16.0} {:>16.0} {:>16.0}",
            point.year, point.projected_value, point.total_contributed, point.total_returns
        );
    }

    println!("\nMilestones:");
    for milestone in result.rounded_milestones() {
        println!(
            "  {:>2} years: ${:.0} from ${:.0} contributed ({:+}% return)",
            milestone.year,
            milestone.projected_value,
            milestone.total_contributed,
            milestone.return_percentage
        );
    }

    if let Some(path) = &cli.csv {
        let mut file = File::create(path)
            .with_context(|| format!("Unable to create CSV file {}", path.display()))?;

        writeln!(file, "Year,ProjectedValue,TotalContributed,TotalReturns")?;
        for point in &result.series {
            writeln!(
                file,
                "{},{:.2},{:.2},{:.2}",
                point.year, point.projected_value, point.total_contributed, point.total_returns
            )?;
        }

        println!("\nFull series written to: {}", path.display());
    }

    Ok(())
}

/// Purchase frequency from `--frequency` or `--frequency-days`; one is required
fn frequency_from_args(keyword: Option<&str>, days: Option<f64>) -> anyhow::Result<Frequency> {
    match (keyword, days) {
        (Some(keyword), _) => keyword.parse::<Frequency>().map_err(anyhow::Error::msg),
        (None, Some(days)) if days.is_finite() && days > 0.0 => Ok(Frequency::EveryDays(days)),
        (None, Some(_)) => bail!("--frequency-days must be positive"),
        (None, None) => bail!("--frequency or --frequency-days is required"),
    }
}

fn search(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let catalog = load_catalog(&config.catalog_path)
        .with_context(|| format!("Failed to load catalog {}", config.catalog_path.display()))?;

    let items = catalog.search(query, config.search_limit);
    if items.is_empty() {
        println!("No items match {:?}", query);
        return Ok(());
    }

    println!("{:>4}  {:<28} {:<16} {:>10}", "Id", "Name", "Category", "Price");
    println!("{}", "-".repeat(62));
    for item in items {
        println!(
            "{:>4}  {:<28} {:<16} {:>10.2}",
            item.id,
            item.name,
            item.category.as_deref().unwrap_or("-"),
            item.unit_price
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_is_required() {
        let err = frequency_from_args(None, None).unwrap_err();
        assert!(err.to_string().contains("--frequency"));
    }

    #[test]
    fn test_frequency_from_args() {
        assert_eq!(frequency_from_args(Some("weekly"), None).unwrap(), Frequency::Weekly);
        assert_eq!(
            frequency_from_args(None, Some(7.0)).unwrap(),
            Frequency::EveryDays(7.0)
        );
        assert!(frequency_from_args(Some("hourly"), None).is_err());
        assert!(frequency_from_args(None, Some(0.0)).is_err());
        assert!(frequency_from_args(None, Some(f64::NAN)).is_err());
    }
}

use super::ui;
use crate::core::{RateProvider, RateTable, RatesQuery};
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Renders `rates` relative to `base` as a table.
pub fn display_as_table(base: &str, rates: &RateTable) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (1 {base})")),
    ]);

    for (code, rate) in rates {
        table.add_row(vec![Cell::new(code), ui::rate_cell(*rate)]);
    }

    let mut output = format!(
        "Exchange rates: {}\n\n",
        ui::style_text(base, ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    if rates.is_empty() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text("None of the requested currencies are known", ui::StyleType::Subtle)
        ));
    }
    output
}

pub async fn run(provider: &dyn RateProvider, query: &RatesQuery) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {} rates...", query.base))?;
    let table = provider.fetch_rates(&query.base).await;
    pb.finish_and_clear();

    let table = table.context("Failed to fetch exchange rates")?;
    println!("{}", display_as_table(&query.base, &query.select(&table)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_each_rate() {
        let rates = RateTable::from([("EUR".to_string(), 0.9215), ("GBP".to_string(), 0.79)]);
        let output = display_as_table("USD", &rates);
        assert!(output.contains("USD"));
        assert!(output.contains("EUR"));
        assert!(output.contains("0.9215"));
        assert!(output.contains("0.7900"));
        assert!(!output.contains("None of the requested"));
    }

    #[test]
    fn test_display_notes_empty_selection() {
        let output = display_as_table("USD", &RateTable::new());
        assert!(output.contains("None of the requested currencies are known"));
    }
}

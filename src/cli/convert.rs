use super::ui;
use crate::core::{ConversionRequest, ConversionResult, RateProvider};
use anyhow::{Context, Result};

pub fn display_result(result: &ConversionResult) -> String {
    format!(
        "{} {} = {} {}",
        result.original_amount,
        ui::style_text(&result.from_currency, ui::StyleType::TotalLabel),
        ui::style_text(&format!("{:.2}", result.converted_amount), ui::StyleType::TotalValue),
        ui::style_text(&result.to_currency, ui::StyleType::TotalLabel),
    )
}

pub async fn run(provider: &dyn RateProvider, amount: f64, from: &str, to: &str) -> Result<()> {
    let request = ConversionRequest::new(amount, from, to)?;

    let pb = ui::new_spinner(&format!("Fetching {} rates...", request.from_currency))?;
    let result = request.execute(provider).await;
    pb.finish_and_clear();

    let result = result.with_context(|| {
        format!(
            "Conversion from {} to {} not possible",
            request.from_currency, request.to_currency
        )
    })?;
    println!("{}", display_result(&result));
    Ok(())
}

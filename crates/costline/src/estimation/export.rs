//! Flat CSV rendering of an estimate's line items.

use serde::Serialize;

use super::engine::ProjectPayload;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer could not be flushed: {0}")]
    Buffer(String),
    #[error("csv output was not utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    section: &'static str,
    trade: &'a str,
    item: &'a str,
    quantity: Option<f64>,
    unit: &'a str,
    unit_cost: Option<f64>,
    total_cost: f64,
    category: &'a str,
}

impl<'a> ExportRow<'a> {
    fn total(item: &'a str, total_cost: f64) -> Self {
        Self {
            section: "totals",
            trade: "",
            item,
            quantity: None,
            unit: "",
            unit_cost: None,
            total_cost,
            category: "",
        }
    }
}

/// Scope systems, then calculator line items, then the totals block.
pub fn to_csv(payload: &ProjectPayload) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for scope in &payload.scope_items {
        for system in &scope.systems {
            writer.serialize(ExportRow {
                section: "scope",
                trade: scope.trade.key(),
                item: &system.item.name,
                quantity: Some(system.item.quantity),
                unit: system.item.unit.code(),
                unit_cost: Some(system.item.unit_cost),
                total_cost: system.item.total_cost,
                category: &system.item.category,
            })?;
        }
    }

    for result in &payload.trade_breakdowns {
        for item in &result.line_items {
            writer.serialize(ExportRow {
                section: "line_item",
                trade: result.trade.key(),
                item: &item.name,
                quantity: Some(item.quantity),
                unit: item.unit.code(),
                unit_cost: Some(item.unit_cost),
                total_cost: item.total_cost,
                category: &item.category,
            })?;
        }
    }

    let totals = &payload.totals;
    writer.serialize(ExportRow::total("Subtotal", totals.subtotal))?;
    writer.serialize(ExportRow::total("Contingency", totals.contingency_amount))?;
    writer.serialize(ExportRow::total("Total Project Cost", totals.total_project_cost))?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExportError::Buffer(error.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

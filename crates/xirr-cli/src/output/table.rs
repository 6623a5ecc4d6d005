use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables: headline figures, the cash-flow schedule, the
/// summary, then warnings and methodology from the envelope.
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", value);
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => print_result(result),
        _ => println!("{}", field_table(envelope)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_result(result: &Map<String, Value>) {
    let scalars: Map<String, Value> = result
        .iter()
        .filter(|(_, v)| !v.is_array() && !v.is_object())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    println!("{}", field_table(&scalars));

    if let Some(Value::Array(flows)) = result.get("cashflows") {
        println!("\nCash flows:");
        println!("{}", cashflow_table(flows));
    }

    if let Some(Value::Object(summary)) = result.get("summary") {
        println!("\nSummary:");
        println!("{}", field_table(summary));
    }
}

fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    builder.build()
}

fn cashflow_table(flows: &[Value]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Date", "Amount", "Kind"]);
    for flow in flows {
        let amount = format_value(&flow["amount"]);
        let kind = if amount.starts_with('-') {
            "contribution"
        } else {
            "inflow"
        };
        builder.push_record([format_value(&flow["date"]), amount, kind.to_string()]);
    }
    builder.build()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cashflow_table_marks_contributions() {
        let flows = vec![
            json!({"date": "2023-01-01", "amount": "-100000"}),
            json!({"date": "2024-01-01", "amount": "158000"}),
        ];
        let rendered = cashflow_table(&flows).to_string();
        assert!(rendered.contains("contribution"));
        assert!(rendered.contains("inflow"));
        assert!(rendered.contains("2024-01-01"));
    }
}

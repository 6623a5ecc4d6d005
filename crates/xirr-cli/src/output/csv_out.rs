use serde_json::Value;
use std::io::{self, Write};

/// Write output as CSV to stdout.
///
/// A result carrying `cashflows` is written as one `date,amount` row per
/// flow followed by the scalar figures; anything else as `field,value`.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(value, stdout.lock()) {
        log::error!("CSV output failed: {}", e);
    }
}

fn write_csv<W: Write>(value: &Value, out: W) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(out);

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            if let Some(Value::Array(flows)) = map.get("cashflows") {
                wtr.write_record(["date", "amount"])?;
                for flow in flows {
                    wtr.write_record([
                        format_csv_value(&flow["date"]),
                        format_csv_value(&flow["amount"]),
                    ])?;
                }
            }

            wtr.write_record(["field", "value"])?;
            for (key, val) in map {
                match val {
                    Value::Array(_) => continue,
                    Value::Object(inner) => {
                        for (k, v) in inner {
                            wtr.write_record([format!("{key}.{k}"), format_csv_value(v)])?;
                        }
                    }
                    _ => wtr.write_record([key.clone(), format_csv_value(val)])?,
                }
            }
        }
        _ => wtr.write_record([format_csv_value(result)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flows_then_fields() {
        let v = json!({
            "result": {
                "xirr": 0.58,
                "cashflows": [
                    {"date": "2023-01-01", "amount": "-100000"},
                    {"date": "2024-01-01", "amount": "158000"}
                ],
                "summary": {"net_profit": "58000"}
            }
        });
        let mut buf = Vec::new();
        write_csv(&v, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("date,amount\n2023-01-01,-100000\n2024-01-01,158000\n"));
        assert!(text.contains("summary.net_profit,58000"));
        assert!(text.contains("xirr,0.58"));
    }
}

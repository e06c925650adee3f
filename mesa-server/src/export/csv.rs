//! Customer CSV rendering
//!
//! Spreadsheet-friendly output: UTF-8 BOM for Excel, every field quoted,
//! columns `Name`, `Phone Number`, `City`. Records without a phone number
//! are useless to the marketing list and are skipped.

use crate::db::models::CustomerData;

const BOM: &str = "\u{feff}";
const HEADER: &str = "\"Name\",\"Phone Number\",\"City\"";

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render customer records as CSV, keeping only rows with a phone number
pub fn customers_to_csv(customers: &[CustomerData]) -> String {
    let mut out = String::from(BOM);
    out.push_str(HEADER);
    out.push_str("\r\n");

    for customer in customers {
        let phone = match customer.phone.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => continue,
        };
        out.push_str(&quote(customer.name.as_deref().unwrap_or("")));
        out.push(',');
        out.push_str(&quote(phone));
        out.push(',');
        out.push_str(&quote(customer.city.as_deref().unwrap_or("")));
        out.push_str("\r\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::CustomerSource;
    use surrealdb::RecordId;

    fn customer(name: Option<&str>, phone: Option<&str>, city: Option<&str>) -> CustomerData {
        CustomerData {
            id: None,
            order: RecordId::from_table_key("order", "o1"),
            name: name.map(str::to_string),
            phone: phone.map(str::to_string),
            city: city.map(str::to_string),
            payment_method: Some("CASH".to_string()),
            source: CustomerSource::Staff,
            collected_at: 0,
        }
    }

    #[test]
    fn test_starts_with_bom_and_header() {
        let csv = customers_to_csv(&[]);
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv.contains("\"Name\",\"Phone Number\",\"City\""));
    }

    #[test]
    fn test_skips_rows_without_phone() {
        let rows = vec![
            customer(Some("Asha"), Some("9876543210"), Some("Pune")),
            customer(Some("NoPhone"), None, Some("Mumbai")),
            customer(Some("Blank"), Some("  "), None),
        ];
        let csv = customers_to_csv(&rows);

        assert!(csv.contains("\"Asha\",\"9876543210\",\"Pune\""));
        assert!(!csv.contains("NoPhone"));
        assert!(!csv.contains("Blank"));
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let rows = vec![customer(None, Some("12345"), None)];
        let csv = customers_to_csv(&rows);
        assert!(csv.contains("\"\",\"12345\",\"\""));
    }

    #[test]
    fn test_quotes_are_escaped() {
        let rows = vec![customer(Some("A \"J\" Rao"), Some("12345"), Some("Delhi"))];
        let csv = customers_to_csv(&rows);
        assert!(csv.contains("\"A \"\"J\"\" Rao\",\"12345\",\"Delhi\""));
    }
}

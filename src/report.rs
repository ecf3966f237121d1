use crate::utils::{date_key, month_name};
use crate::LedgerView;

/// Flat exports of a computed ledger view.
#[derive(Debug, Clone)]
pub struct LedgerReport<'a> {
    view: &'a LedgerView,
}

impl<'a> LedgerReport<'a> {
    pub fn new(view: &'a LedgerView) -> Self {
        Self { view }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self.view)
    }

    pub fn daily_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(
            "Date,General Expenses,Fixed Cost,Contingency,Revenue,Regulated Revenue,Surplus,Cumulative\n",
        );

        for row in &self.view.rows {
            output.push_str(&format!(
                "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}\n",
                date_key(row.date),
                row.general_expenses,
                row.fixed_cost,
                row.contingency,
                row.revenue,
                row.regulated_revenue,
                row.surplus,
                row.cumulative_total
            ));
        }

        output
    }

    pub fn monthly_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Month,Expenses,Revenue,Net Surplus,End of Month Cumulative\n");

        for month in self.view.months.values() {
            output.push_str(&format!(
                "{},{:.2},{:.2},{:.2},{:.2}\n",
                month_name(month.month_index),
                month.total_expenses,
                month.total_revenue,
                month.net_surplus,
                month.end_of_month_cumulative
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# Controle Efetivo {} - {}\n\n",
            self.view.year, self.view.selector
        ));

        output.push_str("| Mês | Despesas | Receitas | Saldo | Acumulado |\n");
        output.push_str("|---|---:|---:|---:|---:|\n");
        for month in self.view.months.values() {
            output.push_str(&format!(
                "| {} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
                month_name(month.month_index),
                month.total_expenses,
                month.total_revenue,
                month.net_surplus,
                month.end_of_month_cumulative
            ));
        }

        let totals = self.view.year_totals();
        output.push_str(&format!(
            "| **Total** | {:.2} | {:.2} | {:.2} | {:.2} |\n",
            totals.total_expenses,
            totals.total_revenue,
            totals.net_surplus,
            totals.closing_cumulative
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_ledger, AccountSelector, DailyLedgerRecord};

    fn view() -> LedgerView {
        let records = vec![DailyLedgerRecord {
            date: "2023-03-31".to_string(),
            account_id: Some("A1".to_string()),
            general_expenses: 40.0,
            fixed_cost: 10.0,
            contingency: 0.0,
            revenue: 200.0,
            regulated_revenue: 0.0,
            daily_surplus: 150.0,
            cumulative_surplus: 150.0,
        }];
        compute_ledger(2023, &AccountSelector::Account("A1".to_string()), &records).unwrap()
    }

    #[test]
    fn test_daily_csv_has_a_line_per_day() {
        let view = view();
        let csv = LedgerReport::new(&view).daily_csv();

        assert_eq!(csv.lines().count(), 366);
        assert!(csv.contains("2023-03-31,40.00,10.00,0.00,200.00,0.00,150.00,150.00"));

        let mut reader = ::csv::Reader::from_reader(csv.as_bytes());
        assert_eq!(reader.records().count(), 365);
    }

    #[test]
    fn test_monthly_csv() {
        let view = view();
        let csv = LedgerReport::new(&view).monthly_csv();

        assert!(csv.starts_with("Month,Expenses"));
        assert!(csv.contains("Março,50.00,200.00,150.00,150.00"));
        assert_eq!(csv.lines().count(), 13);
    }

    #[test]
    fn test_markdown_summary() {
        let view = view();
        let markdown = LedgerReport::new(&view).to_markdown();

        assert!(markdown.contains("# Controle Efetivo 2023 - A1"));
        assert!(markdown.contains("| Março | 50.00 | 200.00 | 150.00 | 150.00 |"));
        // December 31 has no record, so the closing cumulative is zero-filled.
        assert!(markdown.contains("| **Total** | 50.00 | 200.00 | 150.00 | 0.00 |"));
    }
}

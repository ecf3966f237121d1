use cash_ledger_builder::*;

fn main() {
    let payload = r#"[
        {"date": "2024-01-15", "accountId": "A1", "revenue": 2500, "generalExpenses": 800,
         "dailySurplus": 1700, "cumulativeSurplus": 1700},
        {"date": "2024-01-31T00:00:00.000Z", "accountId": "A1", "fixedCost": "1200.00",
         "dailySurplus": -1200, "cumulativeSurplus": 500},
        {"date": "2024-02-29", "accountId": "A1", "regulatedRevenue": 950, "contingency": 150,
         "dailySurplus": 800, "cumulativeSurplus": 1300}
    ]"#;

    let records = parse_ledger_payload(payload).unwrap();
    let selector = AccountSelector::Account("A1".to_string());
    let view = compute_ledger(2024, &selector, &records).unwrap();

    println!(
        "Ledger {} / {}: {} days, {} with activity\n",
        view.year,
        view.selector,
        view.rows.len(),
        view.recorded_days()
    );

    println!("{}", LedgerReport::new(&view).to_markdown());

    let verification = inspect_rows(&view.rows, 0.01);
    if verification.is_clean() {
        println!("Server figures are internally consistent.");
    } else {
        for warning in verification.warnings {
            println!("warning: {}", warning);
        }
    }
}

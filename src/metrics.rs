// Derived financial ratios. Each column is computed only when its source
// columns are present; growth follows the table's current row order.
use crate::types::{FeatureTable, Table};
use tracing::{debug, info, warn};

/// Never fails: a source column that is absent or not numeric simply leaves
/// its dependent columns out.
pub fn extract(clean: &Table) -> FeatureTable {
    let source = |name: &str| match clean.numbers(name) {
        Ok(values) => values,
        Err(e) => {
            warn!(column = name, error = %e, "source column unusable, skipping dependent metrics");
            None
        }
    };
    let revenue = source("revenue");
    let net_profit = source("net_profit");
    let investment = source("investment_cost");
    let opex = source("operating_expense");
    let cogs = source("cogs");

    let profit_margin = match (&net_profit, &revenue) {
        (Some(p), Some(r)) => Some(ratio_percent(p, r)),
        _ => None,
    };
    let roi = match (&net_profit, &investment) {
        (Some(p), Some(i)) => Some(ratio_percent(p, i)),
        _ => None,
    };
    let revenue_growth = revenue.as_deref().map(pct_change);
    let profit_growth = net_profit.as_deref().map(pct_change);
    let bep = match (&opex, &revenue, &cogs) {
        (Some(o), Some(r), Some(c)) => Some(break_even(o, r, c)),
        _ => None,
    };

    let features = FeatureTable {
        records: clean.clone(),
        profit_margin,
        roi,
        revenue_growth,
        profit_growth,
        bep,
    };
    info!(
        rows = features.len(),
        derived = ?features.derived_columns(),
        "extracted features"
    );
    features
}

fn ratio_percent(num: &[f64], den: &[f64]) -> Vec<f64> {
    num.iter().zip(den).map(|(n, d)| n / d * 100.0).collect()
}

/// Percent change against the previous row; the first row has no prior value.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for (i, v) in values.iter().enumerate() {
        if i == 0 {
            out.push(None);
        } else {
            let prev = values[i - 1];
            out.push(Some((v - prev) / prev * 100.0));
        }
    }
    out
}

/// Operating expense over contribution margin, 0 when revenue equals cogs.
fn break_even(opex: &[f64], revenue: &[f64], cogs: &[f64]) -> Vec<f64> {
    opex.iter()
        .zip(revenue.iter().zip(cogs))
        .map(|(o, (r, c))| {
            let margin = r - c;
            if margin == 0.0 {
                debug!(opex = o, "zero contribution margin, BEP set to 0");
                0.0
            } else {
                o / margin
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use approx::assert_relative_eq;

    fn numeric_table(cols: &[(&str, &[f64])]) -> Table {
        let n = cols.first().map(|(_, v)| v.len()).unwrap_or(0);
        let rows = (0..n)
            .map(|i| cols.iter().map(|(_, v)| Cell::Number(v[i])).collect())
            .collect();
        Table::new(cols.iter().map(|(c, _)| c.to_string()).collect(), rows)
    }

    #[test]
    fn margin_and_growth() {
        let t = numeric_table(&[("revenue", &[100.0, 200.0]), ("net_profit", &[-10.0, 20.0])]);
        let f = extract(&t);
        let margin = f.profit_margin.unwrap();
        assert_relative_eq!(margin[0], -10.0);
        assert_relative_eq!(margin[1], 10.0);
        let growth = f.revenue_growth.unwrap();
        assert_eq!(growth[0], None);
        assert_relative_eq!(growth[1].unwrap(), 100.0);
        assert_relative_eq!(f.profit_growth.unwrap()[1].unwrap(), -300.0);
        assert!(f.roi.is_none());
        assert!(f.bep.is_none());
    }

    #[test]
    fn bep_zero_margin_falls_back_to_zero() {
        let t = numeric_table(&[
            ("operating_expense", &[50.0, 30.0]),
            ("revenue", &[50.0, 100.0]),
            ("cogs", &[50.0, 40.0]),
        ]);
        let bep = extract(&t).bep.unwrap();
        assert_eq!(bep[0], 0.0);
        assert_relative_eq!(bep[1], 0.5);
    }

    #[test]
    fn roi_uses_investment_cost() {
        let t = numeric_table(&[("net_profit", &[25.0]), ("investment_cost", &[200.0])]);
        let f = extract(&t);
        assert_relative_eq!(f.roi.unwrap()[0], 12.5);
        assert!(f.profit_margin.is_none());
    }

    #[test]
    fn growth_follows_row_order_not_dates() {
        assert_eq!(pct_change(&[200.0, 100.0]), vec![None, Some(-50.0)]);
        assert_eq!(pct_change(&[]), Vec::<Option<f64>>::new());
    }

    #[test]
    fn non_numeric_source_is_treated_as_absent() {
        let t = Table::new(
            vec!["revenue".into(), "net_profit".into()],
            vec![vec![Cell::Text("n/a".into()), Cell::Number(1.0)]],
        );
        let f = extract(&t);
        assert!(f.profit_margin.is_none());
        assert!(f.revenue_growth.is_none());
        assert_eq!(f.profit_growth, Some(vec![None]));
    }

    #[test]
    fn input_table_is_not_modified() {
        let t = numeric_table(&[("revenue", &[1.0, 2.0])]);
        let before = t.clone();
        let f = extract(&t);
        assert_eq!(t, before);
        assert_eq!(f.records, before);
    }
}

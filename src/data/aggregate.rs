use std::collections::{BTreeMap, HashSet};

use super::model::{Dataset, Quarter, YearMonth};

// ---------------------------------------------------------------------------
// Aggregate results
// ---------------------------------------------------------------------------

/// Dense product × country table of summed totals, zero where a pair has
/// no sales.  Rows and columns are sorted ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossTab {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `values[row][column]`
    pub values: Vec<Vec<f64>>,
}

impl CrossTab {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|v| v == row)?;
        let c = self.columns.iter().position(|v| v == column)?;
        Some(self.values[r][c])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Summary metrics and groupings of one (filtered) dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    /// Sum of monetary totals.
    pub total: f64,
    /// Sum of quantities.
    pub quantity: f64,
    /// Number of distinct customer ids.
    pub customers: usize,
    /// Totals per calendar month, ascending.
    pub by_month: Vec<(YearMonth, f64)>,
    /// Quantities per product, ascending by name.
    pub by_product: Vec<(String, f64)>,
    /// Totals per country, ascending by name.
    pub by_country: Vec<(String, f64)>,
    pub by_product_country: CrossTab,
    /// Totals per calendar quarter, ascending, gaps filled with zero.
    pub by_quarter: Vec<(Quarter, f64)>,
}

/// Compute every metric and grouping over the dataset.
///
/// Groups are keyed by exact (case-sensitive) equality.  Each sum adds its
/// values in sorted order, so the result is bit-identical for any row order.
pub fn aggregate(dataset: &Dataset) -> AggregateResult {
    let records = dataset.records();

    let mut totals = Vec::with_capacity(records.len());
    let mut quantities = Vec::with_capacity(records.len());
    let mut customers: HashSet<&str> = HashSet::new();
    let mut by_month: BTreeMap<YearMonth, Vec<f64>> = BTreeMap::new();
    let mut by_product: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut by_country: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut by_pair: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    let mut by_quarter: BTreeMap<Quarter, Vec<f64>> = BTreeMap::new();

    for r in records {
        totals.push(r.total);
        quantities.push(r.quantity);
        customers.insert(r.customer_id.as_str());
        by_month.entry(r.year_month).or_default().push(r.total);
        by_product.entry(r.product.as_str()).or_default().push(r.quantity);
        by_country.entry(r.country.as_str()).or_default().push(r.total);
        by_pair
            .entry((r.product.as_str(), r.country.as_str()))
            .or_default()
            .push(r.total);
        by_quarter.entry(r.quarter()).or_default().push(r.total);
    }

    let cross_tab = {
        let rows: Vec<String> = by_product.keys().map(|k| k.to_string()).collect();
        let columns: Vec<String> = by_country.keys().map(|k| k.to_string()).collect();
        let mut sums: BTreeMap<(&str, &str), f64> = by_pair
            .into_iter()
            .map(|(key, values)| (key, canonical_sum(values)))
            .collect();
        let values = rows
            .iter()
            .map(|p| {
                columns
                    .iter()
                    .map(|c| sums.remove(&(p.as_str(), c.as_str())).unwrap_or(0.0))
                    .collect()
            })
            .collect();
        CrossTab {
            rows,
            columns,
            values,
        }
    };

    AggregateResult {
        total: canonical_sum(totals),
        quantity: canonical_sum(quantities),
        customers: customers.len(),
        by_month: summed(by_month),
        by_product: summed(by_product)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        by_country: summed(by_country)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        by_product_country: cross_tab,
        by_quarter: fill_quarters(summed(by_quarter)),
    }
}

fn summed<K: Ord>(groups: BTreeMap<K, Vec<f64>>) -> Vec<(K, f64)> {
    groups
        .into_iter()
        .map(|(k, values)| (k, canonical_sum(values)))
        .collect()
}

/// Sum in `total_cmp` order so the result does not depend on input order.
fn canonical_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// Insert zero entries for quarters between the first and last populated one.
fn fill_quarters(sparse: Vec<(Quarter, f64)>) -> Vec<(Quarter, f64)> {
    let (Some(&(first, _)), Some(&(last, _))) = (sparse.first(), sparse.last()) else {
        return sparse;
    };
    let mut known: BTreeMap<Quarter, f64> = sparse.into_iter().collect();
    let mut out = Vec::new();
    let mut q = first;
    while q <= last {
        out.push((q, known.remove(&q).unwrap_or(0.0)));
        q = q.next();
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::Record;

    #[allow(clippy::too_many_arguments)]
    fn rec(
        y: i32,
        m: u32,
        d: u32,
        country: &str,
        customer: &str,
        product: &str,
        qty: f64,
        total: f64,
    ) -> Record {
        let ts = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Record::new(ts, country, customer, product, qty, total)
    }

    fn sample() -> Vec<Record> {
        vec![
            rec(2024, 1, 5, "USA", "17850", "Mug", 6.0, 100.0),
            rec(2024, 2, 10, "USA", "13047", "Lamp", 1.0, 50.0),
            rec(2024, 1, 20, "France", "17850", "Mug", 2.0, 12.5),
            rec(2024, 8, 3, "France", "12583", "Candle", 10.0, 0.1),
            rec(2024, 8, 4, "Spain", "12583", "Mug", 3.0, 0.2),
        ]
    }

    #[test]
    fn empty_dataset_yields_zeros() {
        let agg = aggregate(&Dataset::default());
        assert_eq!(agg.total, 0.0);
        assert_eq!(agg.quantity, 0.0);
        assert_eq!(agg.customers, 0);
        assert!(agg.by_month.is_empty());
        assert!(agg.by_product.is_empty());
        assert!(agg.by_country.is_empty());
        assert!(agg.by_product_country.is_empty());
        assert!(agg.by_quarter.is_empty());
        assert_eq!(agg, AggregateResult::default());
    }

    #[test]
    fn headline_metrics() {
        let agg = aggregate(&sample().into_iter().collect());
        assert!((agg.total - 162.8).abs() < 1e-9);
        assert_eq!(agg.quantity, 22.0);
        assert_eq!(agg.customers, 3);
    }

    #[test]
    fn monthly_groups_are_ascending() {
        let agg = aggregate(&sample().into_iter().collect());
        let months: Vec<String> = agg.by_month.iter().map(|(m, _)| m.to_string()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-08"]);
        assert_eq!(agg.by_month[0].1, 112.5);
    }

    #[test]
    fn product_groups_sum_quantity() {
        let agg = aggregate(&sample().into_iter().collect());
        assert_eq!(
            agg.by_product,
            vec![
                ("Candle".to_string(), 10.0),
                ("Lamp".to_string(), 1.0),
                ("Mug".to_string(), 11.0),
            ]
        );
    }

    #[test]
    fn groupings_partition_the_total() {
        let agg = aggregate(&sample().into_iter().collect());
        fn sum(values: impl Iterator<Item = f64>) -> f64 {
            values.fold(0.0, |a, b| a + b)
        }

        let countries = sum(agg.by_country.iter().map(|(_, v)| *v));
        let months = sum(agg.by_month.iter().map(|(_, v)| *v));
        let quarters = sum(agg.by_quarter.iter().map(|(_, v)| *v));
        let cells = sum(agg.by_product_country.values.iter().flatten().copied());

        for part in [countries, months, quarters, cells] {
            assert!((part - agg.total).abs() < 1e-9, "{part} vs {}", agg.total);
        }
    }

    #[test]
    fn cross_tab_fills_missing_pairs_with_zero() {
        let agg = aggregate(&sample().into_iter().collect());
        let tab = &agg.by_product_country;
        assert_eq!(tab.rows, vec!["Candle", "Lamp", "Mug"]);
        assert_eq!(tab.columns, vec!["France", "Spain", "USA"]);
        assert_eq!(tab.get("Mug", "USA"), Some(100.0));
        assert_eq!(tab.get("Mug", "France"), Some(12.5));
        assert_eq!(tab.get("Lamp", "France"), Some(0.0));
        assert_eq!(tab.get("Lamp", "Narnia"), None);
        assert!(tab.values.iter().all(|row| row.len() == tab.columns.len()));
    }

    #[test]
    fn quarters_are_gap_filled() {
        let agg = aggregate(&sample().into_iter().collect());
        let labels: Vec<String> = agg.by_quarter.iter().map(|(q, _)| q.to_string()).collect();
        assert_eq!(labels, vec!["2024Q1", "2024Q2", "2024Q3"]);
        assert_eq!(agg.by_quarter[1].1, 0.0);
        assert_eq!(agg.by_quarter[0].1, 162.5);
    }

    #[test]
    fn row_order_does_not_change_any_result() {
        let forward: Dataset = sample().into_iter().collect();
        let reversed: Dataset = sample().into_iter().rev().collect();
        let mut rotated = sample();
        rotated.rotate_left(2);
        let rotated: Dataset = rotated.into_iter().collect();

        let expected = aggregate(&forward);
        assert_eq!(aggregate(&reversed), expected);
        assert_eq!(aggregate(&rotated), expected);
    }

    #[test]
    fn duplicate_labels_differing_in_case_stay_separate() {
        let ds: Dataset = vec![
            rec(2024, 1, 5, "USA", "1", "Mug", 1.0, 1.0),
            rec(2024, 1, 6, "usa", "1", "Mug", 1.0, 2.0),
            rec(2024, 1, 7, "USA", "1", "Mug", 1.0, 3.0),
        ]
        .into_iter()
        .collect();
        let agg = aggregate(&ds);
        assert_eq!(
            agg.by_country,
            vec![("USA".to_string(), 4.0), ("usa".to_string(), 2.0)]
        );
        assert_eq!(agg.customers, 1);
    }
}

use super::model::{Dataset, Metric};

// ---------------------------------------------------------------------------
// Quartile (IQR) outlier filter
// ---------------------------------------------------------------------------

/// Multiplier applied to the inter-quartile range to get the fences.
pub const IQR_FENCE: f64 = 1.5;

/// Quantile of `values` at probability `p` in `[0, 1]`.
///
/// Linear interpolation between order statistics: with the values sorted and
/// `h = (n - 1) * p`, the result is `v[⌊h⌋] + (h - ⌊h⌋) * (v[⌊h⌋ + 1] - v[⌊h⌋])`.
/// Returns `None` for an empty slice.
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Inclusive `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]` fences for `values`.
pub fn iqr_bounds(values: &[f64]) -> Option<(f64, f64)> {
    let q1 = quantile(values, 0.25)?;
    let q3 = quantile(values, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - IQR_FENCE * iqr, q3 + IQR_FENCE * iqr))
}

/// Keep the rows whose `metric` value lies inside the IQR fences.
pub fn remove_outliers(dataset: &Dataset, metric: Metric) -> Dataset {
    let values: Vec<f64> = dataset.rows().iter().map(|r| metric.value(r)).collect();
    let Some((lower, upper)) = iqr_bounds(&values) else {
        return dataset.clone();
    };

    let kept: Vec<_> = dataset
        .rows()
        .iter()
        .filter(|r| {
            let v = metric.value(r);
            v >= lower && v <= upper
        })
        .cloned()
        .collect();

    log::debug!(
        "Outlier pass on '{metric}': bounds [{lower:.3}, {upper:.3}], removed {} of {} rows",
        dataset.len() - kept.len(),
        dataset.len()
    );
    Dataset::from_validated(kept)
}

/// One round of [`remove_outliers`] over `columns` in order. Each pass works on
/// the rows left by the previous one.
pub fn clean_pass(dataset: &Dataset, columns: &[Metric]) -> Dataset {
    columns
        .iter()
        .fold(dataset.clone(), |acc, metric| remove_outliers(&acc, *metric))
}

/// Repeat [`clean_pass`] until a full round removes nothing.
///
/// A single round is not idempotent: dropping the tails moves the quartiles.
/// Running to the fixed point makes `clean(clean(d)) == clean(d)`. Terminates
/// because every extra round removes at least one row.
pub fn clean(dataset: &Dataset, columns: &[Metric]) -> Dataset {
    let mut current = clean_pass(dataset, columns);
    let mut rounds = 1;
    loop {
        let next = clean_pass(&current, columns);
        if next.len() == current.len() {
            log::debug!(
                "Outlier removal converged after {rounds} round(s): {} of {} rows kept",
                current.len(),
                dataset.len()
            );
            return current;
        }
        current = next;
        rounds += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::row;
    use crate::data::model::Continent;

    fn dataset_with_populations(pops: &[u64]) -> Dataset {
        let rows = pops
            .iter()
            .enumerate()
            .map(|(i, p)| row(&format!("C{i}"), Continent::Asia, 1952, *p, 1000.0, 50.0))
            .collect();
        Dataset::from_rows(rows).unwrap()
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        // h = 3 * 0.25 = 0.75 → 1 + 0.75 * (2 - 1)
        assert!((quantile(&v, 0.25).unwrap() - 1.75).abs() < 1e-12);
        // h = 2.25 → 3 + 0.25 * (4 - 3)
        assert!((quantile(&v, 0.75).unwrap() - 3.25).abs() < 1e-12);
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&[7.0], 0.5), Some(7.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn quantile_ignores_input_order() {
        assert_eq!(
            quantile(&[4.0, 1.0, 3.0, 2.0], 0.75),
            quantile(&[1.0, 2.0, 3.0, 4.0], 0.75)
        );
    }

    #[test]
    fn remove_outliers_drops_values_outside_fences() {
        // Q1 = 2.25, Q3 = 4.75, IQR = 2.5 → fences [-1.5, 8.5]
        let ds = dataset_with_populations(&[1, 2, 3, 4, 5, 100]);
        let (lower, upper) = iqr_bounds(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert!((lower + 1.5).abs() < 1e-12);
        assert!((upper - 8.5).abs() < 1e-12);

        let cleaned = remove_outliers(&ds, Metric::Population);
        let pops: Vec<u64> = cleaned.rows().iter().map(|r| r.population).collect();
        assert_eq!(pops, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn fence_values_are_kept() {
        // Q1 = 1, Q3 = 1 → IQR = 0 → only the value 1 survives, inclusively.
        let ds = dataset_with_populations(&[1, 1, 1, 1, 1, 9]);
        let cleaned = remove_outliers(&ds, Metric::Population);
        assert_eq!(cleaned.len(), 5);
    }

    #[test]
    fn passes_are_cumulative() {
        let mut rows = Vec::new();
        for i in 0..8 {
            rows.push(row(&format!("C{i}"), Continent::Europe, 1952, 10 + i, 1000.0 + i as f64, 60.0));
        }
        rows.push(row("BigPop", Continent::Europe, 1952, 1_000_000, 1003.0, 60.0));
        rows.push(row("RichOne", Continent::Europe, 1952, 12, 90_000.0, 60.0));
        let ds = Dataset::from_rows(rows).unwrap();

        let cleaned = clean(&ds, &[Metric::Population, Metric::GdpPerCapita]);
        let names: Vec<&str> = cleaned.rows().iter().map(|r| r.country.as_str()).collect();
        assert!(!names.contains(&"BigPop"));
        assert!(!names.contains(&"RichOne"));
        assert_eq!(cleaned.len(), 8);
    }

    #[test]
    fn single_pass_can_leave_new_outliers_behind() {
        let ds = dataset_with_populations(&[10, 11, 12, 13, 14, 30, 1000]);
        let once = clean_pass(&ds, &[Metric::Population]);
        let converged = clean(&ds, &[Metric::Population]);
        assert!(converged.len() <= once.len());
        assert_eq!(clean_pass(&converged, &[Metric::Population]), converged);
    }

    #[test]
    fn clean_never_mutates_input() {
        let ds = dataset_with_populations(&[1, 2, 3, 1000]);
        let before = ds.clone();
        let _ = clean(&ds, &Metric::ALL);
        assert_eq!(ds, before);
    }

    #[test]
    fn clean_of_empty_dataset_is_empty() {
        let ds = Dataset::from_rows(Vec::new()).unwrap();
        assert!(clean(&ds, &Metric::ALL).is_empty());
    }

    #[test]
    fn clean_is_idempotent_on_sample_table() {
        let ds = crate::data::loader::load(&crate::data::loader::DataSource::Sample).unwrap();
        let once = clean(&ds, &Metric::ALL);
        let twice = clean(&once, &Metric::ALL);
        assert_eq!(once, twice);
    }
}

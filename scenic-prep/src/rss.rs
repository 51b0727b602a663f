use crate::common::*;
use matrix_util::membership::{indicator_vector, unique_in_order};
use fnv::FnvHashSet as HashSet;
use rayon::prelude::*;

/// Jensen-Shannon distance between two discrete distributions, the
/// square root of the Jensen-Shannon divergence with base-2 logarithms,
/// so it lies in [0, 1].
///
/// * `p`, `q` - non-negative weights of the same length; each is
///   normalized to sum to one
pub fn jensen_shannon_distance(p: &[f64], q: &[f64]) -> anyhow::Result<f64> {
    if p.len() != q.len() {
        return Err(anyhow::anyhow!(
            "distributions of different lengths: {} vs. {}",
            p.len(),
            q.len()
        ));
    }

    let p = normalized(p)?;
    let q = normalized(q)?;

    let mut div = 0.0;
    for (&p_i, &q_i) in p.iter().zip(q.iter()) {
        let m_i = 0.5 * (p_i + q_i);
        if p_i > 0.0 {
            div += 0.5 * p_i * (p_i / m_i).log2();
        }
        if q_i > 0.0 {
            div += 0.5 * q_i * (q_i / m_i).log2();
        }
    }

    Ok(div.max(0.0).sqrt())
}

fn normalized(x: &[f64]) -> anyhow::Result<Vec<f64>> {
    if let Some(bad) = x.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(anyhow::anyhow!("invalid probability weight: {}", bad));
    }
    let tot: f64 = x.iter().sum();
    if !(tot > 0.0 && tot.is_finite()) {
        return Err(anyhow::anyhow!("weights sum to {}", tot));
    }
    Ok(x.iter().map(|v| v / tot).collect())
}

/// Regulon specificity scores (Suo et al., Cell Reports 2018)
///
/// `rss(type, regulon) = 1 - JSD(auc[, regulon], 1[label == type])`
///
/// * `auc` - cells x regulons activity
/// * `labels` - cell type of each cell (same order as the rows of `auc`)
///
/// Returns cell types x regulons where cell types are ordered by their
/// first appearance in `labels`. See
/// [`regulon_specificity_scores_ordered`] to order them as in the cell
/// metadata instead.
pub fn regulon_specificity_scores(auc: &AucMatrix, labels: &[Box<str>]) -> anyhow::Result<RssMatrix> {
    let cell_types = unique_in_order(labels);
    specificity_scores(auc, labels, &cell_types)
}

/// Regulon specificity scores with cell types ordered as in `type_order`,
/// e.g., unique values of the metadata column in order of first
/// appearance. Types in `type_order` without any labelled cell are
/// dropped; labels missing from `type_order` come last.
pub fn regulon_specificity_scores_ordered(
    auc: &AucMatrix,
    labels: &[Box<str>],
    type_order: &[Box<str>],
) -> anyhow::Result<RssMatrix> {
    let present: HashSet<&str> = labels.iter().map(|x| &x[..]).collect();
    let mut cell_types: Vec<Box<str>> = type_order
        .iter()
        .filter(|t| present.contains(&t[..]))
        .cloned()
        .collect();

    let listed: HashSet<&str> = cell_types.iter().map(|x| &x[..]).collect();
    let rest: Vec<Box<str>> = unique_in_order(labels)
        .into_iter()
        .filter(|t| !listed.contains(&t[..]))
        .collect();
    cell_types.extend(rest);

    specificity_scores(auc, labels, &cell_types)
}

fn specificity_scores(
    auc: &AucMatrix,
    labels: &[Box<str>],
    cell_types: &[Box<str>],
) -> anyhow::Result<RssMatrix> {
    let (ncells, nregulons) = auc.mat.shape();

    if labels.len() != ncells {
        return Err(anyhow::anyhow!(
            "{} labels for {} cells of AUC",
            labels.len(),
            ncells
        ));
    }

    if auc.cols.len() != nregulons {
        return Err(anyhow::anyhow!(
            "{} regulon names for {} AUC columns",
            auc.cols.len(),
            nregulons
        ));
    }

    if cell_types.is_empty() {
        return Err(anyhow::anyhow!("no cell types"));
    }

    let type_dists = cell_types
        .iter()
        .map(|t| {
            let indicator = indicator_vector(labels, t);
            let size: f64 = indicator.iter().sum();
            if size > 0.0 {
                Ok(indicator.into_iter().map(|x| x / size).collect::<Vec<_>>())
            } else {
                Err(anyhow::anyhow!("cell type `{}` has no cells", t))
            }
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    info!(
        "RSS of {} regulons over {} cell types ({} cells)",
        nregulons,
        cell_types.len(),
        ncells
    );

    let scores = (0..nregulons)
        .into_par_iter()
        .map(|j| -> anyhow::Result<Vec<f64>> {
            let regulon = &auc.cols[j];
            let column: Vec<f64> = auc.mat.column(j).iter().copied().collect();

            if let Some(bad) = column.iter().find(|x| !x.is_finite() || **x < 0.0) {
                return Err(anyhow::anyhow!(
                    "regulon `{}` has an invalid AUC value: {}",
                    regulon,
                    bad
                ));
            }

            let tot: f64 = column.iter().sum();
            if !(tot > 0.0 && tot.is_finite()) {
                return Err(anyhow::anyhow!(
                    "regulon `{}` has AUC sum {} across cells",
                    regulon,
                    tot
                ));
            }

            type_dists
                .iter()
                .map(|q| {
                    let d = jensen_shannon_distance(&column, q)?;
                    Ok((1.0 - d).clamp(0.0, 1.0))
                })
                .collect()
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut rss = Mat::zeros(cell_types.len(), nregulons);
    for (j, column) in scores.into_iter().enumerate() {
        for (k, s) in column.into_iter().enumerate() {
            rss[(k, j)] = s;
        }
    }

    Ok(MatWithNames {
        rows: cell_types.to_vec(),
        cols: auc.cols.clone(),
        mat: rss,
    })
}

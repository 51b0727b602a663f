use fnv::FnvHashSet as HashSet;

/// Generate minibatch intervals
/// * `ntot` - number of total samples
/// * `batch_size` - the size of each batch
pub fn generate_minibatch_intervals(ntot: usize, batch_size: usize) -> Vec<(usize, usize)> {
    let batch_size = batch_size.max(1);
    let num_batches = ntot.div_ceil(batch_size);
    (0..num_batches)
        .map(|b| {
            let lb: usize = b * batch_size;
            let ub: usize = ((b + 1) * batch_size).min(ntot);
            (lb, ub)
        })
        .collect::<Vec<_>>()
}

/// Make names unique by appending `{sep}1`, `{sep}2`, ... to repeated
/// occurrences. The first occurrence keeps its name, and a suffix is
/// skipped if the resulting name is already taken.
///
/// E.g., `[A, B, A, A-1, A]` becomes `[A, B, A-2, A-1, A-3]`
pub fn make_names_unique(names: &[Box<str>], sep: &str) -> Vec<Box<str>> {
    let mut taken: HashSet<Box<str>> = names.iter().cloned().collect();
    let mut seen: HashSet<&str> = HashSet::default();
    let mut next_suffix: fnv::FnvHashMap<&str, usize> = Default::default();

    let mut ret = Vec::with_capacity(names.len());

    for x in names.iter() {
        if seen.insert(x.as_ref()) {
            ret.push(x.clone());
            continue;
        }

        let k = next_suffix.entry(x.as_ref()).or_insert(1);
        loop {
            let candidate: Box<str> = format!("{}{}{}", x, sep, k).into_boxed_str();
            *k += 1;
            if taken.insert(candidate.clone()) {
                ret.push(candidate);
                break;
            }
        }
    }
    ret
}

/// Insert `_` before every `(` of a regulon name, e.g., `Sox2(+)`
/// becomes `Sox2_(+)`. A `(` that already follows `_` is left alone, so
/// normalizing twice is the same as normalizing once.
pub fn normalize_regulon_name(name: &str) -> Box<str> {
    let mut ret = String::with_capacity(name.len() + 2);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c == '(' && prev != Some('_') {
            ret.push('_');
        }
        ret.push(c);
        prev = Some(c);
    }
    ret.into_boxed_str()
}

pub fn normalize_regulon_names(names: &[Box<str>]) -> Vec<Box<str>> {
    names.iter().map(|x| normalize_regulon_name(x)).collect()
}

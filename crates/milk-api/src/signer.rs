use crate::request::Params;

/// Compute `api_sig` for a parameter set.
///
/// Entries are sorted by key, concatenated as `key` + `value` with no
/// separators, prefixed with the shared secret and MD5-hashed. The digest is
/// rendered as lowercase hex.
pub fn sign(shared_secret: &str, params: &Params) -> String {
    let mut entries: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    entries.sort_unstable();

    let mut payload = String::from(shared_secret);
    for (key, value) in entries {
        payload.push_str(key);
        payload.push_str(value);
    }
    format!("{:x}", md5::compute(payload.as_bytes()))
}

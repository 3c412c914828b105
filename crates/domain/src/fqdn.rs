/// Canonical form of a hostname: trimmed, lowercase, trailing dot.
pub fn to_fqdn(name: &str) -> String {
    let mut fqdn = name.trim().to_ascii_lowercase();
    if !fqdn.ends_with('.') {
        fqdn.push('.');
    }
    fqdn
}

/// Yields `fqdn` then each parent domain, most specific first.
/// The root domain is never yielded.
pub fn parent_domains(fqdn: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(fqdn);
    std::iter::from_fn(move || {
        let current = next?;
        if current.is_empty() || current == "." {
            next = None;
            return None;
        }
        next = current.find('.').map(|dot| &current[dot + 1..]);
        Some(current)
    })
}

/// True when `host` equals `parent` or sits below it on a label boundary.
/// Both arguments must already be canonical.
pub fn is_same_or_subdomain(host: &str, parent: &str) -> bool {
    if host == parent {
        return true;
    }
    match host.strip_suffix(parent) {
        Some(prefix) => prefix.ends_with('.') && parent != ".",
        None => false,
    }
}

pub(crate) mod ipv4_cidr;
pub(crate) mod numeric;
pub(crate) mod sanitize;

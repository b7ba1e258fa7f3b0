use crate::ProtectedPages;

/// What the blocker needs to know about an in-flight request.
///
/// Hosts implement this on top of their own request type.
pub trait BlockRequest {
    /// Client address as reported by the connection, if known.
    fn client_addr(&self) -> Option<&str>;

    /// Whether the request targets one of the protected pages.
    fn targets_resource(&self, pages: &ProtectedPages) -> bool;
}

/// A request for a page identified by a numeric ID.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct PageRequest {
    page_id: Option<u64>,
    client_addr: Option<String>,
}

impl PageRequest {
    #[must_use]
    pub fn new(page_id: Option<u64>, client_addr: Option<&str>) -> Self {
        Self {
            page_id,
            client_addr: client_addr.map(str::to_owned),
        }
    }
}

impl BlockRequest for PageRequest {
    fn client_addr(&self) -> Option<&str> {
        self.client_addr.as_deref()
    }

    fn targets_resource(&self, pages: &ProtectedPages) -> bool {
        self.page_id.is_some_and(|id| pages.contains(id))
    }
}

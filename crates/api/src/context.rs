use nestegg_core::OwnerId;

/// Owner context for a request.
///
/// Inserted by the auth middleware after token verification and passed
/// explicitly into every core call. This is immutable and must be present
/// for all ledger routes; there is no ambient "current user".
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OwnerContext {
    owner_id: OwnerId,
}

impl OwnerContext {
    pub fn new(owner_id: OwnerId) -> Self {
        Self { owner_id }
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }
}

//! The authorization gate for privileged user mutations.
use std::fmt::Debug;

use log::*;

use crate::{
    bss_api::{errors::AuthApiError, user_api::EMAIL_FIELD},
    db_types::{Collection, Principal, Role, UpdateReceipt},
    traits::{Filter, Patch, ResourceStore, UpdateOptions},
};

/// `AuthApi` decides whether a requester may perform privileged mutations, and performs them if so.
///
/// The only privileged mutation is promoting a user to [`Role::Admin`]. The requester is identified by a verified
/// [`Principal`], and their role is looked up from the users collection on every request.
pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B>
where B: ResourceStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Returns true iff `requester` is present and belongs to a user account with the admin role.
    ///
    /// An absent principal and a principal with no user account are both a plain `false`. Only store failures are
    /// errors.
    pub async fn can_grant_admin(&self, requester: Option<&Principal>) -> Result<bool, AuthApiError> {
        let Some(requester) = requester else {
            debug!("🔐️ No verified requester. Admin grant denied");
            return Ok(false);
        };
        let filter = Filter::field_eq(EMAIL_FIELD, requester.email.as_str());
        let account = self.db.find_one(Collection::Users, &filter).await?;
        let allowed = match account {
            Some(account) => Role::of(&account) == Role::Admin,
            None => {
                debug!("🔐️ Requester {requester} has no user account");
                false
            },
        };
        trace!("🔐️ Requester {requester} may grant admin: {allowed}");
        Ok(allowed)
    }

    /// Promotes the user with `target_email` to admin, on behalf of `requester`.
    ///
    /// Refused with [`AuthApiError::InsufficientPermissions`] when the requester may not grant admin, and also when no
    /// user has `target_email`, so that callers cannot fish for accounts.
    pub async fn grant_admin(
        &self,
        requester: Option<&Principal>,
        target_email: &str,
    ) -> Result<UpdateReceipt, AuthApiError> {
        if !self.can_grant_admin(requester).await? {
            return Err(AuthApiError::InsufficientPermissions);
        }
        let filter = Filter::field_eq(EMAIL_FIELD, target_email);
        let patch = Patch::default().with(Role::FIELD, Role::Admin.to_string());
        let receipt = self.db.update_one(Collection::Users, &filter, &patch, UpdateOptions::default()).await?;
        if receipt.matched_count == 0 {
            info!("🔐️ Admin grant for {target_email} matched no user account");
            return Err(AuthApiError::InsufficientPermissions);
        }
        info!("🔐️ {target_email} was granted the admin role");
        Ok(receipt)
    }
}

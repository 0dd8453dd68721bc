use chrono::{Duration, Utc};
use eyre::{Error, Result};
use log::warn;
use model::{admin::Admin, auth::AuthKey, session::Session};
use storage::{admin::AdminStore, auth_key::AuthKeys};
use tx_macro::tx;

const KEY_MAX_AGE_DAYS: i64 = 20;

#[derive(Clone)]
pub struct Auth {
    admins: AdminStore,
    keys: AuthKeys,
}

impl Auth {
    pub(crate) fn new(admins: AdminStore, keys: AuthKeys) -> Self {
        Auth { admins, keys }
    }

    /// Verifies the credentials and hands out a session key. `None` means
    /// the credentials were wrong; the caller decides how slowly to say so.
    #[tx]
    pub async fn login(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> Result<Option<AuthKey>> {
        let Some(admin) = self.admins.get_by_username(session, username).await? else {
            warn!("login attempt for unknown user '{}'", username);
            return Ok(None);
        };
        if !admin.verify_password(password) {
            warn!("wrong password for '{}'", username);
            return Ok(None);
        }

        // Reuse a fresh key so parallel admin tabs share one session.
        if let Some(key) = self.keys.get(session, admin.id).await? {
            if Utc::now() - key.created_at < Duration::days(KEY_MAX_AGE_DAYS) {
                return Ok(Some(key));
            }
        }
        let key = AuthKey::gen(admin.id);
        self.keys.upsert(session, &key).await?;
        Ok(Some(key))
    }

    pub async fn authenticate(
        &self,
        session: &mut Session,
        key: &str,
    ) -> Result<Option<Admin>, Error> {
        let Some(auth_key) = self.keys.get_by_key(session, key).await? else {
            return Ok(None);
        };
        if Utc::now() - auth_key.created_at > Duration::days(KEY_MAX_AGE_DAYS) {
            return Ok(None);
        }
        self.admins.get(session, auth_key.admin_id).await
    }

    pub async fn logout(&self, session: &mut Session, key: &str) -> Result<(), Error> {
        self.keys.remove_by_key(session, key).await
    }

    /// Bootstrap helper: inserts the admin unless the username is taken.
    pub(crate) async fn provision(
        &self,
        session: &mut Session,
        admin: &Admin,
    ) -> Result<bool, Error> {
        self.admins.insert(session, admin).await
    }
}

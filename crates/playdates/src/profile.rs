//! User profiles and child rosters.

use auth::{Identity, IdentityProvider};
use chrono::Local;
use entities::{Child, User};
use playdate_store::PlaydateStore;

use crate::{validation, PlaydateError, PlaydateResult, PlaydateService};

/// Editable profile fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name. Required.
    pub name: String,
    /// `None` keeps the current number; `Some("")` clears it.
    pub phone_number: Option<String>,
}

impl ProfileUpdate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: None,
        }
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }
}

impl<S: PlaydateStore> PlaydateService<S> {
    /// Creates the profile for a newly registered identity.
    ///
    /// Registering an identity that already has a profile returns the
    /// existing profile unchanged.
    pub async fn register_user(&self, identity: &Identity) -> PlaydateResult<User> {
        if let Some(existing) = self
            .store_call("get_user", self.store.get_user(&identity.id))
            .await?
        {
            tracing::debug!(user_id = %identity.id, "User already registered");
            return Ok(existing);
        }

        let name = validation::required("Name", identity.display_name())?;
        let user = User::new(&identity.id, &identity.email, name);
        let created = match self
            .store_call("create_user", self.store.create_user(user))
            .await
        {
            Ok(created) => created,
            Err(e) if e.is_already_exists() => {
                // A concurrent registration of the same identity may have won
                return match self
                    .store_call("get_user", self.store.get_user(&identity.id))
                    .await?
                {
                    Some(existing) => {
                        tracing::debug!(user_id = %identity.id, "User registered concurrently");
                        Ok(existing)
                    }
                    None => Err(e),
                };
            }
            Err(e) => return Err(e),
        };

        tracing::info!(user_id = %created.id, email = %created.email, "Registered user");
        Ok(created)
    }

    /// Registers whoever is currently signed in with `provider`.
    pub async fn register_signed_in<P: IdentityProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> PlaydateResult<User> {
        let identity = provider
            .require_identity()
            .map_err(|_| PlaydateError::NotSignedIn)?;
        self.register_user(&identity).await
    }

    pub async fn get_profile(&self, user_id: &str) -> PlaydateResult<User> {
        self.store_call("get_user", self.store.get_user(user_id))
            .await?
            .ok_or_else(|| PlaydateError::not_found("User", user_id))
    }

    /// Updates the name and optionally the phone number.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> PlaydateResult<User> {
        let name = validation::required("Name", &update.name)?;
        let phone_number = update.phone_number.as_deref().map(str::trim);

        let user = self
            .modify_user("update_profile", user_id, |user| {
                user.name = name.clone();
                if let Some(phone) = phone_number {
                    user.phone_number = (!phone.is_empty()).then(|| phone.to_string());
                }
                Ok(())
            })
            .await?;

        tracing::info!(user_id, "Updated profile");
        Ok(user)
    }

    /// Appends a child to the roster. Invalid input leaves the roster as is.
    pub async fn add_child(&self, user_id: &str, name: &str, age: u32) -> PlaydateResult<User> {
        let name = validation::required("Child name", name)?;
        let age = validation::child_age(age)?;
        let today = Local::now().date_naive();

        let user = self
            .modify_user("add_child", user_id, |user| {
                user.children.push(Child::new(name.clone(), age, today));
                Ok(())
            })
            .await?;

        tracing::info!(user_id, children = user.children.len(), "Added child");
        Ok(user)
    }

    /// Removes the child at `index` from the roster. Negative positions are
    /// out of range like any other.
    pub async fn remove_child(&self, user_id: &str, index: i64) -> PlaydateResult<User> {
        let user = self
            .modify_user("remove_child", user_id, |user| {
                let len = user.children.len();
                let position = usize::try_from(index)
                    .ok()
                    .filter(|&position| position < len)
                    .ok_or(PlaydateError::IndexOutOfRange { index, len })?;
                user.children.remove(position);
                Ok(())
            })
            .await?;

        tracing::info!(user_id, index, children = user.children.len(), "Removed child");
        Ok(user)
    }

    /// Read-modify-write of one user record, retried on version conflicts.
    async fn modify_user<F>(
        &self,
        operation: &'static str,
        user_id: &str,
        change: F,
    ) -> PlaydateResult<User>
    where
        F: Fn(&mut User) -> PlaydateResult<()>,
    {
        let change = &change;
        self.retry_on_conflict(operation, || async move {
            let mut user = self.get_profile(user_id).await?;
            change(&mut user)?;
            self.store_call(operation, self.store.update_user(user))
                .await
        })
        .await
    }
}

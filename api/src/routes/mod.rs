//! HTTP route handlers
//!
//! - `users`: registration, login, token refresh and logout
//! - `entries`: creating, finding, revealing and listing secret entries

pub mod entries;
pub mod users;

use std::sync::Arc;

use sk_core::repositories::{EntryRepository, TokenRepository, UserRepository};
use sk_core::services::entry::{EntryNotifier, EntryService};
use sk_core::services::token::TokenService;
use sk_core::services::user::UserService;

/// Services shared by every handler
pub struct AppState<E, N, T, U>
where
    E: EntryRepository,
    N: EntryNotifier,
    T: TokenRepository,
    U: UserRepository,
{
    pub entry_service: Arc<EntryService<E, N>>,
    pub token_service: Arc<TokenService<T>>,
    pub user_service: Arc<UserService<U>>,
}

impl<E, N, T, U> AppState<E, N, T, U>
where
    E: EntryRepository,
    N: EntryNotifier,
    T: TokenRepository,
    U: UserRepository,
{
    pub fn new(
        entry_service: Arc<EntryService<E, N>>,
        token_service: Arc<TokenService<T>>,
        user_service: Arc<UserService<U>>,
    ) -> Self {
        Self {
            entry_service,
            token_service,
            user_service,
        }
    }
}

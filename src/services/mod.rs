//! Business logic services

pub mod auth;
pub mod books;
pub mod borrows;
pub mod genres;
pub mod roles;
pub mod users;

use crate::{
    config::{AuthConfig, CirculationConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub roles: roles::RolesService,
    pub users: users::UsersService,
    pub genres: genres::GenresService,
    pub books: books::BooksService,
    pub borrows: borrows::BorrowsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        circulation_config: CirculationConfig,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            roles: roles::RolesService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            genres: genres::GenresService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository, circulation_config),
        }
    }
}

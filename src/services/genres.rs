//! Genre management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::genre::{CreateGenre, Genre, UpdateGenre},
    repository::Repository,
};

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all genres
    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    /// Get genre by ID
    pub async fn get_genre(&self, id: Uuid) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    /// Create a new genre
    pub async fn create_genre(&self, genre: CreateGenre, created_by: &str) -> AppResult<Genre> {
        if self.repository.genres.name_exists(&genre.name, None).await? {
            return Err(AppError::Conflict(format!(
                "Genre \"{}\" already exists",
                genre.name
            )));
        }
        self.repository.genres.create(&genre, created_by).await
    }

    /// Update an existing genre
    pub async fn update_genre(
        &self,
        id: Uuid,
        genre: UpdateGenre,
        modified_by: &str,
    ) -> AppResult<Genre> {
        if let Some(ref name) = genre.name {
            if self.repository.genres.name_exists(name, Some(id)).await? {
                return Err(AppError::Conflict(format!("Genre \"{}\" already exists", name)));
            }
        }
        self.repository.genres.update(id, &genre, modified_by).await
    }

    /// Delete a genre
    pub async fn delete_genre(&self, id: Uuid) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }
}

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: AppConfig,
}

pub mod manager;
pub mod models;
pub mod query;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{Curriculum, PersonalInfo, User};
pub use query::{CurriculumColumn, CurriculumInclude, OrderBy, SortDirection, UserQuery};
pub use repository::{PgUserStore, UserStore};

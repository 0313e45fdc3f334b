pub mod curriculum;
pub mod personal_info;
pub mod user;

pub use curriculum::{Curriculum, CurriculumRow};
pub use personal_info::PersonalInfo;
pub use user::User;

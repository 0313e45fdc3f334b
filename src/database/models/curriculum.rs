use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::PersonalInfo;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curriculum {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub template: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub personal_info: Option<PersonalInfo>,
}

/// One row of `Curriculum LEFT JOIN PersonalInfo`; personal info columns are
/// prefixed with `pi_` and all null when the curriculum has none.
#[derive(Debug, FromRow)]
pub struct CurriculumRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub template: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pi_id: Option<String>,
    pub pi_full_name: Option<String>,
    pub pi_email: Option<String>,
    pub pi_phone: Option<String>,
    pub pi_location: Option<String>,
    pub pi_linkedin: Option<String>,
    pub pi_website: Option<String>,
    pub pi_summary: Option<String>,
}

impl CurriculumRow {
    pub fn into_curriculum(self, with_personal_info: bool) -> Curriculum {
        let personal_info = match self.pi_id {
            Some(pi_id) if with_personal_info => Some(PersonalInfo {
                id: pi_id,
                curriculum_id: self.id.clone(),
                full_name: self.pi_full_name.unwrap_or_default(),
                email: self.pi_email,
                phone: self.pi_phone,
                location: self.pi_location,
                linkedin: self.pi_linkedin,
                website: self.pi_website,
                summary: self.pi_summary,
            }),
            _ => None,
        };

        Curriculum {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            template: self.template,
            created_at: self.created_at,
            updated_at: self.updated_at,
            personal_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pi_id: Option<&str>) -> CurriculumRow {
        CurriculumRow {
            id: "cv-1".into(),
            user_id: "user-1".into(),
            title: "Backend".into(),
            template: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            pi_id: pi_id.map(str::to_string),
            pi_full_name: pi_id.map(|_| "Ana".to_string()),
            pi_email: None,
            pi_phone: None,
            pi_location: None,
            pi_linkedin: None,
            pi_website: None,
            pi_summary: None,
        }
    }

    #[test]
    fn joined_row_carries_personal_info() {
        let cv = row(Some("pi-1")).into_curriculum(true);
        let info = cv.personal_info.expect("personal info");
        assert_eq!(info.curriculum_id, "cv-1");
        assert_eq!(info.full_name, "Ana");
    }

    #[test]
    fn unmatched_join_yields_null_personal_info() {
        assert_eq!(row(None).into_curriculum(true).personal_info, None);
    }

    #[test]
    fn personal_info_dropped_when_not_requested() {
        assert_eq!(row(Some("pi-1")).into_curriculum(false).personal_info, None);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(row(None).into_curriculum(true)).unwrap();
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("userId").is_some());
        assert_eq!(value["personalInfo"], serde_json::Value::Null);
    }
}

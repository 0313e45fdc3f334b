#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Curriculum columns a query may sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurriculumColumn {
    UpdatedAt,
}

impl CurriculumColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            CurriculumColumn::UpdatedAt => "updatedAt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: CurriculumColumn,
    pub direction: SortDirection,
}

/// Which curriculum relations to load and how to order them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurriculumInclude {
    pub personal_info: bool,
    pub order_by: Vec<OrderBy>,
}

impl CurriculumInclude {
    /// `ORDER BY` clause for the curriculum table aliased as `alias`.
    pub fn order_clause(&self, alias: &str) -> String {
        if self.order_by.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = self
            .order_by
            .iter()
            .map(|o| format!("\"{}\".\"{}\" {}", alias, o.column.column_name(), o.direction.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

/// Declarative description of a user lookup: the user by its unique email,
/// plus the owned relations to eager-load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub email: String,
    pub curriculums: Option<CurriculumInclude>,
}

impl UserQuery {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            curriculums: None,
        }
    }

    /// The dashboard view: every curriculum with its personal info, most
    /// recently updated first.
    pub fn dashboard(email: impl Into<String>) -> Self {
        Self::by_email(email).include_curriculums(CurriculumInclude {
            personal_info: true,
            order_by: vec![OrderBy {
                column: CurriculumColumn::UpdatedAt,
                direction: SortDirection::Desc,
            }],
        })
    }

    pub fn include_curriculums(mut self, include: CurriculumInclude) -> Self {
        self.curriculums = Some(include);
        self
    }
}

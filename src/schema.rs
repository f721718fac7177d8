//! Table mappings for the persisted entities.
//!
//! The column lists here drive the SQL issued by the Postgres repository and
//! mirror the DDL under `migrations/`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub nullable: bool,
    pub primary_key: bool,
    /// Referenced `(table, column)` for foreign keys.
    pub references: Option<(&'static str, &'static str)>,
}

impl ColumnDef {
    const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            primary_key: false,
            references: None,
        }
    }

    const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some((table, column));
        self
    }

    fn ddl(&self) -> String {
        let mut line = format!("    {} {}", self.name, self.sql_type);
        if self.primary_key {
            line.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            line.push_str(" NOT NULL");
        }
        if let Some((table, column)) = self.references {
            line.push_str(&format!(" REFERENCES {} ({})", table, column));
        }
        line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

pub const AUTHOR_TABLE: TableSchema = TableSchema {
    name: "author",
    columns: &[
        ColumnDef::new("id", "BIGSERIAL").primary_key(),
        ColumnDef::new("name", "VARCHAR(255)"),
        ColumnDef::new("email", "VARCHAR(255)"),
        ColumnDef::new("created_at", "TIMESTAMPTZ"),
        ColumnDef::new("updated_at", "TIMESTAMPTZ"),
    ],
};

// slug is deliberately not UNIQUE: posts may share a title.
pub const POST_TABLE: TableSchema = TableSchema {
    name: "post",
    columns: &[
        ColumnDef::new("id", "BIGSERIAL").primary_key(),
        ColumnDef::new("title", "VARCHAR(150)"),
        ColumnDef::new("content", "TEXT"),
        ColumnDef::new("author_id", "BIGINT").references("author", "id"),
        ColumnDef::new("cover", "VARCHAR(255)").nullable(),
        ColumnDef::new("slug", "VARCHAR(255)"),
        ColumnDef::new("created_at", "TIMESTAMPTZ"),
        ColumnDef::new("updated_at", "TIMESTAMPTZ"),
    ],
};

impl TableSchema {
    pub fn primary_key(&self) -> &'static str {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name)
            .unwrap_or("id")
    }

    /// Every column except the generated primary key, in declaration order.
    pub fn writable_columns(&self) -> impl Iterator<Item = &'static ColumnDef> {
        self.columns.iter().filter(|c| !c.primary_key)
    }

    pub fn select_sql(&self) -> String {
        let columns: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        format!("SELECT {} FROM {}", columns.join(", "), self.name)
    }

    pub fn insert_sql(&self) -> String {
        let columns: Vec<&str> = self.writable_columns().map(|c| c.name).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            self.name,
            columns.join(", "),
            placeholders.join(", "),
            self.primary_key()
        )
    }

    pub fn update_sql(&self) -> String {
        let assignments: Vec<String> = self
            .writable_columns()
            .enumerate()
            .map(|(i, c)| format!("{} = ${}", c.name, i + 1))
            .collect();
        format!(
            "UPDATE {} SET {} WHERE {} = ${}",
            self.name,
            assignments.join(", "),
            self.primary_key(),
            assignments.len() + 1
        )
    }

    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(ColumnDef::ddl).collect();
        format!("CREATE TABLE {} (\n{}\n);", self.name, columns.join(",\n"))
    }
}
